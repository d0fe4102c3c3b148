//! Element tree: the live, running instantiation of a node tree.
//!
//! Ticks carry the wall time elapsed since the receiving element's own
//! start, not since the run's start. An element that finishes inside a tick
//! reports the unconsumed remainder so the scheduler hands it to whatever
//! runs next within the same pass; composite durations therefore never
//! drift with frame size.

use crate::config::Config;
use crate::curve::Curve;
use crate::effect::{ActionHandle, ActionScope, Spawner};
use crate::ids::WriterId;
use crate::interp::TweenFn;
use crate::node::{ActionNode, AnimationNode, ValueAnimation};
use crate::store::{AnimatedValue, ValueStore};
use crate::value::Value;

/// Outcome of one tick delivered to an element.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Tick {
    Running,
    /// The element finished; `remainder` is the slice of this tick's
    /// elapsed time it did not consume. Reported exactly once; the parent
    /// drops the element on exit.
    Exited { remainder: f32 },
}

/// Duration/curve defaults inherited from enclosing defaults scopes.
///
/// Threaded down through element construction instead of looked up via
/// parent back-links; the nearest enclosing scope wins.
#[derive(Copy, Clone, Debug, Default)]
pub struct ScopedDefaults {
    pub duration: Option<f32>,
    pub curve: Option<Curve>,
}

impl ScopedDefaults {
    fn narrowed(self, duration: Option<f32>, curve: Option<Curve>) -> Self {
        Self {
            duration: duration.or(self.duration),
            curve: curve.or(self.curve),
        }
    }
}

/// Everything an element may touch while starting, ticking, or canceling.
pub struct RunCtx<'a> {
    pub store: &'a mut ValueStore,
    pub config: &'a Config,
    /// Static node tree of the whole run; resets without an explicit
    /// target list walk this.
    pub root: &'a AnimationNode,
    pub spawner: &'a Spawner,
}

/// Live counterpart of one node instance within one run.
pub enum Element {
    Group(GroupElement),
    Sequence(SequenceElement),
    Animate(AnimateElement),
    Delay(DelayElement),
    Speed(SpeedElement),
    Defaults(DefaultsElement),
    Reset(ResetElement),
    Action(ActionElement),
}

impl Element {
    /// Instantiate the element for `node` and start it. Construction and
    /// start are one step, so a not-yet-started element cannot be ticked.
    pub fn start(node: &AnimationNode, scope: ScopedDefaults, ctx: &mut RunCtx<'_>) -> Element {
        match node {
            AnimationNode::Group(children) => {
                Element::Group(GroupElement::start(children, scope, ctx))
            }
            AnimationNode::Sequence(children) => {
                Element::Sequence(SequenceElement::start(children, scope, ctx))
            }
            AnimationNode::Animate(anim) => Element::Animate(AnimateElement::start(anim, scope, ctx)),
            AnimationNode::Delay { duration, child } => {
                Element::Delay(DelayElement::start(*duration, child.as_deref(), scope))
            }
            AnimationNode::Speed { factor, child } => {
                Element::Speed(SpeedElement::start(*factor, child, scope, ctx))
            }
            AnimationNode::Defaults {
                duration,
                curve,
                child,
            } => Element::Defaults(DefaultsElement::start(*duration, *curve, child, scope, ctx)),
            AnimationNode::Reset { targets } => Element::Reset(ResetElement::start(targets, ctx)),
            AnimationNode::Action(action) => Element::Action(ActionElement::start(action, ctx)),
        }
    }

    /// Advance to `elapsed` seconds since this element's own start.
    pub fn tick(&mut self, elapsed: f32, ctx: &mut RunCtx<'_>) -> Tick {
        assert!(
            elapsed.is_finite() && elapsed >= 0.0,
            "tick with invalid elapsed {elapsed}"
        );
        match self {
            Element::Group(el) => el.tick(elapsed, ctx),
            Element::Sequence(el) => el.tick(elapsed, ctx),
            Element::Animate(el) => el.tick(elapsed, ctx),
            Element::Delay(el) => el.tick(elapsed, ctx),
            Element::Speed(el) => el.tick(elapsed, ctx),
            Element::Defaults(el) => el.tick(elapsed, ctx),
            Element::Reset(el) => el.tick(elapsed),
            Element::Action(el) => el.tick(elapsed),
        }
    }

    /// Stop immediately, depth-first. No exit is reported, no further value
    /// writes happen, and a still-pending action effect resolving later is
    /// ignored.
    pub fn cancel(&mut self, ctx: &mut RunCtx<'_>) {
        match self {
            Element::Group(el) => {
                for child in &mut el.children {
                    child.cancel(ctx);
                }
            }
            Element::Sequence(el) => {
                if let Some(current) = el.current.as_mut() {
                    current.cancel(ctx);
                }
            }
            Element::Animate(el) => el.cancel(ctx),
            Element::Delay(el) => {
                if let Some(child) = el.child.as_mut() {
                    child.cancel(ctx);
                }
            }
            Element::Speed(el) => el.child.cancel(ctx),
            Element::Defaults(el) => el.child.cancel(ctx),
            Element::Reset(_) | Element::Action(_) => {}
        }
    }
}

/// Runs all children against the same timeline; finishes when the last one
/// does.
pub struct GroupElement {
    children: Vec<Element>,
    /// Remainders recorded as each child exited.
    exited: Vec<f32>,
}

impl GroupElement {
    fn start(children: &[AnimationNode], scope: ScopedDefaults, ctx: &mut RunCtx<'_>) -> Self {
        Self {
            children: children
                .iter()
                .map(|child| Element::start(child, scope, ctx))
                .collect(),
            exited: Vec::new(),
        }
    }

    fn tick(&mut self, elapsed: f32, ctx: &mut RunCtx<'_>) -> Tick {
        let mut i = 0;
        while i < self.children.len() {
            match self.children[i].tick(elapsed, ctx) {
                Tick::Running => i += 1,
                Tick::Exited { remainder } => {
                    self.exited.push(remainder);
                    self.children.remove(i);
                }
            }
        }
        if self.children.is_empty() {
            // Only slack common to every child is forwarded; an empty group
            // passes the tick through whole.
            let remainder = self.exited.iter().copied().fold(elapsed, f32::min);
            Tick::Exited { remainder }
        } else {
            Tick::Running
        }
    }
}

/// Runs children one after another on a shared timeline.
pub struct SequenceElement {
    nodes: Vec<AnimationNode>,
    /// Index of the next node to start.
    index: usize,
    current: Option<Box<Element>>,
    /// Sequence-relative time at which `current` began.
    offset: f32,
    scope: ScopedDefaults,
}

impl SequenceElement {
    fn start(children: &[AnimationNode], scope: ScopedDefaults, ctx: &mut RunCtx<'_>) -> Self {
        let mut el = Self {
            nodes: children.to_vec(),
            index: 0,
            current: None,
            offset: 0.0,
            scope,
        };
        if !el.nodes.is_empty() {
            el.current = Some(Box::new(Element::start(&el.nodes[0], scope, ctx)));
            el.index = 1;
        }
        el
    }

    fn tick(&mut self, elapsed: f32, ctx: &mut RunCtx<'_>) -> Tick {
        loop {
            let Some(current) = self.current.as_mut() else {
                return Tick::Exited {
                    remainder: elapsed - self.offset,
                };
            };
            let child_elapsed = (elapsed - self.offset).max(0.0);
            match current.tick(child_elapsed, ctx) {
                Tick::Running => return Tick::Running,
                Tick::Exited { remainder } => {
                    // The finished child consumed up to (elapsed - remainder)
                    // of sequence time; the successor starts there and is
                    // ticked with the remainder within this same pass.
                    self.offset = elapsed - remainder;
                    self.current = None;
                    if self.index < self.nodes.len() {
                        let next = Element::start(&self.nodes[self.index], self.scope, ctx);
                        self.index += 1;
                        self.current = Some(Box::new(next));
                    } else {
                        return Tick::Exited { remainder };
                    }
                }
            }
        }
    }
}

/// Per-value interpolation runtime: tween + curve + progress clock.
pub struct AnimateElement {
    key: String,
    tween: TweenFn,
    from: Value,
    to: Value,
    duration: f32,
    curve: Curve,
    writer: WriterId,
}

impl AnimateElement {
    fn start(anim: &ValueAnimation, scope: ScopedDefaults, ctx: &mut RunCtx<'_>) -> Self {
        let duration = anim
            .duration
            .or(scope.duration)
            .unwrap_or(ctx.config.default_duration);
        let curve = anim.curve.or(scope.curve).unwrap_or(ctx.config.default_curve);
        // Take over the slot before reading the start point: the previous
        // runtime's stop notification lands first, and the start value is
        // whatever was last committed.
        let writer = ctx.store.install_writer(&anim.target);
        let from = match &anim.from {
            Some(from) => from.clone(),
            None => ctx.store.current(&anim.target),
        };
        Self {
            key: anim.target.key().to_owned(),
            tween: anim.target.tween(),
            from,
            to: anim.to.clone(),
            duration,
            curve,
            writer,
        }
    }

    fn tick(&mut self, elapsed: f32, ctx: &mut RunCtx<'_>) -> Tick {
        if !ctx.store.is_active_writer(&self.key, self.writer) {
            // Evicted by a newer animation on the same value: stop without
            // writing and without consuming any of this tick.
            return Tick::Exited { remainder: elapsed };
        }
        if elapsed >= self.duration {
            // Land exactly on the end value; curve overshoot never leaks
            // past the boundary.
            ctx.store.write(&self.key, self.to.clone(), self.writer);
            ctx.store.release_writer(&self.key, self.writer);
            return Tick::Exited {
                remainder: elapsed - self.duration,
            };
        }
        let progress = self.curve.transform(elapsed / self.duration);
        let value = (self.tween)(&self.from, &self.to, progress);
        ctx.store.write(&self.key, value, self.writer);
        Tick::Running
    }

    fn cancel(&mut self, ctx: &mut RunCtx<'_>) {
        // Release only if still installed; a successor may own the slot.
        ctx.store.release_writer(&self.key, self.writer);
    }
}

/// Holds its (optional) child back until `duration` has passed, then runs
/// it on the leftover time.
pub struct DelayElement {
    duration: f32,
    pending: Option<AnimationNode>,
    child: Option<Box<Element>>,
    scope: ScopedDefaults,
}

impl DelayElement {
    fn start(duration: f32, child: Option<&AnimationNode>, scope: ScopedDefaults) -> Self {
        Self {
            duration,
            pending: child.cloned(),
            child: None,
            scope,
        }
    }

    fn tick(&mut self, elapsed: f32, ctx: &mut RunCtx<'_>) -> Tick {
        if let Some(child) = self.child.as_mut() {
            return child.tick(elapsed - self.duration, ctx);
        }
        if elapsed < self.duration {
            return Tick::Running;
        }
        match self.pending.take() {
            None => Tick::Exited {
                remainder: elapsed - self.duration,
            },
            Some(node) => {
                let mut child = Element::start(&node, self.scope, ctx);
                let result = child.tick(elapsed - self.duration, ctx);
                if matches!(result, Tick::Running) {
                    self.child = Some(Box::new(child));
                }
                result
            }
        }
    }
}

/// Scales the child's timeline by a positive factor, converting back to
/// wall-clock on the way out.
pub struct SpeedElement {
    factor: f32,
    child: Box<Element>,
}

impl SpeedElement {
    fn start(
        factor: f32,
        child: &AnimationNode,
        scope: ScopedDefaults,
        ctx: &mut RunCtx<'_>,
    ) -> Self {
        Self {
            factor,
            child: Box::new(Element::start(child, scope, ctx)),
        }
    }

    fn tick(&mut self, elapsed: f32, ctx: &mut RunCtx<'_>) -> Tick {
        match self.child.tick(elapsed * self.factor, ctx) {
            Tick::Running => Tick::Running,
            Tick::Exited { remainder } => Tick::Exited {
                remainder: remainder / self.factor,
            },
        }
    }
}

/// Transparent for ticking; exists so descendants started underneath see
/// the narrowed defaults scope.
pub struct DefaultsElement {
    child: Box<Element>,
}

impl DefaultsElement {
    fn start(
        duration: Option<f32>,
        curve: Option<Curve>,
        child: &AnimationNode,
        scope: ScopedDefaults,
        ctx: &mut RunCtx<'_>,
    ) -> Self {
        let narrowed = scope.narrowed(duration, curve);
        Self {
            child: Box::new(Element::start(child, narrowed, ctx)),
        }
    }

    fn tick(&mut self, elapsed: f32, ctx: &mut RunCtx<'_>) -> Tick {
        self.child.tick(elapsed, ctx)
    }
}

/// Writes defaults back synchronously at start and consumes no time.
pub struct ResetElement;

impl ResetElement {
    fn start(targets: &[AnimatedValue], ctx: &mut RunCtx<'_>) -> Self {
        if targets.is_empty() {
            let mut reachable = Vec::new();
            ctx.root.collect_values(&mut reachable);
            for value in &reachable {
                ctx.store.reset(value);
            }
        } else {
            for value in targets {
                ctx.store.reset(value);
            }
        }
        ResetElement
    }

    fn tick(&mut self, elapsed: f32) -> Tick {
        Tick::Exited { remainder: elapsed }
    }
}

/// Runs its effect at start and stays open until the effect completes.
pub struct ActionElement {
    handle: ActionHandle,
    completed_at_start: bool,
}

impl ActionElement {
    fn start(action: &ActionNode, ctx: &mut RunCtx<'_>) -> Self {
        let handle = ActionHandle::default();
        (action.effect)(ActionScope {
            handle: handle.clone(),
            spawner: ctx.spawner.clone(),
        });
        let completed_at_start = handle.is_complete();
        Self {
            handle,
            completed_at_start,
        }
    }

    fn tick(&mut self, elapsed: f32) -> Tick {
        if !self.handle.is_complete() {
            return Tick::Running;
        }
        if self.completed_at_start {
            // Synchronous effect: consumed no time.
            Tick::Exited { remainder: elapsed }
        } else {
            // Time spent awaiting is not slack to forward.
            Tick::Exited { remainder: 0.0 }
        }
    }
}
