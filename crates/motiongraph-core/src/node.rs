//! Declarative animation nodes: the immutable, composable graph.
//!
//! Nodes are pure data (plus an opaque effect closure for Action) and may
//! be reused to start any number of independent runs. Combinators wrap or
//! rewrite trees without executing them.

use std::fmt;
use std::rc::Rc;

use crate::curve::Curve;
use crate::effect::ActionScope;
use crate::error::GraphError;
use crate::store::AnimatedValue;
use crate::value::Value;

/// Interpolate one target value from a start point to `to`.
///
/// `duration`/`curve` left unset inherit from the nearest enclosing
/// [`AnimationNode::Defaults`] scope, then from the engine config.
/// A start left unset reads the target's live value when the animation
/// takes over the slot.
#[derive(Clone, Debug)]
pub struct ValueAnimation {
    pub target: AnimatedValue,
    pub from: Option<Value>,
    pub to: Value,
    pub duration: Option<f32>,
    pub curve: Option<Curve>,
}

impl ValueAnimation {
    pub fn new(target: &AnimatedValue, to: Value) -> Self {
        Self {
            target: target.clone(),
            from: None,
            to,
            duration: None,
            curve: None,
        }
    }

    /// Override the start value instead of reading the live one.
    pub fn starting_at(mut self, from: Value) -> Self {
        self.from = Some(from);
        self
    }

    /// Explicit duration in seconds.
    pub fn over(mut self, seconds: f32) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Explicit easing curve.
    pub fn curved(mut self, curve: Curve) -> Self {
        self.curve = Some(curve);
        self
    }
}

impl From<ValueAnimation> for AnimationNode {
    fn from(anim: ValueAnimation) -> Self {
        AnimationNode::Animate(anim)
    }
}

/// A zero-argument effect; may complete synchronously inside the call or
/// asynchronously through a kept [`ActionHandle`](crate::effect::ActionHandle).
#[derive(Clone)]
pub struct ActionNode {
    pub effect: Rc<dyn Fn(ActionScope)>,
}

impl fmt::Debug for ActionNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ActionNode(..)")
    }
}

/// Immutable description of one animation fragment.
#[derive(Clone, Debug)]
pub enum AnimationNode {
    /// Children advance together within the same tick.
    Group(Vec<AnimationNode>),
    /// Children run one after another, remainder time flowing between them.
    Sequence(Vec<AnimationNode>),
    Animate(ValueAnimation),
    /// Hold for `duration` seconds, then run the child (if any) on the
    /// leftover time.
    Delay {
        duration: f32,
        child: Option<Box<AnimationNode>>,
    },
    /// Scale the child's timeline; must be finite and > 0.
    Speed {
        factor: f32,
        child: Box<AnimationNode>,
    },
    /// Duration/curve defaults visible to descendant value animations that
    /// do not specify their own.
    Defaults {
        duration: Option<f32>,
        curve: Option<Curve>,
        child: Box<AnimationNode>,
    },
    /// Synchronously write defaults back: to the listed targets, or, when
    /// the list is empty, to every value reachable in the run's tree.
    Reset { targets: Vec<AnimatedValue> },
    Action(ActionNode),
}

impl AnimationNode {
    pub fn group(children: Vec<AnimationNode>) -> Self {
        AnimationNode::Group(children)
    }

    pub fn sequence(children: Vec<AnimationNode>) -> Self {
        AnimationNode::Sequence(children)
    }

    /// Animate `target` to `to` with inherited duration and curve.
    pub fn animate(target: &AnimatedValue, to: Value) -> Self {
        ValueAnimation::new(target, to).into()
    }

    /// A childless delay.
    pub fn pause(seconds: f32) -> Self {
        AnimationNode::Delay {
            duration: seconds,
            child: None,
        }
    }

    /// Reset every value reachable in the surrounding run's tree.
    pub fn reset() -> Self {
        AnimationNode::Reset {
            targets: Vec::new(),
        }
    }

    /// Reset exactly the listed values.
    pub fn reset_values(targets: Vec<AnimatedValue>) -> Self {
        AnimationNode::Reset { targets }
    }

    pub fn action(effect: impl Fn(ActionScope) + 'static) -> Self {
        AnimationNode::Action(ActionNode {
            effect: Rc::new(effect),
        })
    }

    /// Wrap in a delay of `seconds`.
    pub fn delayed(self, seconds: f32) -> Self {
        AnimationNode::Delay {
            duration: seconds,
            child: Some(Box::new(self)),
        }
    }

    /// Wrap in a timeline scale.
    pub fn with_speed(self, factor: f32) -> Self {
        AnimationNode::Speed {
            factor,
            child: Box::new(self),
        }
    }

    /// Wrap in a defaults scope.
    pub fn with_defaults(self, duration: Option<f32>, curve: Option<Curve>) -> Self {
        AnimationNode::Defaults {
            duration,
            curve,
            child: Box::new(self),
        }
    }

    /// Rewrite explicit durations of value-animation leaves by `factor`,
    /// recursing through Group/Sequence/Delay. Other variants own their
    /// subtree's timing semantics and are returned unchanged.
    pub fn retimed(&self, factor: f32) -> AnimationNode {
        match self {
            AnimationNode::Group(children) => {
                AnimationNode::Group(children.iter().map(|c| c.retimed(factor)).collect())
            }
            AnimationNode::Sequence(children) => {
                AnimationNode::Sequence(children.iter().map(|c| c.retimed(factor)).collect())
            }
            AnimationNode::Animate(anim) => AnimationNode::Animate(ValueAnimation {
                duration: anim.duration.map(|d| d * factor),
                ..anim.clone()
            }),
            AnimationNode::Delay { duration, child } => AnimationNode::Delay {
                duration: *duration,
                child: child.as_ref().map(|c| Box::new(c.retimed(factor))),
            },
            AnimationNode::Speed { .. }
            | AnimationNode::Defaults { .. }
            | AnimationNode::Reset { .. }
            | AnimationNode::Action(_) => self.clone(),
        }
    }

    /// Override the curve of value-animation leaves, with the same
    /// recursion rules as [`retimed`](Self::retimed).
    pub fn recurved(&self, curve: Curve) -> AnimationNode {
        match self {
            AnimationNode::Group(children) => {
                AnimationNode::Group(children.iter().map(|c| c.recurved(curve)).collect())
            }
            AnimationNode::Sequence(children) => {
                AnimationNode::Sequence(children.iter().map(|c| c.recurved(curve)).collect())
            }
            AnimationNode::Animate(anim) => AnimationNode::Animate(ValueAnimation {
                curve: Some(curve),
                ..anim.clone()
            }),
            AnimationNode::Delay { duration, child } => AnimationNode::Delay {
                duration: *duration,
                child: child.as_ref().map(|c| Box::new(c.recurved(curve))),
            },
            AnimationNode::Speed { .. }
            | AnimationNode::Defaults { .. }
            | AnimationNode::Reset { .. }
            | AnimationNode::Action(_) => self.clone(),
        }
    }

    /// Collect every animated value referenced anywhere in the tree,
    /// deduplicated by key in first-seen order.
    pub fn collect_values(&self, out: &mut Vec<AnimatedValue>) {
        fn push_unique(out: &mut Vec<AnimatedValue>, value: &AnimatedValue) {
            if !out.iter().any(|v| v.key() == value.key()) {
                out.push(value.clone());
            }
        }
        match self {
            AnimationNode::Group(children) | AnimationNode::Sequence(children) => {
                for child in children {
                    child.collect_values(out);
                }
            }
            AnimationNode::Animate(anim) => push_unique(out, &anim.target),
            AnimationNode::Delay { child, .. } => {
                if let Some(child) = child {
                    child.collect_values(out);
                }
            }
            AnimationNode::Speed { child, .. } | AnimationNode::Defaults { child, .. } => {
                child.collect_values(out);
            }
            AnimationNode::Reset { targets } => {
                for target in targets {
                    push_unique(out, target);
                }
            }
            AnimationNode::Action(_) => {}
        }
    }

    /// Check configuration invariants over the whole tree before any
    /// element starts.
    pub fn validate(&self) -> Result<(), GraphError> {
        fn check_duration(seconds: f32) -> Result<(), GraphError> {
            if seconds.is_finite() && seconds >= 0.0 {
                Ok(())
            } else {
                Err(GraphError::InvalidDuration { seconds })
            }
        }
        fn check_kind(anim: &ValueAnimation, value: &Value) -> Result<(), GraphError> {
            if value.kind() == anim.target.kind() {
                Ok(())
            } else {
                Err(GraphError::KindMismatch {
                    key: anim.target.key().to_owned(),
                    expected: anim.target.kind(),
                    actual: value.kind(),
                })
            }
        }
        match self {
            AnimationNode::Group(children) | AnimationNode::Sequence(children) => {
                children.iter().try_for_each(AnimationNode::validate)
            }
            AnimationNode::Animate(anim) => {
                if let Some(duration) = anim.duration {
                    check_duration(duration)?;
                }
                check_kind(anim, &anim.to)?;
                if let Some(from) = &anim.from {
                    check_kind(anim, from)?;
                }
                Ok(())
            }
            AnimationNode::Delay { duration, child } => {
                check_duration(*duration)?;
                child.as_ref().map_or(Ok(()), |c| c.validate())
            }
            AnimationNode::Speed { factor, child } => {
                if !(factor.is_finite() && *factor > 0.0) {
                    return Err(GraphError::InvalidSpeed { factor: *factor });
                }
                child.validate()
            }
            AnimationNode::Defaults {
                duration, child, ..
            } => {
                if let Some(duration) = duration {
                    check_duration(*duration)?;
                }
                child.validate()
            }
            AnimationNode::Reset { .. } | AnimationNode::Action(_) => Ok(()),
        }
    }
}
