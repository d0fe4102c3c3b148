//! Engine: owns the value store and the set of running graph animations,
//! and drives their ticks from the host clock.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::clock::FrameClock;
use crate::config::Config;
use crate::effect::Spawner;
use crate::element::{Element, RunCtx, ScopedDefaults, Tick};
use crate::error::GraphError;
use crate::ids::{IdAllocator, RunId, SubscriptionId};
use crate::node::AnimationNode;
use crate::store::{AnimatedValue, ValueStatus, ValueStore};
use crate::value::Value;

/// How a run ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Outcome {
    Completed,
    Canceled,
}

#[derive(Default)]
struct CompletionState {
    outcome: Cell<Option<Outcome>>,
    on_done: RefCell<Vec<Box<dyn FnOnce()>>>,
    on_settled: RefCell<Vec<Box<dyn FnOnce(Outcome)>>>,
}

impl CompletionState {
    fn settle(&self, outcome: Outcome) {
        if self.outcome.get().is_some() {
            return;
        }
        self.outcome.set(Some(outcome));
        if outcome == Outcome::Completed {
            for callback in self.on_done.borrow_mut().drain(..) {
                callback();
            }
        } else {
            self.on_done.borrow_mut().clear();
        }
        for callback in self.on_settled.borrow_mut().drain(..) {
            callback(outcome);
        }
    }
}

/// Shared handle onto one running (or finished) graph animation.
///
/// Cancellation goes through [`Engine::cancel`] with this handle's id; the
/// handle itself only observes completion.
#[derive(Clone)]
pub struct RunHandle {
    id: RunId,
    state: Rc<CompletionState>,
}

impl RunHandle {
    pub fn id(&self) -> RunId {
        self.id
    }

    /// True only after natural completion; never after a cancel.
    pub fn is_done(&self) -> bool {
        self.state.outcome.get() == Some(Outcome::Completed)
    }

    pub fn is_settled(&self) -> bool {
        self.state.outcome.get().is_some()
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.state.outcome.get()
    }

    /// Invoke `callback` on natural completion. Never invoked for a
    /// canceled run; invoked immediately if the run already completed.
    pub fn on_done(&self, callback: impl FnOnce() + 'static) {
        match self.state.outcome.get() {
            Some(Outcome::Completed) => callback(),
            Some(Outcome::Canceled) => {}
            None => self.state.on_done.borrow_mut().push(Box::new(callback)),
        }
    }

    /// Invoke `callback` exactly once when the run settles either way.
    pub fn on_settled(&self, callback: impl FnOnce(Outcome) + 'static) {
        match self.state.outcome.get() {
            Some(outcome) => callback(outcome),
            None => self.state.on_settled.borrow_mut().push(Box::new(callback)),
        }
    }
}

/// One root-to-completion execution of a node tree.
struct Run {
    id: RunId,
    node: Rc<AnimationNode>,
    root: Element,
    /// Wall time accumulated since this run's start.
    elapsed: f32,
    state: Rc<CompletionState>,
}

/// Scope-wide animation state: the value store plus all running graphs.
///
/// Single-threaded and cooperative: hosts obtain one engine per scope and
/// call [`advance`](Engine::advance) from their frame callback.
pub struct Engine {
    cfg: Config,
    ids: IdAllocator,
    store: ValueStore,
    runs: Vec<Run>,
    pending: Spawner,
    clock: Option<Box<dyn FrameClock>>,
    clock_running: bool,
}

impl Engine {
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            ids: IdAllocator::new(),
            store: ValueStore::new(),
            runs: Vec::new(),
            pending: Spawner::new(),
            clock: None,
            clock_running: false,
        }
    }

    pub fn with_clock(cfg: Config, clock: Box<dyn FrameClock>) -> Self {
        let mut engine = Self::new(cfg);
        engine.clock = Some(clock);
        engine
    }

    pub fn config(&self) -> &Config {
        &self.cfg
    }

    pub fn store(&self) -> &ValueStore {
        &self.store
    }

    /// Validate `node` and start executing it immediately.
    ///
    /// The root element starts synchronously inside this call (leading
    /// actions and resets run now); interpolation begins with the next
    /// [`advance`](Engine::advance).
    pub fn animate(&mut self, node: impl Into<Rc<AnimationNode>>) -> Result<RunHandle, GraphError> {
        let node = node.into();
        node.validate()?;
        let handle = self.start_run(node);
        self.drain_pending();
        self.update_clock();
        Ok(handle)
    }

    /// Advance every running graph by `dt` seconds of wall time.
    pub fn advance(&mut self, dt: f32) -> usize {
        assert!(dt.is_finite() && dt >= 0.0, "advance with invalid dt {dt}");
        let mut i = 0;
        while i < self.runs.len() {
            let run = &mut self.runs[i];
            run.elapsed += dt;
            let Run {
                node,
                root,
                elapsed,
                ..
            } = run;
            let mut ctx = RunCtx {
                store: &mut self.store,
                config: &self.cfg,
                root: &**node,
                spawner: &self.pending,
            };
            match root.tick(*elapsed, &mut ctx) {
                Tick::Running => i += 1,
                Tick::Exited { .. } => {
                    let run = self.runs.remove(i);
                    log::debug!("animation run {:?} completed", run.id);
                    run.state.settle(Outcome::Completed);
                }
            }
        }
        self.drain_pending();
        self.update_clock();
        self.runs.len()
    }

    /// Cancel one run. Idempotent: canceling an unknown or already-settled
    /// run is a no-op returning false. By the time this returns, no further
    /// value writes from the run will occur.
    pub fn cancel(&mut self, id: RunId) -> bool {
        let Some(index) = self.runs.iter().position(|run| run.id == id) else {
            return false;
        };
        let mut run = self.runs.remove(index);
        let Run { node, root, .. } = &mut run;
        let mut ctx = RunCtx {
            store: &mut self.store,
            config: &self.cfg,
            root: &**node,
            spawner: &self.pending,
        };
        root.cancel(&mut ctx);
        run.state.settle(Outcome::Canceled);
        log::debug!("animation run {:?} canceled", id);
        self.update_clock();
        true
    }

    /// Cancel every running animation.
    pub fn cancel_all(&mut self) {
        // Snapshot first: settling a run must not disturb the iteration.
        let ids: Vec<RunId> = self.runs.iter().map(|run| run.id).collect();
        for id in ids {
            self.cancel(id);
        }
    }

    pub fn is_running(&self, id: RunId) -> bool {
        self.runs.iter().any(|run| run.id == id)
    }

    pub fn active_runs(&self) -> usize {
        self.runs.len()
    }

    /// Deferred-start queue handle; safe to use from inside completing
    /// action effects.
    pub fn spawner(&self) -> Spawner {
        self.pending.clone()
    }

    /// Current value of `value` (its declared default if never touched).
    pub fn value(&self, value: &AnimatedValue) -> Value {
        self.store.value_or_default(value)
    }

    pub fn status(&self, value: &AnimatedValue) -> ValueStatus {
        self.store.status(value.key())
    }

    /// Write `value` directly, bypassing any in-flight animation. Cancel
    /// conflicting runs first if the race is undesired.
    pub fn set_value(&mut self, value: &AnimatedValue, new_value: Value) {
        self.store.set(value, new_value);
    }

    /// Write a value's declared default directly, bypassing any in-flight
    /// animation.
    pub fn reset(&mut self, value: &AnimatedValue) {
        self.store.reset(value);
    }

    /// Write every known value's declared default directly.
    pub fn reset_all(&mut self) {
        self.store.reset_all();
    }

    pub fn subscribe(
        &mut self,
        value: &AnimatedValue,
        subscriber: impl FnMut(&Value, ValueStatus) + 'static,
    ) -> SubscriptionId {
        self.store.subscribe(value, subscriber)
    }

    pub fn unsubscribe(&mut self, value: &AnimatedValue, sub: SubscriptionId) -> bool {
        self.store.unsubscribe(value.key(), sub)
    }

    fn start_run(&mut self, node: Rc<AnimationNode>) -> RunHandle {
        let id = self.ids.alloc_run();
        let root = {
            let node_ref: &AnimationNode = &node;
            let mut ctx = RunCtx {
                store: &mut self.store,
                config: &self.cfg,
                root: node_ref,
                spawner: &self.pending,
            };
            Element::start(node_ref, ScopedDefaults::default(), &mut ctx)
        };
        let state = Rc::new(CompletionState::default());
        log::debug!("animation run {:?} started", id);
        self.runs.push(Run {
            id,
            node,
            root,
            elapsed: 0.0,
            state: state.clone(),
        });
        RunHandle { id, state }
    }

    /// Start everything queued by action effects. Starting a run can queue
    /// more, so loop until the queue stays empty.
    fn drain_pending(&mut self) {
        loop {
            let nodes = self.pending.drain();
            if nodes.is_empty() {
                break;
            }
            for node in nodes {
                match node.validate() {
                    Ok(()) => {
                        let _ = self.start_run(node);
                    }
                    Err(err) => log::error!("discarding spawned animation: {err}"),
                }
            }
        }
    }

    fn update_clock(&mut self) {
        let should_run = !self.runs.is_empty();
        if should_run == self.clock_running {
            return;
        }
        self.clock_running = should_run;
        if let Some(clock) = self.clock.as_mut() {
            if should_run {
                clock.start();
            } else {
                clock.stop();
            }
        }
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
