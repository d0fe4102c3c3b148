//! Action effects and their completion protocol.
//!
//! Effects run on the engine thread. A synchronous effect completes its
//! handle before returning; an asynchronous one clones the handle out and
//! completes it later, from the same thread, between ticks.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::node::AnimationNode;

#[derive(Debug, Default)]
struct EffectState {
    done: Cell<bool>,
}

/// Completion handle for one Action effect.
#[derive(Clone, Debug, Default)]
pub struct ActionHandle {
    state: Rc<EffectState>,
}

impl ActionHandle {
    pub fn complete(&self) {
        self.state.done.set(true);
    }

    /// Report a failure through the error side channel and complete the
    /// effect. The owning graph proceeds either way, and the report is
    /// delivered even when the owning element has already been canceled.
    pub fn fail(&self, message: impl fmt::Display) {
        log::error!("animation action failed: {message}");
        self.state.done.set(true);
    }

    pub fn is_complete(&self) -> bool {
        self.state.done.get()
    }
}

/// Deferred-start queue shared with action effects.
///
/// Nodes pushed here are picked up by the engine at the end of its current
/// pass, which is what makes starting an animation from inside a completing
/// effect safe while a tick is on the stack.
#[derive(Clone, Debug, Default)]
pub struct Spawner {
    queue: Rc<RefCell<Vec<Rc<AnimationNode>>>>,
}

impl Spawner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, node: impl Into<Rc<AnimationNode>>) {
        self.queue.borrow_mut().push(node.into());
    }

    pub(crate) fn drain(&self) -> Vec<Rc<AnimationNode>> {
        std::mem::take(&mut *self.queue.borrow_mut())
    }
}

/// Context handed to an Action effect when it starts.
pub struct ActionScope {
    pub handle: ActionHandle,
    pub spawner: Spawner,
}
