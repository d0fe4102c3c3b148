//! Animated value store: live state per typed value identifier, with
//! change notification and the writer-ownership protocol.

use hashbrown::HashMap;

use crate::ids::{IdAllocator, SubscriptionId, WriterId};
use crate::interp::{lerp_value, TweenFn};
use crate::value::{Value, ValueKind};

/// A typed, named animation target.
///
/// Identity is the key; the live state for a key is created lazily in the
/// [`ValueStore`] on first use. Many animations may reference the same
/// value over time; the store arbitrates who gets to write it.
#[derive(Clone, Debug)]
pub struct AnimatedValue {
    key: String,
    default: Value,
    tween: TweenFn,
}

impl AnimatedValue {
    pub fn new(key: impl Into<String>, default: Value) -> Self {
        Self {
            key: key.into(),
            default,
            tween: lerp_value,
        }
    }

    /// Replace the begin/end interpolator used when animating this value.
    pub fn with_tween(mut self, tween: TweenFn) -> Self {
        self.tween = tween;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn default_value(&self) -> &Value {
        &self.default
    }

    pub fn kind(&self) -> ValueKind {
        self.default.kind()
    }

    pub fn tween(&self) -> TweenFn {
        self.tween
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ValueStatus {
    Idle,
    Running,
}

type SubscriberFn = Box<dyn FnMut(&Value, ValueStatus)>;

struct ValueSlot {
    value: Value,
    default: Value,
    status: ValueStatus,
    writer: Option<WriterId>,
    subscribers: Vec<(SubscriptionId, SubscriberFn)>,
}

impl ValueSlot {
    fn new(value: &AnimatedValue) -> Self {
        Self {
            value: value.default.clone(),
            default: value.default.clone(),
            status: ValueStatus::Idle,
            writer: None,
            subscribers: Vec::new(),
        }
    }
}

fn notify(slot: &mut ValueSlot) {
    let ValueSlot {
        value,
        status,
        subscribers,
        ..
    } = slot;
    for (_, subscriber) in subscribers.iter_mut() {
        subscriber(value, *status);
    }
}

/// Mapping from value key to live slot. Mutated only by the engine's tick
/// loop and by explicit set/reset calls from the same thread.
#[derive(Default)]
pub struct ValueStore {
    slots: HashMap<String, ValueSlot>,
    ids: IdAllocator,
}

impl ValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure(&mut self, value: &AnimatedValue) -> &mut ValueSlot {
        self.slots
            .entry(value.key.clone())
            .or_insert_with(|| ValueSlot::new(value))
    }

    /// Current live value, creating the slot at its default if absent.
    pub fn current(&mut self, value: &AnimatedValue) -> Value {
        self.ensure(value).value.clone()
    }

    /// Current live value without touching the store; the declared default
    /// when the value has never been written.
    pub fn value_or_default(&self, value: &AnimatedValue) -> Value {
        match self.slots.get(&value.key) {
            Some(slot) => slot.value.clone(),
            None => value.default.clone(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.slots.get(key).map(|slot| &slot.value)
    }

    pub fn status(&self, key: &str) -> ValueStatus {
        self.slots
            .get(key)
            .map_or(ValueStatus::Idle, |slot| slot.status)
    }

    /// Take over a value as its sole interpolation writer.
    ///
    /// Any previously installed writer is evicted first: its claim is
    /// dropped and the stop (Idle) notification delivered before the new
    /// writer installs and the Running notification fires. The value itself
    /// is left untouched so the caller can read the last committed value as
    /// its start point.
    pub fn install_writer(&mut self, value: &AnimatedValue) -> WriterId {
        let id = self.ids.alloc_writer();
        let slot = self
            .slots
            .entry(value.key.clone())
            .or_insert_with(|| ValueSlot::new(value));
        if slot.writer.take().is_some() {
            slot.status = ValueStatus::Idle;
            notify(slot);
        }
        slot.writer = Some(id);
        slot.status = ValueStatus::Running;
        notify(slot);
        id
    }

    /// True while `writer` still owns the slot for `key`.
    pub fn is_active_writer(&self, key: &str, writer: WriterId) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| slot.writer == Some(writer))
    }

    /// Write through an installed writer. Rejected (returning false) once
    /// the writer has been evicted, so a stale runtime can never clobber
    /// its replacement.
    pub fn write(&mut self, key: &str, value: Value, writer: WriterId) -> bool {
        let Some(slot) = self.slots.get_mut(key) else {
            return false;
        };
        if slot.writer != Some(writer) {
            return false;
        }
        slot.value = value;
        notify(slot);
        true
    }

    /// Give up writer ownership if `writer` is still the one installed;
    /// a later animation may already have replaced it.
    pub fn release_writer(&mut self, key: &str, writer: WriterId) -> bool {
        let Some(slot) = self.slots.get_mut(key) else {
            return false;
        };
        if slot.writer != Some(writer) {
            return false;
        }
        slot.writer = None;
        slot.status = ValueStatus::Idle;
        notify(slot);
        true
    }

    /// Direct set, bypassing any installed writer. The writer, if any,
    /// stays installed and will overwrite on its next tick.
    pub fn set(&mut self, value: &AnimatedValue, new_value: Value) {
        let slot = self.ensure(value);
        slot.value = new_value;
        notify(slot);
    }

    /// Write the declared default, bypassing any installed writer.
    pub fn reset(&mut self, value: &AnimatedValue) {
        let slot = self.ensure(value);
        slot.value = slot.default.clone();
        notify(slot);
    }

    /// Reset every slot the store has seen to its declared default.
    pub fn reset_all(&mut self) {
        for slot in self.slots.values_mut() {
            slot.value = slot.default.clone();
            notify(slot);
        }
    }

    /// Observe every write and status transition of one value.
    pub fn subscribe(
        &mut self,
        value: &AnimatedValue,
        subscriber: impl FnMut(&Value, ValueStatus) + 'static,
    ) -> SubscriptionId {
        let id = self.ids.alloc_sub();
        self.ensure(value).subscribers.push((id, Box::new(subscriber)));
        id
    }

    pub fn unsubscribe(&mut self, key: &str, sub: SubscriptionId) -> bool {
        let Some(slot) = self.slots.get_mut(key) else {
            return false;
        };
        let before = slot.subscribers.len();
        slot.subscribers.retain(|(id, _)| *id != sub);
        slot.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.slots.keys().map(String::as_str)
    }
}
