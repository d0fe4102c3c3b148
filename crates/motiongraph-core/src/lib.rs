//! motiongraph-core (host-agnostic)
//!
//! A declarative animation graph engine. A host describes a composite,
//! time-based animation as an immutable [`AnimationNode`] tree, submits it
//! to the [`Engine`], and drives per-frame ticks with the wall-time delta
//! since the previous frame. A mutable element tree mirrors the node tree
//! at runtime, forwarding unconsumed tick time across composition
//! boundaries so composite durations never drift with frame rate. Current
//! values live in a [`ValueStore`] whose writes the host's notification
//! layer can observe; racing animations on the same value hand ownership
//! over without visual discontinuity.

pub mod clock;
pub mod config;
pub mod curve;
pub mod effect;
pub mod element;
pub mod engine;
pub mod error;
pub mod ids;
pub mod interp;
pub mod node;
pub mod store;
pub mod value;

// Re-exports for consumers (host adapters)
pub use clock::{FrameClock, ManualClock};
pub use config::Config;
pub use curve::Curve;
pub use effect::{ActionHandle, ActionScope, Spawner};
pub use element::{Element, RunCtx, ScopedDefaults, Tick};
pub use engine::{Engine, Outcome, RunHandle};
pub use error::GraphError;
pub use ids::{RunId, SubscriptionId, WriterId};
pub use interp::{lerp_value, step_value, TweenFn};
pub use node::{ActionNode, AnimationNode, ValueAnimation};
pub use store::{AnimatedValue, ValueStatus, ValueStore};
pub use value::{Value, ValueKind};
