//! Reactive module - Signals, effects and per-field change callbacks
//!
//! # Module Structure
//!
//! - `signal` - Value cells with tracked reads, effects, memos
//! - `state` - Explicit field mutation with per-key observers

mod signal;
mod state;

pub use signal::{create_effect, create_memo, untrack, Effect, EffectId, Signal};
pub use state::{ReactiveRecord, Record, StateManager};
