//! Client-side gate logic
//!
//! Pure state machines a client embeds around the two HTTP endpoints: a
//! resend cooldown for the "send code" control and a gate that holds a
//! sensitive action until the code is verified.

mod cooldown;
mod pending_action;

pub use cooldown::ResendCooldown;
pub use pending_action::{GateDecision, GatedAction};
