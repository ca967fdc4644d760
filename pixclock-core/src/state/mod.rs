//! Clock mode state machine
//!
//! Defines which network activity the clock is engaged in. The machine is
//! explicit, finite and deterministic; timers and collaborators live in
//! the orchestrator, which feeds it events.

pub mod events;
pub mod machine;

pub use events::ModeEvent;
pub use machine::Mode;
