//! Pure state machine for two-party meetup consent.
//!
//! This crate implements the consent negotiation for one proposed meetup
//! between two matched users as a pure functional state machine. The
//! design separates:
//! - **Session**: What the system knows (`ConsentSession`)
//! - **Events**: What happened (`SessionEvent`)
//! - **Effects**: What to do (`Effect`)
//! - **Transition**: Pure function `(Session, Event, now) -> (Session, Vec<Effect>)`
//!
//! Nothing here performs I/O or reads a clock; the engine crate owns
//! storage, timers, and signal delivery and interprets the effects.

pub mod effect;
pub mod event;
pub mod session;
pub mod transition;

pub use effect::*;
pub use event::*;
pub use session::*;
pub use transition::*;
