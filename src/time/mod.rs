//! Frame timing.

pub mod clock;

pub use clock::{Clock, ListenerId};
