//! Domain models for the booking and admin system.

mod appointment;
mod booking;
mod insurance;

pub use appointment::*;
pub use booking::*;
pub use insurance::*;
