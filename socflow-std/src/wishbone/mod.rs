//! Wishbone bus, revision B4.

mod bus;

pub use bus::*;
