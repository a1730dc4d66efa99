//! Control and status register (CSR) bus.
//!
//! The CSR bus is a narrow, single-cycle bus. Registers wider than the bus are split into chunks, and the
//! [`Multiplexer`] makes every chunked access atomic: reading chunk 0 captures the whole register and writing the
//! last chunk commits the whole register.

mod bus;
mod wishbone;

pub use bus::*;
pub use wishbone::*;
