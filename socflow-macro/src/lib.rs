//! Implementation of proc macros on signal types.
//!
//! # Note
//!
//! To use `#[derive(Signal)]` on struct, it is assumed that its `port_decls()` method
//! implementation of `Signal` trait is constructed as struct of its fields.
//!
//! For example, `port_decls()` method implementation of the CSR request bundle is as follows.
//!
//! ```ignore
//! #[derive(Debug, Clone, Signal)]
//! pub struct CsrRequest {
//!     addr: Bits,
//!     #[member(name = "stb")]
//!     r_stb: bool,
//! }
//!
//! impl Signal for CsrRequest {
//!     ...
//!     fn port_decls(&self) -> PortDecls {
//!         PortDecls::Struct(vec![
//!             (Some("addr".to_string()), self.addr.port_decls()),
//!             (Some("stb".to_string()), self.r_stb.port_decls()),
//!         ])
//!     }
//! }
//! ```
//!
//! Unit enums are encoded with `#[width(n)]` on the enum and `#[encode(value)]` on variants.

mod signal;
mod utils;

use proc_macro::TokenStream;

#[proc_macro_derive(Signal, attributes(member, width, encode))]
pub fn signal(input: TokenStream) -> TokenStream { signal::derive(input) }
