//! Interface of channels.

use std::fmt::Debug;

use crate::*;

/// Interface of channels.
///
/// An interface joins two modules. Its forward signals are driven by the module on the input side (e.g. a bus
/// initiator's request) and its backward signals by the module on the output side (e.g. a target's response).
pub trait Interface: 'static + Debug {
    /// Forward signals.
    type Fwd: Signal + PartialEq + Default;

    /// Backward signals.
    type Bwd: Signal + PartialEq + Default;
}

/// Forward signals of interface `I`.
pub type Fwd<I> = <I as Interface>::Fwd;

/// Backward signals of interface `I`.
pub type Bwd<I> = <I as Interface>::Bwd;

impl Interface for () {
    type Bwd = ();
    type Fwd = ();
}
