//! Finite state machine (Mealy machine).

use std::fmt;
use std::marker::PhantomData;

use crate::*;

/// Synchronous module described as a finite state machine (Mealy machine).
///
/// The state is the set of registers of the module. `comb` describes the circuit for (1) the current-cycle output
/// for all cycles and (2) the next-cycle state, which is committed at the clock edge.
pub trait Fsm: fmt::Debug {
    /// Input interface.
    type I: Interface;

    /// Output interface.
    type O: Interface;

    /// Registers.
    type S: Clone + fmt::Debug;

    /// Returns module name.
    fn module_name(&self) -> String;

    /// Initial value of registers.
    fn init(&self) -> Self::S;

    /// Evaluates one cycle.
    ///
    /// Returns the output interface's forward signals, the input interface's backward signals and the next state.
    fn comb(&self, i_fwd: &Fwd<Self::I>, o_bwd: &Bwd<Self::O>, s: &Self::S) -> (Fwd<Self::O>, Bwd<Self::I>, Self::S);

    /// Chains `self`'s output interface to `next`'s input interface.
    fn compose<B: Fsm<I = Self::O>>(self, module_name: &str, next: B) -> Composite<Self, B>
    where Self: Sized {
        Composite::new(module_name, self, next)
    }
}

/// Finite state machine described by a closure.
pub struct FnFsm<I: Interface, O: Interface, S, F> {
    /// Module name.
    module_name: String,
    /// FSM function.
    f: F,
    /// Initial value of registers in the FSM.
    init: S,
    _marker: PhantomData<(I, O)>,
}

impl<I: Interface, O: Interface, S: Clone + fmt::Debug, F: Fn(&Fwd<I>, &Bwd<O>, &S) -> (Fwd<O>, Bwd<I>, S)>
    FnFsm<I, O, S, F>
{
    /// Creates a new FSM.
    pub fn new(module_name: &str, f: F, init: S) -> Self {
        Self { module_name: module_name.to_string(), f, init, _marker: PhantomData }
    }
}

impl<I: Interface, O: Interface, S: fmt::Debug, F> fmt::Debug for FnFsm<I, O, S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFsm").field("module_name", &self.module_name).field("init", &self.init).finish()
    }
}

impl<I: Interface, O: Interface, S: Clone + fmt::Debug, F: Fn(&Fwd<I>, &Bwd<O>, &S) -> (Fwd<O>, Bwd<I>, S)> Fsm
    for FnFsm<I, O, S, F>
{
    type I = I;
    type O = O;
    type S = S;

    fn module_name(&self) -> String { self.module_name.clone() }

    fn init(&self) -> S { self.init.clone() }

    fn comb(&self, i_fwd: &Fwd<I>, o_bwd: &Bwd<O>, s: &S) -> (Fwd<O>, Bwd<I>, S) { (self.f)(i_fwd, o_bwd, s) }
}
