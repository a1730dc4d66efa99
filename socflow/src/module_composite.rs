//! Composite module.

use log::trace;

use crate::*;

/// Number of evaluations after which a composite gives up settling its internal wires.
const SETTLE_LIMIT: usize = 16;

/// Two modules where the output interface of the first drives the input interface of the second.
///
/// The wires between the submodules are settled within the cycle: the backward signals of the inner interface
/// start from their default and both submodules are re-evaluated until those signals stop changing.
#[derive(Debug)]
pub struct Composite<A, B> {
    module_name: String,
    first: A,
    second: B,
}

impl<A: Fsm, B: Fsm<I = A::O>> Composite<A, B> {
    /// Creates a new composite module.
    pub fn new(module_name: &str, first: A, second: B) -> Self {
        Self { module_name: module_name.to_string(), first, second }
    }
}

impl<A: Fsm, B: Fsm<I = A::O>> Fsm for Composite<A, B> {
    type I = A::I;
    type O = B::O;
    type S = (A::S, B::S);

    fn module_name(&self) -> String { self.module_name.clone() }

    fn init(&self) -> Self::S { (self.first.init(), self.second.init()) }

    /// # Panics
    ///
    /// Panics if the submodules form a combinational loop that does not settle.
    fn comb(&self, i_fwd: &Fwd<A::I>, o_bwd: &Bwd<B::O>, s: &Self::S) -> (Fwd<B::O>, Bwd<A::I>, Self::S) {
        let (first_state, second_state) = s;
        let mut inner_bwd = <Bwd<A::O> as Default>::default();

        for iteration in 0..SETTLE_LIMIT {
            let (inner_fwd, i_bwd, first_next) = self.first.comb(i_fwd, &inner_bwd, first_state);
            let (o_fwd, inner_bwd_next, second_next) = self.second.comb(&inner_fwd, o_bwd, second_state);

            if inner_bwd_next == inner_bwd {
                return (o_fwd, i_bwd, (first_next, second_next));
            }

            trace!("{}: settling inner wires (iteration {})", self.module_name, iteration);
            inner_bwd = inner_bwd_next;
        }

        panic!("{}: combinational loop did not settle after {} iterations", self.module_name, SETTLE_LIMIT)
    }
}
