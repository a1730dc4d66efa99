//! Cycle-accurate simulation.

use log::trace;

use crate::*;

/// Simulates a module one clock cycle at a time.
///
/// Every component advances exactly one step per clock edge. `step` drives the module's inputs for the current
/// cycle, returns its current-cycle outputs and then commits the next state.
#[derive(Debug)]
pub struct Simulator<M: Fsm> {
    module: M,
    state: M::S,
    cycle: u64,
    trace: Option<Trace>,
}

impl<M: Fsm> Simulator<M> {
    /// Creates a simulator with the module in its initial state.
    pub fn new(module: M) -> Self {
        let state = module.init();
        Self { module, state, cycle: 0, trace: None }
    }

    /// Records every simulated cycle.
    pub fn with_trace(mut self) -> Self {
        self.trace = Some(Trace::new(&self.module.module_name()));
        self
    }

    /// Returns the simulated module.
    pub fn module(&self) -> &M { &self.module }

    /// Returns the current registers.
    pub fn state(&self) -> &M::S { &self.state }

    /// Number of clock edges since creation or the last reset.
    pub fn cycle(&self) -> u64 { self.cycle }

    /// Evaluates the current cycle without clocking.
    pub fn peek(&self, i_fwd: &Fwd<M::I>, o_bwd: &Bwd<M::O>) -> (Fwd<M::O>, Bwd<M::I>) {
        let (o_fwd, i_bwd, _) = self.module.comb(i_fwd, o_bwd, &self.state);
        (o_fwd, i_bwd)
    }

    /// Evaluates the current cycle, then clocks the module.
    pub fn step(&mut self, i_fwd: &Fwd<M::I>, o_bwd: &Bwd<M::O>) -> (Fwd<M::O>, Bwd<M::I>) {
        let (o_fwd, i_bwd, state_next) = self.module.comb(i_fwd, o_bwd, &self.state);
        trace!(
            "{} @ {}: in {:?} / {:?}, out {:?} / {:?}",
            self.module.module_name(),
            self.cycle,
            i_fwd,
            i_bwd,
            o_fwd,
            o_bwd
        );

        if let Some(trace) = &mut self.trace {
            trace.record(i_fwd, &i_bwd, &o_fwd, o_bwd);
        }

        self.state = state_next;
        self.cycle += 1;
        (o_fwd, i_bwd)
    }

    /// Restores the initial state. The recorded trace is kept.
    pub fn reset(&mut self) {
        self.state = self.module.init();
        self.cycle = 0;
    }

    /// Returns the recorded trace.
    pub fn trace(&self) -> Option<&Trace> { self.trace.as_ref() }

    /// Takes the recorded trace, stopping the recording.
    pub fn take_trace(&mut self) -> Option<Trace> { self.trace.take() }
}
