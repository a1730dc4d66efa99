//! Recorded port values of a simulated module.

use itertools::izip;
use linked_hash_map::LinkedHashMap;

use crate::*;

/// Port values of a module, sampled once per cycle before the clock edge.
///
/// Ports are the flattened leaves of the module's interface signals, prefixed with `in` (input interface, both
/// directions) or `out` (output interface, both directions).
#[derive(Debug, Clone)]
pub struct Trace {
    module_name: String,
    /// Port name to offset and width within a sample, in declaration order.
    ports: LinkedHashMap<String, (usize, usize)>,
    /// Widths of the input-forward, input-backward, output-forward and output-backward groups.
    groups: Vec<usize>,
    samples: Vec<Vec<bool>>,
}

impl Trace {
    /// Creates an empty trace.
    pub fn new(module_name: &str) -> Self {
        Self { module_name: module_name.to_string(), ports: LinkedHashMap::new(), groups: vec![], samples: vec![] }
    }

    /// Returns module name.
    pub fn module_name(&self) -> &str { &self.module_name }

    /// Records one cycle.
    ///
    /// Ports are declared by the first recorded cycle. Later cycles are zero-extended or truncated to the declared
    /// widths.
    pub fn record<A: Signal, B: Signal, C: Signal, D: Signal>(&mut self, i_fwd: &A, i_bwd: &B, o_fwd: &C, o_bwd: &D) {
        let groups = [
            ("in", i_fwd.port_decls(), i_fwd.transl()),
            ("in", i_bwd.port_decls(), i_bwd.transl()),
            ("out", o_fwd.port_decls(), o_fwd.transl()),
            ("out", o_bwd.port_decls(), o_bwd.transl()),
        ];

        if self.groups.is_empty() {
            let mut offset = 0;
            for (prefix, decls, _) in &groups {
                self.groups.push(decls.width());
                for (name, width) in decls.flatten(Some(prefix)) {
                    let name = name.unwrap_or_else(|| prefix.to_string());
                    let mut unique = name.clone();
                    let mut suffix = 1;
                    while self.ports.contains_key(&unique) {
                        unique = format!("{}_{}", name, suffix);
                        suffix += 1;
                    }
                    self.ports.insert(unique, (offset, width));
                    offset += width;
                }
            }
        }

        let sample = izip!(&groups, &self.groups)
            .flat_map(|((_, _, bits), width)| (0..*width).map(move |i| bits.get(i).copied().unwrap_or(false)))
            .collect();
        self.samples.push(sample);
    }

    /// Number of recorded cycles.
    pub fn len(&self) -> usize { self.samples.len() }

    /// Returns whether no cycle was recorded.
    pub fn is_empty(&self) -> bool { self.samples.is_empty() }

    /// Iterates over port names and widths, in declaration order.
    pub fn ports(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.ports.iter().map(|(name, (_, width))| (name.as_str(), *width))
    }

    /// Returns the value of `port` at `cycle`.
    pub fn value(&self, port: &str, cycle: usize) -> Option<Bits> {
        let (offset, width) = self.ports.get(port)?;
        let sample = self.samples.get(cycle)?;
        Some(sample[*offset..*offset + *width].iter().copied().collect())
    }

    /// Returns the values of all ports at `cycle`, in declaration order.
    pub fn sample(&self, cycle: usize) -> Option<Vec<Bits>> {
        let sample = self.samples.get(cycle)?;
        Some(
            self.ports
                .values()
                .map(|(offset, width)| sample[*offset..*offset + *width].iter().copied().collect())
                .collect(),
        )
    }
}
