//! Generates Value Change Dump waveforms from simulation traces.
//!
//! Each cycle spans 10 time units: ports change with the falling clock at `10 * cycle`, and the rising edge that
//! commits the cycle's state is at `10 * cycle + 5`.

use std::io::{self, Write};

use arrayvec::ArrayVec;
use itertools::Itertools;

use crate::*;

/// Time units per clock cycle.
const CYCLE_PERIOD: usize = 10;

/// Returns the VCD identifier code of the `index`-th variable.
fn ident(index: usize) -> String {
    // Identifier codes are base-94 numbers over the printable ASCII range.
    let mut digits = ArrayVec::<char, 8>::new();
    let mut rest = index;
    loop {
        digits.push(char::from(b'!' + (rest % 94) as u8));
        rest /= 94;
        if rest == 0 {
            break;
        }
    }
    digits.into_iter().collect()
}

fn gen_value<W: Write>(w: &mut W, value: &Bits, ident: &str) -> io::Result<()> {
    if value.width() == 1 {
        writeln!(w, "{}{}", u8::from(value.get(0)), ident)
    } else {
        writeln!(w, "b{} {}", value.iter().collect::<Vec<_>>().into_iter().rev().map(u8::from).join(""), ident)
    }
}

/// Writes `trace` as a VCD file. Zero-width ports are omitted.
pub fn gen_vcd<W: Write>(trace: &Trace, w: &mut W) -> io::Result<()> {
    writeln!(w, "$version socflow {} $end", env!("CARGO_PKG_VERSION"))?;
    writeln!(w, "$timescale 1ns $end")?;
    writeln!(w, "$scope module {} $end", trace.module_name())?;
    writeln!(w, "$var wire 1 {} clk $end", ident(0))?;

    // Variable index of each port, `None` for zero-width ports.
    let mut idents = vec![];
    let mut next = 1;
    for (name, width) in trace.ports() {
        if width == 0 {
            idents.push(None);
            continue;
        }
        let id = ident(next);
        writeln!(w, "$var wire {} {} {} $end", width, id, name)?;
        idents.push(Some(id));
        next += 1;
    }

    writeln!(w, "$upscope $end")?;
    writeln!(w, "$enddefinitions $end")?;

    let mut prev: Option<Vec<Bits>> = None;
    for cycle in 0..trace.len() {
        let Some(sample) = trace.sample(cycle) else { break };
        writeln!(w, "#{}", cycle * CYCLE_PERIOD)?;
        writeln!(w, "0{}", ident(0))?;
        for (i, (value, id)) in sample.iter().zip(&idents).enumerate() {
            let Some(id) = id else { continue };
            if prev.as_ref().map_or(true, |prev| prev[i] != *value) {
                gen_value(w, value, id)?;
            }
        }
        writeln!(w, "#{}", cycle * CYCLE_PERIOD + CYCLE_PERIOD / 2)?;
        writeln!(w, "1{}", ident(0))?;
        prev = Some(sample);
    }

    if !trace.is_empty() {
        writeln!(w, "#{}", trace.len() * CYCLE_PERIOD)?;
    }
    Ok(())
}
