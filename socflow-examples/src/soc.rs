//! Example system: a Wishbone master accessing peripheral registers through the Wishbone-to-CSR bridge and the
//! CSR multiplexer.

use log::{debug, info, warn};
use socflow::*;
use socflow_std::csr::*;
use socflow_std::wishbone::{WishboneBus, WishboneInterface, WishboneRequest, WishboneResponse};

use crate::Error;

/// CSR bus address width.
const CSR_ADDR_WIDTH: u32 = 16;

/// Width of the interrupt status register.
const IRQ_WIDTH: usize = 8;

/// Peripheral configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SocConfig {
    pub(crate) csr_width: u32,
    pub(crate) wb_width: u32,
    pub(crate) alignment: Option<u32>,
    pub(crate) pipelined: bool,
}

/// Placement of the peripheral registers.
#[derive(Debug, Clone, Copy)]
struct Registers {
    /// Read-write storage.
    scratch: Placement,
    /// Read-only free-running cycle counter.
    cycles: Placement,
    /// Interrupt status: writing ones sets bits, reading clears all bits.
    irq: Placement,
}

#[derive(Debug, Clone)]
struct Peripheral {
    scratch: Bits,
    cycles: u64,
    irq: Bits,
}

impl Registers {
    fn r_data(&self, width: usize, s: &Peripheral) -> Vec<Bits> {
        let mut r_data = vec![Bits::default(); 3];
        r_data[self.scratch.id.index()] = s.scratch.clone();
        r_data[self.cycles.id.index()] = Bits::from_u64(width, s.cycles);
        r_data[self.irq.id.index()] = s.irq.clone();
        r_data
    }

    fn next(&self, drives: &[ElementDrive], s: &Peripheral) -> Peripheral {
        let mut next = s.clone();
        next.cycles = s.cycles.wrapping_add(1);

        if let Some(drive) = drives.get(self.scratch.id.index()).filter(|drive| drive.w_stb) {
            next.scratch = drive.w_data.clone();
        }

        if let Some(drive) = drives.get(self.irq.id.index()) {
            if drive.r_stb {
                next.irq = Bits::zero(IRQ_WIDTH);
            }
            if drive.w_stb {
                next.irq = next.irq.iter().zip(drive.w_data.iter()).map(|(old, set)| old || set).collect();
            }
        }

        next
    }
}

fn peripheral(regs: Registers, width: usize) -> impl Fsm<I = ElementBus, O = (), S = Peripheral> {
    FnFsm::<ElementBus, (), Peripheral, _>::new(
        "peripheral",
        move |drives: &Vec<ElementDrive>, _: &(), s: &Peripheral| ((), regs.r_data(width, s), regs.next(drives, s)),
        Peripheral { scratch: Bits::zero(width), cycles: 0, irq: Bits::zero(IRQ_WIDTH) },
    )
}

fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1 << width) - 1
    }
}

/// Wishbone master running classic single-word transactions.
#[derive(Debug)]
struct Master<M: Fsm<I = WishboneBus, O = ()>> {
    sim: Simulator<M>,
    wb: WishboneInterface,
    chunks: usize,
    checks: usize,
}

impl<M: Fsm<I = WishboneBus, O = ()>> Master<M> {
    fn sel(&self) -> u64 { mask(self.wb.sel_width()) }

    /// Holds `req` until it is acknowledged, then idles for a cycle.
    fn transaction(&mut self, req: &WishboneRequest) -> Result<WishboneResponse, Error> {
        let start = self.sim.cycle();
        for _ in 0..=self.chunks + 1 {
            let (_, resp) = self.sim.step(req, &());
            if resp.ack {
                debug!(
                    "wb: {} {:#x} acknowledged in {} cycle(s), dat_r {:#x}",
                    if req.we { "write" } else { "read" },
                    req.adr.to_u64(),
                    self.sim.cycle() - start,
                    resp.dat_r.to_u64()
                );
                self.sim.step(&self.wb.idle(), &());
                return Ok(resp);
            }
        }
        Err(Error::Timeout { adr: req.adr.to_u64(), cycles: self.sim.cycle() - start })
    }

    fn write(&mut self, adr: u64, data: u64) -> Result<(), Error> {
        let req = self.wb.write(adr, data, self.sel());
        self.transaction(&req).map(|_| ())
    }

    fn read(&mut self, adr: u64) -> Result<u64, Error> {
        let req = self.wb.read(adr, self.sel());
        self.transaction(&req).map(|resp| resp.dat_r.to_u64())
    }

    fn expect(&mut self, name: &'static str, actual: u64, expected: u64) -> Result<(), Error> {
        self.checks += 1;
        if actual != expected {
            return Err(Error::Mismatch { name, expected, actual });
        }
        Ok(())
    }
}

/// Builds the system, runs the register test, and returns the recorded traces.
pub(crate) fn run(config: SocConfig) -> Result<Package, Error> {
    let csr_bus = CsrInterface::new(CSR_ADDR_WIDTH, config.csr_width)?;
    let mut bridge = WishboneCsrBridge::new(csr_bus, Some(config.wb_width))?;
    if config.pipelined {
        bridge = bridge.pipelined();
    }
    let chunks = bridge.chunks();
    let word = flog2(chunks) as u32;

    // Every register starts and ends on a Wishbone word.
    let alignment = match config.alignment {
        Some(alignment) if alignment < word => {
            warn!("alignment {alignment} is narrower than a {}-bit Wishbone word, using {word}", config.wb_width);
            word
        }
        Some(alignment) => alignment,
        None => word,
    };

    let width = config.wb_width as usize;
    let mut builder = MultiplexerBuilder::new(csr_bus, alignment)?;
    let regs = Registers {
        scratch: builder.add(Element::new(width, Access::RW).with_name("scratch"))?,
        cycles: builder.add(Element::new(width, Access::R).with_name("cycles"))?,
        irq: builder.add(Element::new(IRQ_WIDTH, Access::RW).with_name("irq"))?,
    };
    let mux = builder.build();
    let adr = |placement: Placement| placement.addr >> word;

    let mut package = Package::default();

    // The multiplexer on its own: a whole-register read, chunk by chunk.
    let mut csr = Simulator::new(mux.clone()).with_trace();
    let r_data = regs.r_data(width, &Peripheral {
        scratch: Bits::from_u64(width, 0x0123_4567_89ab_cdef),
        cycles: 0,
        irq: Bits::zero(IRQ_WIDTH),
    });
    for chunk in 0..regs.scratch.size {
        csr.step(&csr_bus.read(regs.scratch.addr + chunk), &r_data);
    }
    csr.step(&csr_bus.idle(), &r_data);
    if let Some(trace) = csr.take_trace() {
        package.add(trace);
    }

    let wb = bridge.wb_bus().clone();
    let soc = bridge.compose("wb_csr_mux", mux).compose("soc", peripheral(regs, width));
    let mut master = Master { sim: Simulator::new(soc).with_trace(), wb, chunks, checks: 0 };

    let scratch = 0x0123_4567_89ab_cdef & mask(config.wb_width);
    master.write(adr(regs.scratch), scratch)?;
    let actual = master.read(adr(regs.scratch))?;
    master.expect("scratch", actual, scratch)?;

    // A transaction takes `chunks + 2` cycles and the master idles for one more.
    let before = master.read(adr(regs.cycles))?;
    let after = master.read(adr(regs.cycles))?;
    master.expect("cycles", after.wrapping_sub(before) & mask(config.wb_width), chunks as u64 + 3)?;

    master.write(adr(regs.irq), 0b101)?;
    master.write(adr(regs.irq), 0b010)?;
    let actual = master.read(adr(regs.irq))?;
    master.expect("irq", actual, 0b111)?;
    let actual = master.read(adr(regs.irq))?;
    master.expect("irq", actual, 0)?;

    info!("soc: {} check(s) passed in {} cycles", master.checks, master.sim.cycle());
    if let Some(trace) = master.sim.take_trace() {
        package.add(trace);
    }
    Ok(package)
}
