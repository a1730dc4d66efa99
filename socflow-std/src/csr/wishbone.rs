//! Wishbone to CSR bridge.

use log::debug;
use socflow::*;

use crate::config::check_supported;
use crate::csr::{CsrBus, CsrInterface, CsrRequest, CsrResponse};
use crate::wishbone::{OptionalSignal, WishboneBus, WishboneInterface, WishboneRequest, WishboneResponse};
use crate::ConfigError;

/// Wishbone to CSR bridge.
///
/// A bus bridge for accessing CSR registers from a Wishbone master. The Wishbone granularity is the CSR data width,
/// and a Wishbone data word is split into `data_width / granularity` chunks, one CSR access per chunk, from the
/// least significant. Chunks whose `sel` bit is clear are skipped but still take a cycle, so every transaction
/// takes exactly `chunks + 1` cycles to be acknowledged.
///
/// The CSR address is the Wishbone address followed by the chunk index, so the CSR registers should be aligned
/// to the Wishbone data width to be accessed with a single transaction.
#[derive(Debug, Clone)]
pub struct WishboneCsrBridge {
    csr_bus: CsrInterface,
    wb_bus: WishboneInterface,
}

/// Registers of a [`WishboneCsrBridge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeState {
    cycle: usize,
    ack: bool,
    dat_r: Bits,
}

impl BridgeState {
    /// Index of the chunk accessed in this cycle; equals the number of chunks in the final cycle.
    pub fn cycle(&self) -> usize { self.cycle }

    /// Whether `ack` is asserted in this cycle.
    pub fn ack(&self) -> bool { self.ack }

    /// Registered read data.
    pub fn dat_r(&self) -> &Bits { &self.dat_r }
}

impl WishboneCsrBridge {
    /// Creates a bridge to `csr_bus`. `data_width` is the Wishbone data width, defaulting to the CSR data width.
    pub fn new(csr_bus: CsrInterface, data_width: Option<u32>) -> Result<Self, ConfigError> {
        let granularity = check_supported("CSR bus data width", csr_bus.data_width())?;
        let data_width = data_width.unwrap_or(granularity);
        let ratio = (data_width / granularity) as usize;
        let wb_bus = WishboneInterface::new(
            csr_bus.addr_width().saturating_sub(flog2(ratio) as u32),
            data_width,
            Some(granularity),
        )?;
        debug!(
            "wb_csr: {}-bit Wishbone ({} address bits) to {}-bit CSR ({} address bits)",
            wb_bus.data_width(),
            wb_bus.addr_width(),
            csr_bus.data_width(),
            csr_bus.addr_width()
        );
        Ok(Self { csr_bus, wb_bus })
    }

    /// Adds the `stall` signal: the bridge stalls until the transaction is acknowledged.
    pub fn pipelined(mut self) -> Self {
        self.wb_bus = self.wb_bus.with_signal(OptionalSignal::Stall);
        self
    }

    /// CSR bus, driven by the bridge.
    pub fn csr_bus(&self) -> CsrInterface { self.csr_bus }

    /// Wishbone bus, driving the bridge.
    pub fn wb_bus(&self) -> &WishboneInterface { &self.wb_bus }

    /// Number of CSR chunks per Wishbone data word.
    pub fn chunks(&self) -> usize { self.wb_bus.sel_width() as usize }
}

impl Fsm for WishboneCsrBridge {
    type I = WishboneBus;
    type O = CsrBus;
    type S = BridgeState;

    fn module_name(&self) -> String { "wb_csr".to_string() }

    fn init(&self) -> BridgeState {
        BridgeState { cycle: 0, ack: false, dat_r: Bits::zero(self.wb_bus.data_width() as usize) }
    }

    fn comb(
        &self, wb: &WishboneRequest, csr: &CsrResponse, s: &BridgeState,
    ) -> (CsrRequest, WishboneResponse, BridgeState) {
        let chunks = self.chunks();
        let granularity = self.wb_bus.granularity() as usize;

        let chunk_index = (s.cycle & (chunks - 1)) as u64;
        let addr = (wb.adr.to_u64() << flog2(chunks)) | chunk_index;
        let mut req =
            CsrRequest { addr: Bits::from_u64(self.csr_bus.addr_width() as usize, addr), ..self.csr_bus.idle() };

        let mut s_next = s.clone();
        if wb.cyc && (wb.stb || s.cycle != 0) {
            if s.cycle < chunks {
                if s.cycle > 0 {
                    s_next.dat_r.set_slice((s.cycle - 1) * granularity, &csr.r_data.resize(granularity));
                }
                let sel = wb.sel.get(s.cycle);
                req.r_stb = sel && !wb.we;
                req.w_stb = sel && wb.we;
                req.w_data = wb.dat_w.clip(s.cycle * granularity, granularity);
                s_next.cycle = s.cycle + 1;
            } else {
                s_next.dat_r.set_slice((chunks - 1) * granularity, &csr.r_data.resize(granularity));
                s_next.ack = true;
            }
        }

        if s.ack {
            s_next.cycle = 0;
            s_next.ack = false;
        }

        let resp = WishboneResponse {
            dat_r: s.dat_r.clone(),
            ack: s.ack,
            stall: self.wb_bus.has(OptionalSignal::Stall) && !s.ack,
        };
        (req, resp, s_next)
    }
}
