//! CSR bus interface, register elements and the register multiplexer.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::debug;
use socflow::*;

use crate::ConfigError;

/// Register access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Access {
    /// Read-only.
    R,
    /// Write-only.
    W,
    /// Read-write.
    RW,
}

impl Access {
    /// Returns whether the register can be read.
    pub fn readable(self) -> bool { matches!(self, Self::R | Self::RW) }

    /// Returns whether the register can be written.
    pub fn writable(self) -> bool { matches!(self, Self::W | Self::RW) }
}

impl FromStr for Access {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "r" => Ok(Self::R),
            "w" => Ok(Self::W),
            "rw" => Ok(Self::RW),
            _ => Err(ConfigError::AccessMode { token: s.to_string() }),
        }
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = match self {
            Self::R => "r",
            Self::W => "w",
            Self::RW => "rw",
        };
        write!(f, "{token}")
    }
}

/// Peripheral-side CSR interface: a single register with an access mode.
///
/// A readable register drives `r_data` continuously and observes the one-cycle `r_stb` pulse issued when a read
/// samples it. A writable register observes `w_data` and the one-cycle `w_stb` pulse issued when a write commits.
/// The register may have side effects on either strobe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    width: usize,
    access: Access,
    name: Option<String>,
}

impl Element {
    /// Creates a register of `width` bits.
    pub fn new(width: usize, access: Access) -> Self { Self { width, access, name: None } }

    /// Names the register, for logs and traces.
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Register width.
    pub fn width(&self) -> usize { self.width }

    /// Access mode.
    pub fn access(&self) -> Access { self.access }

    /// Register name.
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }

    /// Signal layout, seen from the register.
    pub fn layout(&self) -> PortDecls {
        let mut layout = Vec::new();
        if self.access.readable() {
            layout.push((Some("r_data".to_string()), PortDecls::Bits(self.width)));
            layout.push((Some("r_stb".to_string()), PortDecls::Bits(1)));
        }
        if self.access.writable() {
            layout.push((Some("w_data".to_string()), PortDecls::Bits(self.width)));
            layout.push((Some("w_stb".to_string()), PortDecls::Bits(1)));
        }
        PortDecls::Struct(layout)
    }

    /// Number of bus-width chunks the register occupies. Even a zero-width register occupies one chunk.
    pub fn chunks(&self, data_width: u32) -> u64 {
        let data_width = data_width as usize;
        ((self.width + data_width - 1) / data_width).max(1) as u64
    }
}

/// CPU-side CSR interface.
///
/// A low-level interface to a set of atomically readable and writable peripheral registers. A read is issued by
/// asserting `r_stb` with `addr`; its data is valid on `r_data` in the next cycle. A write is issued by asserting
/// `w_stb` with `addr` and `w_data`. At most one of `r_stb` and `w_stb` is asserted in a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CsrInterface {
    addr_width: u32,
    data_width: u32,
}

impl CsrInterface {
    /// Creates an interface with the given address and data widths.
    pub fn new(addr_width: u32, data_width: u32) -> Result<Self, ConfigError> {
        if addr_width == 0 || addr_width > 64 {
            return Err(ConfigError::AddrWidth { addr_width, min: 1 });
        }
        if data_width == 0 {
            return Err(ConfigError::DataWidth { data_width });
        }
        Ok(Self { addr_width, data_width })
    }

    /// Address width.
    pub fn addr_width(&self) -> u32 { self.addr_width }

    /// Data width.
    pub fn data_width(&self) -> u32 { self.data_width }

    /// Signal layout.
    pub fn layout(&self) -> PortDecls {
        PortDecls::Struct(vec![
            (Some("addr".to_string()), PortDecls::Bits(self.addr_width as usize)),
            (Some("r_data".to_string()), PortDecls::Bits(self.data_width as usize)),
            (Some("r_stb".to_string()), PortDecls::Bits(1)),
            (Some("w_data".to_string()), PortDecls::Bits(self.data_width as usize)),
            (Some("w_stb".to_string()), PortDecls::Bits(1)),
        ])
    }

    /// Returns whether `size` chunks starting at `addr` fit in the address space.
    pub fn contains(&self, addr: u64, size: u64) -> bool {
        u128::from(addr) + u128::from(size) <= 1u128 << self.addr_width
    }

    /// Request with no strobe asserted.
    pub fn idle(&self) -> CsrRequest {
        CsrRequest {
            addr: Bits::zero(self.addr_width as usize),
            r_stb: false,
            w_data: Bits::zero(self.data_width as usize),
            w_stb: false,
        }
    }

    /// Request reading the chunk at `addr`.
    pub fn read(&self, addr: u64) -> CsrRequest {
        CsrRequest { addr: Bits::from_u64(self.addr_width as usize, addr), r_stb: true, ..self.idle() }
    }

    /// Request writing `data` to the chunk at `addr`.
    pub fn write(&self, addr: u64, data: u64) -> CsrRequest {
        CsrRequest {
            addr: Bits::from_u64(self.addr_width as usize, addr),
            w_data: Bits::from_u64(self.data_width as usize, data),
            w_stb: true,
            ..self.idle()
        }
    }
}

/// CSR request signals, driven by the initiator.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Signal)]
pub struct CsrRequest {
    pub addr: Bits,
    pub r_stb: bool,
    pub w_data: Bits,
    pub w_stb: bool,
}

/// CSR response signals, driven by the target.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Signal)]
pub struct CsrResponse {
    pub r_data: Bits,
}

/// CSR bus.
#[derive(Debug)]
pub struct CsrBus;

impl Interface for CsrBus {
    type Bwd = CsrResponse;
    type Fwd = CsrRequest;
}

/// Strobes and write data driven to one register.
///
/// For read-only registers, `w_data` is kept at zero and `w_stb` is never asserted.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Signal)]
pub struct ElementDrive {
    pub r_stb: bool,
    pub w_data: Bits,
    pub w_stb: bool,
}

/// Register bank: strobes to every register, and every register's `r_data` back.
///
/// Entries are indexed by [`ElementId`]. Missing `r_data` entries read as zero.
#[derive(Debug)]
pub struct ElementBus;

impl Interface for ElementBus {
    type Bwd = Vec<Bits>;
    type Fwd = Vec<ElementDrive>;
}

/// Index of a register in a multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// Position in the [`ElementBus`] signals.
    pub fn index(self) -> usize { self.0 }
}

/// Address range assigned to a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Register.
    pub id: ElementId,
    /// First chunk address.
    pub addr: u64,
    /// Number of chunks, including alignment padding.
    pub size: u64,
}

impl Placement {
    /// Address one past the last chunk.
    pub fn end(&self) -> u64 { self.addr + self.size }
}

#[derive(Debug, Clone)]
struct Slot {
    element: Element,
    addr: u64,
    size: u64,
}

/// Rounds `value` up to a multiple of `2 ** alignment`, or `None` on overflow.
fn align_checked(value: u64, alignment: u32) -> Option<u64> {
    let by = 1u64.checked_shl(alignment)?;
    value.checked_add(by - 1)?;
    Some(align_up(value, by))
}

/// Places registers in the address space of a CSR bus.
///
/// Every register's address and size are rounded up to a multiple of `2 ** alignment` chunks. Addresses are
/// assigned in insertion order and never overlap.
#[derive(Debug)]
pub struct MultiplexerBuilder {
    bus: CsrInterface,
    alignment: u32,
    next_addr: u64,
    slots: Vec<Slot>,
}

impl MultiplexerBuilder {
    /// Creates a builder with an empty address space.
    pub fn new(bus: CsrInterface, alignment: u32) -> Result<Self, ConfigError> {
        if alignment >= 64 {
            return Err(ConfigError::Alignment { alignment });
        }
        Ok(Self { bus, alignment, next_addr: 0, slots: Vec::new() })
    }

    /// CSR bus.
    pub fn bus(&self) -> CsrInterface { self.bus }

    /// Alignment, in log2 of chunks.
    pub fn alignment(&self) -> u32 { self.alignment }

    /// Address of the next free chunk.
    pub fn next_addr(&self) -> u64 { self.next_addr }

    /// Places `element` at the next aligned address.
    ///
    /// On error, the builder is left unchanged.
    pub fn add(&mut self, element: Element) -> Result<Placement, ConfigError> {
        let chunks = element.chunks(self.bus.data_width());
        let overflow = |addr, size| ConfigError::AddressSpace { addr, size, addr_width: self.bus.addr_width() };

        let addr = align_checked(self.next_addr, self.alignment).ok_or_else(|| overflow(self.next_addr, chunks))?;
        let size = align_checked(chunks, self.alignment).ok_or_else(|| overflow(addr, chunks))?;
        if !self.bus.contains(addr, size) {
            return Err(overflow(addr, size));
        }

        let id = ElementId(self.slots.len());
        debug!(
            "csr: {} ({} bit(s), {}) at {:#x}..{:#x}",
            element.name().unwrap_or("<anonymous>"),
            element.width(),
            element.access(),
            addr,
            addr + size
        );
        self.next_addr = addr + size;
        self.slots.push(Slot { element, addr, size });
        Ok(Placement { id, addr, size })
    }

    /// Rounds the next free address up to a multiple of `2 ** alignment` chunks, and returns it.
    ///
    /// The returned address is not rounded further by the builder's own alignment; the next [`add`](Self::add)
    /// does that.
    pub fn align_to(&mut self, alignment: u32) -> Result<u64, ConfigError> {
        if alignment >= 64 {
            return Err(ConfigError::Alignment { alignment });
        }
        let addr = align_checked(self.next_addr, alignment)
            .filter(|addr| self.bus.contains(*addr, 0))
            .ok_or(ConfigError::AddressSpace { addr: self.next_addr, size: 0, addr_width: self.bus.addr_width() })?;
        self.next_addr = addr;
        Ok(addr)
    }

    /// Finishes placement.
    pub fn build(self) -> Multiplexer {
        let decoder = self.slots.iter().enumerate().map(|(index, slot)| (slot.addr, index)).collect();
        Multiplexer { bus: self.bus, alignment: self.alignment, slots: self.slots, decoder }
    }
}

/// CSR register multiplexer.
///
/// Connects the registers placed by a [`MultiplexerBuilder`] to a CSR bus, making wide accesses atomic:
///
/// - Reading chunk 0 of a readable register strobes its `r_stb` and captures all of its `r_data` in a shadow
///   register; chunk 0 is returned and later chunks are returned from the shadow. Chunk 0 must be read first, or
///   stale or zero data is returned.
/// - Writing a chunk of a writable register stores it in the shadow; writing the last chunk strobes the register's
///   `w_stb` in the next cycle with the whole shadow as `w_data`. Chunks must be written in order, ending with the
///   last chunk.
/// - Read data is registered: it appears on `r_data` in the cycle after `r_stb`, and is zero otherwise.
/// - A shadow is cleared in every cycle whose address is outside its register.
/// - Reads of unmapped addresses and alignment padding return zero; writes to them are ignored.
#[derive(Debug, Clone)]
pub struct Multiplexer {
    bus: CsrInterface,
    alignment: u32,
    slots: Vec<Slot>,
    decoder: BTreeMap<u64, usize>,
}

/// Registers of a [`Multiplexer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiplexerState {
    shadows: Vec<Bits>,
    w_stbs: Vec<bool>,
    r_data: Bits,
}

impl MultiplexerState {
    /// Shadow register of `id`.
    pub fn shadow(&self, id: ElementId) -> &Bits { &self.shadows[id.0] }

    /// Registered read data.
    pub fn r_data(&self) -> &Bits { &self.r_data }
}

impl Multiplexer {
    /// CSR bus.
    pub fn bus(&self) -> CsrInterface { self.bus }

    /// Alignment, in log2 of chunks.
    pub fn alignment(&self) -> u32 { self.alignment }

    /// Number of registers.
    pub fn len(&self) -> usize { self.slots.len() }

    /// Returns whether no register is placed.
    pub fn is_empty(&self) -> bool { self.slots.is_empty() }

    /// Register `id`.
    pub fn element(&self, id: ElementId) -> &Element { &self.slots[id.0].element }

    /// Placements, in insertion order.
    pub fn placements(&self) -> impl Iterator<Item = Placement> + '_ {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, slot)| Placement { id: ElementId(index), addr: slot.addr, size: slot.size })
    }

    /// Decodes a chunk address into its register and chunk index.
    pub fn decode(&self, addr: u64) -> Option<(ElementId, u64)> {
        let (base, index) = self.decoder.range(..=addr).next_back()?;
        let offset = addr - base;
        (offset < self.slots[*index].size).then_some((ElementId(*index), offset))
    }

    /// Zero `r_data` for every register.
    pub fn idle_r_data(&self) -> Vec<Bits> { self.slots.iter().map(|slot| Bits::zero(slot.element.width())).collect() }
}

impl Fsm for Multiplexer {
    type I = CsrBus;
    type O = ElementBus;
    type S = MultiplexerState;

    fn module_name(&self) -> String { "csr_mux".to_string() }

    fn init(&self) -> MultiplexerState {
        MultiplexerState {
            shadows: self.idle_r_data(),
            w_stbs: vec![false; self.slots.len()],
            r_data: Bits::zero(self.bus.data_width() as usize),
        }
    }

    fn comb(
        &self, req: &CsrRequest, r_data: &Vec<Bits>, s: &MultiplexerState,
    ) -> (Vec<ElementDrive>, CsrResponse, MultiplexerState) {
        let data_width = self.bus.data_width() as usize;
        let selected = self.decode(req.addr.to_u64());

        let mut s_next = s.clone();
        s_next.r_data = Bits::zero(data_width);

        let mut drives = Vec::with_capacity(self.slots.len());
        for (index, slot) in self.slots.iter().enumerate() {
            let access = slot.element.access();
            let width = slot.element.width();

            let mut drive = ElementDrive {
                r_stb: false,
                w_data: if access.writable() { s.shadows[index].clone() } else { Bits::zero(width) },
                w_stb: s.w_stbs[index],
            };

            match selected.filter(|(id, _)| id.0 == index) {
                None => {
                    s_next.shadows[index] = Bits::zero(width);
                    s_next.w_stbs[index] = false;
                }
                Some((_, chunk)) => {
                    let offset = chunk as usize * data_width;

                    if access.readable() && req.r_stb {
                        if chunk == 0 {
                            let value =
                                r_data.get(index).map_or_else(|| Bits::zero(width), |value| value.resize(width));
                            drive.r_stb = true;
                            s_next.r_data = value.clip(0, data_width);
                            s_next.shadows[index] = value;
                        } else {
                            s_next.r_data = s.shadows[index].clip(offset, data_width);
                        }
                    }

                    if access.writable() && req.w_stb {
                        s_next.shadows[index].set_slice(offset, &req.w_data);
                    }
                    s_next.w_stbs[index] = access.writable() && req.w_stb && chunk == slot.size - 1;
                }
            }

            drives.push(drive);
        }

        (drives, CsrResponse { r_data: s.r_data.clone() }, s_next)
    }
}
