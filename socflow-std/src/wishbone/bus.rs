//! Wishbone bus interface.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use socflow::*;

use crate::config::check_supported;
use crate::ConfigError;

/// Wishbone Registered Feedback cycle type (`cti`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Signal)]
#[width(3)]
pub enum CycleType {
    /// Classic cycle.
    #[encode(0b000)]
    Classic,
    /// Constant address burst.
    #[encode(0b001)]
    ConstBurst,
    /// Incrementing burst.
    #[encode(0b010)]
    IncrBurst,
    /// End of burst.
    #[encode(0b111)]
    EndOfBurst,
}

/// Wishbone Registered Feedback burst type extension (`bte`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Signal)]
#[width(2)]
pub enum BurstTypeExt {
    /// Linear burst.
    #[encode(0b00)]
    Linear,
    /// 4-beat wrap burst.
    #[encode(0b01)]
    Wrap4,
    /// 8-beat wrap burst.
    #[encode(0b10)]
    Wrap8,
    /// 16-beat wrap burst.
    #[encode(0b11)]
    Wrap16,
}

/// Optional Wishbone signals, in their layout order.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptionalSignal {
    Err,
    Rty,
    Stall,
    Lock,
    Cti,
    Bte,
}

impl OptionalSignal {
    /// All optional signals.
    pub const ALL: [Self; 6] = [Self::Err, Self::Rty, Self::Stall, Self::Lock, Self::Cti, Self::Bte];

    /// Port name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Err => "err",
            Self::Rty => "rty",
            Self::Stall => "stall",
            Self::Lock => "lock",
            Self::Cti => "cti",
            Self::Bte => "bte",
        }
    }

    /// Port width.
    pub fn width(self) -> usize {
        match self {
            Self::Cti => 3,
            Self::Bte => 2,
            _ => 1,
        }
    }
}

impl FromStr for OptionalSignal {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, ConfigError> {
        Self::ALL
            .into_iter()
            .find(|signal| signal.name() == s)
            .ok_or_else(|| ConfigError::OptionalSignals { names: vec![s.to_string()] })
    }
}

impl fmt::Display for OptionalSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}", self.name()) }
}

/// Wishbone interface.
///
/// `granularity` is the smallest unit of data transfer the interface is capable of, and `sel` has one bit per
/// granule: `data_width / granularity` bits. Both widths are in bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WishboneInterface {
    addr_width: u32,
    data_width: u32,
    granularity: u32,
    optional: BTreeSet<OptionalSignal>,
}

impl WishboneInterface {
    /// Creates an interface with only the mandatory signals. `granularity` defaults to `data_width`.
    pub fn new(addr_width: u32, data_width: u32, granularity: Option<u32>) -> Result<Self, ConfigError> {
        if addr_width > 64 {
            return Err(ConfigError::AddrWidth { addr_width, min: 0 });
        }
        let data_width = check_supported("Data width", data_width)?;
        let granularity = check_supported("Granularity", granularity.unwrap_or(data_width))?;
        if granularity > data_width {
            return Err(ConfigError::Granularity { granularity, data_width });
        }
        Ok(Self { addr_width, data_width, granularity, optional: BTreeSet::new() })
    }

    /// Adds optional signals by name. Every unknown name is reported.
    pub fn with_features<'a>(mut self, names: impl IntoIterator<Item = &'a str>) -> Result<Self, ConfigError> {
        let mut unknown = Vec::new();
        for name in names {
            match name.parse::<OptionalSignal>() {
                Ok(signal) => {
                    self.optional.insert(signal);
                }
                Err(_) => unknown.push(name.to_string()),
            }
        }
        if !unknown.is_empty() {
            return Err(ConfigError::OptionalSignals { names: unknown });
        }
        Ok(self)
    }

    /// Adds an optional signal.
    pub fn with_signal(mut self, signal: OptionalSignal) -> Self {
        self.optional.insert(signal);
        self
    }

    /// Address width.
    pub fn addr_width(&self) -> u32 { self.addr_width }

    /// Data width.
    pub fn data_width(&self) -> u32 { self.data_width }

    /// Granularity.
    pub fn granularity(&self) -> u32 { self.granularity }

    /// Width of `sel`.
    pub fn sel_width(&self) -> u32 { self.data_width / self.granularity }

    /// Returns whether the optional signal is present.
    pub fn has(&self, signal: OptionalSignal) -> bool { self.optional.contains(&signal) }

    /// Present optional signals, in layout order.
    pub fn optional(&self) -> impl Iterator<Item = OptionalSignal> + '_ { self.optional.iter().copied() }

    /// Signal layout: mandatory signals, then the present optional signals.
    pub fn layout(&self) -> PortDecls {
        let mandatory = [
            ("adr", self.addr_width as usize),
            ("dat_w", self.data_width as usize),
            ("dat_r", self.data_width as usize),
            ("sel", self.sel_width() as usize),
            ("cyc", 1),
            ("stb", 1),
            ("we", 1),
            ("ack", 1),
        ];
        PortDecls::Struct(
            mandatory
                .into_iter()
                .chain(self.optional().map(|signal| (signal.name(), signal.width())))
                .map(|(name, width)| (Some(name.to_string()), PortDecls::Bits(width)))
                .collect(),
        )
    }

    /// Request with `cyc` deasserted.
    pub fn idle(&self) -> WishboneRequest {
        WishboneRequest {
            adr: Bits::zero(self.addr_width as usize),
            dat_w: Bits::zero(self.data_width as usize),
            sel: Bits::zero(self.sel_width() as usize),
            cyc: false,
            stb: false,
            we: false,
        }
    }

    /// Request reading the granules selected by `sel` at `adr`.
    pub fn read(&self, adr: u64, sel: u64) -> WishboneRequest {
        WishboneRequest {
            adr: Bits::from_u64(self.addr_width as usize, adr),
            sel: Bits::from_u64(self.sel_width() as usize, sel),
            cyc: true,
            stb: true,
            ..self.idle()
        }
    }

    /// Request writing the granules of `data` selected by `sel` at `adr`.
    pub fn write(&self, adr: u64, data: u64, sel: u64) -> WishboneRequest {
        WishboneRequest {
            dat_w: Bits::from_u64(self.data_width as usize, data),
            we: true,
            ..self.read(adr, sel)
        }
    }
}

/// Wishbone signals driven by the initiator.
///
/// Carries the mandatory signals only. `lock`, `cti` and `bte` appear in [`WishboneInterface::layout`] when enabled
/// but have no field here.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Signal)]
pub struct WishboneRequest {
    pub adr: Bits,
    pub dat_w: Bits,
    pub sel: Bits,
    pub cyc: bool,
    pub stb: bool,
    pub we: bool,
}

/// Wishbone signals driven by the target.
///
/// Carries the mandatory signals plus `stall`. `err` and `rty` appear in [`WishboneInterface::layout`] when enabled
/// but have no field here, and are never asserted.
///
/// `stall` is only meaningful when the interface has [`OptionalSignal::Stall`]; it is deasserted otherwise.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, PartialEq, Eq, Signal)]
pub struct WishboneResponse {
    pub dat_r: Bits,
    pub ack: bool,
    pub stall: bool,
}

/// Wishbone bus.
#[derive(Debug)]
pub struct WishboneBus;

impl Interface for WishboneBus {
    type Bwd = WishboneResponse;
    type Fwd = WishboneRequest;
}
