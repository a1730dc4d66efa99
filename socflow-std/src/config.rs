//! Configuration errors.
//!
//! Every component validates its parameters when it is constructed; a rejected configuration never yields a
//! partially built component.

use itertools::Itertools;
use thiserror::Error;

/// Data widths supported by the Wishbone interface and the Wishbone-to-CSR bridge.
pub const SUPPORTED_WIDTHS: [u32; 4] = [8, 16, 32, 64];

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Address width must be an integer between {min} and 64, not {addr_width}")]
    AddrWidth { addr_width: u32, min: u32 },

    #[error("Data width must be a positive integer, not {data_width}")]
    DataWidth { data_width: u32 },

    #[error("Alignment must be an integer between 0 and 63, not {alignment}")]
    Alignment { alignment: u32 },

    #[error("{what} must be one of 8, 16, 32, 64, not {width}")]
    UnsupportedWidth { what: &'static str, width: u32 },

    #[error("Granularity {granularity} may not be greater than data width {data_width}")]
    Granularity { granularity: u32, data_width: u32 },

    #[error("Access mode must be one of \"r\", \"w\", or \"rw\", not {token:?}")]
    AccessMode { token: String },

    #[error("Optional signal(s) {} are not supported", .names.iter().map(|name| format!("{:?}", name)).join(", "))]
    OptionalSignals { names: Vec<String> },

    #[error("{size} chunk(s) at address {addr:#x} do not fit in an address space of {addr_width} bits")]
    AddressSpace { addr: u64, size: u64, addr_width: u32 },
}

/// Checks that `width` is one of [`SUPPORTED_WIDTHS`].
pub(crate) fn check_supported(what: &'static str, width: u32) -> Result<u32, ConfigError> {
    if SUPPORTED_WIDTHS.contains(&width) {
        Ok(width)
    } else {
        Err(ConfigError::UnsupportedWidth { what, width })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            ConfigError::AccessMode { token: "wo".to_string() }.to_string(),
            "Access mode must be one of \"r\", \"w\", or \"rw\", not \"wo\""
        );
        assert_eq!(
            ConfigError::OptionalSignals { names: vec!["foo".to_string()] }.to_string(),
            "Optional signal(s) \"foo\" are not supported"
        );
        assert_eq!(
            check_supported("Data width", 7).unwrap_err().to_string(),
            "Data width must be one of 8, 16, 32, 64, not 7"
        );
        assert_eq!(check_supported("Granularity", 16), Ok(16));
    }
}
