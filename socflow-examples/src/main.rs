//! Builds a Wishbone-to-CSR system, runs a register test on it, and writes the waveforms.

mod soc;

use std::path::PathBuf;

use clap::Parser;
use socflow::{is_pow2, PackageError};
use socflow_std::ConfigError;
use static_assertions::const_assert;
use thiserror::Error;

const DEFAULT_CSR_WIDTH: u32 = 8;
const DEFAULT_WB_WIDTH: u32 = 32;

const_assert!(DEFAULT_WB_WIDTH % DEFAULT_CSR_WIDTH == 0);
const_assert!(is_pow2((DEFAULT_WB_WIDTH / DEFAULT_CSR_WIDTH) as usize));

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Package(#[from] PackageError),

    #[error("transaction at {adr:#x} not acknowledged after {cycles} cycles")]
    Timeout { adr: u64, cycles: u64 },

    #[error("{name}: read {actual:#x}, expected {expected:#x}")]
    Mismatch { name: &'static str, expected: u64, actual: u64 },
}

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// CSR bus data width
    #[arg(long, default_value_t = DEFAULT_CSR_WIDTH)]
    csr_width: u32,

    /// Wishbone bus data width
    #[arg(long, default_value_t = DEFAULT_WB_WIDTH)]
    wb_width: u32,

    /// Register alignment, in log2 of CSR chunks [default: one Wishbone word]
    #[arg(long)]
    alignment: Option<u32>,

    /// Add the Wishbone stall signal
    #[arg(long)]
    pipelined: bool,

    /// Directory the waveforms are written to
    #[arg(short, long, default_value = "./build")]
    out: PathBuf,
}

fn main() -> Result<(), Error> {
    env_logger::Builder::new().filter_level(log::LevelFilter::Warn).parse_default_env().init();

    let args = Args::parse();
    let package = soc::run(soc::SocConfig {
        csr_width: args.csr_width,
        wb_width: args.wb_width,
        alignment: args.alignment,
        pipelined: args.pipelined,
    })?;
    package.gen_vcd(&args.out)?;
    Ok(())
}
