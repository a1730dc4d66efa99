use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use thiserror::Error;

use crate::*;

#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum PackageError {
    #[error("file system error: {error:?}")]
    Fs { error: io::Error },
}

impl From<io::Error> for PackageError {
    fn from(error: io::Error) -> Self { Self::Fs { error } }
}

/// Package.
#[derive(Debug, Default)]
pub struct Package {
    /// Traces.
    pub traces: Vec<Trace>,
}

impl Package {
    /// Adds the given trace to package.
    pub fn add(&mut self, trace: Trace) { self.traces.push(trace); }

    /// Writes each trace to `<module name>.vcd` in `path`, creating the directory if needed.
    pub fn gen_vcd(&self, path: &Path) -> Result<(), PackageError> {
        fs::create_dir_all(path)?;

        for trace in &self.traces {
            let file_path = path.join(format!("{}.vcd", trace.module_name()));
            let mut file = BufWriter::new(File::create(&file_path)?);
            vcdgen::gen_vcd(trace, &mut file)?;
            file.flush()?;
            info!("wrote {} cycles of `{}` to {}", trace.len(), trace.module_name(), file_path.display());
        }

        Ok(())
    }
}
