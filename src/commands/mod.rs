pub mod breakpoints;
pub mod stats;

use crate::config::Config;
use crate::read::{ReadSet, ReadsErr};
use log::error;
use std::io;

/// Parse and group the segments of `input`, turning failures into
/// `io::Error`s for the command line.
pub(crate) fn load_reads(input: &str, config: &Config) -> io::Result<ReadSet> {
    ReadSet::from_path(input, config).map_err(|e| {
        let message = e.to_string();
        error!("{}", message);
        match e {
            ReadsErr::IoError(e) => e,
            ReadsErr::UnsupportedFormat(_) => io::Error::new(io::ErrorKind::InvalidInput, message),
            ReadsErr::Allocation(_) => io::Error::new(io::ErrorKind::OutOfMemory, message),
        }
    })
}
