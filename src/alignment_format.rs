//! Input format detection and opening
//!
//! SAM text is parsed directly. BGZF-compressed SAM goes through a BGZF
//! reader, and BAM is handed to an external converter whose standard output
//! is parsed as SAM text.

use crate::config::Config;
use log::{debug, info, warn};
use noodles::bgzf;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Seek, SeekFrom};
use std::process::{Child, Command, Stdio};

/// Alignment input types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AlignmentFormat {
    /// SAM text on standard input
    Stdin,
    Sam,
    /// BGZF-compressed SAM text
    SamBgzf,
    Bam,
}

impl AlignmentFormat {
    /// Detect format from file extension
    pub fn from_path(path: &str) -> Option<Self> {
        if path == "-" {
            Some(AlignmentFormat::Stdin)
        } else if path.ends_with(".sam") {
            Some(AlignmentFormat::Sam)
        } else if path.ends_with(".sam.gz") || path.ends_with(".sam.bgz") {
            Some(AlignmentFormat::SamBgzf)
        } else if path.ends_with(".bam") {
            Some(AlignmentFormat::Bam)
        } else {
            None
        }
    }
}

const BGZF_HEADER_SIZE: usize = 18;

/// Check whether a file starts with a valid BGZF header.
/// Returns `Ok(false)` for regular gzip, too-small files, or plain text.
fn is_bgzf<R: Read + Seek>(reader: &mut R) -> io::Result<bool> {
    let mut header = [0u8; BGZF_HEADER_SIZE];
    let result = match reader.read_exact(&mut header) {
        Ok(()) => Ok(header[0..2] == [0x1f, 0x8b]      // gzip magic
            && header[2] == 0x08                       // DEFLATE
            && header[3] == 0x04                       // FEXTRA
            && header[10..12] == [0x06, 0x00]          // XLEN=6
            && header[12..14] == [b'B', b'C']          // BC subfield
            && header[14..16] == [0x02, 0x00]), // SLEN=2
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(e),
    };
    reader.seek(SeekFrom::Start(0))?;
    result
}

/// An opened alignment input yielding SAM text.
///
/// For BAM input the converter process is kept so it can be reaped once the
/// text has been consumed.
pub struct SamInput {
    reader: Box<dyn BufRead>,
    converter: Option<Child>,
}

impl SamInput {
    pub fn open(path: &str, format: AlignmentFormat, config: &Config) -> io::Result<Self> {
        match format {
            AlignmentFormat::Stdin => {
                info!("Reading from standard input");
                Ok(Self::from_reader(Box::new(BufReader::new(io::stdin()))))
            }
            AlignmentFormat::Sam => {
                let file = File::open(path).map_err(|e| {
                    io::Error::new(e.kind(), format!("Could not open the SAM file '{}': {}", path, e))
                })?;
                info!("Reading from: {}", path);
                Ok(Self::from_reader(Box::new(BufReader::new(file))))
            }
            AlignmentFormat::SamBgzf => {
                let mut file = File::open(path).map_err(|e| {
                    io::Error::new(
                        e.kind(),
                        format!("Failed to open compressed file '{}': {}", path, e),
                    )
                })?;
                if !is_bgzf(&mut file)? {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "'{}' is regular gzip, not BGZF. Convert with: zcat '{}' | bgzip > output.sam.gz",
                            path, path
                        ),
                    ));
                }
                debug!("Using BGZF reader for {}", path);
                info!("Reading from: {}", path);
                Ok(Self::from_reader(Box::new(bgzf::io::Reader::new(file))))
            }
            AlignmentFormat::Bam => Self::spawn_converter(path, config),
        }
    }

    pub fn from_reader(reader: Box<dyn BufRead>) -> Self {
        Self {
            reader,
            converter: None,
        }
    }

    fn spawn_converter(path: &str, config: &Config) -> io::Result<Self> {
        let args = config.converter_args(path);
        info!("Running: {} {}", config.converter, args.join(" "));

        let mut child = Command::new(&config.converter)
            .args(&args)
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| {
                io::Error::new(
                    e.kind(),
                    format!("Could not run {}: {}", config.converter, e),
                )
            })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            io::Error::other(format!("No standard output from {}", config.converter))
        })?;

        Ok(Self {
            reader: Box::new(BufReader::new(stdout)),
            converter: Some(child),
        })
    }

    pub fn reader(&mut self) -> &mut dyn BufRead {
        &mut *self.reader
    }

    /// Release the input, waiting for the converter process if there is one.
    pub fn finish(self) -> io::Result<()> {
        let SamInput { reader, converter } = self;
        // Close the pipe first so a converter blocked on writing can exit
        drop(reader);

        if let Some(mut child) = converter {
            let status = child.wait()?;
            if !status.success() {
                warn!("Converter exited with {}", status);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_format_detection() {
        assert_eq!(AlignmentFormat::from_path("-"), Some(AlignmentFormat::Stdin));
        assert_eq!(
            AlignmentFormat::from_path("reads.sam"),
            Some(AlignmentFormat::Sam)
        );
        assert_eq!(
            AlignmentFormat::from_path("reads.sam.gz"),
            Some(AlignmentFormat::SamBgzf)
        );
        assert_eq!(
            AlignmentFormat::from_path("reads.sam.bgz"),
            Some(AlignmentFormat::SamBgzf)
        );
        assert_eq!(
            AlignmentFormat::from_path("reads.bam"),
            Some(AlignmentFormat::Bam)
        );
        assert_eq!(AlignmentFormat::from_path("reads.cram"), None);
        assert_eq!(AlignmentFormat::from_path("reads"), None);
    }

    #[test]
    fn test_is_bgzf_rejects_plain_text() {
        let mut cursor = Cursor::new(b"read1\t0\tchr1\t1\t60\t5S5M\t*\t0\t0\tACGTA\t*\n".to_vec());
        assert!(!is_bgzf(&mut cursor).unwrap());
        // The reader is rewound afterwards
        assert_eq!(cursor.position(), 0);
    }

    #[test]
    fn test_is_bgzf_short_input() {
        let mut cursor = Cursor::new(vec![0x1f, 0x8b]);
        assert!(!is_bgzf(&mut cursor).unwrap());
    }

    #[test]
    fn test_missing_converter_is_an_error() {
        let config = Config {
            converter: "nanosv-converter-that-does-not-exist".to_string(),
            ..Default::default()
        };
        assert!(SamInput::open("reads.bam", AlignmentFormat::Bam, &config).is_err());
    }
}
