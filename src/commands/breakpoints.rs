use crate::breakpoint::{breakpoints_from_reads, Breakpoint};
use crate::config::Config;
use crate::read::ReadSet;
use log::info;
use std::io::{self, BufWriter, Write};

/// Detect breakpoints in `input` and write them as a tab-separated table
/// to `output`, or to standard output when no path is given.
pub fn run_breakpoints(input: &str, output: Option<&str>, config: &Config) -> io::Result<()> {
    let reads = super::load_reads(input, config)?;
    let breakpoints = breakpoints_from_reads(&reads, config);

    let mut writer: Box<dyn Write> = if let Some(path) = output {
        Box::new(BufWriter::new(std::fs::File::create(path)?))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };
    write_breakpoints(&mut writer, &reads, breakpoints.iter())?;
    writer.flush()?;

    if let Some(path) = output {
        info!("Wrote {} breakpoints to {}", breakpoints.len(), path);
    }
    Ok(())
}

/// Write one row per breakpoint:
/// `qname rname1 pos1 strand1 rname2 pos2 strand2 gap`
pub fn write_breakpoints<'a, W, I>(writer: &mut W, reads: &ReadSet, breakpoints: I) -> io::Result<()>
where
    W: Write,
    I: Iterator<Item = &'a Breakpoint>,
{
    writeln!(writer, "#qname\trname1\tpos1\tstrand1\trname2\tpos2\tstrand2\tgap")?;

    for breakpoint in breakpoints {
        let (Some(first), Some(second)) = (breakpoint.first(), breakpoint.second()) else {
            continue;
        };
        let first = &reads.segments[first];
        let second = &reads.segments[second];
        let qname = first
            .read
            .and_then(|id| reads.get(id))
            .map_or(".", |read| read.qname.as_str());

        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            qname,
            first.rname,
            breakpoint.breakpoints[0],
            first.strand().as_char(),
            second.rname,
            breakpoint.breakpoints[1],
            second.strand().as_char(),
            breakpoint.gap
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn test_write_breakpoints() {
        let seq = "A".repeat(50);
        let text = format!(
            "@HD\tVN:1.6\n\
             r1\t0\tchr1\t100\t60\t10S40=\t*\t0\t0\t{seq}\t*\n\
             r1\t16\tchr3\t700\t60\t30S20=\t*\t0\t0\t{seq}\t*\n"
        );
        let config = Config {
            min_map_quality: 20,
            min_identity: 0.3,
            ..Default::default()
        };
        let reads = ReadSet::from_stream(BufReader::new(text.as_bytes()), &config).unwrap();
        let breakpoints = breakpoints_from_reads(&reads, &config);

        let mut out = Vec::new();
        write_breakpoints(&mut out, &reads, breakpoints.iter()).unwrap();
        let out = String::from_utf8(out).unwrap();
        let lines: Vec<_> = out.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with('#'));
        // chr1 end = 100 + 50, gap = 10 - 30 + 50
        assert_eq!(lines[1], "r1\tchr1\t150\t+\tchr3\t700\t-\t30");
    }
}
