use crate::breakpoint::breakpoints_from_reads;
use crate::config::Config;
use crate::read::ReadSet;
use rustc_hash::FxHashMap;
use std::io::{self, Write};

/// Print segment, read and breakpoint statistics for `input`
pub fn run_stats(input: &str, config: &Config) -> io::Result<()> {
    let reads = super::load_reads(input, config)?;
    let breakpoints = breakpoints_from_reads(&reads, config);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    print_stats(&mut out, &reads, breakpoints.len(), config)?;
    out.flush()
}

pub fn print_stats<W: Write>(
    out: &mut W,
    reads: &ReadSet,
    num_breakpoints: usize,
    config: &Config,
) -> io::Result<()> {
    let stats = &reads.stats;
    writeln!(out, "Parsed segments: {}", stats.parsed)?;
    writeln!(out, "Filtered segments: {}", stats.filtered())?;
    writeln!(out, "  without read name: {}", stats.unnamed)?;
    writeln!(out, "  unmapped: {}", stats.unmapped)?;
    writeln!(
        out,
        "  map quality below {}: {}",
        config.min_map_quality, stats.low_map_quality
    )?;
    writeln!(out, "  map quality unavailable: {}", stats.map_quality_unavailable)?;
    writeln!(
        out,
        "  identity below {}: {}",
        config.min_identity, stats.low_identity
    )?;
    writeln!(out, "  without clip: {}", stats.no_clip)?;
    writeln!(out, "Retained segments: {}", stats.retained)?;
    writeln!(out, "Reads: {}", reads.len())?;
    writeln!(out, "Breakpoints: {}", num_breakpoints)?;

    let mut segments_per_read: FxHashMap<usize, usize> = FxHashMap::default();
    for (_, read) in reads.iter() {
        *segments_per_read.entry(read.len()).or_insert(0) += 1;
    }

    let mut entries: Vec<(usize, usize)> = segments_per_read.into_iter().collect();
    entries.sort_unstable();

    if !entries.is_empty() {
        writeln!(out, "\nSegments per read:")?;
        for (segments, count) in entries {
            writeln!(out, "{}\t{}", segments, count)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    #[test]
    fn test_print_stats() {
        let seq = "A".repeat(20);
        let text = format!(
            "a\t0\tchr1\t1\t60\t5S15=\t*\t0\t0\t{seq}\t*\n\
             a\t0\tchr2\t1\t60\t15=5S\t*\t0\t0\t{seq}\t*\n\
             b\t4\t*\t0\t0\t*\t*\t0\t0\t{seq}\t*\n\
             c\t0\tchr1\t1\t60\t2S18=\t*\t0\t0\t{seq}\t*\n"
        );
        let config = Config {
            min_map_quality: 20,
            min_identity: 0.5,
            ..Default::default()
        };
        let reads = ReadSet::from_stream(BufReader::new(text.as_bytes()), &config).unwrap();

        let mut out = Vec::new();
        print_stats(&mut out, &reads, 1, &config).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Parsed segments: 4\n"));
        assert!(out.contains("Filtered segments: 1\n"));
        assert!(out.contains("  unmapped: 1\n"));
        assert!(out.contains("Reads: 2\n"));
        assert!(out.contains("Segments per read:\n1\t1\n2\t1\n"));
    }
}
