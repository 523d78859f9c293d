//! CIGAR string analysis
//!
//! The scanners are lenient: any byte that is not an
//! operation letter is collected into the pending length, and the length is
//! read back with `atoi` semantics. Malformed strings therefore produce a
//! defined result instead of an error (`11I6M2D34DD6I` has 36 deletions).

/// Summary of the operations in a CIGAR string.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CigarOverview {
    pub insertions: u32,
    pub deletions: u32,
    pub alignment_matches: u32,
    pub matches: u32,
    pub mismatches: u32,
    pub skipped: u32,
    /// Length of the last soft clip seen
    pub soft_clip: u32,
    /// Length of the last hard clip seen
    pub hard_clip: u32,
    pub padding: u32,
}

impl CigarOverview {
    pub fn from_cigar(cigar: &str) -> Self {
        let mut overview = CigarOverview::default();
        let mut pending = LengthBuffer::default();

        for &byte in cigar.as_bytes() {
            // Negative lengths wrap, matching unsigned accumulation
            let counter = match byte {
                b'I' => &mut overview.insertions,
                b'D' => &mut overview.deletions,
                b'M' => &mut overview.alignment_matches,
                b'N' => &mut overview.skipped,
                b'P' => &mut overview.padding,
                b'=' => &mut overview.matches,
                b'X' => &mut overview.mismatches,
                b'S' => {
                    overview.soft_clip = pending.take() as u32;
                    continue;
                }
                b'H' => {
                    overview.hard_clip = pending.take() as u32;
                    continue;
                }
                _ => {
                    pending.push(byte);
                    continue;
                }
            };
            *counter = counter.wrapping_add(pending.take() as u32);
        }

        overview
    }

    /// Number of reference bases consumed relative to the read length.
    pub fn reference_delta(&self) -> i64 {
        self.deletions as i64 - self.insertions as i64
    }
}

/// Length of the first soft or hard clip in `cigar`, if any.
///
/// Operations before the first clip only reset the pending length; padding
/// (`P`) is not an operation here and is collected like a digit.
pub fn first_clip(cigar: &str) -> Option<u32> {
    let mut pending = LengthBuffer::default();
    for &byte in cigar.as_bytes() {
        match byte {
            b'I' | b'D' | b'M' | b'N' | b'=' | b'X' => pending.clear(),
            b'S' | b'H' => return Some(pending.value() as u32),
            _ => pending.push(byte),
        }
    }
    None
}

/// Fraction of `seq_len` covered by the first `=` run in `cigar`.
///
/// Returns `None` when the CIGAR has no `=` operation.
pub fn percent_identity(cigar: &str, seq_len: u32) -> Option<f32> {
    let mut pending = LengthBuffer::default();
    for &byte in cigar.as_bytes() {
        match byte {
            b'I' | b'D' | b'M' | b'N' | b'X' | b'S' | b'H' => pending.clear(),
            b'=' => return Some(pending.value() as f32 / seq_len as f32),
            _ => pending.push(byte),
        }
    }
    None
}

/// Parse the leading decimal integer of `bytes` the way C's `atoi` does:
/// optional whitespace, an optional sign, then digits. Anything else yields 0.
pub fn leading_int(bytes: &[u8]) -> i64 {
    let mut iter = bytes
        .iter()
        .skip_while(|b| b.is_ascii_whitespace())
        .peekable();

    let negative = match iter.peek() {
        Some(b'-') => {
            iter.next();
            true
        }
        Some(b'+') => {
            iter.next();
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    for &byte in iter {
        if !byte.is_ascii_digit() {
            break;
        }
        value = value.wrapping_mul(10).wrapping_add((byte - b'0') as i64);
    }

    if negative {
        -value
    } else {
        value
    }
}

#[derive(Default)]
struct LengthBuffer {
    bytes: Vec<u8>,
}

impl LengthBuffer {
    fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    fn value(&self) -> i64 {
        leading_int(&self.bytes)
    }

    fn clear(&mut self) {
        self.bytes.clear();
    }

    fn take(&mut self) -> i64 {
        let value = self.value();
        self.clear();
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_simple() {
        let overview = CigarOverview::from_cigar("133I44D2M675I16M");
        assert_eq!(overview.insertions, 808);
        assert_eq!(overview.deletions, 44);
        assert_eq!(overview.alignment_matches, 18);
    }

    #[test]
    fn test_overview_repeated_operation() {
        // The bare second 'D' applies an empty length
        let overview = CigarOverview::from_cigar("11I6M2D34DD6I");
        assert_eq!(overview.insertions, 17);
        assert_eq!(overview.deletions, 36);
        assert_eq!(overview.alignment_matches, 6);
    }

    #[test]
    fn test_overview_clips_are_overwritten() {
        let overview = CigarOverview::from_cigar("5S10M3S2H4H");
        assert_eq!(overview.soft_clip, 3);
        assert_eq!(overview.hard_clip, 4);
        assert_eq!(overview.alignment_matches, 10);
    }

    #[test]
    fn test_overview_all_counters() {
        let overview = CigarOverview::from_cigar("2S10=3X4N1P5M2I3D7H");
        assert_eq!(
            overview,
            CigarOverview {
                insertions: 2,
                deletions: 3,
                alignment_matches: 5,
                matches: 10,
                mismatches: 3,
                skipped: 4,
                soft_clip: 2,
                hard_clip: 7,
                padding: 1,
            }
        );
        assert_eq!(overview.reference_delta(), 1);
    }

    #[test]
    fn test_overview_empty() {
        assert_eq!(CigarOverview::from_cigar(""), CigarOverview::default());
        assert_eq!(CigarOverview::from_cigar("*"), CigarOverview::default());
    }

    #[test]
    fn test_overview_unknown_letter_is_collected() {
        // "5Q3" reads back as 5
        let overview = CigarOverview::from_cigar("5Q3M");
        assert_eq!(overview.alignment_matches, 5);
    }

    #[test]
    fn test_first_clip() {
        assert_eq!(first_clip("30S100M"), Some(30));
        assert_eq!(first_clip("100M25H"), Some(25));
        assert_eq!(first_clip("10M5I20S4H"), Some(20));
        assert_eq!(first_clip("100M"), None);
        assert_eq!(first_clip(""), None);
        assert_eq!(first_clip("*"), None);
    }

    #[test]
    fn test_first_clip_padding_is_collected() {
        assert_eq!(first_clip("10M5P3S"), Some(5));
    }

    #[test]
    fn test_percent_identity() {
        assert_eq!(percent_identity("10S90=", 100), Some(0.9));
        assert_eq!(percent_identity("5S40=5X50=", 100), Some(0.4));
        assert_eq!(percent_identity("100M", 100), None);
        assert_eq!(percent_identity("", 100), None);
    }

    #[test]
    fn test_leading_int() {
        assert_eq!(leading_int(b"123"), 123);
        assert_eq!(leading_int(b"  42abc"), 42);
        assert_eq!(leading_int(b"-7"), -7);
        assert_eq!(leading_int(b"+8"), 8);
        assert_eq!(leading_int(b"abc"), 0);
        assert_eq!(leading_int(b""), 0);
    }
}
