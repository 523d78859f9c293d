use crate::cigar::{self, CigarOverview};
use std::cell::OnceCell;

/// Segment is reported on the reverse strand
pub const FLAG_REVERSE: u16 = 0x10;
/// Segment is unmapped
pub const FLAG_UNMAPPED: u16 = 0x4;
/// Mapping quality value meaning "not available"
pub const MAPQ_UNAVAILABLE: u16 = 255;

/// Handle of a segment inside a [`SegmentStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub u32);

/// Handle of a read inside a [`crate::read::ReadSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ReadId(pub u32);

/// Strand orientation of a segment
#[derive(Default, PartialEq, Clone, Copy, Debug)]
pub enum Strand {
    #[default]
    Forward,
    Reverse,
}

impl Strand {
    pub fn as_char(&self) -> char {
        match self {
            Strand::Forward => '+',
            Strand::Reverse => '-',
        }
    }
}

/// One alignment record of a read.
///
/// The read name is not stored here; it belongs to the owning read.
#[derive(Debug, Clone, Default)]
pub struct Segment {
    pub flag: u16,
    pub rname: String,
    /// 1-based leftmost mapping position
    pub pos: i32,
    pub mapq: u16,
    pub cigar: String,
    pub rnext: String,
    pub pnext: i32,
    pub tlen: i32,
    pub seq: String,
    pub qual: String,

    pub seq_len: u32,
    /// Alignment end, `pos + seq_len + deletions - insertions`
    pub end: i32,
    pub read: Option<ReadId>,
    pub(crate) clip: OnceCell<Option<u32>>,
}

impl Segment {
    /// Fill in the fields derived from the SAM columns.
    ///
    /// The overview is computed from the CIGAR every time; nothing cached is
    /// trusted here.
    pub fn compute_derived(&mut self) {
        self.seq_len = self.seq.len() as u32;
        let overview = self.cigar_overview();
        self.end = (self.pos as i64 + self.seq_len as i64 + overview.reference_delta()) as i32;
    }

    pub fn cigar_overview(&self) -> CigarOverview {
        CigarOverview::from_cigar(&self.cigar)
    }

    /// Length of the first clip in the CIGAR string, computed once.
    pub fn first_clip(&self) -> Option<u32> {
        *self.clip.get_or_init(|| cigar::first_clip(&self.cigar))
    }

    /// First clip as a signed value, -1 when there is none
    pub fn clip_or_unset(&self) -> i64 {
        self.first_clip().map_or(-1, |clip| clip as i64)
    }

    pub fn percent_identity(&self) -> Option<f32> {
        cigar::percent_identity(&self.cigar, self.seq_len)
    }

    pub fn is_unmapped(&self) -> bool {
        self.flag & FLAG_UNMAPPED != 0
    }

    pub fn strand(&self) -> Strand {
        if self.flag & FLAG_REVERSE != 0 {
            Strand::Reverse
        } else {
            Strand::Forward
        }
    }

    /// Position of the junction on this segment: the leftmost position on
    /// the reverse strand, the alignment end otherwise.
    pub fn breakpoint_position(&self) -> i32 {
        match self.strand() {
            Strand::Reverse => self.pos,
            Strand::Forward => self.end,
        }
    }
}

/// Arena owning every retained segment of a parsing pass.
///
/// Reads and breakpoints refer to segments by [`SegmentId`] only, so a
/// segment shared by two breakpoints is still released exactly once.
#[derive(Debug, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: Segment) -> Result<SegmentId, std::collections::TryReserveError> {
        self.segments.try_reserve(1)?;
        let id = SegmentId(self.segments.len() as u32);
        self.segments.push(segment);
        Ok(id)
    }

    pub fn get(&self, id: SegmentId) -> Option<&Segment> {
        self.segments.get(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl std::ops::Index<SegmentId> for SegmentStore {
    type Output = Segment;

    fn index(&self, id: SegmentId) -> &Segment {
        &self.segments[id.0 as usize]
    }
}

impl std::ops::IndexMut<SegmentId> for SegmentStore {
    fn index_mut(&mut self, id: SegmentId) -> &mut Segment {
        &mut self.segments[id.0 as usize]
    }
}
