use crate::alignment_format::{AlignmentFormat, SamInput};
use crate::config::Config;
use crate::sam::SamReader;
use crate::segment::{ReadId, Segment, SegmentId, SegmentStore, MAPQ_UNAVAILABLE};
use crate::trie::{Trie, TrieError};
use log::{debug, info, warn};
use std::collections::TryReserveError;
use std::io::{self, BufRead};

#[derive(Debug)]
pub enum ReadsErr {
    Allocation(TryReserveError),
    UnsupportedFormat(String),
    IoError(io::Error),
}

impl std::fmt::Display for ReadsErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadsErr::Allocation(e) => write!(f, "Memory allocation failed: {}", e),
            ReadsErr::UnsupportedFormat(path) => {
                write!(f, "Unsupported file extension for '{}'", path)
            }
            ReadsErr::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ReadsErr {}

impl From<TryReserveError> for ReadsErr {
    fn from(e: TryReserveError) -> Self {
        ReadsErr::Allocation(e)
    }
}

impl From<TrieError> for ReadsErr {
    fn from(e: TrieError) -> Self {
        match e {
            TrieError::Allocation(e) => ReadsErr::Allocation(e),
            TrieError::EmptyKey => ReadsErr::IoError(io::Error::new(
                io::ErrorKind::InvalidData,
                "Record without a read name",
            )),
        }
    }
}

impl From<io::Error> for ReadsErr {
    fn from(e: io::Error) -> Self {
        ReadsErr::IoError(e)
    }
}

/// All retained segments sharing one read name
#[derive(Debug)]
pub struct Read {
    pub qname: String,
    segments: Vec<SegmentId>,
}

impl Read {
    pub fn new(qname: String) -> Self {
        Self {
            qname,
            segments: Vec::new(),
        }
    }

    pub fn add_segment(&mut self, segment: SegmentId) -> Result<(), TryReserveError> {
        self.segments.try_reserve(1)?;
        self.segments.push(segment);
        Ok(())
    }

    /// Segment handles in insertion order
    pub fn segments(&self) -> &[SegmentId] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// Reason a segment was left out of every read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterReason {
    Unmapped,
    LowMapQuality,
    MapQualityUnavailable,
    LowIdentity,
    NoClip,
}

/// Decide whether `segment` is dropped, checking the filters in order.
pub fn filter_segment(segment: &Segment, config: &Config) -> Option<FilterReason> {
    if segment.is_unmapped() {
        return Some(FilterReason::Unmapped);
    }
    if segment.mapq < config.min_map_quality {
        return Some(FilterReason::LowMapQuality);
    }
    if segment.mapq == MAPQ_UNAVAILABLE {
        return Some(FilterReason::MapQualityUnavailable);
    }
    // No '=' operation counts as -1
    if segment.percent_identity().unwrap_or(-1.0) < config.min_identity {
        return Some(FilterReason::LowIdentity);
    }
    if segment.first_clip().is_none() {
        return Some(FilterReason::NoClip);
    }
    None
}

/// Accounting for one parsing pass
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FilterStats {
    pub parsed: u64,
    pub retained: u64,
    /// Records with an empty read name
    pub unnamed: u64,
    pub unmapped: u64,
    pub low_map_quality: u64,
    pub map_quality_unavailable: u64,
    pub low_identity: u64,
    pub no_clip: u64,
}

impl FilterStats {
    pub fn filtered(&self) -> u64 {
        self.unnamed
            + self.unmapped
            + self.low_map_quality
            + self.map_quality_unavailable
            + self.low_identity
            + self.no_clip
    }

    fn record(&mut self, reason: FilterReason) {
        match reason {
            FilterReason::Unmapped => self.unmapped += 1,
            FilterReason::LowMapQuality => self.low_map_quality += 1,
            FilterReason::MapQualityUnavailable => self.map_quality_unavailable += 1,
            FilterReason::LowIdentity => self.low_identity += 1,
            FilterReason::NoClip => self.no_clip += 1,
        }
    }
}

/// Reads grouped from one alignment stream, together with the segments
/// they own.
#[derive(Debug, Default)]
pub struct ReadSet {
    reads: Vec<Read>,
    pub segments: SegmentStore,
    pub stats: FilterStats,
}

impl ReadSet {
    /// Group the segments of a SAM text stream into reads.
    ///
    /// A stream error ends the input early; an allocation failure discards
    /// everything built so far.
    pub fn from_stream<R: BufRead>(reader: R, config: &Config) -> Result<Self, ReadsErr> {
        let mut reader = SamReader::new(reader).with_field_capacity(config.max_field_length);
        let mut read_set = ReadSet::default();

        // Maps read names to reads, only needed while the stream is open
        let mut trie: Trie<ReadId> = Trie::new();

        loop {
            let (qname, segment) = match reader.next_segment() {
                Ok(Some(record)) => record,
                Ok(None) => break,
                Err(e) => {
                    warn!("Stopped reading input: {}", e);
                    break;
                }
            };
            read_set.stats.parsed += 1;

            if qname.is_empty() {
                warn!(
                    "Skipping record {} without a read name",
                    reader.records_read()
                );
                read_set.stats.unnamed += 1;
                continue;
            }

            if let Some(reason) = filter_segment(&segment, config) {
                read_set.stats.record(reason);
                continue;
            }

            read_set.add_segment(&mut trie, qname, segment)?;
            read_set.stats.retained += 1;
        }

        info!(
            "Parsed {} segments, of which {} were filtered.",
            read_set.stats.parsed,
            read_set.stats.filtered()
        );
        info!(
            "Retained {} segments in {} reads.",
            read_set.stats.retained,
            read_set.reads.len()
        );
        debug!(
            "Filtered segments: {} without read name, {} unmapped, {} below map quality {}, {} without map quality, {} below identity {}, {} without clip",
            read_set.stats.unnamed,
            read_set.stats.unmapped,
            read_set.stats.low_map_quality,
            config.min_map_quality,
            read_set.stats.map_quality_unavailable,
            read_set.stats.low_identity,
            config.min_identity,
            read_set.stats.no_clip
        );
        debug!("Indexed {} read names", trie.count());

        Ok(read_set)
    }

    /// Open `path` according to its extension and group its segments.
    pub fn from_path(path: &str, config: &Config) -> Result<Self, ReadsErr> {
        info!("Parsing '{}'", path);
        let format = AlignmentFormat::from_path(path)
            .ok_or_else(|| ReadsErr::UnsupportedFormat(path.to_string()))?;

        let mut input = SamInput::open(path, format, config)?;
        let result = Self::from_stream(input.reader(), config);
        input.finish()?;
        result
    }

    fn add_segment(
        &mut self,
        trie: &mut Trie<ReadId>,
        qname: String,
        mut segment: Segment,
    ) -> Result<(), ReadsErr> {
        let read_id = match trie.find(&qname) {
            Some(&read_id) => read_id,
            None => {
                let read_id = ReadId(self.reads.len() as u32);
                trie.insert(&qname, read_id)?;
                self.reads.try_reserve(1)?;
                self.reads.push(Read::new(qname));
                read_id
            }
        };

        segment.read = Some(read_id);
        let segment_id = self.segments.push(segment)?;
        self.reads[read_id.0 as usize].add_segment(segment_id)?;
        Ok(())
    }

    pub fn get(&self, id: ReadId) -> Option<&Read> {
        self.reads.get(id.0 as usize)
    }

    /// Reads, most recently created first
    pub fn iter(&self) -> impl Iterator<Item = (ReadId, &Read)> {
        self.reads
            .iter()
            .enumerate()
            .rev()
            .map(|(index, read)| (ReadId(index as u32), read))
    }

    pub fn len(&self) -> usize {
        self.reads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reads.is_empty()
    }

    /// Segments of `read`, in insertion order
    pub fn segments_of<'a>(&'a self, read: &'a Read) -> impl Iterator<Item = &'a Segment> + 'a {
        read.segments().iter().map(move |&id| &self.segments[id])
    }
}
