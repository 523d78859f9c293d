use crate::config::Config;
use crate::read::{Read, ReadSet};
use crate::segment::{SegmentId, SegmentStore, FLAG_REVERSE};
use log::{debug, info};
use std::collections::VecDeque;

/// Candidate junction between two segments of one read.
///
/// Only segment handles are held; the segments stay owned by their
/// [`SegmentStore`], and one segment may appear in two breakpoints.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Breakpoint {
    pub segments: [Option<SegmentId>; 2],
    /// Junction coordinate on each segment
    pub breakpoints: [i32; 2],
    /// Distance between the segments on the read, negative when they overlap
    pub gap: i64,
}

impl Breakpoint {
    /// Pair two segments, computing the junction coordinates and the gap.
    pub fn with_segments(first: SegmentId, second: SegmentId, store: &SegmentStore) -> Self {
        let mut breakpoint = Breakpoint {
            segments: [Some(first), Some(second)],
            ..Default::default()
        };
        breakpoint.set_breakpoints(store);

        let first = &store[first];
        breakpoint.gap = first.clip_or_unset() - store[second].clip_or_unset() + first.seq_len as i64;
        breakpoint
    }

    pub fn first(&self) -> Option<SegmentId> {
        self.segments[0]
    }

    pub fn second(&self) -> Option<SegmentId> {
        self.segments[1]
    }

    /// Recompute the junction coordinates from the current segments.
    ///
    /// Reverse-strand segments contribute their leftmost position, forward
    /// ones their alignment end. Returns false when a segment is missing.
    pub fn set_breakpoints(&mut self, store: &SegmentStore) -> bool {
        let (Some(first), Some(second)) = (self.segments[0], self.segments[1]) else {
            return false;
        };
        let (Some(first), Some(second)) = (store.get(first), store.get(second)) else {
            return false;
        };
        self.breakpoints = [first.breakpoint_position(), second.breakpoint_position()];
        true
    }

    /// Swap the two segments and set the reverse flag on both.
    ///
    /// Returns false, changing nothing, when either segment is missing.
    pub fn switch_segments(&mut self, store: &mut SegmentStore) -> bool {
        let (Some(first), Some(second)) = (self.segments[0], self.segments[1]) else {
            return false;
        };
        if store.get(first).is_none() || store.get(second).is_none() {
            return false;
        }

        self.segments = [Some(second), Some(first)];
        store[first].flag |= FLAG_REVERSE;
        store[second].flag |= FLAG_REVERSE;
        true
    }
}

/// Pair adjacent segments of `read`, ordered by first clip, pushing one
/// breakpoint per pair to the front of `output`.
///
/// Reads with a single segment, or with `max_split` or more, yield nothing.
/// Returns the number of breakpoints added.
pub fn breakpoints_from_read(
    read: &Read,
    store: &SegmentStore,
    config: &Config,
    output: &mut VecDeque<Breakpoint>,
) -> usize {
    let segment_count = read.len();
    if segment_count <= 1 || segment_count >= config.max_split as usize {
        return 0;
    }

    // The read keeps its insertion order; sort a copy
    let mut ordered = read.segments().to_vec();
    ordered.sort_by_key(|&id| store[id].first_clip());

    for pair in ordered.windows(2) {
        output.push_front(Breakpoint::with_segments(pair[0], pair[1], store));
    }

    debug!(
        "Read {} produced {} breakpoints",
        read.qname,
        ordered.len() - 1
    );
    ordered.len() - 1
}

/// Collect the breakpoints of every read in `reads`.
pub fn breakpoints_from_reads(reads: &ReadSet, config: &Config) -> VecDeque<Breakpoint> {
    let mut breakpoints = VecDeque::new();
    let mut split_reads = 0;
    for (_, read) in reads.iter() {
        if breakpoints_from_read(read, &reads.segments, config, &mut breakpoints) > 0 {
            split_reads += 1;
        }
    }
    info!(
        "Found {} breakpoints in {} split reads.",
        breakpoints.len(),
        split_reads
    );
    breakpoints
}
