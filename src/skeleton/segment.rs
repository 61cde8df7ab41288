//! `Segment` and `Progress` — the Segment Registry's data (§3.A).

use crate::types::Hash;
use rlp::{DecoderError, Rlp, RlpStream};

/// A contiguous run of stashed headers with block numbers in
/// `[tail, head]`; `next` is the parent hash of the header at `tail`.
///
/// Invariant (P2): `headerStore.get(tail).parentHash == next`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub head: u64,
    pub tail: u64,
    pub next: Hash,
}

impl Segment {
    pub fn new(head: u64, tail: u64, next: Hash) -> Self {
        debug_assert!(tail <= head, "segment tail must not exceed head");
        Self { head, tail, next }
    }

    /// A single-block segment `(n, n, parent_hash)`.
    pub fn singleton(n: u64, parent_hash: Hash) -> Self {
        Self::new(n, n, parent_hash)
    }

    pub fn len(&self) -> u64 {
        self.head - self.tail + 1
    }

    pub fn contains(&self, number: u64) -> bool {
        number >= self.tail && number <= self.head
    }
}

impl rlp::Encodable for Segment {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.append(&self.head);
        s.append(&self.tail);
        s.append(&self.next);
    }
}

impl rlp::Decodable for Segment {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        Ok(Segment {
            head: rlp.val_at(0)?,
            tail: rlp.val_at(1)?,
            next: rlp.val_at(2)?,
        })
    }
}

/// Ordered list of segments (lowest number first) plus the two booleans
/// persisted alongside them (§3.A, §6).
///
/// Invariant (P1): segments are strictly ordered and disjoint — for
/// `i < j`, `segments[i].head < segments[j].tail`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub segments: Vec<Segment>,
    pub linked: bool,
    pub canonical_head_reset: bool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lowest-numbered segment (the "active" segment the skeleton
    /// algorithm operates on), if one exists.
    pub fn active(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn active_mut(&mut self) -> Option<&mut Segment> {
        self.segments.first_mut()
    }

    /// P1: segments are strictly ordered and pairwise disjoint.
    pub fn check_disjoint(&self) -> bool {
        self.segments
            .windows(2)
            .all(|w| w[0].head < w[1].tail)
    }

    /// `bodyRange()`: the full span currently tracked, from 0 (genesis,
    /// always implicitly canonical) to the highest stashed head.
    pub fn body_range(&self) -> (u64, u64) {
        let max = self.segments.last().map(|s| s.head).unwrap_or(0);
        (0, max)
    }
}

impl rlp::Encodable for Progress {
    fn rlp_append(&self, s: &mut RlpStream) {
        s.begin_list(3);
        s.begin_list(self.segments.len());
        for seg in &self.segments {
            s.append(seg);
        }
        s.append(&self.linked);
        s.append(&self.canonical_head_reset);
    }
}

impl rlp::Decodable for Progress {
    fn decode(rlp: &Rlp) -> Result<Self, DecoderError> {
        if rlp.item_count()? != 3 {
            return Err(DecoderError::RlpIncorrectListLen);
        }
        let segments: Vec<Segment> = rlp.list_at(0)?;
        let linked: bool = rlp.val_at(1)?;
        let canonical_head_reset: bool = rlp.val_at(2)?;
        Ok(Progress {
            segments,
            linked,
            canonical_head_reset,
        })
    }
}
