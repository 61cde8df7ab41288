//! The Interval Tally (§4.3): two `IntervalSet`s over block numbers —
//! `mask` (still needs fetching) and `pulled` (already downloaded) —
//! kept disjoint in steady state (P9).

use crate::interval::IntervalSet;

#[derive(Clone, Debug, Default)]
pub struct IntervalTally {
    mask: IntervalSet,
    pulled: IntervalSet,
}

impl IntervalTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask(&self) -> &IntervalSet {
        &self.mask
    }

    pub fn pulled(&self) -> &IntervalSet {
        &self.pulled
    }

    /// Records that `head` has been downloaded: folds it into `pulled`,
    /// opens a `mask` gap for anything skipped since the previous max,
    /// and clears `head` itself out of `mask`.
    pub fn head_tally(&mut self, head: u64) {
        let max_pulled = self.pulled.max();
        self.pulled.merge(head, head);

        if let Some(mp) = max_pulled {
            if head > mp {
                let gap_start = mp + 1;
                let gap_end = head.saturating_sub(1);
                if gap_start <= gap_end {
                    self.mask.merge(gap_start, gap_end);
                }
            }
        }

        self.mask.reduce(head, head);
    }

    /// Chops `[least, last]` into `GetBlocks(n, maxResults)` jobs of at
    /// most `max_get_blocks` headers each, scanning in decreasing order,
    /// and removes each chunk from `mask` as its job is emitted.
    ///
    /// Returns `(n, max_results)` pairs: `n` is the highest block number
    /// in the chunk, `max_results` the chunk's size (the peer is asked to
    /// walk backwards from `n`).
    pub fn fill_blocks_gaps(&mut self, least: u64, last: u64, max_get_blocks: u64) -> Vec<(u64, u64)> {
        if least > last || max_get_blocks == 0 {
            return Vec::new();
        }

        let mut jobs = Vec::new();
        let mut cursor = last;
        loop {
            let remaining = cursor - least + 1;
            let span = max_get_blocks.min(remaining);
            let chunk_start = cursor + 1 - span;
            jobs.push((cursor, span));
            self.mask.reduce(chunk_start, cursor);

            if chunk_start <= least {
                break;
            }
            cursor = chunk_start - 1;
        }
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_tally_opens_a_gap_behind_a_jump() {
        let mut tally = IntervalTally::new();
        tally.head_tally(10);
        assert_eq!(tally.pulled().ranges().collect::<Vec<_>>(), vec![(10, 10)]);
        assert!(tally.mask().is_empty());

        tally.head_tally(15);
        assert_eq!(
            tally.pulled().ranges().collect::<Vec<_>>(),
            vec![(10, 10), (15, 15)]
        );
        assert_eq!(tally.mask().ranges().collect::<Vec<_>>(), vec![(11, 14)]);
    }

    #[test]
    fn head_tally_is_noop_gap_for_consecutive_heads() {
        let mut tally = IntervalTally::new();
        tally.head_tally(5);
        tally.head_tally(6);
        assert!(tally.mask().is_empty());
        assert_eq!(tally.pulled().ranges().collect::<Vec<_>>(), vec![(5, 6)]);
    }

    #[test]
    fn fill_blocks_gaps_chops_into_bounded_chunks() {
        let mut tally = IntervalTally::new();
        // simulate a gap having been opened directly
        tally.mask.merge(1, 10);

        let jobs = tally.fill_blocks_gaps(1, 10, 4);
        assert_eq!(jobs, vec![(10, 4), (6, 4), (2, 2)]);
        assert!(tally.mask().is_empty());
    }

    #[test]
    fn fill_blocks_gaps_on_empty_range_yields_nothing() {
        let mut tally = IntervalTally::new();
        assert!(tally.fill_blocks_gaps(5, 1, 10).is_empty());
    }
}
