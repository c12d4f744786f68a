//! Aggregator: single consumer of the result channel. Deduplicates by IP.

use crossbeam_channel::Receiver;
use log::debug;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::net::IpAddr;

use super::context::ParsedRow;
use crate::{DedupMode, GeoRecord};

/// IP → (row index, record) map plus the duplicate counter. Owned by one thread; no locking.
#[derive(Debug, Default)]
pub struct Aggregator {
    mode: DedupMode,
    seen: HashMap<IpAddr, (usize, GeoRecord)>,
    duplicates: usize,
}

impl Aggregator {
    pub fn new(mode: DedupMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Keep the record if its IP is new. Otherwise count a duplicate; in [`DedupMode::Race`] the
    /// stored record stays, in [`DedupMode::FileOrder`] the one from the earlier row stays.
    pub fn push(&mut self, index: usize, record: GeoRecord) {
        match self.seen.entry(record.ip()) {
            Entry::Vacant(slot) => {
                slot.insert((index, record));
            }
            Entry::Occupied(mut slot) => {
                self.duplicates += 1;
                if self.mode == DedupMode::FileOrder && index < slot.get().0 {
                    slot.insert((index, record));
                }
            }
        }
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Surviving records and the duplicate count. Unordered in `Race` mode, by row index in `FileOrder`.
    pub fn finish(self) -> (Vec<GeoRecord>, usize) {
        let mut kept: Vec<(usize, GeoRecord)> = self.seen.into_values().collect();
        if self.mode == DedupMode::FileOrder {
            kept.sort_unstable_by_key(|(index, _)| *index);
        }
        let records = kept.into_iter().map(|(_, record)| record).collect();
        (records, self.duplicates)
    }
}

/// Drain `result_rx` until every sender is dropped. Returns (records, duplicates).
pub fn run_aggregator(result_rx: Receiver<ParsedRow>, mode: DedupMode) -> (Vec<GeoRecord>, usize) {
    let mut aggregator = Aggregator::new(mode);
    let mut received = 0_usize;
    while let Ok((index, record)) = result_rx.recv() {
        aggregator.push(index, record);
        received += 1;
    }
    debug!(
        "aggregator: channel closed, {} received, {} duplicates",
        received,
        aggregator.duplicates()
    );
    aggregator.finish()
}
