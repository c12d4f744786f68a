use crossbeam_channel::Sender;
use rayon::prelude::*;

use super::context::ParsedRow;
use crate::row::parse_row;

/// Parse each row of one chunk in order, send successes on `result_tx`.
/// Failed rows are dropped here; they only show up later as discarded. Returns rows sent.
fn parse_chunk(offset: usize, chunk: &[String], result_tx: &Sender<ParsedRow>) -> usize {
    let mut sent = 0_usize;
    for (i, row) in chunk.iter().enumerate() {
        let Ok(record) = parse_row(row) else {
            continue;
        };
        if result_tx.send((offset + i, record)).is_err() {
            // Aggregator is gone; nothing left to do.
            break;
        }
        sent += 1;
    }
    sent
}

/// Cut `rows` into contiguous `chunk_size` slices and parse them as tasks on the rayon pool.
///
/// There are ⌈rows/chunk_size⌉ tasks but never more OS threads than the pool holds, so a
/// chunk size of 1 over a large file is slow rather than fatal. Blocks until every chunk is
/// done; `result_tx` (and every clone of it) is dropped on return, closing the channel for
/// the aggregator. Returns the total number of rows sent.
pub fn parse_chunks(rows: &[String], chunk_size: usize, result_tx: Sender<ParsedRow>) -> usize {
    let chunk_size = chunk_size.max(1);
    rows.par_chunks(chunk_size)
        .enumerate()
        .map_with(result_tx, |tx, (n, chunk)| parse_chunk(n * chunk_size, chunk, tx))
        .sum()
}
