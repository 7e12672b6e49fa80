// ============================================================
// Layer 4 — Prefetching Window Drain
// ============================================================
// Overlaps batch construction with training.
//
//   producer thread                    consumer (caller's thread)
//   ───────────────                    ──────────────────────────
//   iter.next()  ──► bounded channel ──►  consume(batch)
//   iter.next()  ──►   (depth slots)  ──►  consume(batch)
//   ...window ends, channel closes     loop ends
//
// The producer is the only thread touching the iterator, so at
// most one next_batch() call is ever in flight. The consumer (the
// model) never leaves the calling thread and does not need to be
// Send. If the consumer fails, the channel is dropped, the
// producer's next send fails and it stops.
//
// Reference: Rust Book §16 (Message Passing with mpsc)
//            std::thread::scope documentation

use std::sync::mpsc;
use std::thread;

use anyhow::{anyhow, Result};

use crate::data::batch_iterator::BatchIterator;
use crate::domain::batch::EncodedBatch;

/// Drain the active macro-batch window of `iter`, building up to
/// `depth` batches ahead of `consume`. Returns the number of
/// batches consumed.
pub fn drain_window_prefetched<F>(
    iter:    &mut BatchIterator,
    depth:   usize,
    mut consume: F,
) -> Result<usize>
where
    F: FnMut(EncodedBatch) -> Result<()>,
{
    let (tx, rx) = mpsc::sync_channel::<EncodedBatch>(depth.max(1));

    thread::scope(|scope| {
        let producer = scope.spawn(move || {
            for batch in iter.by_ref() {
                if tx.send(batch).is_err() {
                    break;
                }
            }
        });

        let mut consumed = 0usize;
        let mut outcome = Ok(());
        for batch in rx.iter() {
            if let Err(e) = consume(batch) {
                outcome = Err(e);
                break;
            }
            consumed += 1;
        }
        drop(rx);

        producer
            .join()
            .map_err(|_| anyhow!("batch producer thread panicked"))?;
        outcome.map(|_| consumed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::batch_iterator::BatchConfig;
    use crate::domain::corpus::Example;

    fn iterator(n: usize, per_macro: usize) -> BatchIterator {
        let examples = (0..n).map(|i| Example::new(vec![3 + i as u32 % 3], vec![4])).collect();
        let config = BatchConfig {
            batch_size:             2,
            batches_per_macrobatch: per_macro,
            dict_size:              8,
            row_size:               3,
        };
        BatchIterator::new(examples, config).unwrap()
    }

    #[test]
    fn test_drains_exactly_one_window_in_order() {
        let mut it = iterator(10, 2);
        let mut seen = Vec::new();
        let n = drain_window_prefetched(&mut it, 1, |batch| {
            seen.push(batch.input[0]);
            Ok(())
        })
        .unwrap();
        assert_eq!(n, 2);
        // first example of batch 0 is id 3, of batch 1 is id 5 (i = 2)
        assert_eq!(seen, vec![3.0, 5.0]);
        assert_eq!(it.current_batch(), 2);
        assert!(!it.has_next());
    }

    #[test]
    fn test_matches_sequential_iteration() {
        let mut sequential = iterator(9, 5);
        let expected: Vec<_> = sequential.by_ref().collect();

        let mut prefetched = iterator(9, 5);
        let mut got = Vec::new();
        drain_window_prefetched(&mut prefetched, 3, |b| {
            got.push(b);
            Ok(())
        })
        .unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_consumer_error_stops_the_drain() {
        let mut it = iterator(20, 10);
        let mut calls = 0;
        let err = drain_window_prefetched(&mut it, 2, |_| {
            calls += 1;
            if calls == 3 {
                anyhow::bail!("model diverged");
            }
            Ok(())
        })
        .unwrap_err();
        assert!(err.to_string().contains("model diverged"));
        assert_eq!(calls, 3);
    }
}
