//! Stream ordering.

use crate::resolver::types::StreamDescriptor;
use std::cmp::Ordering;

/// Sorts streams best-first: language tier, then quality, then format,
/// then size, all descending. The sort is stable, so streams that tie
/// on every key keep their discovery order.
pub fn sort_streams(streams: &mut [StreamDescriptor]) {
    streams.sort_by(compare);
}

fn compare(a: &StreamDescriptor, b: &StreamDescriptor) -> Ordering {
    b.language
        .tier()
        .rank()
        .cmp(&a.language.tier().rank())
        .then_with(|| b.quality.rank().cmp(&a.quality.rank()))
        .then_with(|| b.format.rank().cmp(&a.format.rank()))
        .then_with(|| b.size_bytes.unwrap_or(0).cmp(&a.size_bytes.unwrap_or(0)))
}
