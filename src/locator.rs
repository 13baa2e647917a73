// Flat-offset to segment reconciliation
// The rendered text of one block is fragmented into several segments by
// inline formatting; matches are found against the concatenation and must
// be routed back to the segment that owns the offset.

/// Derive the cumulative-length table from per-segment lengths.
/// Entry `i` is the total flattened length through segment `i` inclusive.
pub fn cumulative_lengths(segment_lens: &[usize]) -> Vec<usize> {
    let mut total = 0;
    segment_lens
        .iter()
        .map(|len| {
            total += len;
            total
        })
        .collect()
}

/// Find the segment owning `offset` in the flattened text.
///
/// Segment `i` owns the half-open range `[cumulative_lens[i-1] or 0,
/// cumulative_lens[i])`. Offsets at or past the total length clamp to the
/// last segment, so end-of-document offsets need no special casing by the
/// caller. An empty table returns 0. O(log n).
pub fn find_node_index(offset: usize, cumulative_lens: &[usize]) -> usize {
    if cumulative_lens.is_empty() {
        return 0;
    }

    let mut low = 0;
    let mut high = cumulative_lens.len() - 1;

    while low <= high {
        let mid = (low + high) / 2;
        let prev_len = if mid > 0 { cumulative_lens[mid - 1] } else { 0 };
        let curr_len = cumulative_lens[mid];

        if offset >= prev_len && offset < curr_len {
            return mid;
        } else if offset < prev_len {
            // mid > 0 here, since prev_len is 0 otherwise
            high = mid - 1;
        } else {
            low = mid + 1;
        }
    }

    cumulative_lens.len() - 1
}
