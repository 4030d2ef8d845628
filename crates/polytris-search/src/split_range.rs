use std::ops::Range;

/// Splits `range` into `min(parts, range.len())` contiguous spans.
///
/// Span lengths differ by at most one, longer spans first. The spans cover the
/// range exactly, in order, without overlapping.
///
/// # Example
///
/// ```
/// use polytris_search::split_range;
///
/// assert_eq!(
///     split_range(0..30, 8),
///     [0..4, 4..8, 8..12, 12..16, 16..20, 20..24, 24..27, 27..30]
/// );
/// assert_eq!(split_range(0..2, 4), [0..1, 1..2]);
/// assert!(split_range(5..5, 4).is_empty());
/// ```
#[must_use]
pub fn split_range(range: Range<usize>, parts: usize) -> Vec<Range<usize>> {
    let len = range.len();
    let parts = usize::min(parts, len);
    if parts == 0 {
        return vec![];
    }

    let base = len / parts;
    let longer = len % parts;
    let mut start = range.start;
    (0..parts)
        .map(|i| {
            let span_len = base + usize::from(i < longer);
            let span = start..start + span_len;
            start = span.end;
            span
        })
        .collect()
}
