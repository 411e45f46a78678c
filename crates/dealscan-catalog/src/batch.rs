//! Partitioning of identifiers into provider-sized requests.

use std::num::NonZeroUsize;

/// A contiguous slice of the input, tagged with its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a, T> {
    /// 1-based batch number.
    pub number: usize,
    /// 1-based position of the first item within the whole input.
    pub first: usize,
    pub items: &'a [T],
}

impl<T> Batch<'_, T> {
    /// 1-based position of the last item within the whole input.
    #[must_use]
    pub fn last(&self) -> usize {
        self.first + self.items.len() - 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Splits `items` into contiguous batches of at most `max` items, preserving
/// order. Empty input yields no batches.
#[must_use]
pub fn partition<T>(items: &[T], max: NonZeroUsize) -> Vec<Batch<'_, T>> {
    items
        .chunks(max.get())
        .enumerate()
        .map(|(idx, chunk)| Batch {
            number: idx + 1,
            first: idx * max.get() + 1,
            items: chunk,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn empty_input_gives_no_batches() {
        let items: Vec<u32> = Vec::new();
        assert!(partition(&items, nz(10)).is_empty());
    }

    #[test]
    fn batches_cover_input_in_order_within_bound() {
        for n in 0..=25usize {
            for m in 1..=7usize {
                let items: Vec<usize> = (0..n).collect();
                let batches = partition(&items, nz(m));

                assert!(batches.iter().all(|b| b.len() <= m && !b.is_empty()));
                assert_eq!(batches.iter().map(Batch::len).sum::<usize>(), n);

                let rebuilt: Vec<usize> = batches
                    .iter()
                    .flat_map(|b| b.items.iter().copied())
                    .collect();
                assert_eq!(rebuilt, items);
            }
        }
    }

    #[test]
    fn batches_report_one_based_ranges() {
        let items: Vec<u32> = (0..23).collect();
        let batches = partition(&items, nz(10));
        let ranges: Vec<(usize, usize, usize)> = batches
            .iter()
            .map(|b| (b.number, b.first, b.last()))
            .collect();
        assert_eq!(ranges, [(1, 1, 10), (2, 11, 20), (3, 21, 23)]);
    }
}
