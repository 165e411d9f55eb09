//! Sort-pool stage: gathers a window of examples, sorts it by sequence
//! length, and re-emits the examples one at a time.

use std::collections::VecDeque;

use super::SortLength;
use crate::error::Result;

/// Buffers up to `pool_size` records, sorts each pool ascending by
/// [`SortLength::sort_length`] (stable for ties), then drains it before
/// pulling the next pool. The final pool may be short. No ordering holds
/// across pool boundaries.
#[derive(Debug)]
pub struct SortPool<I, T> {
    inner: I,
    pool_size: usize,
    buffered: VecDeque<T>,
    done: bool,
}

impl<I, T> SortPool<I, T> {
    /// Creates a sort pool of the given window size.
    pub fn new(inner: I, pool_size: usize) -> Self {
        Self {
            inner,
            pool_size,
            buffered: VecDeque::new(),
            done: false,
        }
    }
}

impl<I, T> Iterator for SortPool<I, T>
where
    T: SortLength,
    I: Iterator<Item = Result<T>>,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.buffered.pop_front() {
            return Some(Ok(item));
        }
        if self.done {
            return None;
        }

        let mut pool = Vec::with_capacity(self.pool_size);
        while pool.len() < self.pool_size {
            match self.inner.next() {
                Some(Ok(item)) => pool.push(item),
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e));
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        if pool.is_empty() {
            return None;
        }

        pool.sort_by_key(SortLength::sort_length);
        self.buffered = pool.into();
        self.buffered.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrepError;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Seq(Vec<u32>, u32);

    impl SortLength for Seq {
        fn sort_length(&self) -> usize {
            self.0.len()
        }
    }

    fn seqs(lengths: &[usize]) -> Vec<Result<Seq>> {
        lengths
            .iter()
            .enumerate()
            .map(|(tag, &len)| Ok(Seq(vec![0; len], tag as u32)))
            .collect()
    }

    #[test]
    fn pool_is_sorted_ascending() {
        let input = seqs(&[5, 1, 3, 2, 4]);
        let lengths: Vec<usize> = SortPool::new(input.into_iter(), 5)
            .map(|r| r.unwrap().sort_length())
            .collect();
        assert_eq!(lengths, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sorting_is_stable_for_ties() {
        let input = vec![
            Ok(Seq(vec![0, 0], 0)),
            Ok(Seq(vec![0], 1)),
            Ok(Seq(vec![0, 0], 2)),
        ];
        let tags: Vec<u32> = SortPool::new(input.into_iter(), 3)
            .map(|r| r.unwrap().1)
            .collect();
        assert_eq!(tags, vec![1, 0, 2]);
    }

    #[test]
    fn no_ordering_across_pools() {
        let input = seqs(&[3, 4, 1, 2]);
        let lengths: Vec<usize> = SortPool::new(input.into_iter(), 2)
            .map(|r| r.unwrap().sort_length())
            .collect();
        // Each window of two is sorted independently.
        assert_eq!(lengths, vec![3, 4, 1, 2]);
    }

    #[test]
    fn short_final_pool_is_emitted() {
        let input = seqs(&[2, 1, 3]);
        let lengths: Vec<usize> = SortPool::new(input.into_iter(), 2)
            .map(|r| r.unwrap().sort_length())
            .collect();
        assert_eq!(lengths, vec![1, 2, 3]);
    }

    #[test]
    fn empty_input_yields_nothing() {
        let mut pool = SortPool::new(Vec::<Result<Seq>>::new().into_iter(), 4);
        assert!(pool.next().is_none());
        assert!(pool.next().is_none());
    }

    #[test]
    fn error_ends_the_stream() {
        let input = vec![
            Ok(Seq(vec![0], 0)),
            Err(PrepError::InvalidConfig("boom".into())),
            Ok(Seq(vec![0, 0], 1)),
        ];
        let mut pool = SortPool::new(input.into_iter(), 10);
        assert!(pool.next().unwrap().is_err());
        assert!(pool.next().is_none());
    }
}
