//! Splits the pair space among workers.
//!
//! With `n` trees, tree `i` is tested against the `n - i - 1` trees after it.
//! Consecutive trees are handed to a worker until it covers at least
//! `C(n, 2) / workers` pairs, so early workers get few trees with many pairs
//! and later workers many trees with few pairs.

/// Contiguous run of trees assigned to one worker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Partition {
    /// Index of the first tree.
    pub first: usize,
    /// Number of trees to test against all later trees.
    pub count: usize,
}

/// Partitions `trees` top-level trees across at most `workers` workers.
///
/// Every tree but the last lands in exactly one partition. The last worker
/// absorbs whatever remains.
#[must_use]
pub fn partition(trees: usize, workers: usize) -> Vec<Partition> {
    if trees < 2 || workers == 0 {
        return Vec::new();
    }
    let total = trees * (trees - 1) / 2;
    let per_worker = (total / workers).max(1);
    let last = trees - 1;

    let mut out = Vec::with_capacity(workers);
    let mut index = 0;
    while index < last {
        let first = index;
        if out.len() + 1 == workers {
            out.push(Partition {
                first,
                count: last - first,
            });
            break;
        }

        let mut covered = 0;
        while covered < per_worker && index < last {
            covered += trees - index - 1;
            index += 1;
        }
        out.push(Partition {
            first,
            count: index - first,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs_covered(trees: usize, parts: &[Partition]) -> usize {
        parts
            .iter()
            .flat_map(|p| p.first..p.first + p.count)
            .map(|i| trees - i - 1)
            .sum()
    }

    #[test]
    fn test_no_work_for_fewer_than_two() {
        assert!(partition(0, 4).is_empty());
        assert!(partition(1, 4).is_empty());
        assert!(partition(10, 0).is_empty());
    }

    #[test]
    fn test_front_loaded_split() {
        assert_eq!(
            partition(4, 2),
            vec![Partition { first: 0, count: 1 }, Partition { first: 1, count: 2 }]
        );
    }

    #[test]
    fn test_partitions_are_contiguous_and_complete() {
        for trees in 2..40 {
            for workers in 1..12 {
                let parts = partition(trees, workers);
                assert!(parts.len() <= workers, "{trees} trees, {workers} workers");

                let mut next = 0;
                for p in &parts {
                    assert_eq!(p.first, next);
                    assert!(p.count > 0);
                    next += p.count;
                }
                assert_eq!(next, trees - 1);
                assert_eq!(pairs_covered(trees, &parts), trees * (trees - 1) / 2);
            }
        }
    }
}
