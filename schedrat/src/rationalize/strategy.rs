use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use itertools::Itertools;
use schedrat_core::config::MatchStrategy;

/// enumerates the index pairs `(i, j)` with `i < j` whose stop sequences should
/// be tested for equality. pairs are always returned in ascending `(i, j)` order
/// so that first-match-wins mapping gives the same result for every strategy.
pub trait CandidatePairs {
    fn candidate_pairs(&self, sequences: &[&[String]]) -> Vec<(usize, usize)>;
}

impl CandidatePairs for MatchStrategy {
    fn candidate_pairs(&self, sequences: &[&[String]]) -> Vec<(usize, usize)> {
        match self {
            MatchStrategy::AllPairs => (0..sequences.len()).tuple_combinations().collect_vec(),
            MatchStrategy::Hashed => {
                let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
                for (idx, sequence) in sequences.iter().enumerate() {
                    let mut hasher = DefaultHasher::new();
                    sequence.hash(&mut hasher);
                    buckets.entry(hasher.finish()).or_default().push(idx);
                }
                buckets
                    .into_values()
                    .flat_map(|bucket| bucket.into_iter().tuple_combinations::<(_, _)>())
                    .sorted()
                    .collect_vec()
            }
        }
    }
}

/// true if `needle` occurs in `haystack` as a contiguous run. the empty
/// sequence is contained in everything.
pub fn contains_contiguous(haystack: &[String], needle: &[String]) -> bool {
    if needle.is_empty() {
        return true;
    }
    if needle.len() > haystack.len() {
        return false;
    }
    haystack.windows(needle.len()).any(|w| w == needle)
}

#[cfg(test)]
mod test {
    use super::{contains_contiguous, CandidatePairs};
    use schedrat_core::config::MatchStrategy;

    fn seq(stops: &[&str]) -> Vec<String> {
        stops.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_pairs_in_order() {
        let a = seq(&["A"]);
        let sequences = vec![a.as_slice(); 3];
        let pairs = MatchStrategy::AllPairs.candidate_pairs(&sequences);
        assert_eq!(pairs, vec![(0, 1), (0, 2), (1, 2)]);
    }

    #[test]
    fn test_hashed_only_pairs_equal_sequences() {
        let a = seq(&["A", "B"]);
        let b = seq(&["B", "C"]);
        let sequences = vec![a.as_slice(), b.as_slice(), a.as_slice(), b.as_slice()];
        let pairs = MatchStrategy::Hashed.candidate_pairs(&sequences);
        assert_eq!(pairs, vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn test_contiguous_containment() {
        let hay = seq(&["s1", "s2", "s3"]);
        assert!(contains_contiguous(&hay, &seq(&["s2", "s3"])));
        assert!(!contains_contiguous(&hay, &seq(&["s1", "s3"])));
        assert!(contains_contiguous(&hay, &hay));
        assert!(contains_contiguous(&hay, &[]));
        assert!(!contains_contiguous(&seq(&["s1"]), &hay));
    }
}
