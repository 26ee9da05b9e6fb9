use itertools::Itertools;
use schedrat_core::config::MatchStrategy;
use schedrat_core::error::BatchWarning;
use schedrat_core::model::{Subsection, SubsectionMapping};

use super::mapping_resolver::{MappingResolver, Resolution};
use super::strategy::CandidatePairs;

/// collapses subsections with identical stop sequences on the same line.
///
/// subsections are compared in enumeration order; for an equal pair `(i, j)`
/// with `i < j` the later one maps onto the earlier one. each subsection is
/// resolved to the fixed point of its mapping chain.
///
/// # Result
///
/// one mapping row per input subsection in enumeration order, plus a
/// `CycleInMapping` warning for every chain that closed on itself.
pub fn canonicalize_subsections(
    subsections: &[Subsection],
    strategy: &MatchStrategy,
) -> (Vec<SubsectionMapping>, Vec<BatchWarning>) {
    let ordered = subsections
        .iter()
        .sorted_by(|a, b| a.key.cmp(&b.key))
        .collect_vec();
    let mut resolver = MappingResolver::new(ordered.len());

    let mut offset = 0;
    for (_, line) in &ordered.iter().chunk_by(|s| s.key.line_name.clone()) {
        let line = line.collect_vec();
        let sequences = line.iter().map(|s| s.stops.as_slice()).collect_vec();
        for (i, j) in strategy.candidate_pairs(&sequences) {
            if sequences[i] == sequences[j] && !resolver.is_mapped(offset + j) {
                resolver.map(offset + j, offset + i);
            }
        }
        offset += line.len();
    }

    let mut warnings = vec![];
    let mapping = ordered
        .iter()
        .enumerate()
        .map(|(idx, subsection)| {
            let resolution = resolver.resolve(idx);
            if let Resolution::Cycle { revisited, .. } = resolution {
                warnings.push(
                    BatchWarning::CycleInMapping {
                        start: subsection.key.subsection_id.clone(),
                        revisited: ordered[revisited].key.subsection_id.clone(),
                    }
                    .logged(),
                );
            }
            SubsectionMapping::new(&subsection.key, &ordered[resolution.node()].key)
        })
        .collect_vec();

    (mapping, warnings)
}

/// the minimal set: subsections that resolve to themselves.
pub fn minimal_subsections(mapping: &[SubsectionMapping]) -> Vec<&SubsectionMapping> {
    mapping.iter().filter(|m| m.is_base()).collect_vec()
}

#[cfg(test)]
mod test {
    use super::{canonicalize_subsections, minimal_subsections};
    use schedrat_core::config::MatchStrategy;
    use schedrat_core::model::{Subsection, SubsectionKey};

    fn subsection(line: &str, jp: &str, position: u32, stops: &[&str]) -> Subsection {
        Subsection {
            key: SubsectionKey::new(line, "ds", jp, position),
            stops: stops.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn fixture() -> Vec<Subsection> {
        vec![
            subsection("10", "JP2", 1, &["C", "D"]),
            subsection("10", "JP1", 1, &["A", "B", "C"]),
            subsection("10", "JP1", 2, &["C", "D"]),
            subsection("10", "JP3", 1, &["C", "D"]),
            subsection("20", "JP9", 1, &["C", "D"]),
        ]
    }

    #[test]
    fn test_equal_sequences_map_to_first_seen() {
        for strategy in [MatchStrategy::AllPairs, MatchStrategy::Hashed] {
            let (mapping, warnings) = canonicalize_subsections(&fixture(), &strategy);
            assert!(warnings.is_empty());
            let pairs = mapping
                .iter()
                .map(|m| (m.subsection_id.as_str(), m.subsection_base_id.as_str()))
                .collect::<Vec<_>>();
            assert_eq!(
                pairs,
                vec![
                    ("ds_JP1_1", "ds_JP1_1"),
                    ("ds_JP1_2", "ds_JP1_2"),
                    ("ds_JP2_1", "ds_JP1_2"),
                    ("ds_JP3_1", "ds_JP1_2"),
                    ("ds_JP9_1", "ds_JP9_1"),
                ]
            );
        }
    }

    #[test]
    fn test_every_subsection_mapped_once() {
        let (mapping, _) = canonicalize_subsections(&fixture(), &MatchStrategy::AllPairs);
        assert_eq!(mapping.len(), 5);
        assert_eq!(minimal_subsections(&mapping).len(), 3);
    }

    #[test]
    fn test_canonicalization_is_idempotent() {
        let input = fixture();
        let (mapping, _) = canonicalize_subsections(&input, &MatchStrategy::AllPairs);
        let minimal = input
            .into_iter()
            .filter(|s| {
                mapping
                    .iter()
                    .any(|m| m.subsection_id == s.key.subsection_id && m.is_base())
            })
            .collect::<Vec<_>>();
        let (again, _) = canonicalize_subsections(&minimal, &MatchStrategy::AllPairs);
        assert!(again.iter().all(|m| m.is_base()));
        assert_eq!(again.len(), minimal.len());
    }

    #[test]
    fn test_degenerate_sequences_compare_by_equality() {
        let input = vec![
            subsection("10", "JP1", 1, &["A"]),
            subsection("10", "JP2", 1, &["A"]),
            subsection("10", "JP3", 1, &[]),
        ];
        let (mapping, _) = canonicalize_subsections(&input, &MatchStrategy::AllPairs);
        assert_eq!(mapping[1].subsection_base_id, "ds_JP1_1");
        assert!(mapping[2].is_base());
    }
}
