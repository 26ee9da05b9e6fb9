use std::cmp::Reverse;
use std::collections::HashMap;

use itertools::Itertools;
use schedrat_core::error::BatchWarning;
use schedrat_core::model::{variant_code, SubsectionMapping, Variant, VariantKey, VariantMapping};

use super::mapping_resolver::{MappingResolver, Resolution};
use super::strategy::contains_contiguous;

/// reduces every journey pattern in the mapping table to the ordered list of
/// base subsection ids it visits. variants are returned in enumeration order.
pub fn variant_sequences(mapping: &[SubsectionMapping]) -> Vec<Variant> {
    mapping
        .iter()
        .sorted_by(|a, b| {
            (
                &a.line_name,
                &a.data_source_id,
                &a.journey_pattern_id,
                a.subsection_position,
            )
                .cmp(&(
                    &b.line_name,
                    &b.data_source_id,
                    &b.journey_pattern_id,
                    b.subsection_position,
                ))
        })
        .chunk_by(|m| VariantKey {
            line_name: m.line_name.clone(),
            data_source_id: m.data_source_id.clone(),
            journey_pattern_id: m.journey_pattern_id.clone(),
        })
        .into_iter()
        .map(|(key, rows)| Variant {
            key,
            subsections: rows.map(|m| m.subsection_base_id.clone()).collect_vec(),
        })
        .collect_vec()
}

/// collapses variants whose base subsection sequence is a contiguous run of
/// another variant's sequence on the same line, then ranks the remaining bases.
///
/// for a pair `(i, j)` in enumeration order the shorter sequence maps onto the
/// longer one; on equal length `j` maps onto `i`. a variant contained in several
/// others keeps the first container found. bases are ranked per line by
/// descending length of their own sequence, ties kept in enumeration order, and
/// receive the variant code `{lineName}-{rank}`.
///
/// # Result
///
/// one mapping row per input variant in enumeration order, plus any
/// `CycleInMapping` warnings.
pub fn canonicalize_variants(variants: &[Variant]) -> (Vec<VariantMapping>, Vec<BatchWarning>) {
    let ordered = variants
        .iter()
        .sorted_by(|a, b| a.key.cmp(&b.key))
        .collect_vec();
    let mut resolver = MappingResolver::new(ordered.len());

    let mut offset = 0;
    for (_, line) in &ordered.iter().chunk_by(|v| v.key.line_name.clone()) {
        let line = line.collect_vec();
        for (i, j) in (0..line.len()).tuple_combinations() {
            let (a, b) = (&line[i].subsections, &line[j].subsections);
            if a.len() < b.len() {
                if contains_contiguous(b, a) {
                    resolver.map(offset + i, offset + j);
                }
            } else if contains_contiguous(a, b) {
                resolver.map(offset + j, offset + i);
            }
        }
        offset += line.len();
    }

    let mut warnings = vec![];
    let bases = (0..ordered.len())
        .map(|idx| {
            let resolution = resolver.resolve(idx);
            if let Resolution::Cycle { revisited, .. } = resolution {
                warnings.push(
                    BatchWarning::CycleInMapping {
                        start: variant_label(&ordered[idx].key),
                        revisited: variant_label(&ordered[revisited].key),
                    }
                    .logged(),
                );
            }
            resolution.node()
        })
        .collect_vec();

    let ranks = rank_bases(&ordered, &bases);
    let mapping = ordered
        .iter()
        .zip(bases.iter())
        .map(|(variant, base_idx)| {
            let base = ordered[*base_idx];
            let variant_rank = ranks.get(base_idx).copied().unwrap_or_default();
            VariantMapping {
                line_name: variant.key.line_name.clone(),
                data_source_id: variant.key.data_source_id.clone(),
                journey_pattern_id: variant.key.journey_pattern_id.clone(),
                base_data_source_id: base.key.data_source_id.clone(),
                base_journey_pattern_id: base.key.journey_pattern_id.clone(),
                base_sequence_length: base.subsections.len(),
                variant_rank,
                variant_code: variant_code(&variant.key.line_name, variant_rank),
            }
        })
        .collect_vec();

    (mapping, warnings)
}

/// 1-based rank per line of each distinct base index.
fn rank_bases(ordered: &[&Variant], bases: &[usize]) -> HashMap<usize, usize> {
    let mut ranks = HashMap::new();
    let distinct = bases.iter().copied().sorted().dedup().collect_vec();
    for (_, line_bases) in &distinct
        .into_iter()
        .chunk_by(|b| ordered[*b].key.line_name.clone())
    {
        let ranked = line_bases
            .sorted_by_key(|b| Reverse(ordered[*b].subsections.len()))
            .collect_vec();
        for (position, base) in ranked.into_iter().enumerate() {
            ranks.insert(base, position + 1);
        }
    }
    ranks
}

fn variant_label(key: &VariantKey) -> String {
    format!("{}/{}/{}", key.line_name, key.data_source_id, key.journey_pattern_id)
}

/// the retained variants: those that resolve to themselves.
pub fn retained_variants(mapping: &[VariantMapping]) -> Vec<&VariantMapping> {
    mapping.iter().filter(|m| m.is_base()).collect_vec()
}

#[cfg(test)]
mod test {
    use super::{canonicalize_variants, retained_variants, variant_sequences};
    use crate::rationalize::strategy::contains_contiguous;
    use schedrat_core::model::{SubsectionMapping, Variant, VariantKey};

    fn variant(line: &str, jp: &str, subsections: &[&str]) -> Variant {
        Variant {
            key: VariantKey {
                line_name: line.to_string(),
                data_source_id: String::from("ds"),
                journey_pattern_id: jp.to_string(),
            },
            subsections: subsections.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn codes(variants: &[Variant]) -> Vec<(String, String, String)> {
        let (mapping, _) = canonicalize_variants(variants);
        mapping
            .into_iter()
            .map(|m| (m.journey_pattern_id, m.base_journey_pattern_id, m.variant_code))
            .collect()
    }

    fn row(jp: &str, position: u32, base: &str) -> SubsectionMapping {
        SubsectionMapping {
            line_name: String::from("10"),
            data_source_id: String::from("ds"),
            journey_pattern_id: jp.to_string(),
            subsection_id: format!("ds_{jp}_{position}"),
            subsection_position: position,
            subsection_base_id: base.to_string(),
        }
    }

    #[test]
    fn test_variant_sequences_follow_positions() {
        let mapping = vec![
            row("JP2", 1, "ds_JP1_2"),
            row("JP1", 2, "ds_JP1_2"),
            row("JP1", 1, "ds_JP1_1"),
        ];
        let variants = variant_sequences(&mapping);
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].key.journey_pattern_id, "JP1");
        assert_eq!(variants[0].subsections, vec!["ds_JP1_1", "ds_JP1_2"]);
        assert_eq!(variants[1].subsections, vec!["ds_JP1_2"]);
    }

    #[test]
    fn test_contained_variant_maps_to_container() {
        let variants = vec![
            variant("10", "JP1", &["s2", "s3"]),
            variant("10", "JP2", &["s1", "s2", "s3", "s4"]),
            variant("10", "JP3", &["s9"]),
        ];
        let result = codes(&variants);
        assert_eq!(
            result,
            vec![
                ("JP1".into(), "JP2".into(), "10-1".into()),
                ("JP2".into(), "JP2".into(), "10-1".into()),
                ("JP3".into(), "JP3".into(), "10-2".into()),
            ]
        );
    }

    #[test]
    fn test_identical_variants_keep_first() {
        let variants = vec![
            variant("10", "JP1", &["s1", "s2"]),
            variant("10", "JP2", &["s1", "s2"]),
        ];
        let result = codes(&variants);
        assert_eq!(result[1].1, "JP1");
        assert_eq!(result[1].2, "10-1");
    }

    #[test]
    fn test_multiple_containers_first_match_wins() {
        let variants = vec![
            variant("10", "JP1", &["s1", "s2", "s3"]),
            variant("10", "JP2", &["s2"]),
            variant("10", "JP3", &["s0", "s2", "s4"]),
        ];
        let result = codes(&variants);
        assert_eq!(result[1].1, "JP1");
    }

    #[test]
    fn test_rank_ties_keep_enumeration_order() {
        let variants = vec![
            variant("10", "JP1", &["s1"]),
            variant("10", "JP2", &["s2", "s3"]),
            variant("10", "JP3", &["s4", "s5"]),
            variant("20", "JP4", &["s6"]),
        ];
        let result = codes(&variants);
        let expected: Vec<(String, String, String)> = vec![
            ("JP1".into(), "JP1".into(), "10-3".into()),
            ("JP2".into(), "JP2".into(), "10-1".into()),
            ("JP3".into(), "JP3".into(), "10-2".into()),
            ("JP4".into(), "JP4".into(), "20-1".into()),
        ];
        assert_eq!(result, expected);
    }

    #[test]
    fn test_retained_variants_are_containment_closed() {
        let variants = vec![
            variant("10", "JP1", &["s1", "s2"]),
            variant("10", "JP2", &["s2", "s3"]),
            variant("10", "JP3", &["s1", "s2", "s3"]),
            variant("10", "JP4", &["s3"]),
            variant("10", "JP5", &["s5", "s1"]),
        ];
        let (mapping, _) = canonicalize_variants(&variants);
        assert_eq!(mapping.len(), variants.len());
        let retained = retained_variants(&mapping)
            .into_iter()
            .filter_map(|m| {
                variants
                    .iter()
                    .find(|v| v.key.journey_pattern_id == m.journey_pattern_id)
            })
            .collect::<Vec<_>>();
        assert_eq!(retained.len(), 2);
        for a in retained.iter() {
            for b in retained.iter() {
                if a.key != b.key {
                    assert!(!contains_contiguous(&b.subsections, &a.subsections));
                }
            }
        }
        let unique_codes = retained_variants(&mapping)
            .iter()
            .map(|m| m.variant_code.clone())
            .collect::<std::collections::HashSet<_>>();
        assert_eq!(unique_codes.len(), 2);
    }
}
