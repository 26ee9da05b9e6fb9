mod mapping_resolver;
mod merge_ops;
mod sequence_table;
mod strategy;
mod subsection_ops;
mod variant_ops;

pub use mapping_resolver::{MappingResolver, Resolution};
pub use merge_ops::{merge_links, variant_links};
pub use sequence_table::SequenceTable;
pub use strategy::{contains_contiguous, CandidatePairs};
pub use subsection_ops::{canonicalize_subsections, minimal_subsections};
pub use variant_ops::{canonicalize_variants, retained_variants, variant_sequences};

use indexmap::IndexMap;
use itertools::Itertools;
use rayon::prelude::*;
use schedrat_core::config::RationalizeConfig;
use schedrat_core::error::{batch_processing_error, BatchWarning, RationalizeError};
use schedrat_core::model::{RouteLink, SubsectionMapping, TimingLink, VariantMapping};
use serde::Serialize;

/// canonical subsections and variants of a batch, and every pattern link
/// annotated with them.
#[derive(Debug, Default)]
pub struct Rationalization {
    pub subsection_mapping: Vec<SubsectionMapping>,
    pub variant_mapping: Vec<VariantMapping>,
    pub route_links: Vec<RouteLink>,
    pub warnings: Vec<BatchWarning>,
}

/// per-line counts reported by the summary operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSummary {
    pub line_name: String,
    pub subsections: usize,
    pub minimal_subsections: usize,
    pub variants: usize,
    pub retained_variants: usize,
}

impl Rationalization {
    pub fn line_summaries(&self) -> Vec<LineSummary> {
        let subsections = self
            .subsection_mapping
            .iter()
            .into_group_map_by(|m| m.line_name.as_str());
        let variants = self
            .variant_mapping
            .iter()
            .into_group_map_by(|m| m.line_name.as_str());
        subsections
            .into_iter()
            .sorted_by_key(|(line_name, _)| *line_name)
            .map(|(line_name, rows)| {
                let line_variants = variants.get(line_name).cloned().unwrap_or_default();
                LineSummary {
                    line_name: line_name.to_string(),
                    subsections: rows.len(),
                    minimal_subsections: rows.iter().filter(|m| m.is_base()).count(),
                    variants: line_variants.len(),
                    retained_variants: line_variants.iter().filter(|m| m.is_base()).count(),
                }
            })
            .collect_vec()
    }
}

/// runs subsection and variant canonicalization over all lines of a batch.
/// lines share nothing, so each is processed on its own rayon task.
///
/// # Errors
///
/// `NoLines` when there are no links at all, otherwise any error raised while
/// merging the canonical identities back onto the links.
pub fn rationalize(
    links: Vec<TimingLink>,
    config: &RationalizeConfig,
) -> Result<Rationalization, RationalizeError> {
    if links.is_empty() {
        return Err(RationalizeError::NoLines);
    }
    let mut lines: IndexMap<String, Vec<TimingLink>> = IndexMap::new();
    for link in links {
        lines.entry(link.line_name.clone()).or_default().push(link);
    }
    lines.sort_keys();
    log::debug!("rationalizing {} lines", lines.len());

    let (results, errors): (Vec<Rationalization>, Vec<RationalizeError>) = lines
        .into_iter()
        .collect_vec()
        .into_par_iter()
        .map(|(line_name, line_links)| rationalize_line(&line_name, line_links, config))
        .collect::<Vec<_>>()
        .into_iter()
        .partition_result();

    if !errors.is_empty() {
        return Err(batch_processing_error(&errors));
    }

    let result = results
        .into_iter()
        .fold(Rationalization::default(), |mut acc, line| {
            acc.subsection_mapping.extend(line.subsection_mapping);
            acc.variant_mapping.extend(line.variant_mapping);
            acc.route_links.extend(line.route_links);
            acc.warnings.extend(line.warnings);
            acc
        });
    log::info!(
        "rationalized {} subsections into {}, {} variants into {}",
        result.subsection_mapping.len(),
        minimal_subsections(&result.subsection_mapping).len(),
        result.variant_mapping.len(),
        retained_variants(&result.variant_mapping).len(),
    );
    Ok(result)
}

fn rationalize_line(
    line_name: &str,
    links: Vec<TimingLink>,
    config: &RationalizeConfig,
) -> Result<Rationalization, RationalizeError> {
    let table = SequenceTable::build(links);
    let (subsection_mapping, mut warnings) =
        canonicalize_subsections(&table.subsections, &config.match_strategy);
    let variants = variant_sequences(&subsection_mapping);
    let (variant_mapping, variant_warnings) = canonicalize_variants(&variants);
    warnings.extend(variant_warnings);
    let route_links = merge_links(&table.links, &subsection_mapping, &variant_mapping)?;
    log::debug!(
        "line {line_name}: {} subsections, {} variants",
        subsection_mapping.len(),
        variant_mapping.len()
    );
    Ok(Rationalization {
        subsection_mapping,
        variant_mapping,
        route_links,
        warnings,
    })
}

#[cfg(test)]
mod test {
    use super::rationalize;
    use crate::rationalize::sequence_table::test::link;
    use schedrat_core::config::RationalizeConfig;
    use schedrat_core::error::RationalizeError;

    #[test]
    fn test_no_links_is_fatal() {
        let result = rationalize(vec![], &RationalizeConfig::default());
        assert!(matches!(result, Err(RationalizeError::NoLines)));
    }

    #[test]
    fn test_lines_are_rationalized_independently() {
        let mut other_line = link("JP9", 1, 1, "A", "B", true);
        other_line.line_name = String::from("20");
        let links = vec![
            other_line,
            link("JP1", 1, 1, "A", "B", true),
            link("JP1", 1, 2, "B", "C", true),
            link("JP2", 1, 1, "B", "C", true),
        ];
        let result =
            rationalize(links, &RationalizeConfig::default()).expect("should rationalize");
        let summaries = result.line_summaries();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].line_name, "10");
        assert_eq!(summaries[0].subsections, 3);
        assert_eq!(summaries[0].minimal_subsections, 2);
        assert_eq!(summaries[0].variants, 2);
        assert_eq!(summaries[0].retained_variants, 1);
        assert_eq!(summaries[1].line_name, "20");
        assert_eq!(summaries[1].retained_variants, 1);
        let codes = result
            .variant_mapping
            .iter()
            .map(|m| m.variant_code.as_str())
            .collect::<Vec<_>>();
        assert_eq!(codes, vec!["10-1", "10-1", "20-1"]);
        assert_eq!(result.route_links.len(), 4);
    }
}
