use std::collections::HashMap;

use itertools::Itertools;
use schedrat_core::error::RationalizeError;
use schedrat_core::model::{RouteLink, SequencedLink, SubsectionMapping, VariantMapping};

/// annotates every sequenced link with its base subsection and the identity and
/// code of its base variant. subsections are matched on line, data source,
/// journey pattern and position rather than on the joined subsection id, which
/// can collide when identifiers contain underscores.
///
/// # Errors
///
/// `UnknownSubsection` when a link belongs to a subsection that is missing from
/// the mapping table, `Internal` when its journey pattern has no variant row.
pub fn merge_links(
    links: &[SequencedLink],
    subsection_mapping: &[SubsectionMapping],
    variant_mapping: &[VariantMapping],
) -> Result<Vec<RouteLink>, RationalizeError> {
    let subsection_bases: HashMap<(&str, &str, &str, u32), &str> = subsection_mapping
        .iter()
        .map(|m| {
            (
                (
                    m.line_name.as_str(),
                    m.data_source_id.as_str(),
                    m.journey_pattern_id.as_str(),
                    m.subsection_position,
                ),
                m.subsection_base_id.as_str(),
            )
        })
        .collect();
    let variants: HashMap<(&str, &str), &VariantMapping> = variant_mapping
        .iter()
        .map(|m| ((m.data_source_id.as_str(), m.journey_pattern_id.as_str()), m))
        .collect();

    links
        .iter()
        .map(|sequenced| {
            let link = &sequenced.link;
            let base_id = subsection_bases
                .get(&(
                    link.line_name.as_str(),
                    link.data_source_id.as_str(),
                    link.journey_pattern_id.as_str(),
                    sequenced.subsection_position,
                ))
                .ok_or_else(|| RationalizeError::UnknownSubsection {
                    line_name: link.line_name.clone(),
                    journey_pattern_id: link.journey_pattern_id.clone(),
                    subsection_id: sequenced.subsection_id.clone(),
                })?;
            let variant = variants
                .get(&(link.data_source_id.as_str(), link.journey_pattern_id.as_str()))
                .ok_or_else(|| {
                    RationalizeError::Internal(format!(
                        "journey pattern {}/{} was not assigned a variant",
                        link.data_source_id, link.journey_pattern_id
                    ))
                })?;
            Ok(RouteLink::new(sequenced, base_id, variant))
        })
        .collect::<Result<Vec<_>, _>>()
}

/// links of the journey patterns that are their own base variant. these are
/// the links that describe each variant code.
pub fn variant_links(route_links: &[RouteLink]) -> Vec<RouteLink> {
    route_links
        .iter()
        .filter(|l| {
            l.data_source_id == l.base_data_source_id
                && l.journey_pattern_id == l.base_journey_pattern_id
        })
        .cloned()
        .collect_vec()
}
