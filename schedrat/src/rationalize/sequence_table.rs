use std::collections::HashSet;

use itertools::Itertools;
use schedrat_core::model::{subsection_id, SequencedLink, Subsection, SubsectionKey, TimingLink};

/// the ordered links of every journey pattern of a batch together with the
/// subsections they form.
pub struct SequenceTable {
    /// ordered by (line name, data source, journey pattern, position in pattern)
    pub links: Vec<SequencedLink>,
    /// in enumeration order, see [`SubsectionKey`]
    pub subsections: Vec<Subsection>,
}

impl SequenceTable {
    /// builds the sequence table from validated timing links.
    ///
    /// links repeating a (line name, data source, journey pattern, section, link
    /// position) are dropped, keeping the first. within each pattern the links are ordered
    /// by section and link position and renumbered from 1. the first link opens
    /// subsection 1 and every later link leaving a timing point opens the next one.
    pub fn build(links: Vec<TimingLink>) -> SequenceTable {
        let mut seen = HashSet::new();
        let unique_links = links
            .into_iter()
            .filter(|l| {
                seen.insert((
                    l.line_name.clone(),
                    l.data_source_id.clone(),
                    l.journey_pattern_id.clone(),
                    l.section_position,
                    l.link_position_in_section,
                ))
            })
            .collect_vec();
        log::debug!("sequencing {} unique timing links", seen.len());

        let sorted = unique_links.into_iter().sorted_by(|a, b| {
            (
                &a.line_name,
                &a.data_source_id,
                &a.journey_pattern_id,
                a.section_position,
                a.link_position_in_section,
            )
                .cmp(&(
                    &b.line_name,
                    &b.data_source_id,
                    &b.journey_pattern_id,
                    b.section_position,
                    b.link_position_in_section,
                ))
        });

        let mut sequenced: Vec<SequencedLink> = vec![];
        let mut subsections: Vec<Subsection> = vec![];
        let patterns = sorted.chunk_by(|l| {
            (
                l.line_name.clone(),
                l.data_source_id.clone(),
                l.journey_pattern_id.clone(),
            )
        });
        for ((line_name, data_source_id, journey_pattern_id), pattern_links) in &patterns {
            let mut subsection_position = 0;
            for (idx, link) in pattern_links.enumerate() {
                if idx == 0 || link.from_is_timing_point {
                    subsection_position += 1;
                    let key = SubsectionKey::new(
                        &line_name,
                        &data_source_id,
                        &journey_pattern_id,
                        subsection_position,
                    );
                    subsections.push(Subsection {
                        key,
                        stops: vec![link.from_stop_id.clone()],
                    });
                }
                if let Some(current) = subsections.last_mut() {
                    current.stops.push(link.to_stop_id.clone());
                }
                sequenced.push(SequencedLink {
                    link_position_in_pattern: idx as u32 + 1,
                    subsection_position,
                    subsection_id: subsection_id(
                        &data_source_id,
                        &journey_pattern_id,
                        subsection_position,
                    ),
                    link,
                });
            }
        }

        SequenceTable {
            links: sequenced,
            subsections,
        }
    }
}
