use serde::{Deserialize, Serialize};

/// identity of a subsection. the derived ordering is the enumeration order used
/// for canonicalization: line name, data source, journey pattern, then position.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubsectionKey {
    pub line_name: String,
    pub data_source_id: String,
    pub journey_pattern_id: String,
    pub subsection_position: u32,
    pub subsection_id: String,
}

impl SubsectionKey {
    pub fn new(
        line_name: &str,
        data_source_id: &str,
        journey_pattern_id: &str,
        subsection_position: u32,
    ) -> SubsectionKey {
        SubsectionKey {
            line_name: line_name.to_string(),
            data_source_id: data_source_id.to_string(),
            journey_pattern_id: journey_pattern_id.to_string(),
            subsection_position,
            subsection_id: subsection_id(data_source_id, journey_pattern_id, subsection_position),
        }
    }
}

/// `{dataSourceId}_{journeyPatternId}_{position}`
pub fn subsection_id(data_source_id: &str, journey_pattern_id: &str, position: u32) -> String {
    format!("{data_source_id}_{journey_pattern_id}_{position}")
}

/// a run of consecutive links between two timing points, reduced to the ordered
/// stops it visits.
#[derive(Debug, Clone, PartialEq)]
pub struct Subsection {
    pub key: SubsectionKey,
    pub stops: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubsectionMapping {
    pub line_name: String,
    pub data_source_id: String,
    pub journey_pattern_id: String,
    pub subsection_id: String,
    pub subsection_position: u32,
    pub subsection_base_id: String,
}

impl SubsectionMapping {
    pub fn new(key: &SubsectionKey, base: &SubsectionKey) -> SubsectionMapping {
        SubsectionMapping {
            line_name: key.line_name.clone(),
            data_source_id: key.data_source_id.clone(),
            journey_pattern_id: key.journey_pattern_id.clone(),
            subsection_id: key.subsection_id.clone(),
            subsection_position: key.subsection_position,
            subsection_base_id: base.subsection_id.clone(),
        }
    }

    pub fn is_base(&self) -> bool {
        self.subsection_id == self.subsection_base_id
    }
}
