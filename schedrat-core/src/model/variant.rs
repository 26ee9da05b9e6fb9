use serde::{Deserialize, Serialize};

/// identity of a variant (one journey pattern of a line). ordered for enumeration.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VariantKey {
    pub line_name: String,
    pub data_source_id: String,
    pub journey_pattern_id: String,
}

/// a journey pattern reduced to the base subsection ids it visits, in position order.
#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub key: VariantKey,
    pub subsections: Vec<String>,
}

/// `{lineName}-{rank}`
pub fn variant_code(line_name: &str, rank: usize) -> String {
    format!("{line_name}-{rank}")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantMapping {
    pub line_name: String,
    pub data_source_id: String,
    pub journey_pattern_id: String,
    pub base_data_source_id: String,
    pub base_journey_pattern_id: String,
    /// number of subsections in the base variant
    pub base_sequence_length: usize,
    pub variant_rank: usize,
    pub variant_code: String,
}

impl VariantMapping {
    pub fn is_base(&self) -> bool {
        self.data_source_id == self.base_data_source_id
            && self.journey_pattern_id == self.base_journey_pattern_id
    }
}
