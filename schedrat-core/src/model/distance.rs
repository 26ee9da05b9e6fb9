use serde::{Deserialize, Serialize};
use uom::si::f64::Length;
use uom::si::length::{foot, meter};

/// outcome of reading a raw distance cell from an input table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DistanceCell {
    /// a numeric distance in meters
    Known(f64),
    /// empty cell or the literal `None`
    Absent,
    /// some text that is not a number
    Unparsable,
}

impl DistanceCell {
    pub fn parse(raw: Option<&str>) -> DistanceCell {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return DistanceCell::Absent;
        };
        if value == "None" {
            return DistanceCell::Absent;
        }
        match value.parse::<f64>() {
            Ok(d) if d.is_finite() => DistanceCell::Known(d),
            _ => DistanceCell::Unparsable,
        }
    }

    /// unknown distances (absent or unparsable) become `None`, never zero.
    pub fn meters(&self) -> Option<f64> {
        match self {
            DistanceCell::Known(d) => Some(*d),
            DistanceCell::Absent | DistanceCell::Unparsable => None,
        }
    }
}

/// sums a sequence of optional distances. a single unknown makes the sum unknown.
pub fn sum_distances<I>(distances: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    distances
        .into_iter()
        .try_fold(0.0, |acc, d| d.map(|d| acc + d))
}

/// unit used when writing distance columns to output tables. the engine itself
/// always works in meters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceUnit {
    #[default]
    Meters,
    Feet,
}

impl DistanceUnit {
    pub fn from_meters(&self, meters: f64) -> f64 {
        let length = Length::new::<meter>(meters);
        match self {
            DistanceUnit::Meters => length.get::<meter>(),
            DistanceUnit::Feet => length.get::<foot>(),
        }
    }
}

/// a table row carrying distance columns in meters that can be re-expressed in
/// the configured output unit just before it is written.
pub trait DistanceColumns {
    fn in_unit(self, unit: DistanceUnit) -> Self;
}

#[cfg(test)]
mod tests {
    use super::{sum_distances, DistanceCell, DistanceUnit};

    #[test]
    fn test_parse_cells() {
        assert_eq!(DistanceCell::parse(Some("120.5")), DistanceCell::Known(120.5));
        assert_eq!(DistanceCell::parse(Some("None")), DistanceCell::Absent);
        assert_eq!(DistanceCell::parse(Some("  ")), DistanceCell::Absent);
        assert_eq!(DistanceCell::parse(None), DistanceCell::Absent);
        assert_eq!(DistanceCell::parse(Some("12m")), DistanceCell::Unparsable);
        assert_eq!(DistanceCell::parse(Some("12m")).meters(), None);
    }

    #[test]
    fn test_unknown_propagates_through_sum() {
        assert_eq!(sum_distances(vec![Some(1.0), Some(2.5)]), Some(3.5));
        assert_eq!(sum_distances(vec![Some(1.0), None, Some(2.5)]), None);
        assert_eq!(sum_distances(Vec::<Option<f64>>::new()), Some(0.0));
    }

    #[test]
    fn test_feet_conversion() {
        let feet = DistanceUnit::Feet.from_meters(1000.0);
        assert!((feet - 3280.84).abs() < 0.01);
        assert_eq!(DistanceUnit::Meters.from_meters(12.0), 12.0);
    }
}
