use std::fmt::Display;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

const SECONDS_PER_MINUTE: u32 = 60;
const SECONDS_PER_HOUR: u32 = 3600;

/// a time of day within an operating day, stored as whole seconds since the
/// start of the day. values at or beyond 24:00 describe service running past
/// midnight and are never wrapped modulo 24 hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ServiceTime(u32);

impl ServiceTime {
    pub const START_OF_DAY: ServiceTime = ServiceTime(0);

    pub fn from_seconds(seconds: u32) -> ServiceTime {
        ServiceTime(seconds)
    }

    pub fn from_minutes(minutes: u32) -> ServiceTime {
        ServiceTime(minutes.saturating_mul(SECONDS_PER_MINUTE))
    }

    pub fn from_hours(hours: u32) -> ServiceTime {
        ServiceTime(hours.saturating_mul(SECONDS_PER_HOUR))
    }

    pub fn seconds(&self) -> u32 {
        self.0
    }

    /// minutes since the start of the day, truncating any seconds.
    pub fn whole_minutes(&self) -> u32 {
        self.0 / SECONDS_PER_MINUTE
    }

    /// parses `HH:MM:SS` or `HH:MM`. the hour field may exceed 23.
    pub fn parse(value: &str) -> Result<ServiceTime, String> {
        let fields = value.trim().split(':').collect::<Vec<_>>();
        let (h, m, s) = match fields.as_slice() {
            [h, m] => (*h, *m, "0"),
            [h, m, s] => (*h, *m, *s),
            _ => return Err(format!("time '{value}' is not in HH:MM:SS or HH:MM form")),
        };
        let parse_field = |field: &str, name: &str| -> Result<u32, String> {
            field
                .parse::<u32>()
                .map_err(|e| format!("invalid {name} field in time '{value}': {e}"))
        };
        let hours = parse_field(h, "hour")?;
        let minutes = parse_field(m, "minute")?;
        let seconds = parse_field(s, "second")?;
        if minutes >= 60 || seconds >= 60 {
            return Err(format!("time '{value}' has minutes or seconds out of range"));
        }
        hours
            .checked_mul(SECONDS_PER_HOUR)
            .and_then(|h| h.checked_add(minutes * SECONDS_PER_MINUTE + seconds))
            .map(ServiceTime)
            .ok_or_else(|| format!("time '{value}' is too late to represent"))
    }

    /// rounds down to a whole multiple of `minutes` using integer-minute floor division.
    pub fn floor_to_minutes(&self, minutes: u32) -> ServiceTime {
        if minutes == 0 {
            return ServiceTime::from_minutes(self.whole_minutes());
        }
        ServiceTime::from_minutes((self.whole_minutes() / minutes) * minutes)
    }

    pub fn add_seconds(&self, seconds: u32) -> ServiceTime {
        ServiceTime(self.0.saturating_add(seconds))
    }

    pub fn add_minutes(&self, minutes: u32) -> ServiceTime {
        self.add_seconds(minutes.saturating_mul(SECONDS_PER_MINUTE))
    }

    pub fn saturating_sub_minutes(&self, minutes: u32) -> ServiceTime {
        ServiceTime(
            self.0
                .saturating_sub(minutes.saturating_mul(SECONDS_PER_MINUTE)),
        )
    }

    /// `H:MM` with unbounded hours, e.g. `25:10`.
    pub fn format_hm(&self) -> String {
        let total_minutes = self.whole_minutes();
        format!("{}:{:02}", total_minutes / 60, total_minutes % 60)
    }
}

impl Display for ServiceTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format_hm())
    }
}

impl Serialize for ServiceTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_hm())
    }
}

impl<'de> Deserialize<'de> for ServiceTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let time_str: String = String::deserialize(deserializer)?;
        ServiceTime::parse(&time_str)
            .map_err(|e| D::Error::custom(format!("Invalid service time format: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::ServiceTime;

    #[test]
    fn test_parse_past_midnight() {
        let t = ServiceTime::parse("25:10:30").expect("should parse");
        assert_eq!(t.seconds(), 25 * 3600 + 10 * 60 + 30);
        assert_eq!(t.format_hm(), "25:10");
    }

    #[test]
    fn test_parse_hour_minute_only() {
        let t = ServiceTime::parse("07:03").expect("should parse");
        assert_eq!(t, ServiceTime::from_minutes(7 * 60 + 3));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(ServiceTime::parse("7").is_err());
        assert!(ServiceTime::parse("07:75:00").is_err());
        assert!(ServiceTime::parse("ab:00:00").is_err());
    }

    #[test]
    fn test_parse_rejects_hours_beyond_range() {
        assert!(ServiceTime::parse("2000000:00:00").is_err());
        assert!(ServiceTime::parse("1193046:28:16").is_err());
        let latest = ServiceTime::parse("1193046:28:15").expect("should parse");
        assert_eq!(latest.seconds(), u32::MAX);
    }

    #[test]
    fn test_floor_to_quarter_hour() {
        let t = ServiceTime::parse("07:44:59").expect("should parse");
        assert_eq!(t.floor_to_minutes(15).format_hm(), "7:30");
        let exact = ServiceTime::parse("07:45:00").expect("should parse");
        assert_eq!(exact.floor_to_minutes(15).format_hm(), "7:45");
    }

    #[test]
    fn test_format_start_and_end_of_day() {
        assert_eq!(ServiceTime::START_OF_DAY.format_hm(), "0:00");
        assert_eq!(ServiceTime::from_hours(36).format_hm(), "36:00");
    }
}
