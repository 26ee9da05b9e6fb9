use std::collections::BTreeSet;
use std::fmt::Display;

use chrono::Weekday;
use serde::{Deserialize, Serialize, Serializer};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// coarse operating-calendar class of a vehicle journey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayType {
    Weekday,
    Saturday,
    Sunday,
    Holiday,
    AllWeek,
    Weekend,
}

impl DayType {
    /// classifies the free-text days-of-week of a vehicle journey, first match wins:
    /// holidays, then a mix of weekend and weekdays, Saturday plus Sunday only,
    /// Sunday only, Saturday only, and finally weekdays. absent text means every day.
    pub fn from_days_of_week(days_of_week: Option<&str>) -> DayType {
        let text = days_of_week.unwrap_or_default();
        if text.contains("BankHoliday") || text.contains("HolidaysOnly") {
            return DayType::Holiday;
        }
        let days = operating_weekdays(days_of_week);
        let has_saturday = days.contains(&Weekday::Sat.num_days_from_monday());
        let has_sunday = days.contains(&Weekday::Sun.num_days_from_monday());
        let has_weekday = days.iter().any(|d| *d < Weekday::Sat.num_days_from_monday());
        match (has_weekday, has_saturday, has_sunday) {
            (true, true, _) | (true, _, true) => DayType::AllWeek,
            (false, true, true) => DayType::Weekend,
            (false, false, true) => DayType::Sunday,
            (false, true, false) => DayType::Saturday,
            _ => DayType::Weekday,
        }
    }
}

impl Display for DayType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DayType::Weekday => "Weekday",
            DayType::Saturday => "Saturday",
            DayType::Sunday => "Sunday",
            DayType::Holiday => "Holiday",
            DayType::AllWeek => "AllWeek",
            DayType::Weekend => "Weekend",
        };
        write!(f, "{name}")
    }
}

/// Monday-first flags for the days a journey operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatingDays([bool; 7]);

impl OperatingDays {
    pub fn new(day_type: DayType, days_of_week: Option<&str>) -> OperatingDays {
        if matches!(day_type, DayType::AllWeek | DayType::Holiday) {
            return OperatingDays([true; 7]);
        }
        let days = operating_weekdays(days_of_week);
        let mut flags = [false; 7];
        for (idx, flag) in flags.iter_mut().enumerate() {
            *flag = days.contains(&(idx as u32));
        }
        OperatingDays(flags)
    }

    pub fn operates_on(&self, day: Weekday) -> bool {
        self.0[day.num_days_from_monday() as usize]
    }
}

impl Display for OperatingDays {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flags = self
            .0
            .iter()
            .map(|d| if *d { "1" } else { "0" })
            .collect::<Vec<_>>()
            .join("|");
        write!(f, "{flags}")
    }
}

impl Serialize for OperatingDays {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// expands days-of-week text into weekday numbers (Monday = 0). composite tokens
/// of the source format such as `MondayToFriday` or `Weekend` are expanded; tokens
/// that name no weekday (e.g. `BankHoliday`) are ignored.
fn operating_weekdays(days_of_week: Option<&str>) -> BTreeSet<u32> {
    let text = match days_of_week.map(str::trim) {
        None | Some("") => return WEEK.iter().map(|d| d.num_days_from_monday()).collect(),
        Some(text) => text,
    };
    let mut days = BTreeSet::new();
    for token in text
        .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
        .filter(|t| !t.is_empty())
    {
        let expanded: &[Weekday] = match token {
            "MondayToFriday" => &WEEK[..5],
            "MondayToSaturday" => &WEEK[..6],
            "MondayToSunday" | "Everyday" => &WEEK[..],
            "Weekend" => &WEEK[5..],
            other => match other.parse::<Weekday>() {
                Ok(day) => {
                    days.insert(day.num_days_from_monday());
                    continue;
                }
                Err(_) => &[],
            },
        };
        days.extend(expanded.iter().map(|d| d.num_days_from_monday()));
    }
    days
}

#[cfg(test)]
mod tests {
    use super::{DayType, OperatingDays};
    use chrono::Weekday;

    #[test]
    fn test_day_type_classification() {
        assert_eq!(
            DayType::from_days_of_week(Some("Monday, Tuesday, Wednesday, Thursday, Friday")),
            DayType::Weekday
        );
        assert_eq!(
            DayType::from_days_of_week(Some("MondayToFriday")),
            DayType::Weekday
        );
        assert_eq!(DayType::from_days_of_week(Some("Saturday")), DayType::Saturday);
        assert_eq!(DayType::from_days_of_week(Some("Sunday")), DayType::Sunday);
        assert_eq!(
            DayType::from_days_of_week(Some("Saturday, Sunday")),
            DayType::Weekend
        );
        assert_eq!(
            DayType::from_days_of_week(Some("MondayToSaturday")),
            DayType::AllWeek
        );
        assert_eq!(
            DayType::from_days_of_week(Some("Sunday, BankHoliday")),
            DayType::Holiday
        );
        assert_eq!(DayType::from_days_of_week(None), DayType::AllWeek);
    }

    #[test]
    fn test_operating_days() {
        let days = OperatingDays::new(DayType::Weekday, Some("MondayToFriday"));
        assert_eq!(days.to_string(), "1|1|1|1|1|0|0");
        assert!(days.operates_on(Weekday::Wed));
        assert!(!days.operates_on(Weekday::Sun));

        let holiday = OperatingDays::new(DayType::Holiday, Some("BankHoliday"));
        assert_eq!(holiday.to_string(), "1|1|1|1|1|1|1");
    }
}
