use std::collections::{BTreeSet, HashMap, HashSet};

use itertools::Itertools;
use schedrat_core::error::BatchWarning;
use schedrat_core::model::{
    DayType, LoadPeriod, Point, RuntimePeriod, SchedulePeriod, ServiceTime, StopPlaceRecord,
    TripSubsection,
};

/// resolves stop ids to place codes. a stop without a place falls back to its
/// own id and raises a `MissingPlace` warning the first time it is looked up.
pub struct PlaceLookup {
    places: HashMap<String, String>,
    reported: HashSet<String>,
    warnings: Vec<BatchWarning>,
}

impl PlaceLookup {
    pub fn new(stop_places: &[StopPlaceRecord]) -> PlaceLookup {
        let mut places = HashMap::new();
        for record in stop_places.iter() {
            places
                .entry(record.stop_id.clone())
                .or_insert_with(|| record.place.clone());
        }
        PlaceLookup {
            places,
            reported: HashSet::new(),
            warnings: vec![],
        }
    }

    pub fn place(&mut self, stop_id: &str) -> String {
        match self.places.get(stop_id) {
            Some(place) => place.clone(),
            None => {
                if self.reported.insert(stop_id.to_string()) {
                    self.warnings
                        .push(BatchWarning::MissingPlace(stop_id.to_string()).logged());
                }
                stop_id.to_string()
            }
        }
    }

    pub fn into_warnings(self) -> Vec<BatchWarning> {
        self.warnings
    }
}

type GroupKey<'a> = (&'a str, &'a str, DayType);

/// broadcasts every schedule period to each variant that visits the period's
/// `(lineName, subsectionBaseId, dayType)` group.
///
/// rows are ordered by day type, variant code, base subsection and period start.
pub fn runtime_periods(
    periods: &[SchedulePeriod],
    trip_subsections: &[TripSubsection],
    places: &mut PlaceLookup,
) -> Vec<RuntimePeriod> {
    let mut group_variants: HashMap<GroupKey<'_>, BTreeSet<&str>> = HashMap::new();
    for trip in trip_subsections.iter() {
        group_variants
            .entry((
                trip.line_name.as_str(),
                trip.subsection_base_id.as_str(),
                trip.day_type,
            ))
            .or_default()
            .insert(trip.variant_code.as_str());
    }

    let mut rows = vec![];
    for period in periods.iter() {
        let key = (
            period.line_name.as_str(),
            period.subsection_base_id.as_str(),
            period.day_type,
        );
        let Some(variants) = group_variants.get(&key) else {
            continue;
        };
        let from_place = places.place(&period.from_stop_id);
        let to_place = places.place(&period.to_stop_id);
        for variant_code in variants.iter() {
            rows.push(RuntimePeriod {
                day_type: period.day_type,
                line_name: period.line_name.clone(),
                variant_code: variant_code.to_string(),
                subsection_base_id: period.subsection_base_id.clone(),
                data_source_id: period.data_source_id.clone(),
                vehicle_journey_code: period.vehicle_journey_code.clone(),
                from_stop_id: period.from_stop_id.clone(),
                to_stop_id: period.to_stop_id.clone(),
                from_place: from_place.clone(),
                to_place: to_place.clone(),
                run_time_minutes: period.run_time_seconds / 60,
                period_start: period.period_start,
                period_end: period.period_end,
            });
        }
    }

    rows.sort_by(|a, b| {
        (
            a.day_type,
            &a.variant_code,
            &a.subsection_base_id,
            a.period_start,
            &a.data_source_id,
            &a.vehicle_journey_code,
        )
            .cmp(&(
                b.day_type,
                &b.variant_code,
                &b.subsection_base_id,
                b.period_start,
                &b.data_source_id,
                &b.vehicle_journey_code,
            ))
    });
    rows
}

/// one stop-place visit within a runtime period
struct LoadVisit<'a> {
    period: &'a RuntimePeriod,
    stop_id: &'a str,
    place: &'a str,
}

/// derives the load table from the runtime periods: the from-place and to-place
/// of every row, each reported once per trip and period, joined with the wait
/// time the trip spends at that stop.
///
/// rows are ordered by day type, variant, vehicle journey, place and period, and
/// only the first row per (day type, variant, place, period start) is kept.
pub fn load_periods(runtime: &[RuntimePeriod], trip_points: &[Point]) -> Vec<LoadPeriod> {
    let mut waits: HashMap<(&str, &str, &str), u32> = HashMap::new();
    for point in trip_points.iter() {
        let Some(vj) = point.vehicle_journey_code.as_deref() else {
            continue;
        };
        waits
            .entry((point.data_source_id.as_str(), vj, point.stop_id.as_str()))
            .or_insert(point.wait_time_seconds);
    }

    let from_visits = runtime.iter().map(|r| LoadVisit {
        period: r,
        stop_id: &r.from_stop_id,
        place: &r.from_place,
    });
    let to_visits = runtime.iter().map(|r| LoadVisit {
        period: r,
        stop_id: &r.to_stop_id,
        place: &r.to_place,
    });
    let visits = from_visits
        .chain(to_visits)
        .unique_by(|v| {
            (
                v.period.data_source_id.as_str(),
                v.period.vehicle_journey_code.as_str(),
                v.place,
                v.period.period_start,
                v.period.period_end,
            )
        })
        .sorted_by(|a, b| load_order(a).cmp(&load_order(b)))
        .collect_vec();

    visits
        .into_iter()
        .unique_by(|v| {
            (
                v.period.day_type,
                v.period.variant_code.as_str(),
                v.place,
                v.period.period_start,
            )
        })
        .map(|v| {
            let wait = waits
                .get(&(
                    v.period.data_source_id.as_str(),
                    v.period.vehicle_journey_code.as_str(),
                    v.stop_id,
                ))
                .copied()
                .unwrap_or_default();
            LoadPeriod {
                day_type: v.period.day_type,
                place: v.place.to_string(),
                period_start: v.period.period_start,
                period_end: v.period.period_end,
                wait_time_minutes: wait / 60,
                line_name: v.period.line_name.clone(),
                variant_code: v.period.variant_code.clone(),
            }
        })
        .collect_vec()
}

fn load_order<'a>(
    v: &LoadVisit<'a>,
) -> (DayType, &'a str, &'a str, &'a str, ServiceTime, ServiceTime) {
    (
        v.period.day_type,
        v.period.variant_code.as_str(),
        v.period.vehicle_journey_code.as_str(),
        v.place,
        v.period.period_start,
        v.period.period_end,
    )
}

#[cfg(test)]
mod test {
    use super::{load_periods, runtime_periods, PlaceLookup};
    use crate::period::period_ops::{schedule_periods, test::trip_subsection};
    use schedrat_core::config::PeriodConfig;
    use schedrat_core::error::BatchWarning;
    use schedrat_core::model::{Point, StopPlaceRecord};

    fn places() -> PlaceLookup {
        PlaceLookup::new(&[StopPlaceRecord {
            stop_id: String::from("A"),
            place: String::from("ALPH"),
        }])
    }

    fn trip_point(vj: &str, stop: &str, wait: u32) -> Point {
        Point {
            data_source_id: String::from("ds"),
            line_id: String::from("L1"),
            line_name: String::from("10"),
            journey_pattern_id: String::from("JP1"),
            vehicle_journey_code: Some(vj.to_string()),
            variant_code: String::from("10-1"),
            subsection_id: String::from("ds_JP1_1"),
            subsection_base_id: String::from("ds_JP1_1"),
            section_position: 1,
            link_position_in_pattern: 1,
            stop_id: stop.to_string(),
            is_timing_point: true,
            distance: Some(0.0),
            run_time_seconds: 0,
            wait_time_seconds: wait,
            is_first_in_subsection: true,
            is_last_in_subsection: false,
            is_first_in_route: true,
            is_last_in_route: false,
            cumulative_distance: None,
        }
    }

    #[test]
    fn test_missing_place_falls_back_once() {
        let mut lookup = places();
        assert_eq!(lookup.place("A"), "ALPH");
        assert_eq!(lookup.place("B"), "B");
        assert_eq!(lookup.place("B"), "B");
        assert_eq!(
            lookup.into_warnings(),
            vec![BatchWarning::MissingPlace(String::from("B"))]
        );
    }

    #[test]
    fn test_periods_broadcast_to_sharing_variants() {
        let trips = vec![
            trip_subsection("VJ1", "10-1", "ds_JP1_2", "07:03:00"),
            trip_subsection("VJ2", "10-2", "ds_JP1_2", "07:40:00"),
        ];
        let periods = schedule_periods(&trips, &PeriodConfig::default());
        let mut lookup = places();
        let rows = runtime_periods(&periods, &trips, &mut lookup);
        let summary = rows
            .iter()
            .map(|r| {
                (
                    r.variant_code.as_str(),
                    r.vehicle_journey_code.as_str(),
                    r.period_start.format_hm(),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("10-1", "VJ1", "0:00".to_string()),
                ("10-1", "VJ2", "7:30".to_string()),
                ("10-2", "VJ1", "0:00".to_string()),
                ("10-2", "VJ2", "7:30".to_string()),
            ]
        );
        assert!(rows.iter().all(|r| r.run_time_minutes == 2));
        assert!(rows.iter().all(|r| r.from_place == "ALPH" && r.to_place == "B"));
    }

    #[test]
    fn test_load_rows_join_wait_and_dedupe() {
        let trips = vec![
            trip_subsection("VJ1", "10-1", "ds_JP1_1", "07:03:00"),
            trip_subsection("VJ2", "10-1", "ds_JP1_1", "07:40:00"),
        ];
        let periods = schedule_periods(&trips, &PeriodConfig::default());
        let mut lookup = places();
        let runtime = runtime_periods(&periods, &trips, &mut lookup);
        let points = vec![
            trip_point("VJ1", "A", 130),
            trip_point("VJ1", "A", 999),
            trip_point("VJ2", "B", 61),
        ];
        let load = load_periods(&runtime, &points);
        let summary = load
            .iter()
            .map(|l| (l.place.as_str(), l.period_start.format_hm(), l.wait_time_minutes))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("ALPH", "0:00".to_string(), 2),
                ("B", "0:00".to_string(), 0),
                ("ALPH", "7:30".to_string(), 0),
                ("B", "7:30".to_string(), 1),
            ]
        );
    }
}
