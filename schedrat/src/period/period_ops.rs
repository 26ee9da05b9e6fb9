use itertools::Itertools;
use schedrat_core::config::PeriodConfig;
use schedrat_core::model::{SchedulePeriod, ServiceTime, TripSubsection};

/// partitions the operating day for one group of departures, given in
/// ascending order. returns one `(start, end)` pair per departure.
///
/// the first period starts at `0:00`. every later start is the departure rounded
/// down to `rounding_minutes`, but at least `min_separation_minutes` after both
/// the previous departure and the previous start. a period ends one minute
/// before the next one starts; the last ends at `day_end_hours`.
///
/// departures at or past the end of the day are pulled back so that the
/// remaining periods still fit before `day_end_hours`, one separation apart.
/// every period then has `start <= end`.
pub fn generate_periods(
    departures: &[ServiceTime],
    conf: &PeriodConfig,
) -> Vec<(ServiceTime, ServiceTime)> {
    let day_end = ServiceTime::from_hours(conf.day_end_hours);
    let remaining_after = |idx: usize| -> u32 {
        u32::try_from(departures.len() - 1 - idx).unwrap_or(u32::MAX)
    };
    let mut starts: Vec<ServiceTime> = Vec::with_capacity(departures.len());
    for (idx, departure) in departures.iter().enumerate() {
        let start = match (idx.checked_sub(1), starts.last()) {
            (Some(prev_idx), Some(prev_start)) => {
                let rounded = departure.floor_to_minutes(conf.rounding_minutes);
                let after_departure = departures
                    .get(prev_idx)
                    .map(|d| ServiceTime::from_minutes(d.whole_minutes()))
                    .unwrap_or_default()
                    .add_minutes(conf.min_separation_minutes);
                let after_start = prev_start.add_minutes(conf.min_separation_minutes);
                let latest = day_end.saturating_sub_minutes(
                    remaining_after(idx).saturating_mul(conf.min_separation_minutes),
                );
                rounded
                    .max(after_departure)
                    .max(after_start)
                    .min(latest)
                    .max(after_start)
            }
            _ => ServiceTime::START_OF_DAY,
        };
        starts.push(start);
    }

    starts
        .iter()
        .enumerate()
        .map(|(idx, start)| {
            let end = match starts.get(idx + 1) {
                Some(next) => next.saturating_sub_minutes(1),
                None => day_end.max(*start),
            };
            (*start, end)
        })
        .collect_vec()
}

/// assigns a reporting period to every trip subsection, grouping by
/// `(lineName, subsectionBaseId, dayType)`. within a group trips are ordered by
/// departure time, ties by data source and vehicle journey code. an empty input
/// yields no periods.
pub fn schedule_periods(
    trip_subsections: &[TripSubsection],
    conf: &PeriodConfig,
) -> Vec<SchedulePeriod> {
    let sorted = trip_subsections
        .iter()
        .sorted_by(|a, b| {
            (
                &a.line_name,
                &a.subsection_base_id,
                a.day_type,
                a.departure_time,
                &a.data_source_id,
                &a.vehicle_journey_code,
            )
                .cmp(&(
                    &b.line_name,
                    &b.subsection_base_id,
                    b.day_type,
                    b.departure_time,
                    &b.data_source_id,
                    &b.vehicle_journey_code,
                ))
        })
        .collect_vec();

    let mut periods = vec![];
    let groups = sorted
        .iter()
        .chunk_by(|t| (t.line_name.clone(), t.subsection_base_id.clone(), t.day_type));
    for (_, group) in &groups {
        let group = group.copied().collect_vec();
        let departures = group.iter().map(|t| t.departure_time).collect_vec();
        let bounds = generate_periods(&departures, conf);
        for (trip, (period_start, period_end)) in group.into_iter().zip(bounds) {
            periods.push(SchedulePeriod {
                line_name: trip.line_name.clone(),
                subsection_base_id: trip.subsection_base_id.clone(),
                day_type: trip.day_type,
                data_source_id: trip.data_source_id.clone(),
                vehicle_journey_code: trip.vehicle_journey_code.clone(),
                departure_time: trip.departure_time,
                from_stop_id: trip.from_stop_id.clone(),
                to_stop_id: trip.to_stop_id.clone(),
                run_time_seconds: trip.run_time_seconds,
                period_start,
                period_end,
            });
        }
    }
    log::info!(
        "generated {} schedule periods for {} trip subsections",
        periods.len(),
        trip_subsections.len()
    );
    periods
}

#[cfg(test)]
pub(crate) mod test {
    use super::{generate_periods, schedule_periods};
    use schedrat_core::config::PeriodConfig;
    use schedrat_core::model::{DayType, ServiceTime, TripSubsection};

    fn time(value: &str) -> ServiceTime {
        ServiceTime::parse(value).expect("test time should parse")
    }

    fn formatted(departures: &[&str]) -> Vec<(String, String)> {
        let departures = departures.iter().map(|d| time(d)).collect::<Vec<_>>();
        generate_periods(&departures, &PeriodConfig::default())
            .into_iter()
            .map(|(s, e)| (s.format_hm(), e.format_hm()))
            .collect()
    }

    pub(crate) fn trip_subsection(
        vj: &str,
        variant: &str,
        base: &str,
        departure: &str,
    ) -> TripSubsection {
        TripSubsection {
            data_source_id: String::from("ds"),
            line_name: String::from("10"),
            vehicle_journey_code: vj.to_string(),
            journey_pattern_id: String::from("JP1"),
            variant_code: variant.to_string(),
            day_type: DayType::Weekday,
            subsection_id: base.to_string(),
            subsection_position: 1,
            subsection_base_id: base.to_string(),
            departure_time: time(departure),
            run_time_seconds: 150,
            distance: Some(100.0),
            from_stop_id: String::from("A"),
            to_stop_id: String::from("B"),
        }
    }

    #[test]
    fn test_three_departures() {
        let periods = formatted(&["07:03:00", "07:11:00", "07:42:00"]);
        assert_eq!(
            periods,
            vec![
                ("0:00".into(), "7:03".into()),
                ("7:04".into(), "7:29".into()),
                ("7:30".into(), "36:00".into()),
            ]
        );
    }

    #[test]
    fn test_single_departure_covers_day() {
        let periods = formatted(&["12:34:00"]);
        assert_eq!(periods, vec![("0:00".into(), "36:00".into())]);
    }

    #[test]
    fn test_same_quarter_hour_stays_strictly_increasing() {
        let periods = formatted(&["08:00:00", "08:01:00", "08:01:00", "08:02:00"]);
        let starts = periods.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>();
        assert_eq!(starts, vec!["0:00", "8:01", "8:02", "8:03"]);
    }

    #[test]
    fn test_periods_are_contiguous() {
        let departures = ["05:10:00", "06:00:00", "06:20:00", "23:50:00", "25:10:00"]
            .iter()
            .map(|d| time(d))
            .collect::<Vec<_>>();
        let periods = generate_periods(&departures, &PeriodConfig::default());
        assert_eq!(periods[0].0, ServiceTime::START_OF_DAY);
        assert_eq!(periods[periods.len() - 1].1, ServiceTime::from_hours(36));
        for pair in periods.windows(2) {
            assert!(pair[1].0 >= pair[0].0.add_minutes(1));
            assert_eq!(pair[0].1, pair[1].0.saturating_sub_minutes(1));
        }
        assert_eq!(periods[4].0.format_hm(), "25:00");
    }

    #[test]
    fn test_departure_after_day_end_is_pulled_back() {
        let periods = formatted(&["07:00:00", "36:20:00"]);
        assert_eq!(
            periods,
            vec![
                ("0:00".into(), "35:59".into()),
                ("36:00".into(), "36:00".into()),
            ]
        );

        let departures = ["35:50:00", "36:10:00", "37:00:00"]
            .iter()
            .map(|d| time(d))
            .collect::<Vec<_>>();
        let periods = generate_periods(&departures, &PeriodConfig::default());
        let day_end = ServiceTime::from_hours(36);
        assert_eq!(periods[periods.len() - 1].1, day_end);
        assert!(periods.iter().all(|(start, end)| start <= end && *end <= day_end));
        for pair in periods.windows(2) {
            assert!(pair[1].0 > pair[0].0);
        }
        let starts = periods.iter().map(|(s, _)| s.format_hm()).collect::<Vec<_>>();
        assert_eq!(starts, vec!["0:00", "35:59", "36:00"]);
    }

    #[test]
    fn test_empty_group_has_no_periods() {
        assert!(generate_periods(&[], &PeriodConfig::default()).is_empty());
        assert!(schedule_periods(&[], &PeriodConfig::default()).is_empty());
    }

    #[test]
    fn test_groups_by_base_subsection() {
        let trips = vec![
            trip_subsection("VJ2", "10-1", "ds_JP1_1", "07:11:00"),
            trip_subsection("VJ9", "10-2", "ds_JP3_1", "09:00:00"),
            trip_subsection("VJ1", "10-1", "ds_JP1_1", "07:03:00"),
        ];
        let periods = schedule_periods(&trips, &PeriodConfig::default());
        let rows = periods
            .iter()
            .map(|p| {
                (
                    p.vehicle_journey_code.as_str(),
                    p.period_start.format_hm(),
                    p.period_end.format_hm(),
                )
            })
            .collect::<Vec<_>>();
        assert_eq!(
            rows,
            vec![
                ("VJ1", "0:00".into(), "7:03".into()),
                ("VJ2", "7:04".into(), "36:00".into()),
                ("VJ9", "0:00".into(), "36:00".into()),
            ]
        );
    }
}
