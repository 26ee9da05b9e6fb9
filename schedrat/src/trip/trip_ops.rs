use std::collections::{BTreeMap, BTreeSet, HashMap};

use itertools::Itertools;
use schedrat_core::error::BatchWarning;
use schedrat_core::model::{
    sum_distances, DayType, JourneyPatternRecord, RouteLink, TripHeader, TripSubsection,
    TripSummary, VehicleJourney, VehicleJourneyLinkOverride,
};

/// expands each vehicle journey into the links of its journey pattern, applying
/// any per-journey run or wait time overrides.
///
/// # Result
///
/// trip links grouped by journey in input order and by position within a
/// journey, plus a `MissingJourneyPattern` warning for every journey whose
/// pattern has no links.
pub fn trip_links(
    journeys: &[VehicleJourney],
    route_links: &[RouteLink],
    overrides: &[VehicleJourneyLinkOverride],
) -> (Vec<RouteLink>, Vec<BatchWarning>) {
    let patterns: HashMap<(&str, &str), Vec<&RouteLink>> = route_links
        .iter()
        .sorted_by_key(|l| l.link_position_in_pattern)
        .into_group_map_by(|l| (l.data_source_id.as_str(), l.journey_pattern_id.as_str()));
    let overrides: HashMap<(&str, &str, &str), &VehicleJourneyLinkOverride> = overrides
        .iter()
        .map(|o| {
            (
                (
                    o.data_source_id.as_str(),
                    o.vehicle_journey_code.as_str(),
                    o.timing_link_id.as_str(),
                ),
                o,
            )
        })
        .collect();

    let mut links = vec![];
    let mut warnings = vec![];
    for journey in journeys.iter() {
        let key = (
            journey.data_source_id.as_str(),
            journey.journey_pattern_id.as_str(),
        );
        let Some(pattern) = patterns.get(&key) else {
            warnings.push(
                BatchWarning::MissingJourneyPattern {
                    vehicle_journey_code: journey.vehicle_journey_code.clone(),
                    journey_pattern_id: journey.journey_pattern_id.clone(),
                }
                .logged(),
            );
            continue;
        };
        for link in pattern.iter() {
            let link_override = link.timing_link_id.as_deref().and_then(|id| {
                overrides
                    .get(&(
                        journey.data_source_id.as_str(),
                        journey.vehicle_journey_code.as_str(),
                        id,
                    ))
                    .copied()
            });
            links.push(link.for_vehicle_journey(&journey.vehicle_journey_code, link_override));
        }
    }
    (links, warnings)
}

/// the links of one trip in pattern order, keyed by (data source, journey code)
fn links_by_journey(trip_links: &[RouteLink]) -> HashMap<(&str, &str), Vec<&RouteLink>> {
    trip_links
        .iter()
        .filter_map(|l| {
            l.vehicle_journey_code
                .as_deref()
                .map(|vj| ((l.data_source_id.as_str(), vj), l))
        })
        .into_group_map()
}

/// one row per subsection visited by each trip. the departure time at a
/// subsection is the trip departure plus the run and wait times of all
/// earlier links.
pub fn trip_subsections(
    journeys: &[VehicleJourney],
    trip_links: &[RouteLink],
) -> Vec<TripSubsection> {
    let by_journey = links_by_journey(trip_links);
    let mut rows = vec![];
    for journey in journeys.iter() {
        let key = (
            journey.data_source_id.as_str(),
            journey.vehicle_journey_code.as_str(),
        );
        let Some(links) = by_journey.get(&key) else {
            continue;
        };
        let mut elapsed = 0u32;
        for (_, subsection) in &links.iter().chunk_by(|l| l.subsection_position) {
            let subsection = subsection.copied().collect_vec();
            let (Some(first), Some(last)) = (subsection.first(), subsection.last()) else {
                continue;
            };
            rows.push(TripSubsection {
                data_source_id: journey.data_source_id.clone(),
                line_name: first.line_name.clone(),
                vehicle_journey_code: journey.vehicle_journey_code.clone(),
                journey_pattern_id: journey.journey_pattern_id.clone(),
                variant_code: first.variant_code.clone(),
                day_type: journey.day_type,
                subsection_id: first.subsection_id.clone(),
                subsection_position: first.subsection_position,
                subsection_base_id: first.subsection_base_id.clone(),
                departure_time: journey.departure_time.add_seconds(elapsed),
                run_time_seconds: total_seconds(subsection.iter().map(|l| l.run_time_seconds)),
                distance: sum_distances(subsection.iter().map(|l| l.distance)),
                from_stop_id: first.from_stop_id.clone(),
                to_stop_id: last.to_stop_id.clone(),
            });
            elapsed = elapsed
                .saturating_add(total_seconds(subsection.iter().map(|l| l.elapsed_seconds())));
        }
    }
    rows
}

/// sums durations, holding at `u32::MAX` instead of wrapping.
fn total_seconds(durations: impl Iterator<Item = u32>) -> u32 {
    durations.fold(0, |acc, seconds| acc.saturating_add(seconds))
}

/// one header row per trip that has links.
pub fn trip_headers(
    journeys: &[VehicleJourney],
    trip_links: &[RouteLink],
    journey_patterns: &[JourneyPatternRecord],
) -> Vec<TripHeader> {
    let by_journey = links_by_journey(trip_links);
    let patterns: HashMap<(&str, &str), &JourneyPatternRecord> = journey_patterns
        .iter()
        .map(|p| ((p.data_source_id.as_str(), p.journey_pattern_id.as_str()), p))
        .collect();

    journeys
        .iter()
        .filter_map(|journey| {
            let links = by_journey.get(&(
                journey.data_source_id.as_str(),
                journey.vehicle_journey_code.as_str(),
            ))?;
            let first = links.first()?;
            let last = links.last()?;
            let pattern = patterns.get(&(
                journey.data_source_id.as_str(),
                journey.journey_pattern_id.as_str(),
            ));
            let elapsed = total_seconds(links.iter().map(|l| l.elapsed_seconds()));
            Some(TripHeader {
                data_source_id: journey.data_source_id.clone(),
                line_name: first.line_name.clone(),
                vehicle_journey_code: journey.vehicle_journey_code.clone(),
                journey_pattern_id: journey.journey_pattern_id.clone(),
                variant_code: first.variant_code.clone(),
                direction: pattern.and_then(|p| p.direction.clone()),
                destination_display: pattern.and_then(|p| p.destination_display.clone()),
                day_type: journey.day_type,
                operating_days: journey.operating_days,
                departure_time: journey.departure_time,
                arrival_time: journey.departure_time.add_seconds(elapsed),
                distance: sum_distances(links.iter().map(|l| l.distance)),
                from_stop_id: first.from_stop_id.clone(),
                to_stop_id: last.to_stop_id.clone(),
            })
        })
        .sorted_by(|a, b| {
            (&a.data_source_id, &a.line_name, a.day_type, a.departure_time, &a.vehicle_journey_code)
                .cmp(&(
                    &b.data_source_id,
                    &b.line_name,
                    b.day_type,
                    b.departure_time,
                    &b.vehicle_journey_code,
                ))
        })
        .collect_vec()
}

/// trip counts and distinct variant codes per (data source, line, day type,
/// direction).
pub fn trip_summary(headers: &[TripHeader]) -> Vec<TripSummary> {
    type SummaryKey<'a> = (&'a str, &'a str, DayType, Option<&'a str>);
    let mut groups: BTreeMap<SummaryKey<'_>, (usize, BTreeSet<&str>)> = BTreeMap::new();
    for header in headers.iter() {
        let entry = groups
            .entry((
                header.data_source_id.as_str(),
                header.line_name.as_str(),
                header.day_type,
                header.direction.as_deref(),
            ))
            .or_default();
        entry.0 += 1;
        entry.1.insert(header.variant_code.as_str());
    }
    groups
        .into_iter()
        .map(
            |((data_source_id, line_name, day_type, direction), (trip_count, variants))| {
                TripSummary {
                    data_source_id: data_source_id.to_string(),
                    line_name: line_name.to_string(),
                    day_type,
                    direction: direction.map(String::from),
                    trip_count,
                    variant_codes: variants.into_iter().join("|"),
                }
            },
        )
        .collect_vec()
}

#[cfg(test)]
mod test {
    use super::{trip_headers, trip_links, trip_subsections, trip_summary};
    use schedrat_core::error::BatchWarning;
    use schedrat_core::model::{
        DayType, JourneyPatternRecord, OperatingDays, RouteLink, ServiceTime, VehicleJourney,
        VehicleJourneyLinkOverride,
    };

    fn pattern_link(position: u32, subsection: u32, from: &str, to: &str) -> RouteLink {
        RouteLink {
            data_source_id: String::from("ds"),
            line_id: String::from("L1"),
            line_name: String::from("10"),
            journey_pattern_id: String::from("JP1"),
            vehicle_journey_code: None,
            timing_link_id: Some(format!("TL{position}")),
            section_position: 1,
            link_position_in_section: position,
            link_position_in_pattern: position,
            subsection_id: format!("ds_JP1_{subsection}"),
            subsection_position: subsection,
            subsection_base_id: format!("ds_JP1_{subsection}"),
            base_data_source_id: String::from("ds"),
            base_journey_pattern_id: String::from("JP1"),
            variant_code: String::from("10-1"),
            from_stop_id: String::from(from),
            to_stop_id: String::from(to),
            from_is_timing_point: true,
            to_is_timing_point: true,
            distance: Some(100.0),
            run_time_seconds: 60,
            from_wait_seconds: None,
            to_wait_seconds: Some(30),
        }
    }

    fn journey(code: &str, jp: &str, departure: &str) -> VehicleJourney {
        VehicleJourney {
            data_source_id: String::from("ds"),
            vehicle_journey_code: code.to_string(),
            line_id: String::from("L1"),
            journey_pattern_id: jp.to_string(),
            departure_time: ServiceTime::parse(departure).expect("test time should parse"),
            day_type: DayType::Weekday,
            operating_days: OperatingDays::new(DayType::Weekday, Some("MondayToFriday")),
        }
    }

    fn pattern_links() -> Vec<RouteLink> {
        vec![
            pattern_link(2, 1, "B", "C"),
            pattern_link(1, 1, "A", "B"),
            pattern_link(3, 2, "C", "D"),
        ]
    }

    #[test]
    fn test_trip_links_follow_pattern_with_overrides() {
        let overrides = vec![VehicleJourneyLinkOverride {
            data_source_id: String::from("ds"),
            vehicle_journey_code: String::from("VJ1"),
            timing_link_id: String::from("TL2"),
            run_time_seconds: Some(120),
            from_wait_seconds: None,
            to_wait_seconds: None,
        }];
        let journeys = vec![journey("VJ1", "JP1", "07:00:00"), journey("VJ2", "JPX", "08:00:00")];
        let (links, warnings) = trip_links(&journeys, &pattern_links(), &overrides);
        let stops = links.iter().map(|l| l.from_stop_id.as_str()).collect::<Vec<_>>();
        assert_eq!(stops, vec!["A", "B", "C"]);
        assert_eq!(links[1].run_time_seconds, 120);
        assert_eq!(links[0].run_time_seconds, 60);
        assert!(matches!(
            warnings.as_slice(),
            [BatchWarning::MissingJourneyPattern { .. }]
        ));
    }

    #[test]
    fn test_subsection_departures_accumulate_elapsed_time() {
        let journeys = vec![journey("VJ1", "JP1", "07:00:00")];
        let (links, _) = trip_links(&journeys, &pattern_links(), &[]);
        let rows = trip_subsections(&journeys, &links);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].departure_time.format_hm(), "7:00");
        assert_eq!(rows[0].run_time_seconds, 120);
        assert_eq!(rows[0].distance, Some(200.0));
        assert_eq!(rows[0].from_stop_id, "A");
        assert_eq!(rows[0].to_stop_id, "C");
        // two links of 60s run time and 30s dwell
        assert_eq!(rows[1].departure_time, ServiceTime::from_minutes(7 * 60 + 3));
        assert_eq!(rows[1].subsection_base_id, "ds_JP1_2");
    }

    #[test]
    fn test_headers_and_summary() {
        let journeys = vec![journey("VJ2", "JP1", "08:00:00"), journey("VJ1", "JP1", "07:00:00")];
        let (links, _) = trip_links(&journeys, &pattern_links(), &[]);
        let patterns = vec![JourneyPatternRecord {
            data_source_id: String::from("ds"),
            journey_pattern_id: String::from("JP1"),
            line_id: String::from("L1"),
            direction: Some(String::from("outbound")),
            destination_display: None,
        }];
        let headers = trip_headers(&journeys, &links, &patterns);
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].vehicle_journey_code, "VJ1");
        assert_eq!(headers[0].arrival_time.format_hm(), "7:04");
        assert_eq!(headers[0].distance, Some(300.0));
        assert_eq!(headers[0].direction.as_deref(), Some("outbound"));

        let summary = trip_summary(&headers);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].trip_count, 2);
        assert_eq!(summary[0].variant_codes, "10-1");
    }

    #[test]
    fn test_long_run_times_hold_at_latest_time() {
        let links = pattern_links()
            .into_iter()
            .map(|l| RouteLink {
                run_time_seconds: u32::MAX / 2,
                ..l
            })
            .collect::<Vec<_>>();
        let journeys = vec![journey("VJ1", "JP1", "07:00:00")];
        let (links, _) = trip_links(&journeys, &links, &[]);

        let rows = trip_subsections(&journeys, &links);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].run_time_seconds, u32::MAX - 1);
        assert_eq!(rows[1].departure_time.seconds(), u32::MAX);

        let headers = trip_headers(&journeys, &links, &[]);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers[0].arrival_time.seconds(), u32::MAX);
    }
}
