use itertools::Itertools;
use schedrat_core::model::{Point, RouteLink};

/// what identifies one route when reconstructing points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointGrouping {
    /// one route per vehicle journey
    Trip,
    /// one route per variant code
    Variant,
}

impl PointGrouping {
    pub fn route_key<'a>(&self, link: &'a RouteLink) -> &'a str {
        match self {
            PointGrouping::Trip => link
                .vehicle_journey_code
                .as_deref()
                .unwrap_or(&link.journey_pattern_id),
            PointGrouping::Variant => &link.variant_code,
        }
    }
}

/// expands an ordered link table into a point table with one row per stop
/// visited.
///
/// links are ordered by (data source, line, route key, section position, link
/// position). each route gets a leading point at the first link's from-stop
/// followed by one point per link at its to-stop. the wait at a point is the
/// arriving link's wait at destination plus the departing link's wait at origin.
pub fn links_to_points(links: &[RouteLink], grouping: PointGrouping) -> Vec<Point> {
    let sorted = links
        .iter()
        .sorted_by(|a, b| {
            (
                &a.data_source_id,
                &a.line_name,
                grouping.route_key(a),
                a.section_position,
                a.link_position_in_section,
            )
                .cmp(&(
                    &b.data_source_id,
                    &b.line_name,
                    grouping.route_key(b),
                    b.section_position,
                    b.link_position_in_section,
                ))
        })
        .collect_vec();

    let mut points = Vec::with_capacity(sorted.len() * 2);
    let routes = sorted.iter().chunk_by(|l| {
        (
            l.data_source_id.clone(),
            l.line_name.clone(),
            grouping.route_key(l).to_string(),
        )
    });
    for (_, route) in &routes {
        let route = route.copied().collect_vec();
        points.extend(route_points(&route, grouping));
    }
    points
}

fn route_points(route: &[&RouteLink], grouping: PointGrouping) -> Vec<Point> {
    let Some(first) = route.first() else {
        return vec![];
    };
    let leading_distance = match grouping {
        PointGrouping::Variant if route.iter().any(|l| l.distance.is_none()) => None,
        _ => Some(0.0),
    };
    let mut points = Vec::with_capacity(route.len() + 1);
    points.push(Point {
        link_position_in_pattern: 0,
        stop_id: first.from_stop_id.clone(),
        is_timing_point: first.from_is_timing_point,
        distance: leading_distance,
        run_time_seconds: 0,
        wait_time_seconds: first.from_wait_seconds.unwrap_or_default(),
        is_first_in_subsection: true,
        is_last_in_subsection: false,
        is_first_in_route: true,
        is_last_in_route: false,
        ..point_on(first)
    });

    for (idx, link) in route.iter().enumerate() {
        let previous = idx.checked_sub(1).and_then(|p| route.get(p));
        let next = route.get(idx + 1);
        let wait = link.to_wait_seconds.unwrap_or_default()
            + next.and_then(|n| n.from_wait_seconds).unwrap_or_default();
        points.push(Point {
            wait_time_seconds: wait,
            is_first_in_subsection: previous.is_some_and(|p| p.subsection_id != link.subsection_id),
            is_last_in_subsection: next.map_or(true, |n| n.subsection_id != link.subsection_id),
            is_last_in_route: next.is_none(),
            ..point_on(link)
        });
    }
    points
}

/// the point at the destination of a link
fn point_on(link: &RouteLink) -> Point {
    Point {
        data_source_id: link.data_source_id.clone(),
        line_id: link.line_id.clone(),
        line_name: link.line_name.clone(),
        journey_pattern_id: link.journey_pattern_id.clone(),
        vehicle_journey_code: link.vehicle_journey_code.clone(),
        variant_code: link.variant_code.clone(),
        subsection_id: link.subsection_id.clone(),
        subsection_base_id: link.subsection_base_id.clone(),
        section_position: link.section_position,
        link_position_in_pattern: link.link_position_in_pattern,
        stop_id: link.to_stop_id.clone(),
        is_timing_point: link.to_is_timing_point,
        distance: link.distance,
        run_time_seconds: link.run_time_seconds,
        wait_time_seconds: 0,
        is_first_in_subsection: false,
        is_last_in_subsection: false,
        is_first_in_route: false,
        is_last_in_route: false,
        cumulative_distance: None,
    }
}
