use itertools::Itertools;
use schedrat_core::model::Point;

/// fills `cumulative_distance` along each `(dataSourceId, lineName, variantCode)`
/// route of a variant point table.
///
/// points keep their route order. the running sum restarts at every point that
/// opens a subsection, taking that point's own distance, and becomes unknown
/// for the rest of the run as soon as one distance is unknown.
pub fn with_cumulative_distance(points: Vec<Point>) -> Vec<Point> {
    let sorted = points
        .into_iter()
        .sorted_by(|a, b| {
            (&a.data_source_id, &a.line_name, &a.variant_code).cmp(&(
                &b.data_source_id,
                &b.line_name,
                &b.variant_code,
            ))
        })
        .collect_vec();

    let mut result = Vec::with_capacity(sorted.len());
    let mut running: Option<f64> = None;
    let mut previous_route: Option<(String, String, String)> = None;
    for point in sorted {
        let route = (
            point.data_source_id.clone(),
            point.line_name.clone(),
            point.variant_code.clone(),
        );
        let new_route = previous_route.as_ref() != Some(&route);
        running = if new_route || point.is_first_in_subsection {
            point.distance
        } else {
            running.and_then(|sum| point.distance.map(|d| sum + d))
        };
        previous_route = Some(route);
        result.push(Point {
            cumulative_distance: running,
            ..point
        });
    }
    result
}
