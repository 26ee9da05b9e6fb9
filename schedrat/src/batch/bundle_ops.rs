use itertools::Itertools;
use kdam::{Bar, BarBuilder, BarExt};
use rayon::prelude::*;
use schedrat_core::config::RationalizeConfig;
use schedrat_core::error::{batch_processing_error, RationalizeError};
use schedrat_core::model::DistanceColumns;
use serde_json::json;
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use super::fs::{create_dirs, serialize_into_csv, write_json};
use super::input_ops::{batch_directories, read_batch, validate_batch, ValidatedBatch};
use super::BatchBundle;
use crate::period::{load_periods, runtime_periods, schedule_periods, PlaceLookup};
use crate::rationalize::{rationalize, variant_links, LineSummary};
use crate::reconstruct::{links_to_points, with_cumulative_distance, PointGrouping};
use crate::trip::{trip_headers, trip_links, trip_subsections, trip_summary};

/// API for running batch or single batch processing.
#[derive(Clone, Debug)]
pub struct ProcessBatchesConfig {
    /// parameters shared by every stage of the pipeline
    pub rationalize: RationalizeConfig,
    /// directory to write outputs, one subdirectory per batch
    pub output_directory: String,
}

/// multithreaded batch processing.
///
/// # Arguments
///
/// * `input` - a batch directory, or a directory of batch directories
/// * `parallelism` - threads dedicated to batch processing
/// * `conf` - configuration for processing
/// * `ignore_bad_batch` - if true, a failed batch does not terminate the run and
///   remaining batches are still written. errors are logged.
pub fn batch_process(
    input: &Path,
    parallelism: usize,
    conf: Arc<ProcessBatchesConfig>,
    ignore_bad_batch: bool,
) -> Result<(), RationalizeError> {
    let batch_paths = batch_directories(input)?;
    if batch_paths.is_empty() {
        return Err(RationalizeError::TableRead {
            path: input.to_path_buf(),
            message: String::from("no batch directories found"),
        });
    }
    let chunk_size = batch_paths.len().div_ceil(std::cmp::max(1, parallelism));

    // a progress bar shared across threads
    let bar: Arc<Mutex<Bar>> = Arc::new(Mutex::new(
        BarBuilder::default()
            .desc("batch processing")
            .total(batch_paths.len())
            .animation("fillup")
            .build()
            .map_err(|e| {
                RationalizeError::Internal(format!("failure building progress bar: {e}"))
            })?,
    ));

    let (bundles, errors): (Vec<BatchBundle>, Vec<RationalizeError>) = batch_paths
        .par_chunks(chunk_size)
        .map(|chunk| {
            chunk
                .iter()
                .map(|path| {
                    let result = process_batch(path, &conf.rationalize).map_err(|e| {
                        RationalizeError::BatchProcessing(format!(
                            "while processing {}, {e}",
                            path.display()
                        ))
                    });
                    if let Ok(mut bar) = bar.clone().lock() {
                        let _ = bar.update(1);
                    }
                    result
                })
                .collect_vec()
        })
        .collect_vec_list()
        .into_iter()
        .flat_map(|chunks| chunks.into_iter().flat_map(|chunk| chunk.into_iter()))
        .filter(|r| match r {
            Ok(bundle) if bundle.is_empty() => false, // nothing to write
            _ => true,
        })
        .partition_result();

    eprintln!(); // end progress bar

    // handle errors, either by terminating early, or, logging them
    if !errors.is_empty() && !ignore_bad_batch {
        return Err(batch_processing_error(&errors));
    } else if !errors.is_empty() {
        for error in errors {
            log::error!("{error}");
        }
    }

    let write_errors = bundles
        .par_iter()
        .map(|bundle| write_bundle(bundle, &conf))
        .filter_map(Result::err)
        .collect::<Vec<_>>();

    if !write_errors.is_empty() {
        Err(batch_processing_error(&write_errors))
    } else {
        Ok(())
    }
}

/// reads, validates and runs the full pipeline over a single batch directory.
pub fn process_batch(
    directory: &Path,
    conf: &RationalizeConfig,
) -> Result<BatchBundle, RationalizeError> {
    log::debug!("process_batch called for {}", directory.display());
    let (input, mut read_warnings) = read_batch(directory)?;
    let mut batch = validate_batch(input, conf);
    read_warnings.append(&mut batch.warnings);
    batch.warnings = read_warnings;
    run_pipeline(batch, conf)
}

/// rationalizes a validated batch and derives every output table from it.
pub fn run_pipeline(
    batch: ValidatedBatch,
    conf: &RationalizeConfig,
) -> Result<BatchBundle, RationalizeError> {
    let rationalization = rationalize(batch.timing_links, conf)?;
    let mut warnings = batch.warnings;
    warnings.extend(rationalization.warnings.iter().cloned());

    let variant_links = variant_links(&rationalization.route_links);
    let variant_points =
        with_cumulative_distance(links_to_points(&variant_links, PointGrouping::Variant));

    let (trip_links, trip_warnings) = trip_links(
        &batch.vehicle_journeys,
        &rationalization.route_links,
        &batch.link_overrides,
    );
    warnings.extend(trip_warnings);
    let trip_points = links_to_points(&trip_links, PointGrouping::Trip);
    let trip_subsections = trip_subsections(&batch.vehicle_journeys, &trip_links);
    let trips = trip_headers(&batch.vehicle_journeys, &trip_links, &batch.journey_patterns);
    let trip_summary = trip_summary(&trips);

    let schedule_periods = schedule_periods(&trip_subsections, &conf.period);
    let mut places = PlaceLookup::new(&batch.stop_places);
    let runtime_periods = runtime_periods(&schedule_periods, &trip_subsections, &mut places);
    let load_periods = load_periods(&runtime_periods, &trip_points);
    warnings.extend(places.into_warnings());

    let line_summaries = rationalization.line_summaries();
    let metadata = json![{
        "batch": &batch.name,
        "region": &conf.region,
        "created": chrono::Local::now().to_rfc3339(),
        "distance_unit": conf.distance_unit,
        "match_strategy": conf.match_strategy,
        "period": &conf.period,
        "lines": line_summaries,
        "counts": {
            "subsections": rationalization.subsection_mapping.len(),
            "variants": rationalization.variant_mapping.len(),
            "vehicle_journeys": batch.vehicle_journeys.len(),
            "trip_subsections": trip_subsections.len(),
            "schedule_periods": schedule_periods.len(),
            "runtime_periods": runtime_periods.len(),
            "load_periods": load_periods.len(),
        },
        "warning_count": warnings.len(),
        "warnings": warnings.iter().map(|w| w.to_string()).collect_vec(),
    }];
    log::info!(
        "batch {}: {} trips, {} runtime periods, {} warnings",
        batch.name,
        trips.len(),
        runtime_periods.len(),
        warnings.len()
    );

    Ok(BatchBundle {
        name: batch.name,
        subsection_mapping: rationalization.subsection_mapping,
        variant_mapping: rationalization.variant_mapping,
        variant_links,
        variant_points,
        trip_points,
        trip_subsections,
        trips,
        trip_summary,
        schedule_periods,
        runtime_periods,
        load_periods,
        warnings,
        metadata,
    })
}

/// writes the provided bundle to `{output_directory}/{bundle name}/`. distance
/// columns are converted to the configured unit on the way out.
pub fn write_bundle(
    bundle: &BatchBundle,
    conf: &ProcessBatchesConfig,
) -> Result<(), RationalizeError> {
    let output_directory = bundle_directory(conf, &bundle.name);
    create_dirs(&output_directory)?;
    let unit = conf.rationalize.distance_unit;
    let compress = conf.rationalize.compress_output;
    let overwrite = conf.rationalize.overwrite;
    let dir = output_directory.as_path();

    serialize_into_csv(&bundle.subsection_mapping, "subsection_mapping", dir, compress, overwrite)?;
    serialize_into_csv(&bundle.variant_mapping, "variant_mapping", dir, compress, overwrite)?;
    serialize_into_csv(
        bundle.variant_links.iter().map(|l| l.clone().in_unit(unit)),
        "variant_links",
        dir,
        compress,
        overwrite,
    )?;
    serialize_into_csv(
        bundle.variant_points.iter().map(|p| p.clone().in_unit(unit)),
        "variant_points",
        dir,
        compress,
        overwrite,
    )?;
    serialize_into_csv(
        bundle.trip_points.iter().map(|p| p.clone().in_unit(unit)),
        "trip_points",
        dir,
        compress,
        overwrite,
    )?;
    serialize_into_csv(
        bundle.trip_subsections.iter().map(|t| t.clone().in_unit(unit)),
        "trip_subsections",
        dir,
        compress,
        overwrite,
    )?;
    serialize_into_csv(
        bundle.trips.iter().map(|t| t.clone().in_unit(unit)),
        "trips",
        dir,
        compress,
        overwrite,
    )?;
    serialize_into_csv(&bundle.trip_summary, "trip_summary", dir, compress, overwrite)?;
    serialize_into_csv(&bundle.schedule_periods, "schedule_periods", dir, compress, overwrite)?;
    serialize_into_csv(&bundle.runtime_periods, "runtime_periods", dir, compress, overwrite)?;
    serialize_into_csv(&bundle.load_periods, "load_periods", dir, compress, overwrite)?;
    write_json(&bundle.metadata, "metadata.json", dir, overwrite)?;
    log::info!("wrote batch {} to {}", bundle.name, output_directory.display());
    Ok(())
}

/// runs canonicalization only over every batch under `input`, reporting the
/// per-line counts of each batch.
pub fn summarize(
    input: &Path,
    conf: &RationalizeConfig,
) -> Result<Vec<(String, Vec<LineSummary>)>, RationalizeError> {
    let mut summaries = vec![];
    for directory in batch_directories(input)? {
        let (input, _) = read_batch(&directory)?;
        let batch = validate_batch(input, conf);
        let rationalization = rationalize(batch.timing_links, conf)?;
        summaries.push((batch.name, rationalization.line_summaries()));
    }
    Ok(summaries)
}

/// output directory of a batch, for callers that want to read results back
pub fn bundle_directory(conf: &ProcessBatchesConfig, bundle_name: &str) -> PathBuf {
    Path::new(&conf.output_directory).join(bundle_name)
}
