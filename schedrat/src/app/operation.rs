use std::path::Path;
use std::sync::Arc;

use clap::Subcommand;
use config::{Config, Environment, File};
use schedrat_core::config::RationalizeConfig;
use schedrat_core::error::RationalizeError;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::batch::{batch_process, summarize, ProcessBatchesConfig};

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum SchedratOperation {
    /// rationalize one batch, or a directory of batches, and write all output tables
    Process {
        /// a batch directory or a directory of batch directories
        #[arg(long)]
        input: String,

        /// location on disk to write output files, one subdirectory per batch
        #[arg(long)]
        output_directory: String,

        /// TOML file with run parameters. defaults apply when not provided.
        #[arg(long)]
        configuration_file: Option<String>,

        #[arg(long, default_value_t = 1)]
        parallelism: usize,

        /// log failed batches and continue instead of stopping the run
        #[arg(long)]
        ignore_bad_batch: bool,
    },
    /// run canonicalization only and print per-line subsection and variant counts
    Summary {
        /// a batch directory or a directory of batch directories
        #[arg(long)]
        input: String,

        /// TOML file with run parameters. defaults apply when not provided.
        #[arg(long)]
        configuration_file: Option<String>,
    },
}

impl SchedratOperation {
    pub fn run(&self) -> Result<(), RationalizeError> {
        match self {
            SchedratOperation::Process {
                input,
                output_directory,
                configuration_file,
                parallelism,
                ignore_bad_batch,
            } => {
                let rationalize = load_configuration(configuration_file.as_deref())?;
                log::info!(
                    "processing {input} for region '{}' with {parallelism} threads",
                    rationalize.region
                );
                let conf = Arc::new(ProcessBatchesConfig {
                    rationalize,
                    output_directory: output_directory.clone(),
                });
                batch_process(Path::new(input), *parallelism, conf, *ignore_bad_batch)
            }
            SchedratOperation::Summary {
                input,
                configuration_file,
            } => {
                let conf = load_configuration(configuration_file.as_deref())?;
                let summaries = summarize(Path::new(input), &conf)?;
                let report = summaries
                    .iter()
                    .map(|(batch, lines)| json![{ "batch": batch, "lines": lines }])
                    .collect::<Vec<_>>();
                let output = serde_json::to_string_pretty(&report).map_err(|e| {
                    RationalizeError::Internal(format!("failure serializing summary: {e}"))
                })?;
                println!("{output}");
                Ok(())
            }
        }
    }
}

/// builds the run configuration from an optional TOML file, overridden by
/// `SCHEDRAT_`-prefixed environment variables. nested keys use a double
/// underscore, e.g. `SCHEDRAT_PERIOD__ROUNDING_MINUTES=30`.
pub fn load_configuration(
    configuration_file: Option<&str>,
) -> Result<RationalizeConfig, RationalizeError> {
    let mut builder = Config::builder();
    if let Some(configuration_file) = configuration_file {
        builder = builder.add_source(File::from(Path::new(configuration_file)));
    }
    let config = builder
        .add_source(
            Environment::with_prefix("SCHEDRAT")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()
        .map_err(|e| {
            let source = configuration_file.unwrap_or("environment");
            RationalizeError::InvalidConfiguration(format!("'{source}' produced error: {e}"))
        })?;
    let conf: RationalizeConfig = config.try_deserialize().map_err(|e| {
        RationalizeError::InvalidConfiguration(format!("error reading run parameters: {e}"))
    })?;
    conf.validate()?;
    Ok(conf)
}
