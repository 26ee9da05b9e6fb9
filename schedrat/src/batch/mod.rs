mod bundle;
mod bundle_ops;
mod fs;
mod input_ops;

pub use bundle::BatchBundle;
pub use bundle_ops::{
    batch_process, bundle_directory, process_batch, run_pipeline, summarize, write_bundle,
    ProcessBatchesConfig,
};
pub use fs::{create_dirs, serialize_into_csv};
pub use input_ops::{
    batch_directories, is_batch_directory, read_batch, validate_batch, BatchInput, ValidatedBatch,
};
