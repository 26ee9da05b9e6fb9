use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use csv::QuoteStyle;
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use schedrat_core::error::RationalizeError;
use serde::Serialize;

/// helper function to "mkdir -p path" - make all directories along a path
pub fn create_dirs<P>(path: P) -> Result<(), RationalizeError>
where
    P: AsRef<Path>,
{
    let dirspath = path.as_ref();
    if !dirspath.is_dir() {
        std::fs::create_dir_all(dirspath).map_err(|e| RationalizeError::TableWrite {
            path: dirspath.to_path_buf(),
            message: format!("error building output directory: {e}"),
        })
    } else {
        Ok(())
    }
}

/// finds `{table}.csv` or `{table}.csv.gz` in a batch directory.
pub fn table_path(directory: &Path, table: &str) -> Option<PathBuf> {
    [format!("{table}.csv"), format!("{table}.csv.gz")]
        .into_iter()
        .map(|filename| directory.join(filename))
        .find(|path| path.is_file())
}

/// opens a csv table for reading, transparently decompressing `.gz` files.
/// returns None when the table is not present in the directory.
pub fn open_table(
    directory: &Path,
    table: &str,
) -> Result<Option<(PathBuf, csv::Reader<Box<dyn Read>>)>, RationalizeError> {
    let Some(filepath) = table_path(directory, table) else {
        return Ok(None);
    };
    let file = File::open(&filepath).map_err(|e| RationalizeError::TableRead {
        path: filepath.clone(),
        message: e.to_string(),
    })?;
    let is_gz = filepath.extension().is_some_and(|ext| ext == "gz");
    let buffer: Box<dyn Read> = if is_gz {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(buffer);
    Ok(Some((filepath, reader)))
}

/// output filename of a table, honoring the compression setting.
pub fn table_filename(table: &str, compress: bool) -> String {
    if compress {
        format!("{table}.csv.gz")
    } else {
        format!("{table}.csv")
    }
}

/// writes rows to `{table}.csv[.gz]` in the output directory.
///
/// # Result
///
/// the number of rows written, or zero if the file exists and overwriting is
/// disabled, in which case the table is left untouched.
pub fn serialize_into_csv<I>(
    iterable: I,
    table: &str,
    output_directory: &Path,
    compress: bool,
    overwrite: bool,
) -> Result<usize, RationalizeError>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    let filename = table_filename(table, compress);
    let filepath = output_directory.join(&filename);
    let Some(mut writer) = create_writer(output_directory, &filename, compress, overwrite)? else {
        log::info!("skipping existing table {}", filepath.display());
        return Ok(0);
    };
    let mut rows = 0;
    for element in iterable.into_iter() {
        writer
            .serialize(element)
            .map_err(|e| RationalizeError::TableWrite {
                path: filepath.clone(),
                message: format!("failed to write row {rows}: {e}"),
            })?;
        rows += 1;
    }
    writer.flush().map_err(|e| RationalizeError::TableWrite {
        path: filepath.clone(),
        message: format!("failed to flush: {e}"),
    })?;
    log::debug!("wrote {rows} rows to {}", filepath.display());
    Ok(rows)
}

/// writes a JSON document next to the output tables, respecting the overwrite
/// preference.
pub fn write_json(
    value: &serde_json::Value,
    filename: &str,
    output_directory: &Path,
    overwrite: bool,
) -> Result<(), RationalizeError> {
    let filepath = output_directory.join(filename);
    if filepath.exists() && !overwrite {
        return Ok(());
    }
    let contents =
        serde_json::to_string_pretty(value).map_err(|e| RationalizeError::TableWrite {
            path: filepath.clone(),
            message: format!("failure serializing JSON: {e}"),
        })?;
    std::fs::write(&filepath, contents).map_err(|e| RationalizeError::TableWrite {
        path: filepath,
        message: e.to_string(),
    })
}

/// helper function to build a filewriter for writing either .csv or .csv.gz
/// files while respecting the user's overwrite preferences.
fn create_writer(
    directory: &Path,
    filename: &str,
    compress: bool,
    overwrite: bool,
) -> Result<Option<csv::Writer<Box<dyn Write>>>, RationalizeError> {
    let filepath = directory.join(filename);
    if filepath.exists() && !overwrite {
        return Ok(None);
    }
    let file = File::create(&filepath).map_err(|e| RationalizeError::TableWrite {
        path: filepath.clone(),
        message: e.to_string(),
    })?;
    let buffer: Box<dyn Write> = if compress {
        Box::new(GzEncoder::new(file, Compression::default()))
    } else {
        Box::new(file)
    };
    let writer = csv::WriterBuilder::new()
        .has_headers(true)
        .quote_style(QuoteStyle::Necessary)
        .from_writer(buffer);
    Ok(Some(writer))
}
