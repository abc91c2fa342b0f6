use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;

use crate::error::ExtractError;

fn write_records<W: Write, T: Serialize>(writer: W, records: &[T]) -> Result<W, ExtractError> {
    let mut writer = WriterBuilder::new().has_headers(true).from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|error| ExtractError::Io(error.into_error()))
}

/// Writes one table as CSV, one header row named after the record fields.
/// An empty table produces an empty file.
pub fn write_csv<T: Serialize>(path: &Path, records: &[T]) -> Result<(), ExtractError> {
    let file = std::fs::File::create(path)?;
    write_records(file, records)?;
    Ok(())
}

pub fn write_csv_to_string<T: Serialize>(records: &[T]) -> Result<String, ExtractError> {
    let bytes = write_records(Vec::<u8>::new(), records)?;
    String::from_utf8(bytes)
        .map_err(|error| ExtractError::InvalidOption(format!("invalid utf-8 csv output: {error}")))
}
