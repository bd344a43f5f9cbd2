//! CSV encoding of the account table.

use super::StoreError;
use crate::models::{RECORD_COLUMNS, Record};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

/// Directory that holds `path`, for placing temporary files on the same
/// filesystem.
pub(crate) fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Reads the table at `path`.
///
/// A missing or zero-length file is an empty table.
pub(crate) fn read_table(path: &Path) -> Result<Vec<Record>, StoreError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::Reader::from_reader(BufReader::new(file));
    let headers = reader.headers()?;
    if headers.is_empty() {
        return Ok(Vec::new());
    }
    if !headers.iter().eq(RECORD_COLUMNS) {
        return Err(StoreError::Format(format!(
            "unexpected header {:?}, expected {:?}",
            headers.iter().collect::<Vec<_>>(),
            RECORD_COLUMNS
        )));
    }

    let records = reader
        .deserialize()
        .collect::<Result<Vec<Record>, csv::Error>>()?;
    Ok(records)
}

/// Writes `records` to `path` through a temporary file that is renamed into
/// place, so concurrent readers see either the old or the new table.
pub(crate) fn write_table(path: &Path, records: &[Record]) -> Result<(), StoreError> {
    let mut temp = tempfile::NamedTempFile::new_in(parent_dir(path))?;
    {
        let mut writer = csv::Writer::from_writer(temp.as_file_mut());
        if records.is_empty() {
            writer.write_record(RECORD_COLUMNS)?;
        }
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;
    }
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

impl From<csv::Error> for StoreError {
    fn from(err: csv::Error) -> Self {
        let message = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(e) => StoreError::Io(e),
            _ => StoreError::Format(message),
        }
    }
}
