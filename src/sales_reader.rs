/// Reads sale records from a CSV file
/// Kept separate from the aggregation in case we want to read
/// from something else than CSV later on
use std::{
    io::Read,
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, Trim};
use log::*;

use crate::{error::SalesError, records::SaleRecord};

/// Something able to load the full list of sale records from a path
pub trait SalesCSVReader {
    fn read_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<SaleRecord>, SalesError>;
}

/// Loads the whole file in memory, validating every record on the way
pub struct BulkReader {}

impl BulkReader {
    pub fn new() -> Self {
        Self {}
    }
}

impl SalesCSVReader for BulkReader {
    fn read_csv<P: AsRef<Path>>(&self, path: P) -> Result<Vec<SaleRecord>, SalesError> {
        read_from_csv(path)
    }
}

fn builder() -> ReaderBuilder {
    let mut builder = ReaderBuilder::new();
    builder.trim(Trim::All).flexible(true);
    builder
}

/// Read sales from a CSV file
/// Returns a vector with all the records, or the first error met
pub fn read_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<SaleRecord>, SalesError> {
    let path = path.as_ref();
    info!("Reading sales from {:?}", path);

    let csv_reader = builder()
        .from_path(path)
        .map_err(|source| SalesError::MissingInput {
            path: path.to_path_buf(),
            source,
        })?;

    collect_records(csv_reader).map_err(|err| match err {
        // an I/O failure in the middle of the file means we cannot read it
        ReadFailure::Io(source) => SalesError::MissingInput {
            path: path.to_path_buf(),
            source,
        },
        ReadFailure::Sales(err) => err,
    })
}

/// Path reported when a reader, usually stdin, cannot be read
pub const STDIN_PATH: &str = "-";

/// Same as `read_from_csv` but for anything readable, e.g. stdin
pub fn read_from_reader<R: Read>(reader: R) -> Result<Vec<SaleRecord>, SalesError> {
    collect_records(builder().from_reader(reader)).map_err(|err| match err {
        ReadFailure::Io(source) => SalesError::MissingInput {
            path: PathBuf::from(STDIN_PATH),
            source,
        },
        ReadFailure::Sales(err) => err,
    })
}

enum ReadFailure {
    Io(csv::Error),
    Sales(SalesError),
}

fn collect_records<R: Read>(
    mut csv_reader: csv::Reader<R>,
) -> Result<Vec<SaleRecord>, ReadFailure> {
    let mut records = Vec::new();
    for (index, record) in csv_reader.deserialize::<SaleRecord>().enumerate() {
        // rows are counted from 1, the header is not a row
        let row = index as u64 + 1;
        let record = match record {
            Ok(record) => record,
            Err(err) if err.is_io_error() => return Err(ReadFailure::Io(err)),
            Err(err) => {
                return Err(ReadFailure::Sales(SalesError::MalformedRecord {
                    row,
                    message: err.to_string(),
                }))
            }
        };

        if let Err(reason) = record.validate() {
            return Err(ReadFailure::Sales(SalesError::invalid(row, reason)));
        }

        trace!("Read record {:?}", record);
        records.push(record);
    }

    debug!("Read {} sale records", records.len());
    Ok(records)
}
