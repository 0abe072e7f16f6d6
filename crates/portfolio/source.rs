use crate::error::{Error, Result};
use crate::record::{Dataset, RawRecord};
use csv::{ReaderBuilder, Trim, Writer};
use log::info;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

pub const REQUIRED_COLUMNS: [&str; 16] = [
    "ID",
    "Portfolio #",
    "Date_of_birth",
    "Gender",
    "city",
    "county",
    "duedate",
    "original_sum",
    "principal",
    "interest",
    "current balance",
    "total_paid",
    "fee 1",
    "fee 2",
    "fee 3",
    "fee 4",
];

/// Read raw rows from any CSV source after checking the header contract.
pub fn read_records<R: Read>(rdr: R) -> Result<Vec<RawRecord>> {
    // short rows keep their leading cells, the rest reads as unknown
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(rdr);

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(Error::MissingColumn(column.to_string()));
        }
    }

    let mut records = Vec::new();
    for row in reader.deserialize() {
        let record: RawRecord = row?;
        records.push(record);
    }
    if records.is_empty() {
        return Err(Error::EmptyDataset);
    }
    Ok(records)
}

pub fn load_csv<P: AsRef<Path>>(filename: P) -> Result<Vec<RawRecord>> {
    let file = File::open(&filename)?;
    let records = read_records(file)?;
    info!(
        "loaded {} rows from {:?}",
        records.len(),
        filename.as_ref()
    );
    Ok(records)
}

/// Write the normalized records, derived columns included.
pub fn write_detail<W: Write>(wtr: W, dataset: &Dataset) -> Result<()> {
    let mut writer = Writer::from_writer(wtr);
    for record in dataset.records() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}
