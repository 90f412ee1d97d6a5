//! Readers for comp exports handed to the engine by its data source.

mod parser;

use crate::quality::PropertyCompSet;
use crate::valuation::ComparableSale;
use parser::CompRow;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

#[derive(Debug)]
pub enum ImportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    MissingPropertyId { row: usize },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Io(err) => write!(f, "failed to read comp export: {}", err),
            ImportError::Csv(err) => write!(f, "invalid comp CSV data: {}", err),
            ImportError::Json(err) => write!(f, "invalid comp JSON data: {}", err),
            ImportError::MissingPropertyId { row } => {
                write!(f, "comp row {} has no property_id to group it under", row)
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Io(err) => Some(err),
            ImportError::Csv(err) => Some(err),
            ImportError::Json(err) => Some(err),
            ImportError::MissingPropertyId { .. } => None,
        }
    }
}

impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

pub struct CompsImporter;

impl CompsImporter {
    /// Reads a flat comp list for one subject; property columns are ignored.
    pub fn comparables_from_reader<R: Read>(
        reader: R,
    ) -> Result<Vec<ComparableSale>, ImportError> {
        let mut csv_reader = parser::csv_reader(reader);
        let mut comps = Vec::new();
        for row in csv_reader.deserialize::<CompRow>() {
            comps.push(row?.into_sale());
        }
        Ok(comps)
    }

    pub fn comparables_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<Vec<ComparableSale>, ImportError> {
        let file = File::open(path)?;
        Self::comparables_from_reader(file)
    }

    /// Streams comp sets out of a corpus CSV, grouping consecutive rows that share a
    /// `property_id`.
    pub fn comp_sets_from_reader<R: Read>(reader: R) -> CompSetReader<R> {
        CompSetReader {
            rows: parser::csv_reader(reader).into_deserialize(),
            row: 0,
            pending: None,
        }
    }

    pub fn comp_sets_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<CompSetReader<File>, ImportError> {
        let file = File::open(path)?;
        Ok(Self::comp_sets_from_reader(file))
    }

    /// Streams comp sets from newline-delimited JSON, one property per value.
    pub fn ndjson_from_reader<R: BufRead>(
        reader: R,
    ) -> impl Iterator<Item = Result<PropertyCompSet, ImportError>> {
        serde_json::Deserializer::from_reader(reader)
            .into_iter::<PropertyCompSet>()
            .map(|item| item.map_err(ImportError::from))
    }

    pub fn ndjson_from_path<P: AsRef<Path>>(
        path: P,
    ) -> Result<impl Iterator<Item = Result<PropertyCompSet, ImportError>>, ImportError> {
        let file = File::open(path)?;
        Ok(Self::ndjson_from_reader(BufReader::new(file)))
    }
}

pub struct CompSetReader<R: Read> {
    rows: csv::DeserializeRecordsIntoIter<R, CompRow>,
    row: usize,
    pending: Option<PropertyCompSet>,
}

impl<R: Read> Iterator for CompSetReader<R> {
    type Item = Result<PropertyCompSet, ImportError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let row = match self.rows.next() {
                Some(Ok(row)) => row,
                Some(Err(err)) => return Some(Err(err.into())),
                None => return self.pending.take().map(Ok),
            };
            self.row += 1;

            let Some(id) = row.property_id.clone() else {
                return Some(Err(ImportError::MissingPropertyId { row: self.row }));
            };

            if let Some(set) = self.pending.as_mut().filter(|set| set.id == id) {
                set.comps.push(row.into_sale());
                continue;
            }

            if let Some(finished) = self.pending.replace(row.into_comp_set(id)) {
                return Some(Ok(finished));
            }
        }
    }
}
