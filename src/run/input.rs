//! Input CSV reading and column lookup.

use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use log::warn;

use crate::config::BatchConfig;
use crate::error_handling::BatchError;

/// One input row, padded or truncated to the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct InputRecord {
    /// 1-based position in the input file (header excluded)
    pub position: usize,
    values: Vec<String>,
}

impl InputRecord {
    pub fn new(position: usize, values: Vec<String>) -> Self {
        InputRecord { position, values }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Value at `index`, or "" for an absent column.
    pub fn get(&self, index: Option<usize>) -> &str {
        index
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// A locality column and its position in the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalityField {
    pub name: String,
    pub index: usize,
}

/// Header positions of the columns the geocoder reads.
///
/// There is always at least one locality column: the primary one, followed by
/// the fallbacks in priority order.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    primary: LocalityField,
    fallbacks: Vec<LocalityField>,
    country: Option<usize>,
    state: Option<usize>,
    county: Option<usize>,
}

impl ColumnLayout {
    /// Looks up the configured columns in `headers`.
    ///
    /// # Errors
    ///
    /// Returns `BatchError::MissingColumn` if a locality column is absent.
    /// Missing country/state/county columns only log a warning and are sent
    /// to the service as empty strings.
    pub fn resolve(headers: &StringRecord, config: &BatchConfig) -> Result<Self, BatchError> {
        let position = |name: &str| headers.iter().position(|h| h == name);

        let mut localities = config
            .locality_columns
            .iter()
            .map(|name| {
                position(name)
                    .map(|index| LocalityField {
                        name: name.clone(),
                        index,
                    })
                    .ok_or_else(|| BatchError::MissingColumn {
                        column: name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?
            .into_iter();

        let primary = localities.next().ok_or_else(|| BatchError::MissingColumn {
            column: "locality".into(),
        })?;

        let optional = |name: &str| {
            let index = position(name);
            if index.is_none() {
                warn!("Input has no '{name}' column; sending it empty");
            }
            index
        };

        Ok(ColumnLayout {
            primary,
            fallbacks: localities.collect(),
            country: optional(&config.country_column),
            state: optional(&config.state_column),
            county: optional(&config.county_column),
        })
    }

    pub fn primary_locality(&self) -> &LocalityField {
        &self.primary
    }

    pub fn fallback_localities(&self) -> &[LocalityField] {
        &self.fallbacks
    }

    pub fn country<'r>(&self, record: &'r InputRecord) -> &'r str {
        record.get(self.country)
    }

    pub fn state<'r>(&self, record: &'r InputRecord) -> &'r str {
        record.get(self.state)
    }

    pub fn county<'r>(&self, record: &'r InputRecord) -> &'r str {
        record.get(self.county)
    }
}

/// Header-driven CSV reader yielding [`InputRecord`]s in file order.
pub struct InputSource {
    reader: csv::Reader<File>,
    headers: StringRecord,
    position: usize,
}

impl InputSource {
    pub fn open(path: &Path) -> Result<Self, BatchError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
        let headers = reader.headers()?.clone();
        Ok(InputSource {
            reader,
            headers,
            position: 0,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    fn number_record(&mut self, raw: StringRecord) -> InputRecord {
        self.position += 1;
        let width = self.headers.len();
        if raw.len() != width {
            warn!(
                "Input record {} has {} fields, header has {}; adjusting",
                self.position,
                raw.len(),
                width
            );
        }
        let mut values: Vec<String> = raw.iter().take(width).map(str::to_string).collect();
        values.resize(width, String::new());
        InputRecord::new(self.position, values)
    }
}

impl Iterator for InputSource {
    type Item = Result<InputRecord, BatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut raw = StringRecord::new();
        match self.reader.read_record(&mut raw) {
            Ok(true) => Some(Ok(self.number_record(raw))),
            Ok(false) => None,
            Err(e) => Some(Err(e.into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_records_are_numbered_from_one() {
        let file = csv_file("locality,country\nLawrence,USA\nTopeka,USA\n");
        let source = InputSource::open(file.path()).unwrap();
        let records: Vec<InputRecord> = source.map(Result::unwrap).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].position, 1);
        assert_eq!(records[1].position, 2);
        assert_eq!(records[1].values(), ["Topeka", "USA"]);
    }

    #[test]
    fn test_ragged_rows_are_padded_and_truncated() {
        let file = csv_file("locality,country,county\nLawrence\nTopeka,USA,Shawnee,extra\n");
        let records: Vec<InputRecord> = InputSource::open(file.path())
            .unwrap()
            .map(Result::unwrap)
            .collect();
        assert_eq!(records[0].values(), ["Lawrence", "", ""]);
        assert_eq!(records[1].values(), ["Topeka", "USA", "Shawnee"]);
    }

    #[test]
    fn test_layout_orders_locality_fields() {
        let headers = StringRecord::from(vec!["verbatim", "country", "locality"]);
        let config = BatchConfig {
            locality_columns: vec!["locality".into(), "verbatim".into()],
            ..Default::default()
        };
        let layout = ColumnLayout::resolve(&headers, &config).unwrap();
        assert_eq!(layout.primary_locality().name, "locality");
        assert_eq!(layout.primary_locality().index, 2);
        assert_eq!(layout.fallback_localities()[0].index, 0);

        let record = InputRecord::new(1, vec!["v".into(), "USA".into(), "l".into()]);
        assert_eq!(layout.country(&record), "USA");
        assert_eq!(layout.state(&record), "");
        assert_eq!(layout.county(&record), "");
    }

    #[test]
    fn test_missing_locality_column_is_an_error() {
        let headers = StringRecord::from(vec!["country"]);
        let err = ColumnLayout::resolve(&headers, &BatchConfig::default()).unwrap_err();
        assert!(matches!(err, BatchError::MissingColumn { column } if column == "locality"));
    }
}
