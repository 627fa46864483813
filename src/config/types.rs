//! Configuration types and CLI options.
//!
//! This module defines the `clap` option structs for both binaries and the
//! validated, immutable configuration values the library is driven by.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser, ValueEnum};

use crate::config::constants::{
    DEFAULT_COUNTRY_COLUMN, DEFAULT_COUNTY_COLUMN, DEFAULT_ENDPOINT, DEFAULT_LOCALITY_COLUMN,
    DEFAULT_REQUEST_DELAY, DEFAULT_REVIEW_HOST, DEFAULT_REVIEW_PORT, DEFAULT_STATE_COLUMN,
    DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT, MAX_LANGUAGE_KEY,
};
use crate::error_handling::ConfigurationError;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Per-request switches forwarded to the geocoding service.
///
/// These are part of the request identity: two requests differing only in an
/// option are cached separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeocodeOptions {
    /// `hwyX`: exclude matches on highway names
    pub exclude_highways: bool,
    /// `enableH2O`: allow matches on water bodies
    pub enable_water_bodies: bool,
    /// `doUncert`: compute an uncertainty radius
    pub compute_uncertainty: bool,
    /// `doPoly`: compute an uncertainty polygon
    pub compute_polygon: bool,
    /// `displacePoly`: compute a displaced polygon
    pub displace_polygon: bool,
    /// `languageKey`: locality parser language, 0..=4
    pub language_key: u8,
}

impl Default for GeocodeOptions {
    fn default() -> Self {
        Self {
            exclude_highways: true,
            enable_water_bodies: true,
            compute_uncertainty: true,
            compute_polygon: false,
            displace_polygon: false,
            language_key: 0,
        }
    }
}

/// Batch geocoding configuration (no CLI dependencies).
///
/// Built once at startup and passed by reference into the runner and the
/// geocode client.
///
/// # Examples
///
/// ```no_run
/// use geolocate_batch::BatchConfig;
/// use std::path::PathBuf;
///
/// let config = BatchConfig {
///     input: PathBuf::from("localities.csv"),
///     output: PathBuf::from("georeferenced.csv"),
///     locality_columns: vec!["verbatimLocality".into(), "locality".into()],
///     cache_path: Some(PathBuf::from("glc_cache.db")),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Input CSV file
    pub input: PathBuf,
    /// Output CSV file (appended to when it already exists)
    pub output: PathBuf,
    pub country_column: String,
    pub state_column: String,
    pub county_column: String,
    /// Locality columns to try, in order of preference
    pub locality_columns: Vec<String>,
    /// Minimum pause between two live requests
    pub request_delay: Duration,
    /// Stop after this input position (1-based); `None` processes everything
    pub max_records: Option<usize>,
    /// Emit only the top-ranked result per record
    pub first_match_only: bool,
    /// SQLite response cache; `None` disables caching
    pub cache_path: Option<PathBuf>,
    pub options: GeocodeOptions,
    pub endpoint: String,
    pub timeout_seconds: u64,
    pub user_agent: String,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("input.csv"),
            output: PathBuf::from("output.csv"),
            country_column: DEFAULT_COUNTRY_COLUMN.to_string(),
            state_column: DEFAULT_STATE_COLUMN.to_string(),
            county_column: DEFAULT_COUNTY_COLUMN.to_string(),
            locality_columns: vec![DEFAULT_LOCALITY_COLUMN.to_string()],
            request_delay: DEFAULT_REQUEST_DELAY,
            max_records: None,
            first_match_only: false,
            cache_path: None,
            options: GeocodeOptions::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_seconds: DEFAULT_TIMEOUT_SECS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl BatchConfig {
    /// Checks the invariants the runner relies on. Performs no I/O.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.locality_columns.is_empty() {
            return Err(ConfigurationError::InvalidValue {
                name: "locality fields",
                reason: "at least one locality column is required".into(),
            });
        }
        if self.options.language_key > MAX_LANGUAGE_KEY {
            return Err(ConfigurationError::InvalidValue {
                name: "languageKey",
                reason: format!("must be between 0 and {MAX_LANGUAGE_KEY}"),
            });
        }
        if self.max_records == Some(0) {
            return Err(ConfigurationError::InvalidValue {
                name: "record cap",
                reason: "must be greater than zero".into(),
            });
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigurationError::InvalidValue {
                name: "timeout",
                reason: "must be greater than zero".into(),
            });
        }
        if self.input == self.output {
            return Err(ConfigurationError::InvalidValue {
                name: "output",
                reason: "output file must differ from the input file".into(),
            });
        }
        Ok(())
    }
}

/// Command-line options for the batch geocoder.
///
/// Input and output are optional at the parser level so that a missing path
/// is reported as a [`ConfigurationError`] together with the usage text.
///
/// # Examples
///
/// ```bash
/// # Try verbatimLocality first, fall back to locality, cache responses
/// geolocate_batch -i specimens.csv -o out.csv -l verbatimLocality,locality --cache glc.db
///
/// # First result only, first 100 records
/// geolocate_batch -i specimens.csv -o out.csv -1 -n 100
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "geolocate_batch",
    about = "Runs a CSV of localities through the GEOLocate web service."
)]
pub struct BatchOpt {
    /// Input CSV file
    #[arg(short = 'i', long = "input", value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Output CSV file (resumed if it already exists)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Country column
    #[arg(short = 'c', long = "country-field", default_value = DEFAULT_COUNTRY_COLUMN)]
    pub country_field: String,

    /// State/province column
    #[arg(short = 's', long = "state-field", default_value = DEFAULT_STATE_COLUMN)]
    pub state_field: String,

    /// County column
    #[arg(short = 'a', long = "county-field", default_value = DEFAULT_COUNTY_COLUMN)]
    pub county_field: String,

    /// Comma separated list of locality columns to try in order of preference
    /// (default: locality)
    #[arg(short = 'l', long = "locality-fields", value_delimiter = ',')]
    pub locality_fields: Vec<String>,

    /// Seconds to wait between live requests
    #[arg(short = 't', long = "delay", default_value_t = 0.6)]
    pub delay_seconds: f64,

    /// Number of records to process (default: entire input file)
    #[arg(short = 'n', long = "max-records")]
    pub max_records: Option<usize>,

    /// Log raw service responses (debug level)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Output the first result only for each record
    #[arg(short = '1', long = "firstOnly")]
    pub first_only: bool,

    /// SQLite file used to cache service responses
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    #[arg(long = "hwyX", default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub hwy_x: bool,

    #[arg(long = "enableH2O", default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub enable_h2o: bool,

    #[arg(long = "doUncert", default_value_t = true, action = ArgAction::Set, value_name = "BOOL")]
    pub do_uncert: bool,

    #[arg(long = "doPoly", default_value_t = false, action = ArgAction::Set, value_name = "BOOL")]
    pub do_poly: bool,

    #[arg(long = "displacePoly", default_value_t = false, action = ArgAction::Set, value_name = "BOOL")]
    pub displace_poly: bool,

    /// Locality parser language: 0, 1, 2, 3 or 4
    #[arg(long = "languageKey", default_value_t = 0, value_parser = clap::value_parser!(u8).range(0..=4))]
    pub language_key: u8,

    /// Geocoding service endpoint
    #[arg(long, env = "GEOLOCATE_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_seconds: u64,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl TryFrom<BatchOpt> for BatchConfig {
    type Error = ConfigurationError;

    fn try_from(opt: BatchOpt) -> Result<Self, Self::Error> {
        let input = opt.input.ok_or(ConfigurationError::MissingArgument("-i <inputfile>"))?;
        let output = opt
            .output
            .ok_or(ConfigurationError::MissingArgument("-o <outputfile>"))?;

        if !opt.delay_seconds.is_finite() || opt.delay_seconds < 0.0 {
            return Err(ConfigurationError::InvalidValue {
                name: "delay",
                reason: format!("{} is not a non-negative number of seconds", opt.delay_seconds),
            });
        }

        let log_level = if opt.verbose {
            LogLevel::Debug
        } else {
            opt.log_level
        };

        let config = BatchConfig {
            input,
            output,
            country_column: opt.country_field,
            state_column: opt.state_field,
            county_column: opt.county_field,
            locality_columns: locality_columns_or_default(opt.locality_fields),
            request_delay: Duration::from_secs_f64(opt.delay_seconds),
            max_records: opt.max_records,
            first_match_only: opt.first_only,
            cache_path: opt.cache,
            options: GeocodeOptions {
                exclude_highways: opt.hwy_x,
                enable_water_bodies: opt.enable_h2o,
                compute_uncertainty: opt.do_uncert,
                compute_polygon: opt.do_poly,
                displace_polygon: opt.displace_poly,
                language_key: opt.language_key,
            },
            endpoint: opt.endpoint,
            timeout_seconds: opt.timeout_seconds,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            log_level,
            log_format: opt.log_format,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Command-line options for the review server.
#[derive(Debug, Parser)]
#[command(
    name = "glc_review",
    about = "Serves a map page for confirming or correcting geocoded localities."
)]
pub struct ReviewOpt {
    /// SQLite database holding the geocoded table
    #[arg(short = 'i', long = "db", value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Table holding the batch output
    #[arg(short = 't', long = "input-table")]
    pub input_table: Option<String>,

    /// Table receiving approved points
    #[arg(short = 'o', long = "output-table")]
    pub output_table: Option<String>,

    /// Country column
    #[arg(short = 'c', long = "country-field", default_value = DEFAULT_COUNTRY_COLUMN)]
    pub country_field: String,

    /// State/province column
    #[arg(short = 's', long = "state-field", default_value = DEFAULT_STATE_COLUMN)]
    pub state_field: String,

    /// County column
    #[arg(short = 'a', long = "county-field", default_value = DEFAULT_COUNTY_COLUMN)]
    pub county_field: String,

    /// Comma separated list of locality columns, same order as the batch run
    #[arg(short = 'l', long = "locality-fields", value_delimiter = ',')]
    pub locality_fields: Vec<String>,

    /// Load a batch output CSV into the input table before serving
    #[arg(long = "import", value_name = "CSV")]
    pub import: Option<PathBuf>,

    #[arg(long, default_value = DEFAULT_REVIEW_HOST)]
    pub host: String,

    #[arg(long, default_value_t = DEFAULT_REVIEW_PORT)]
    pub port: u16,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// Review server configuration.
#[derive(Debug, Clone)]
pub struct ReviewConfig {
    pub db_path: PathBuf,
    pub input_table: String,
    pub output_table: String,
    pub country_column: String,
    pub state_column: String,
    pub county_column: String,
    pub locality_columns: Vec<String>,
    pub import: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

impl TryFrom<ReviewOpt> for ReviewConfig {
    type Error = ConfigurationError;

    fn try_from(opt: ReviewOpt) -> Result<Self, Self::Error> {
        let db_path = opt.db.ok_or(ConfigurationError::MissingArgument("-i <input_dbfile>"))?;
        let input_table = opt
            .input_table
            .ok_or(ConfigurationError::MissingArgument("-t <input_table>"))?;
        let output_table = opt
            .output_table
            .ok_or(ConfigurationError::MissingArgument("-o <output_table>"))?;
        if input_table == output_table {
            return Err(ConfigurationError::InvalidValue {
                name: "output table",
                reason: "must differ from the input table".into(),
            });
        }
        Ok(ReviewConfig {
            db_path,
            input_table,
            output_table,
            country_column: opt.country_field,
            state_column: opt.state_field,
            county_column: opt.county_field,
            locality_columns: locality_columns_or_default(opt.locality_fields),
            import: opt.import,
            host: opt.host,
            port: opt.port,
            log_level: opt.log_level,
            log_format: opt.log_format,
        })
    }
}

fn locality_columns_or_default(fields: Vec<String>) -> Vec<String> {
    let fields: Vec<String> = fields
        .into_iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if fields.is_empty() {
        vec![DEFAULT_LOCALITY_COLUMN.to_string()]
    } else {
        fields
    }
}
