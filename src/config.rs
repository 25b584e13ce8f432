use std::path::PathBuf;

/// Output file written when no name is configured.
pub const DEFAULT_CSV_NAME: &str = "post-strat.csv";

/// Location of the code dictionary, relative to the working directory.
pub const DEFAULT_KEYS_PATH: &str = "util/post_strat_keys.txt";

/// Everything a cleaning run needs to know up front.
#[derive(Debug, Clone)]
pub struct Config {
    /// Raw IPUMS extract (delimited, with a header row).
    pub data: PathBuf,
    /// Where the cleaned table is written.
    pub csv_name: PathBuf,
    /// Code dictionary with one block per recoded column.
    pub keys_path: PathBuf,
}

impl Config {
    pub fn new(data: impl Into<PathBuf>) -> Self {
        Self {
            data: data.into(),
            csv_name: PathBuf::from(DEFAULT_CSV_NAME),
            keys_path: PathBuf::from(DEFAULT_KEYS_PATH),
        }
    }

    pub fn with_csv_name(mut self, csv_name: impl Into<PathBuf>) -> Self {
        self.csv_name = csv_name.into();
        self
    }

    pub fn with_keys_path(mut self, keys_path: impl Into<PathBuf>) -> Self {
        self.keys_path = keys_path.into();
        self
    }
}
