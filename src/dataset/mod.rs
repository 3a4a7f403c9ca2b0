//! Input table loading.
//!
//! This module reads the delimited posts table, resolves the required
//! columns by header name and turns every data row into a [`PostRecord`].

use crate::error::{SummaryError, SummaryResult};
use crate::models::PostRecord;
use csv::{ReaderBuilder, StringRecord};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const PLATFORM_COLUMN: &str = "Platform";
pub const POST_TYPE_COLUMN: &str = "PostType";
pub const LIKES_COLUMN: &str = "Likes";
pub const TIMESTAMP_COLUMN: &str = "PostTimestamp";
pub const AGE_GROUP_COLUMN: &str = "AgeGroup";

/// Columns every input table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    PLATFORM_COLUMN,
    POST_TYPE_COLUMN,
    LIKES_COLUMN,
    TIMESTAMP_COLUMN,
];

/// Rows between spinner refreshes.
const PROGRESS_TICK_ROWS: u64 = 10_000;

/// Options for reading the input table.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Field delimiter byte.
    pub delimiter: u8,
    /// Show a spinner on stderr while reading.
    pub show_progress: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            show_progress: false,
        }
    }
}

impl From<&crate::config::InputConfig> for LoadOptions {
    fn from(config: &crate::config::InputConfig) -> Self {
        Self {
            delimiter: config.delimiter_byte(),
            show_progress: false,
        }
    }
}

/// Positions of the known columns within a header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ColumnIndex {
    platform: usize,
    post_type: usize,
    likes: usize,
    post_timestamp: usize,
    age_group: Option<usize>,
}

impl ColumnIndex {
    /// Resolve columns by name, reporting every missing one at once.
    fn resolve(headers: &[String]) -> SummaryResult<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);

        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|&&name| find(name).is_none())
            .map(|name| name.to_string())
            .collect();

        match (
            find(PLATFORM_COLUMN),
            find(POST_TYPE_COLUMN),
            find(LIKES_COLUMN),
            find(TIMESTAMP_COLUMN),
        ) {
            (Some(platform), Some(post_type), Some(likes), Some(post_timestamp)) => Ok(Self {
                platform,
                post_type,
                likes,
                post_timestamp,
                age_group: find(AGE_GROUP_COLUMN),
            }),
            _ => Err(SummaryError::Schema { missing }),
        }
    }

    fn record(&self, row: &StringRecord, line: u64) -> PostRecord {
        let cell = |idx: usize| row.get(idx).unwrap_or_default().to_string();

        PostRecord {
            line,
            platform: cell(self.platform),
            post_type: cell(self.post_type),
            likes: cell(self.likes),
            post_timestamp: cell(self.post_timestamp),
            age_group: self.age_group.map(cell),
        }
    }
}

/// The loaded posts table.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Where the rows came from.
    pub source: PathBuf,
    /// Normalised header names, in file order.
    pub headers: Vec<String>,
    /// One record per data row.
    pub records: Vec<PostRecord>,
    has_age_group: bool,
}

impl Dataset {
    /// Load a dataset from a file on disk.
    pub fn load(path: &Path, options: &LoadOptions) -> SummaryResult<Self> {
        if !path.exists() {
            return Err(SummaryError::FileNotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => SummaryError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => SummaryError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;

        info!("Loading posts from {}", path.display());
        Self::from_reader(file, path, options)
    }

    /// Load a dataset from any reader. `source` is only used for messages.
    pub fn from_reader<R: Read>(
        reader: R,
        source: &Path,
        options: &LoadOptions,
    ) -> SummaryResult<Self> {
        let csv_error = |err: csv::Error| SummaryError::Csv {
            path: source.to_path_buf(),
            source: err,
        };

        let mut reader = ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(normalize_header)
            .collect();
        debug!("Header columns: {:?}", headers);

        let columns = ColumnIndex::resolve(&headers)?;

        let spinner = if options.show_progress && io::stderr().is_terminal() {
            Some(loading_spinner())
        } else {
            None
        };

        let mut records = Vec::new();
        let mut row = StringRecord::new();

        while reader.read_record(&mut row).map_err(csv_error)? {
            let line = row
                .position()
                .map(|pos| pos.line())
                .unwrap_or(records.len() as u64 + 2);
            records.push(columns.record(&row, line));

            if let Some(ref pb) = spinner {
                if records.len() as u64 % PROGRESS_TICK_ROWS == 0 {
                    pb.set_message(format!("{} rows", records.len()));
                }
            }
        }

        if let Some(pb) = spinner {
            pb.finish_and_clear();
        }

        info!("Loaded {} rows", records.len());

        Ok(Self {
            source: source.to_path_buf(),
            headers,
            records,
            has_age_group: columns.age_group.is_some(),
        })
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the input carried an `AgeGroup` column.
    pub fn has_age_group(&self) -> bool {
        self.has_age_group
    }
}

/// Strip a UTF-8 byte order mark and surrounding whitespace from a header.
fn normalize_header(name: &str) -> String {
    name.trim_start_matches('\u{feff}').trim().to_string()
}

fn loading_spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] Reading posts... {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    fn load_str(csv: &str) -> SummaryResult<Dataset> {
        Dataset::from_reader(
            csv.as_bytes(),
            Path::new("posts.csv"),
            &LoadOptions::default(),
        )
    }

    #[test]
    fn test_load_resolves_columns_in_any_order() {
        let dataset = load_str(
            "PostTimestamp,Likes,Extra,PostType,Platform\n\
             2024-01-01T10:00:00,100,x,Video,TikTok\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 1);
        let record = &dataset.records[0];
        assert_eq!(record.platform, "TikTok");
        assert_eq!(record.post_type, "Video");
        assert_eq!(record.likes, "100");
        assert_eq!(record.post_timestamp, "2024-01-01T10:00:00");
        assert_eq!(record.age_group, None);
        assert_eq!(record.line, 2);
        assert!(!dataset.has_age_group());
    }

    #[test]
    fn test_load_reports_all_missing_columns() {
        let err = load_str("Platform,Comments\nTwitter,3\n").unwrap_err();
        match err {
            SummaryError::Schema { missing } => {
                assert_eq!(missing, vec!["PostType", "Likes", "PostTimestamp"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_load_header_only() {
        let dataset = load_str("Platform,PostType,Likes,PostTimestamp\n").unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_load_strips_bom_and_whitespace() {
        let dataset = load_str(
            "\u{feff}Platform, PostType ,Likes,PostTimestamp,AgeGroup\n\
             Instagram,Image,12,2024-02-01 08:00:00,18-24\n",
        )
        .unwrap();

        assert!(dataset.has_age_group());
        assert_eq!(dataset.headers[0], "Platform");
        assert_eq!(dataset.headers[1], "PostType");
        assert_eq!(dataset.records[0].age_group.as_deref(), Some("18-24"));
    }

    #[test]
    fn test_load_custom_delimiter() {
        let options = LoadOptions {
            delimiter: b';',
            show_progress: false,
        };
        let dataset = Dataset::from_reader(
            "Platform;PostType;Likes;PostTimestamp\nTwitter;Text;5;2024-01-01\n".as_bytes(),
            Path::new("posts.csv"),
            &options,
        )
        .unwrap();

        assert_eq!(dataset.records[0].platform, "Twitter");
        assert_eq!(dataset.records[0].likes, "5");
    }

    #[test]
    fn test_load_ragged_row_is_csv_error() {
        let err = load_str("Platform,PostType,Likes,PostTimestamp\nTwitter,Text,5\n").unwrap_err();
        assert!(matches!(err, SummaryError::Csv { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope.csv");
        let err = Dataset::load(&path, &LoadOptions::default()).unwrap_err();
        assert!(matches!(err, SummaryError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_from_disk() {
        let mut tmp = NamedTempFile::new().unwrap();
        write!(
            tmp,
            "Platform,PostType,Likes,PostTimestamp\nTwitter,Image,10,2024-03-05T23:59:00\n"
        )
        .unwrap();

        let dataset = Dataset::load(tmp.path(), &LoadOptions::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.source, tmp.path());
    }

    #[test]
    fn test_load_fixture() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/socialMedia.csv");
        let dataset = Dataset::load(&path, &LoadOptions::default()).unwrap();
        assert!(dataset.has_age_group());
        assert_eq!(dataset.len(), 12);
    }
}
