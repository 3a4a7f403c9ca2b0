//! Console previews and the JSON run report.
//!
//! Previews show the first rows of a derived table as a pipe table with
//! numeric columns right-aligned, or as a JSON array.

use crate::models::{PreviewFormat, RunReport, SummaryRow};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// Render the preview block for a table written to `path`.
pub fn generate_preview<R: SummaryRow>(
    path: &Path,
    rows: &[R],
    limit: usize,
    format: PreviewFormat,
) -> Result<String> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let head = &rows[..rows.len().min(limit)];

    let body = match format {
        PreviewFormat::Markdown => generate_markdown_table(head),
        PreviewFormat::Json => serde_json::to_string_pretty(head)
            .with_context(|| format!("Failed to render preview of {}", name))?,
    };

    Ok(format!("--- {} (Preview) ---\n{}", name, body))
}

/// Render rows as a pipe table.
pub fn generate_markdown_table<R: SummaryRow>(rows: &[R]) -> String {
    let cells: Vec<Vec<String>> = rows.iter().map(SummaryRow::fields).collect();

    let columns: Vec<(usize, bool)> = R::HEADERS
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let width = cells
                .iter()
                .filter_map(|row| row.get(i))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0);
            let numeric = !cells.is_empty()
                && cells
                    .iter()
                    .filter_map(|row| row.get(i))
                    .all(|cell| Decimal::from_str(cell).is_ok());
            (width, numeric)
        })
        .collect();

    let mut table = String::new();

    let header: Vec<String> = R::HEADERS.iter().map(|h| h.to_string()).collect();
    table.push_str(&markdown_row(&header, &columns));

    table.push('|');
    for &(width, numeric) in &columns {
        if numeric {
            table.push_str(&format!("{}:|", "-".repeat(width + 1)));
        } else {
            table.push_str(&format!(":{}|", "-".repeat(width + 1)));
        }
    }
    table.push('\n');

    for row in &cells {
        table.push_str(&markdown_row(row, &columns));
    }

    table
}

fn markdown_row(cells: &[String], columns: &[(usize, bool)]) -> String {
    let mut line = String::from("|");

    for (cell, &(width, numeric)) in cells.iter().zip(columns) {
        if numeric {
            line.push_str(&format!(" {:>width$} |", cell, width = width));
        } else {
            line.push_str(&format!(" {:<width$} |", cell, width = width));
        }
    }

    line.push('\n');
    line
}

/// Generate a JSON run report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write a JSON run report to a file.
pub fn write_json_report(report: &RunReport, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write run report to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        DateAverage, PlatformTypeAverage, RoundingMode, RunMetadata, TableSummary,
    };
    use chrono::{NaiveDate, Utc};
    use tempfile::TempDir;

    fn platform_rows(n: usize) -> Vec<PlatformTypeAverage> {
        (0..n)
            .map(|i| PlatformTypeAverage {
                platform: format!("Platform{}", i),
                post_type: "Video".to_string(),
                avg_likes: RoundingMode::HalfEven.round(Decimal::from(i * 100)),
            })
            .collect()
    }

    #[test]
    fn test_markdown_table_layout() {
        let rows = vec![PlatformTypeAverage {
            platform: "TikTok".to_string(),
            post_type: "Video".to_string(),
            avg_likes: RoundingMode::HalfEven.round(Decimal::from(150)),
        }];

        let table = generate_markdown_table(&rows);
        assert_eq!(
            table,
            "| Platform | PostType | AvgLikes |\n\
             |:---------|:---------|---------:|\n\
             | TikTok   | Video    |   150.00 |\n"
        );
    }

    #[test]
    fn test_markdown_dates_are_left_aligned() {
        let rows = vec![DateAverage {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            avg_likes: RoundingMode::HalfEven.round(Decimal::from(100)),
        }];

        let table = generate_markdown_table(&rows);
        assert!(table.contains("|:-----------|---------:|"));
        assert!(table.contains("| 2024-01-01 |   100.00 |"));
    }

    #[test]
    fn test_markdown_empty_table() {
        let rows: Vec<DateAverage> = Vec::new();
        let table = generate_markdown_table(&rows);
        assert_eq!(table, "| Date | AvgLikes |\n|:-----|:---------|\n");
    }

    #[test]
    fn test_preview_limits_rows() {
        let rows = platform_rows(8);
        let preview = generate_preview(
            Path::new("out/socialMediaAvg.csv"),
            &rows,
            5,
            PreviewFormat::Markdown,
        )
        .unwrap();

        assert!(preview.starts_with("--- socialMediaAvg.csv (Preview) ---\n"));
        assert!(preview.contains("Platform4"));
        assert!(!preview.contains("Platform5"));
    }

    #[test]
    fn test_preview_json() {
        let rows = platform_rows(3);
        let preview =
            generate_preview(Path::new("avg.csv"), &rows, 2, PreviewFormat::Json).unwrap();

        let body = preview.split_once('\n').unwrap().1;
        let parsed: serde_json::Value = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.as_array().map(|a| a.len()), Some(2));
        assert_eq!(parsed[1]["AvgLikes"], "100.00");
    }

    #[test]
    fn test_write_json_report() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("run.json");
        let report = RunReport {
            metadata: RunMetadata {
                input: "socialMedia.csv".to_string(),
                rows_read: 2,
                generated_at: Utc::now(),
                duration_seconds: 0.01,
                rounding: RoundingMode::HalfEven,
                dry_run: false,
            },
            tables: vec![TableSummary {
                name: "platform_type".to_string(),
                path: Some("socialMediaAvg.csv".to_string()),
                rows: 1,
            }],
        };

        write_json_report(&report, &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"rows_read\": 2"));
        assert!(json.contains("\"rounding\": \"half-even\""));
        assert!(json.contains("\"platform_type\""));
    }
}
