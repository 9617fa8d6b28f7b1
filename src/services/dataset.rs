// src/services/dataset.rs
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::UploadError;
use crate::message::{PreviewRow, UploadResponse};

/// Extensions offered by the file picker. Advisory only: anything else is
/// still uploaded.
pub const ACCEPTED_EXTENSIONS: &[&str] = &["sav", "csv", "xlsx", "xls"];

/// Server-issued handle for an uploaded file, plus what the server told us
/// about it. Replaced wholesale by every successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub dataset_id: String,
    pub filename: String,
    #[serde(default)]
    pub preview_rows: Vec<PreviewRow>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

impl DatasetDescriptor {
    /// Accept a 2xx upload body. A missing or blank `dataset_id` is an error
    /// even though the transport succeeded.
    pub fn from_response(
        response: UploadResponse,
        uploaded_name: &str,
    ) -> Result<Self, UploadError> {
        let dataset_id = response
            .dataset_id
            .filter(|id| !id.trim().is_empty())
            .ok_or(UploadError::MissingDatasetId)?;

        Ok(Self {
            dataset_id,
            filename: response
                .filename
                .unwrap_or_else(|| uploaded_name.to_string()),
            preview_rows: response.preview_rows.unwrap_or_default(),
            metadata: response.metadata,
        })
    }

    /// Usable as a chat target.
    pub fn is_usable(&self) -> bool {
        !self.dataset_id.trim().is_empty()
    }

    /// Union of the preview columns, in first-seen order.
    pub fn columns(&self) -> Vec<&str> {
        let mut columns: Vec<&str> = Vec::new();
        for row in &self.preview_rows {
            for key in row.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
        columns
    }

    /// Plain-text table of the preview rows.
    pub fn render_preview(&self) -> String {
        let columns = self.columns();
        if columns.is_empty() {
            return "(no preview rows)".to_string();
        }

        let cells: Vec<Vec<String>> = self
            .preview_rows
            .iter()
            .map(|row| {
                columns
                    .iter()
                    .map(|col| row.get(*col).map(scalar_text).unwrap_or_default())
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                cells
                    .iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(col.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut lines = Vec::with_capacity(cells.len() + 2);
        lines.push(format_row(columns.iter().copied(), &widths));
        lines.push(
            widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-"),
        );
        for row in &cells {
            lines.push(format_row(row.iter().map(String::as_str), &widths));
        }
        lines.join("\n")
    }

    /// `key: value` lines for the metadata block, if there is one.
    pub fn render_metadata(&self) -> Option<String> {
        let metadata = self.metadata.as_ref().filter(|m| !m.is_empty())?;
        Some(
            metadata
                .iter()
                .map(|(key, value)| format!("{key}: {}", scalar_text(value)))
                .collect::<Vec<_>>()
                .join("\n"),
        )
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths.iter().copied())
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rough family of an uploaded file, by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Spss,
    Script,
    Other,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("csv" | "xlsx" | "xls") => Self::Spreadsheet,
            Some("sav") => Self::Spss,
            Some("py" | "r") => Self::Script,
            _ => Self::Other,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Spreadsheet => "spreadsheet",
            Self::Spss => "SPSS data",
            Self::Script => "script",
            Self::Other => "file",
        }
    }

    /// MIME type sent with the multipart part.
    pub fn mime_type(self, path: &Path) -> &'static str {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match (self, extension.as_deref()) {
            (Self::Spreadsheet, Some("csv")) => "text/csv",
            (Self::Spreadsheet, Some("xlsx")) => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            (Self::Spreadsheet, _) => "application/vnd.ms-excel",
            (Self::Spss, _) => "application/x-spss-sav",
            (Self::Script, _) => "text/plain",
            (Self::Other, _) => "application/octet-stream",
        }
    }
}

pub fn is_accepted(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(ext))
        })
        .unwrap_or(false)
}
