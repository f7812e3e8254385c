//! Record file loading and validation.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::model::BidRecord;
use crate::error::SourceError;

/// Supported record file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Yaml,
    Json,
}

impl RecordFormat {
    /// Detects the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some(other) => Err(SourceError::UnsupportedFormat(other.to_string())),
            None => Err(SourceError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RecordFile {
    #[serde(default)]
    records: Vec<BidRecord>,
}

/// Reads and validates a record file.
pub async fn load_records(path: &Path) -> Result<Vec<BidRecord>, SourceError> {
    let format = RecordFormat::from_path(path)?;
    let content = tokio::fs::read_to_string(path).await?;
    parse_records(&content, format, path)
}

/// Parses record file content.
///
/// `origin` is only used in error messages.
pub fn parse_records(
    content: &str,
    format: RecordFormat,
    origin: &Path,
) -> Result<Vec<BidRecord>, SourceError> {
    let file: RecordFile = match format {
        RecordFormat::Yaml => serde_yaml::from_str(content)
            .map_err(|e| SourceError::parse(origin, e.to_string()))?,
        RecordFormat::Json => serde_json::from_str(content)
            .map_err(|e| SourceError::parse(origin, e.to_string()))?,
    };

    validate(&file.records)?;
    Ok(file.records)
}

fn validate(records: &[BidRecord]) -> Result<(), SourceError> {
    let mut seen = HashSet::with_capacity(records.len());

    for record in records {
        if record.id.trim().is_empty() {
            return Err(SourceError::InvalidData("record with empty id".into()));
        }
        if !seen.insert(record.id.as_str()) {
            return Err(SourceError::InvalidData(format!(
                "duplicate record id '{}'",
                record.id
            )));
        }
        if !record.value.is_finite() || record.value < 0.0 {
            return Err(SourceError::InvalidData(format!(
                "record '{}' has invalid value {}",
                record.id, record.value
            )));
        }
        if record.decided_on.is_some() && record.cycle_days().is_none() {
            tracing::warn!(
                id = %record.id,
                "Record decided before it was submitted, cycle time ignored"
            );
        }
    }

    Ok(())
}
