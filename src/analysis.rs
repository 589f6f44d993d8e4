use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chart::{ChartKind, ChartPayload, ChartSpec, build_chart_data};
use crate::dataset::{ColumnClassification, Dataset};
use crate::error::AnalyticsError;

/// Lifecycle state of an analysis record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordStatus {
    /// Stored without a chart payload; axes were missing or unusable.
    Unconfigured,

    /// A chart payload is present and matches the stored axis mapping.
    Configured,
}

/// The persisted document for one uploaded file.
///
/// Folds the upload's metadata, the parsed rows, the column
/// classification and the current chart configuration into a single
/// JSON document. The record id doubles as the file id; the raw upload
/// bytes live next to it in the store under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Record id, also used to address the stored upload bytes.
    pub id: String,

    /// Owning user's id.
    pub user_id: String,

    /// Original filename as uploaded.
    pub filename: String,

    /// Upload size in bytes.
    pub file_size: u64,

    /// MIME type reported by the client.
    pub mime_type: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// The parsed sheet rows, verbatim.
    pub raw_data: Dataset,

    /// Column set of the sheet, in sheet order.
    pub available_columns: Vec<String>,

    /// Numeric/text partition of the column set.
    pub classification: ColumnClassification,

    pub chart_type: ChartKind,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub z_axis: Option<String>,

    /// The built payload, absent while unconfigured.
    pub chart_data: Option<ChartPayload>,

    pub status: RecordStatus,
}

/// Axis hints supplied alongside an upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadAxes {
    pub chart_type: Option<ChartKind>,
    pub x_axis: Option<String>,
    pub y_axis: Option<String>,
    pub z_axis: Option<String>,
}

impl AnalysisRecord {
    /// Create a record for a freshly parsed upload.
    ///
    /// Axis selection: request-supplied axes win; otherwise the first
    /// two numeric columns serve as defaults. If the resulting mapping
    /// does not validate against the column set, the record is stored
    /// `unconfigured` with no payload. Either way the upload succeeds;
    /// the caller reports which of the two outcomes happened.
    pub fn create(
        user_id: &str,
        filename: &str,
        file_size: u64,
        mime_type: &str,
        dataset: Dataset,
        axes: UploadAxes,
    ) -> Self {
        let classification = dataset.classify();
        let available_columns = dataset.columns();

        let chart_type = axes.chart_type.unwrap_or(ChartKind::Bar);
        let x_axis = axes
            .x_axis
            .or_else(|| classification.numeric_columns.first().cloned());
        let y_axis = axes
            .y_axis
            .or_else(|| classification.numeric_columns.get(1).cloned());
        let z_axis = axes.z_axis;

        let now = Utc::now();
        let mut record = AnalysisRecord {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            filename: filename.to_string(),
            file_size,
            mime_type: mime_type.to_string(),
            created_at: now,
            updated_at: now,
            raw_data: dataset,
            available_columns,
            classification,
            chart_type,
            x_axis,
            y_axis,
            z_axis,
            chart_data: None,
            status: RecordStatus::Unconfigured,
        };

        if let Some(spec) = record.chart_spec() {
            if let Ok(payload) = build_chart_data(&record.raw_data, &spec) {
                record.chart_data = Some(payload);
                record.status = RecordStatus::Configured;
            }
        }

        record
    }

    /// The current axis mapping, if both primary axes are set.
    pub fn chart_spec(&self) -> Option<ChartSpec> {
        match (&self.x_axis, &self.y_axis) {
            (Some(x), Some(y)) => Some(ChartSpec {
                kind: self.chart_type,
                x_axis: x.clone(),
                y_axis: y.clone(),
                z_axis: self.z_axis.clone(),
            }),
            _ => None,
        }
    }

    /// Replace the chart configuration and rebuild the payload.
    ///
    /// All-or-nothing: the payload is built first, and the record is
    /// only mutated once the new mapping validated. On error the record
    /// is exactly as it was.
    ///
    /// # Errors
    /// * `AnalyticsError::InvalidAxis` when a requested column is not
    ///   in `available_columns`
    pub fn configure(&mut self, spec: ChartSpec) -> Result<(), AnalyticsError> {
        let payload = build_chart_data(&self.raw_data, &spec)?;

        self.chart_type = spec.kind;
        self.x_axis = Some(spec.x_axis);
        self.y_axis = Some(spec.y_axis);
        self.z_axis = spec.z_axis;
        self.chart_data = Some(payload);
        self.status = RecordStatus::Configured;
        self.updated_at = Utc::now();

        Ok(())
    }

    /// First `n` rows, for previews.
    pub fn sample(&self, n: usize) -> Vec<crate::dataset::Row> {
        self.raw_data.rows.iter().take(n).cloned().collect()
    }
}
