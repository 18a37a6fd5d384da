use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// InteractionRecord: one (person, photo) detection
// ---------------------------------------------------------------------------

/// A single tagged-photo detection: one person identified in one photo at one
/// point in time, with the face's bounding box in the frame.
///
/// Several records can share a `filename` (that is the co-occurrence signal),
/// and several records can share a `timestamp`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionRecord {
    /// Person identifier. The input column is named `class` because the data
    /// comes from an object-detection pipeline.
    pub person: String,
    /// Photo the person was detected in.
    pub filename: String,
    /// When the photo was taken.
    pub timestamp: DateTime<Utc>,
    /// Where in the photo the face was found.
    pub bbox: BoundingBox,
    /// Optional free-text note attached to the detection.
    #[serde(default)]
    pub description: Option<String>,
}

impl InteractionRecord {
    /// Create a record with a zeroed bounding box and no description.
    /// Mostly useful for tests and synthetic data.
    pub fn new(
        person: impl Into<String>,
        filename: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            person: person.into(),
            filename: filename.into(),
            timestamp,
            bbox: BoundingBox::default(),
            description: None,
        }
    }

    /// Set the bounding box.
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = bbox;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Axis-aligned bounding box in pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    pub fn width(&self) -> f64 {
        (self.xmax - self.xmin).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.ymax - self.ymin).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// ManitoRecord: one directed assignment in the gift-exchange table
// ---------------------------------------------------------------------------

/// One row of the manito table: `from` was the secret friend of `to`.
/// Rows are ordered; the dashboard reveals them one at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManitoRecord {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub description: String,
}
