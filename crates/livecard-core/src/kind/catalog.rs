//! Built-in activity kinds: `Counter`, `Status` and `Progress`.

use serde::Serialize;

use super::ActivityKind;
use super::schema::{FieldError, FieldReader, FieldSpec, FieldType, Schema};

// -----------------------------------------------------------------------
// Counter
// -----------------------------------------------------------------------

/// A titled integer counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Counter;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterAttributes {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterContent {
    pub value: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ActivityKind for Counter {
    const NAME: &'static str = "Counter";
    type Attributes = CounterAttributes;
    type Content = CounterContent;
}

impl Schema for CounterAttributes {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", FieldType::String),
        FieldSpec::optional("color", FieldType::String),
    ];

    fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            title: reader.required_str("title")?,
            color: reader.optional_str("color")?,
        })
    }
}

impl Schema for CounterContent {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("value", FieldType::Integer),
        FieldSpec::optional("status", FieldType::String),
    ];

    fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            value: reader.required_int("value")?,
            status: reader.optional_str("status")?,
        })
    }
}

// -----------------------------------------------------------------------
// Status
// -----------------------------------------------------------------------

/// A free-form status line with optional progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusAttributes {
    pub identifier: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusContent {
    pub status: String,
    /// Percent complete, `0..=100`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Seconds since the Unix epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl ActivityKind for Status {
    const NAME: &'static str = "Status";
    type Attributes = StatusAttributes;
    type Content = StatusContent;
}

impl Schema for StatusAttributes {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("identifier", FieldType::String),
        FieldSpec::required("title", FieldType::String),
    ];

    fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            identifier: reader.required_str("identifier")?,
            title: reader.required_str("title")?,
        })
    }
}

impl Schema for StatusContent {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("status", FieldType::String),
        FieldSpec::optional("progress", FieldType::Percent),
        FieldSpec::optional("details", FieldType::String),
        FieldSpec::optional("timestamp", FieldType::Number),
    ];

    fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            status: reader.required_str("status")?,
            progress: reader.optional_percent("progress")?,
            details: reader.optional_str("details")?,
            timestamp: reader.optional_number("timestamp")?,
        })
    }
}

// -----------------------------------------------------------------------
// Progress
// -----------------------------------------------------------------------

/// Progress toward a fixed total, e.g. "3 of 10 files".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressAttributes {
    pub title: String,
    pub total: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressContent {
    pub current: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<i64>,
}

impl ActivityKind for Progress {
    const NAME: &'static str = "Progress";
    type Attributes = ProgressAttributes;
    type Content = ProgressContent;
}

impl Schema for ProgressAttributes {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("title", FieldType::String),
        FieldSpec::required("total", FieldType::Integer),
        FieldSpec::optional("unit", FieldType::String),
    ];

    fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            title: reader.required_str("title")?,
            total: reader.required_int("total")?,
            unit: reader.optional_str("unit")?,
        })
    }
}

impl Schema for ProgressContent {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::required("current", FieldType::Integer),
        FieldSpec::optional("description", FieldType::String),
        FieldSpec::optional("percentage", FieldType::Integer),
    ];

    fn read(reader: &FieldReader<'_>) -> Result<Self, FieldError> {
        Ok(Self {
            current: reader.required_int("current")?,
            description: reader.optional_str("description")?,
            percentage: reader.optional_int("percentage")?,
        })
    }
}
