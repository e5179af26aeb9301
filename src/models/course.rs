use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A percentage metric from course reviews, bounded to [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percentage(f64);

impl Percentage {
    /// Returns `None` for NaN, infinite or out-of-range values
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && (0.0..=100.0).contains(&value)).then_some(Self(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Resolves an optional metric, falling back to `default` when the metric
    /// is absent or exactly zero.
    ///
    /// Stored zeros count as "no data" for every metric, so an easy rating of
    /// 0 scores and filters as the neutral 50.
    pub fn or_default(metric: Option<Self>, default: f64) -> f64 {
        match metric {
            Some(p) if p.0 != 0.0 => p.0,
            _ => default,
        }
    }
}

impl TryFrom<f64> for Percentage {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("percentage out of range: {}", value))
    }
}

impl From<Percentage> for f64 {
    fn from(p: Percentage) -> Self {
        p.0
    }
}

/// Display metadata for a course, returned verbatim with each recommendation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CourseInfo {
    pub url: String,
    pub useful_percentage: Option<Percentage>,
    pub easy_percentage: Option<Percentage>,
    pub liked_percentage: Option<Percentage>,
    pub course_description: String,
    /// Raw reviews as stored in the catalog, including non-text entries
    pub reviews: Vec<Value>,
}

/// A scorable course: one that has a content embedding
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub code: String,
    pub embedding: Vec<f32>,
    pub info: CourseInfo,
    /// Mean embedding of the course's substantive reviews, if it has any
    pub review_embedding: Option<Vec<f32>>,
}

/// Normalizes a user- or catalog-supplied course code for lookups
pub fn normalize_course_code(raw: &str) -> String {
    raw.to_uppercase()
}
