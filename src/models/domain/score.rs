use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::{AppError, AppResult};

pub const META_REQUIRES_MANUAL_GRADING: &str = "requires_manual_grading";
pub const META_GRADING_STATUS: &str = "grading_status";

/// Whether a score is final or still waiting for a person to grade it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScoreStatus {
    #[default]
    Graded,
    PendingManualGrading,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize, JsonSchema)]
pub struct Score {
    points: f64,
    max_points: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    breakdown: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    metadata: BTreeMap<String, Value>,
    #[serde(default)]
    status: ScoreStatus,
}

impl Score {
    pub fn new(points: f64, max_points: f64) -> AppResult<Self> {
        if !points.is_finite() || !max_points.is_finite() {
            return Err(AppError::ValidationError(
                "Score values must be finite numbers".to_string(),
            ));
        }
        if max_points < 0.0 {
            return Err(AppError::ValidationError(format!(
                "Max points cannot be negative, got {}",
                max_points
            )));
        }
        if points < 0.0 || points > max_points {
            return Err(AppError::ValidationError(format!(
                "Points {} must be within [0, {}]",
                points, max_points
            )));
        }

        Ok(Score {
            points,
            max_points,
            breakdown: BTreeMap::new(),
            metadata: BTreeMap::new(),
            status: ScoreStatus::Graded,
        })
    }

    pub fn zero(max_points: f64) -> Self {
        Score {
            points: 0.0,
            max_points: max_points.max(0.0),
            breakdown: BTreeMap::new(),
            metadata: BTreeMap::new(),
            status: ScoreStatus::Graded,
        }
    }

    pub fn full(max_points: f64) -> Self {
        let max_points = max_points.max(0.0);
        Score {
            points: max_points,
            ..Self::zero(max_points)
        }
    }

    /// Builds a score from a fraction of the maximum, saturating to [0, 1].
    pub fn from_fraction(fraction: f64, max_points: f64) -> Self {
        let max_points = max_points.max(0.0);
        let fraction = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };
        let points = round2(fraction * max_points).min(max_points);
        Score {
            points,
            ..Self::zero(max_points)
        }
    }

    /// Zero-point score awaiting manual grading.
    pub fn pending_manual_grading(max_points: f64) -> Self {
        Self::zero(max_points)
            .with_status(ScoreStatus::PendingManualGrading)
            .with_metadata(META_REQUIRES_MANUAL_GRADING, Value::Bool(true))
            .with_metadata(META_GRADING_STATUS, Value::String("pending".to_string()))
    }

    pub fn with_breakdown(mut self, component: &str, value: f64) -> Self {
        self.breakdown.insert(component.to_string(), value);
        self
    }

    pub fn with_metadata(mut self, key: &str, value: Value) -> Self {
        self.metadata.insert(key.to_string(), value);
        self
    }

    fn with_status(mut self, status: ScoreStatus) -> Self {
        self.status = status;
        self
    }

    pub fn points(&self) -> f64 {
        self.points
    }

    pub fn max_points(&self) -> f64 {
        self.max_points
    }

    pub fn breakdown(&self) -> &BTreeMap<String, f64> {
        &self.breakdown
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn status(&self) -> ScoreStatus {
        self.status
    }

    pub fn percentage(&self) -> f64 {
        if self.max_points == 0.0 {
            return 0.0;
        }
        self.points / self.max_points * 100.0
    }

    pub fn is_pending_manual_grading(&self) -> bool {
        self.status == ScoreStatus::PendingManualGrading
            || self
                .metadata
                .get(META_REQUIRES_MANUAL_GRADING)
                .and_then(Value::as_bool)
                .unwrap_or(false)
    }

    /// Full credit on a graded, non-empty score.
    pub fn is_full_credit(&self) -> bool {
        !self.is_pending_manual_grading()
            && self.max_points > 0.0
            && self.points >= self.max_points - f64::EPSILON
    }
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
