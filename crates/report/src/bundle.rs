//! Report Bundle Implementation

use chrono::{DateTime, Utc};
use feature_engine::{FeatureMap, Signal};
use inference_engine::{ClassificationResult, FaultClass, Severity};
use serde::Serialize;
use std::cmp::Reverse;
use tracing::info;
use uuid::Uuid;

/// Overall bearing health
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Fault,
}

impl HealthStatus {
    /// Health derived from the predicted label alone
    pub fn from_label(label: FaultClass) -> Self {
        if label.is_healthy() {
            HealthStatus::Healthy
        } else {
            HealthStatus::Fault
        }
    }
}

/// A known class with its severity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedClass {
    pub class: FaultClass,
    pub display_name: &'static str,
    pub severity: Severity,
    pub recommended_action: &'static str,
}

/// A class probability in descending rank
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedProbability {
    pub class: FaultClass,
    pub probability: f64,
}

/// Everything a renderer needs for one diagnostic report
///
/// Built once by [`ReportBundle::assemble`] and read-only afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    report_id: Uuid,
    generated_at: DateTime<Utc>,
    signal: Signal,
    duration_seconds: f64,
    features: FeatureMap,
    prediction: ClassificationResult,
    status: HealthStatus,
    diagnosis: &'static str,
    severity: Severity,
    recommended_action: &'static str,
    /// Known classes, most severe first
    severity_ranking: Vec<RankedClass>,
    /// Class probabilities, most likely first
    probability_ranking: Vec<RankedProbability>,
}

impl ReportBundle {
    /// Assemble a report for a classified signal
    pub fn assemble(signal: Signal, features: FeatureMap, prediction: ClassificationResult) -> Self {
        Self::assemble_with(Uuid::new_v4(), Utc::now(), signal, features, prediction)
    }

    fn assemble_with(
        report_id: Uuid,
        generated_at: DateTime<Utc>,
        signal: Signal,
        features: FeatureMap,
        prediction: ClassificationResult,
    ) -> Self {
        let label = prediction.label;

        let mut severity_ranking: Vec<RankedClass> = prediction
            .probabilities
            .keys()
            .map(|&class| RankedClass {
                class,
                display_name: class.display_name(),
                severity: class.severity(),
                recommended_action: class.recommended_action(),
            })
            .collect();
        severity_ranking.sort_by_key(|c| Reverse(c.severity));

        let mut probability_ranking: Vec<RankedProbability> = prediction
            .probabilities
            .iter()
            .map(|(&class, &probability)| RankedProbability { class, probability })
            .collect();
        probability_ranking.sort_by(|a, b| b.probability.total_cmp(&a.probability));

        info!(
            "Report {} assembled: {} ({:.1}% confidence)",
            report_id,
            label.display_name(),
            prediction.confidence * 100.0
        );

        Self {
            report_id,
            generated_at,
            duration_seconds: signal.duration_seconds(),
            signal,
            features,
            status: HealthStatus::from_label(label),
            diagnosis: label.display_name(),
            severity: label.severity(),
            recommended_action: label.recommended_action(),
            prediction,
            severity_ranking,
            probability_ranking,
        }
    }

    pub fn report_id(&self) -> Uuid {
        self.report_id
    }

    pub fn generated_at(&self) -> DateTime<Utc> {
        self.generated_at
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    /// Signal length in seconds
    pub fn duration_seconds(&self) -> f64 {
        self.duration_seconds
    }

    pub fn features(&self) -> &FeatureMap {
        &self.features
    }

    pub fn prediction(&self) -> &ClassificationResult {
        &self.prediction
    }

    pub fn status(&self) -> HealthStatus {
        self.status
    }

    /// Display name of the predicted class
    pub fn diagnosis(&self) -> &str {
        self.diagnosis
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn recommended_action(&self) -> &str {
        self.recommended_action
    }

    pub fn severity_ranking(&self) -> &[RankedClass] {
        &self.severity_ranking
    }

    pub fn probability_ranking(&self) -> &[RankedProbability] {
        &self.probability_ranking
    }
}
