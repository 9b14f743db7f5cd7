//! Analysis configuration.
//!
//! Values come from defaults, then an optional TOML file, then CLI flags,
//! and are validated once before any data is read.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::catalog::DefectCategory;
use crate::cluster::MemberShape;
use crate::error::AnalysisError;
use crate::report::DEFAULT_MIN_LIFT;
use crate::rules::MiningThresholds;
use crate::severity::{FilterCriteria, DEFAULT_LENGTH_FLOOR};

/// What a co-occurrence row stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    /// One transaction per cluster
    #[default]
    Cluster,
    /// One transaction per inspection
    Inspection,
}

/// Configuration for a clustering and rule-mining run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Gap along the pipe at which a cluster is closed. Default: 6.0.
    pub gap_threshold: f64,
    /// Gap used when clustering for rule mining. The large default keeps a
    /// whole inspection together as one transaction. Default: 1000.0.
    pub rules_gap_threshold: f64,
    /// Minimum members for a cluster to be retained. Default: 3.
    pub min_cluster_members: usize,
    /// Severity a retained cluster must exceed. Default: 1.0.
    pub min_severity: f64,
    /// Minimum length used as the severity denominator. Default: 3.0.
    pub length_floor: f64,
    /// Support a rule must exceed. Default: 0.001.
    pub min_support: f64,
    /// Confidence a rule must exceed. Default: 0.4.
    pub min_confidence: f64,
    /// Lift a rule must exceed to be reported as interesting. Default: 1.5.
    pub min_lift: f64,
    /// Defect codes to analyse. Default: structural.
    pub active_category: DefectCategory,
    /// Fields carried by cluster members. Default: detailed.
    pub member_shape: MemberShape,
    /// Transaction unit for rule mining. Default: cluster.
    pub granularity: Granularity,
    /// Apply the cluster filter before building transactions. Default: false.
    pub filter_before_mining: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let criteria = FilterCriteria::default();
        let thresholds = MiningThresholds::default();
        Self {
            gap_threshold: 6.0,
            rules_gap_threshold: 1000.0,
            min_cluster_members: criteria.min_members,
            min_severity: criteria.min_severity,
            length_floor: DEFAULT_LENGTH_FLOOR,
            min_support: thresholds.min_support,
            min_confidence: thresholds.min_confidence,
            min_lift: DEFAULT_MIN_LIFT,
            active_category: DefectCategory::default(),
            member_shape: MemberShape::default(),
            granularity: Granularity::default(),
            filter_before_mining: false,
        }
    }
}

impl AnalysisConfig {
    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse analysis config")?;
        Ok(config)
    }

    /// Load a TOML config file
    pub fn from_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Check every value is within its allowed range
    pub fn validate(&self) -> Result<(), AnalysisError> {
        for (name, value) in [
            ("gap_threshold", self.gap_threshold),
            ("rules_gap_threshold", self.rules_gap_threshold),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(AnalysisError::invalid_config(format!(
                    "{name} must be a finite value > 0, got {value}"
                )));
            }
        }
        if self.min_cluster_members < 1 {
            return Err(AnalysisError::invalid_config(
                "min_cluster_members must be >= 1",
            ));
        }
        if !self.min_severity.is_finite() {
            return Err(AnalysisError::invalid_config("min_severity must be finite"));
        }
        if !(self.length_floor.is_finite() && self.length_floor > 0.0) {
            return Err(AnalysisError::invalid_config(format!(
                "length_floor must be a finite value > 0, got {}",
                self.length_floor
            )));
        }
        for (name, value) in [
            ("min_support", self.min_support),
            ("min_confidence", self.min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(AnalysisError::invalid_config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if !self.min_lift.is_finite() {
            return Err(AnalysisError::invalid_config("min_lift must be finite"));
        }
        Ok(())
    }

    pub fn filter_criteria(&self) -> FilterCriteria {
        FilterCriteria {
            min_members: self.min_cluster_members,
            min_severity: self.min_severity,
            length_floor: self.length_floor,
        }
    }

    pub fn mining_thresholds(&self) -> MiningThresholds {
        MiningThresholds {
            min_support: self.min_support,
            min_confidence: self.min_confidence,
        }
    }
}
