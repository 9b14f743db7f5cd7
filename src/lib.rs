//! DefectForge: clustering and association rule mining for sewer inspection defects
//!
//! This library groups spatially-close PACP defect observations into clusters,
//! scores cluster severity from defect grades, and mines support, confidence
//! and lift rules for defect codes that occur together.

pub mod analysis;
pub mod catalog;
pub mod cli;
pub mod cluster;
pub mod config;
pub mod cooccurrence;
pub mod data;
pub mod error;
pub mod report;
pub mod rules;
pub mod severity;

// Re-export public items for easier access
pub use analysis::{analyze_clusters, mine_defect_rules, ClusterAnalysis, RuleMining};
pub use catalog::{DefectCatalog, DefectCategory, PacpCatalog};
pub use cli::{Args, Command};
pub use cluster::{identify_clusters, identify_clusters_in_inspections, Cluster, MemberShape};
pub use config::{AnalysisConfig, Granularity};
pub use cooccurrence::{CoOccurrenceMatrix, PairCounts};
pub use data::{group_inspections, load_inspections, retain_vocabulary, DefectObservation, Inspection};
pub use error::AnalysisError;
pub use report::{
    cluster_size_histogram, interesting_rules, ClusterSizeHistogram, RulesTable, DEFAULT_MIN_LIFT,
};
pub use rules::{mine_rules, pair_metrics, MiningThresholds, PairMetrics, Rule};
pub use severity::{filter_clusters, score_cluster, FilterCriteria, SeverityScore, DEFAULT_LENGTH_FLOOR};

/// Common result type used by ingestion, configuration and the CLI
pub type Result<T> = anyhow::Result<T>;
