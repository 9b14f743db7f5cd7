//! Command-line interface definitions and argument parsing

use clap::{Parser, Subcommand};

use crate::catalog::DefectCategory;
use crate::cluster::MemberShape;
use crate::config::{AnalysisConfig, Granularity};

/// Sewer inspection defect clustering and association rule mining on PACP data
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the PACP condition database CSV
    #[arg(short, long)]
    pub input: String,

    /// Optional TOML analysis config; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// Defect category to analyse: all, structural or operational
    #[arg(long)]
    pub category: Option<String>,

    /// Distance gap that closes a cluster; applies to the rules pass when
    /// given with the `rules` subcommand
    #[arg(short, long)]
    pub gap_threshold: Option<f64>,

    /// Fields carried by cluster members: compact or detailed
    #[arg(long, value_parser = parse_member_shape)]
    pub member_shape: Option<MemberShape>,

    /// Print results as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Identify and filter defect clusters
    Clusters {
        /// Minimum number of defects in a retained cluster
        #[arg(long)]
        min_members: Option<usize>,

        /// Severity a retained cluster must exceed
        #[arg(long)]
        min_severity: Option<f64>,

        /// Minimum length used as the severity denominator
        #[arg(long)]
        length_floor: Option<f64>,
    },
    /// Mine association rules between co-occurring defect codes
    Rules {
        /// Support a rule must exceed
        #[arg(long)]
        min_support: Option<f64>,

        /// Confidence a rule must exceed
        #[arg(long)]
        min_confidence: Option<f64>,

        /// Lift a rule must exceed to be reported
        #[arg(long)]
        min_lift: Option<f64>,

        /// Transaction unit: cluster or inspection
        #[arg(long, value_parser = parse_granularity)]
        granularity: Option<Granularity>,

        /// Filter clusters by size and severity before mining
        #[arg(long)]
        filter_clusters: bool,
    },
}

impl Args {
    /// Build the effective config: file (or defaults), then flag overrides.
    ///
    /// The result is validated, and an unknown category fails here before
    /// any data is read.
    pub fn resolve_config(&self) -> crate::Result<AnalysisConfig> {
        let mut config = match &self.config {
            Some(path) => AnalysisConfig::from_file(path)?,
            None => AnalysisConfig::default(),
        };

        if let Some(category) = &self.category {
            config.active_category = category.parse::<DefectCategory>()?;
        }
        if let Some(gap_threshold) = self.gap_threshold {
            match self.command {
                Command::Clusters { .. } => config.gap_threshold = gap_threshold,
                Command::Rules { .. } => config.rules_gap_threshold = gap_threshold,
            }
        }
        if let Some(shape) = self.member_shape {
            config.member_shape = shape;
        }

        match &self.command {
            Command::Clusters {
                min_members,
                min_severity,
                length_floor,
            } => {
                if let Some(v) = *min_members {
                    config.min_cluster_members = v;
                }
                if let Some(v) = *min_severity {
                    config.min_severity = v;
                }
                if let Some(v) = *length_floor {
                    config.length_floor = v;
                }
            }
            Command::Rules {
                min_support,
                min_confidence,
                min_lift,
                granularity,
                filter_clusters,
            } => {
                if let Some(v) = *min_support {
                    config.min_support = v;
                }
                if let Some(v) = *min_confidence {
                    config.min_confidence = v;
                }
                if let Some(v) = *min_lift {
                    config.min_lift = v;
                }
                if let Some(v) = *granularity {
                    config.granularity = v;
                }
                if *filter_clusters {
                    config.filter_before_mining = true;
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_member_shape(value: &str) -> Result<MemberShape, String> {
    match value.to_ascii_lowercase().as_str() {
        "compact" => Ok(MemberShape::Compact),
        "detailed" => Ok(MemberShape::Detailed),
        _ => Err(format!("expected compact or detailed, got '{value}'")),
    }
}

fn parse_granularity(value: &str) -> Result<Granularity, String> {
    match value.to_ascii_lowercase().as_str() {
        "cluster" => Ok(Granularity::Cluster),
        "inspection" => Ok(Granularity::Inspection),
        _ => Err(format!("expected cluster or inspection, got '{value}'")),
    }
}
