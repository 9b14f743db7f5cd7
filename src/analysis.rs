//! End-to-end analysis passes over a loaded batch of inspections

use tracing::info;

use crate::catalog::DefectCatalog;
use crate::cluster::{identify_clusters_in_inspections, Cluster};
use crate::config::{AnalysisConfig, Granularity};
use crate::cooccurrence::CoOccurrenceMatrix;
use crate::data::Inspection;
use crate::error::AnalysisError;
use crate::rules::{mine_rules, Rule};
use crate::severity::filter_clusters;

/// Clusters found in a batch and those passing the filter
#[derive(Debug, Clone)]
pub struct ClusterAnalysis {
    pub clusters: Vec<Cluster>,
    pub retained: Vec<Cluster>,
}

/// Identify clusters in every inspection, then filter by size and severity
pub fn analyze_clusters<C>(
    inspections: &[Inspection],
    config: &AnalysisConfig,
    catalog: &C,
) -> Result<ClusterAnalysis, AnalysisError>
where
    C: DefectCatalog + ?Sized,
{
    config.validate()?;

    let clusters =
        identify_clusters_in_inspections(inspections, config.gap_threshold, config.member_shape);
    let retained = filter_clusters(&clusters, catalog, &config.filter_criteria())?;

    info!(
        inspections = inspections.len(),
        clusters = clusters.len(),
        retained = retained.len(),
        "Cluster analysis complete"
    );
    Ok(ClusterAnalysis { clusters, retained })
}

/// Transactions and rules of one mining run
#[derive(Debug, Clone)]
pub struct RuleMining {
    pub matrix: CoOccurrenceMatrix,
    pub rules: Vec<Rule>,
}

/// Build transactions over the active category's vocabulary and mine rules.
///
/// With [`Granularity::Cluster`] each cluster, found with
/// `rules_gap_threshold`, is a transaction, optionally filtered first when
/// `filter_before_mining` is set. With
/// [`Granularity::Inspection`] each inspection is one transaction and no
/// clustering takes place.
pub fn mine_defect_rules<C>(
    inspections: &[Inspection],
    config: &AnalysisConfig,
    catalog: &C,
) -> Result<RuleMining, AnalysisError>
where
    C: DefectCatalog + ?Sized,
{
    config.validate()?;
    let vocabulary = catalog.codes(config.active_category);

    let matrix = match config.granularity {
        Granularity::Inspection => CoOccurrenceMatrix::from_inspections(inspections, &vocabulary),
        Granularity::Cluster => {
            let mut clusters = identify_clusters_in_inspections(
                inspections,
                config.rules_gap_threshold,
                config.member_shape,
            );
            if config.filter_before_mining {
                clusters = filter_clusters(&clusters, catalog, &config.filter_criteria())?;
            }
            CoOccurrenceMatrix::from_clusters(&clusters, &vocabulary)
        }
    };

    let rules = mine_rules(&matrix, &config.mining_thresholds());
    info!(
        transactions = matrix.n_rows(),
        codes = vocabulary.len(),
        rules = rules.len(),
        "Rule mining complete"
    );
    Ok(RuleMining { matrix, rules })
}
