//! Cluster severity scoring and filtering

use tracing::debug;

use crate::catalog::DefectCatalog;
use crate::cluster::Cluster;
use crate::error::AnalysisError;

/// Minimum denominator used when scoring tight clusters
pub const DEFAULT_LENGTH_FLOOR: f64 = 3.0;

/// Severity of one cluster, recomputed on demand
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityScore<'a> {
    pub cluster: &'a Cluster,
    /// Sum of member grades
    pub grade_sum: u32,
    /// Raw extent of the cluster, before the floor is applied
    pub length: f64,
    /// `grade_sum / max(length, length_floor)`
    pub severity: f64,
}

/// Score a cluster from its member grades and spatial extent.
///
/// Lengths below `length_floor` are replaced by the floor, which also
/// covers singleton clusters whose raw length is 0.
///
/// # Errors
/// * [`AnalysisError::UnknownCode`] if any member code has no grade
pub fn score_cluster<'a, C>(
    cluster: &'a Cluster,
    catalog: &C,
    length_floor: f64,
) -> Result<SeverityScore<'a>, AnalysisError>
where
    C: DefectCatalog + ?Sized,
{
    let grade_sum = cluster
        .codes()
        .map(|code| catalog.grade(code))
        .sum::<Result<u32, AnalysisError>>()?;

    let length = cluster.length();
    let denominator = if length < length_floor {
        length_floor
    } else {
        length
    };

    Ok(SeverityScore {
        cluster,
        grade_sum,
        length,
        severity: f64::from(grade_sum) / denominator,
    })
}

/// Thresholds a cluster must meet to be retained
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterCriteria {
    pub min_members: usize,
    pub min_severity: f64,
    pub length_floor: f64,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            min_members: 3,
            min_severity: 1.0,
            length_floor: DEFAULT_LENGTH_FLOOR,
        }
    }
}

impl FilterCriteria {
    /// Whether a cluster passes both the size and severity tests.
    ///
    /// The size test runs first; undersized clusters are rejected without
    /// being graded.
    pub fn accepts<C>(&self, cluster: &Cluster, catalog: &C) -> Result<bool, AnalysisError>
    where
        C: DefectCatalog + ?Sized,
    {
        if cluster.len() < self.min_members {
            return Ok(false);
        }
        let score = score_cluster(cluster, catalog, self.length_floor)?;
        Ok(score.severity > self.min_severity)
    }
}

/// Keep clusters with at least `min_members` members and severity strictly
/// above `min_severity`.
///
/// Severity is recomputed for every call; callers filtering repeatedly at
/// different thresholds should cache scores themselves.
pub fn filter_clusters<C>(
    clusters: &[Cluster],
    catalog: &C,
    criteria: &FilterCriteria,
) -> Result<Vec<Cluster>, AnalysisError>
where
    C: DefectCatalog + ?Sized,
{
    let mut retained = Vec::new();
    for cluster in clusters {
        if criteria.accepts(cluster, catalog)? {
            retained.push(cluster.clone());
        }
    }

    debug!(
        clusters = clusters.len(),
        retained = retained.len(),
        min_members = criteria.min_members,
        min_severity = criteria.min_severity,
        "Filtered clusters"
    );
    Ok(retained)
}
