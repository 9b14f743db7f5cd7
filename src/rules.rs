//! Association rule mining over co-occurrence matrices.
//!
//! Every ordered pair of distinct vocabulary codes `(x, y)` is evaluated
//! as the rule "x implies y":
//!
//! - support(x, y) = rows with both set / N
//! - confidence(x → y) = rows with both set / rows with x set
//! - lift(x → y) = support(x, y) / (support(x) · support(y))
//!
//! A rule is kept when support and confidence are both strictly above their
//! thresholds. Lift is only reported; filtering on it belongs to reporting.

use rayon::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::cooccurrence::CoOccurrenceMatrix;

/// Directional rule "antecedent implies consequent"
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rule {
    pub antecedent: String,
    pub consequent: String,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
}

/// Retention thresholds, both compared with strict `>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MiningThresholds {
    pub min_support: f64,
    pub min_confidence: f64,
}

impl Default for MiningThresholds {
    fn default() -> Self {
        Self {
            min_support: 0.001,
            min_confidence: 0.4,
        }
    }
}

/// Support, confidence and lift of one ordered pair
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairMetrics {
    pub support_x: f64,
    pub support_y: f64,
    pub support_xy: f64,
    pub confidence: f64,
    pub lift: f64,
}

/// Metrics for the rule `x → y`.
///
/// Returns `None` for an empty matrix or when either code never occurs,
/// since lift is undefined there.
pub fn pair_metrics(matrix: &CoOccurrenceMatrix, x: usize, y: usize) -> Option<PairMetrics> {
    let n = matrix.n_rows();
    if n == 0 {
        return None;
    }

    let counts = matrix.pair_counts(x, y);
    if counts.count_x == 0 || counts.count_y == 0 {
        return None;
    }

    let n = n as f64;
    let support_x = counts.count_x as f64 / n;
    let support_y = counts.count_y as f64 / n;
    let support_xy = counts.count_xy as f64 / n;
    let confidence = counts.count_xy as f64 / counts.count_x as f64;

    Some(PairMetrics {
        support_x,
        support_y,
        support_xy,
        confidence,
        lift: support_xy / (support_x * support_y),
    })
}

/// Mine rules for every ordered pair of distinct codes.
///
/// Output order follows the vocabulary: all rules with the first code as
/// antecedent come first, consequents in vocabulary order within each.
pub fn mine_rules(matrix: &CoOccurrenceMatrix, thresholds: &MiningThresholds) -> Vec<Rule> {
    if matrix.n_rows() == 0 {
        debug!("Co-occurrence matrix is empty; no rules mined");
        return Vec::new();
    }

    let vocabulary = matrix.vocabulary();
    let k = vocabulary.len();

    let rules: Vec<Rule> = (0..k)
        .into_par_iter()
        .flat_map_iter(move |x| {
            (0..k).filter(move |&y| y != x).filter_map(move |y| {
                let metrics = pair_metrics(matrix, x, y)?;
                let retained = metrics.support_xy > thresholds.min_support
                    && metrics.confidence > thresholds.min_confidence;
                retained.then(|| Rule {
                    antecedent: vocabulary[x].clone(),
                    consequent: vocabulary[y].clone(),
                    support: metrics.support_xy,
                    confidence: metrics.confidence,
                    lift: metrics.lift,
                })
            })
        })
        .collect();

    debug!(
        transactions = matrix.n_rows(),
        codes = k,
        rules = rules.len(),
        "Mined association rules"
    );
    rules
}
