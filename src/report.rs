//! Text summaries of clusters and mined rules

use std::collections::BTreeMap;
use std::fmt;

use crate::cluster::Cluster;
use crate::rules::Rule;

/// Lift above which a rule is reported as interesting
pub const DEFAULT_MIN_LIFT: f64 = 1.5;

/// Count of clusters per cluster size
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterSizeHistogram {
    /// Cluster size mapped to the number of clusters of that size
    pub counts: BTreeMap<usize, usize>,
    /// Largest cluster size seen, 0 when there are no clusters
    pub max_size: usize,
}

pub fn cluster_size_histogram(clusters: &[Cluster]) -> ClusterSizeHistogram {
    let mut histogram = ClusterSizeHistogram::default();
    for cluster in clusters {
        *histogram.counts.entry(cluster.len()).or_insert(0) += 1;
        histogram.max_size = histogram.max_size.max(cluster.len());
    }
    histogram
}

/// Rules with lift strictly above `min_lift`, in mining order
pub fn interesting_rules(rules: &[Rule], min_lift: f64) -> Vec<&Rule> {
    rules.iter().filter(|rule| rule.lift > min_lift).collect()
}

impl fmt::Display for ClusterSizeHistogram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of clusters of different sizes:")?;
        if self.counts.is_empty() {
            return writeln!(f, "  (no clusters)");
        }
        for (size, count) in &self.counts {
            writeln!(f, "  size {:>3}: {}", size, count)?;
        }
        writeln!(f, "Largest cluster: {} defects", self.max_size)
    }
}

/// Table of interesting rules, printed with its lift cut-off
#[derive(Debug, Clone, Copy)]
pub struct RulesTable<'a> {
    pub rules: &'a [&'a Rule],
    pub min_lift: f64,
}

impl<'a> RulesTable<'a> {
    pub fn new(rules: &'a [&'a Rule], min_lift: f64) -> Self {
        Self { rules, min_lift }
    }
}

impl fmt::Display for RulesTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Interesting Association Rules Found (lift > {})",
            self.min_lift
        )?;
        if self.rules.is_empty() {
            return writeln!(f, "  (none)");
        }
        writeln!(
            f,
            "  {:<6} -> {:<6} {:>9} {:>10} {:>7}",
            "IF", "THEN", "support", "confidence", "lift"
        )?;
        for rule in self.rules {
            writeln!(
                f,
                "  {:<6} -> {:<6} {:>9.4} {:>10.3} {:>7.3}",
                rule.antecedent, rule.consequent, rule.support, rule.confidence, rule.lift
            )?;
        }
        Ok(())
    }
}
