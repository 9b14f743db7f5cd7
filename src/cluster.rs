//! Sequential spatial clustering of defect observations along a pipe.
//!
//! Observations are walked in ascending distance order. A cluster stays open
//! while the gap to the previous observation is below the threshold
//! (`gap < gap_threshold`) and is closed as soon as a gap reaches it
//! (`gap >= gap_threshold`).

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::data::{DefectObservation, Inspection};

/// Which fields each cluster member carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberShape {
    /// Inspection id, defect code and distance only
    Compact,
    /// Also carries condition id and frame counter
    #[default]
    Detailed,
}

impl MemberShape {
    fn project(self, observation: &DefectObservation) -> DefectObservation {
        match self {
            MemberShape::Detailed => observation.clone(),
            MemberShape::Compact => DefectObservation::new(
                observation.inspection_id.clone(),
                observation.defect_code.clone(),
                observation.distance,
            ),
        }
    }
}

/// Contiguous run of observations from one inspection.
///
/// Never empty; members are in ascending distance order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cluster {
    members: Vec<DefectObservation>,
}

impl Cluster {
    /// Wrap members into a cluster, or `None` when there are none
    pub fn from_members(members: Vec<DefectObservation>) -> Option<Self> {
        if members.is_empty() {
            None
        } else {
            Some(Self { members })
        }
    }

    pub fn members(&self) -> &[DefectObservation] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for a constructed cluster
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn inspection_id(&self) -> &str {
        &self.members[0].inspection_id
    }

    pub fn first_distance(&self) -> f64 {
        self.members[0].distance
    }

    pub fn last_distance(&self) -> f64 {
        self.members[self.members.len() - 1].distance
    }

    /// Spatial extent: last member distance minus first member distance
    pub fn length(&self) -> f64 {
        self.last_distance() - self.first_distance()
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.members.iter().map(|m| m.defect_code.as_str())
    }
}

/// Partition one inspection into clusters.
///
/// The previous distance starts at 0, so a first observation at or beyond
/// `gap_threshold` closes an empty cluster, which is never emitted.
/// With `gap_threshold <= 0` every cluster is a singleton.
pub fn identify_clusters(
    inspection: &Inspection,
    gap_threshold: f64,
    shape: MemberShape,
) -> Vec<Cluster> {
    let (open, mut closed, _) = inspection.observations().iter().fold(
        (Vec::<DefectObservation>::new(), Vec::<Cluster>::new(), 0.0_f64),
        |(mut open, mut closed, previous), observation| {
            let gap = (observation.distance - previous).abs();
            if gap >= gap_threshold {
                closed.extend(Cluster::from_members(std::mem::take(&mut open)));
            }
            open.push(shape.project(observation));
            (open, closed, observation.distance)
        },
    );
    closed.extend(Cluster::from_members(open));
    closed
}

/// Cluster every inspection independently and concatenate the results.
///
/// Inspections are processed in parallel; output keeps input inspection
/// order.
pub fn identify_clusters_in_inspections(
    inspections: &[Inspection],
    gap_threshold: f64,
    shape: MemberShape,
) -> Vec<Cluster> {
    let clusters: Vec<Cluster> = inspections
        .par_iter()
        .flat_map_iter(|inspection| identify_clusters(inspection, gap_threshold, shape))
        .collect();

    debug!(
        inspections = inspections.len(),
        clusters = clusters.len(),
        gap_threshold,
        "Identified clusters"
    );
    clusters
}
