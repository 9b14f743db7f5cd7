//! Inspection records and CSV ingestion of PACP condition databases using Polars

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use polars::prelude::*;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::AnalysisError;

/// One coded defect observed during an inspection run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefectObservation {
    /// Inspection the observation belongs to
    pub inspection_id: String,
    /// PACP defect code
    pub defect_code: String,
    /// Distance along the pipe from the inspection start
    pub distance: f64,
    /// Condition record identifier, carried through untouched
    pub condition_id: Option<String>,
    /// Video frame counter, carried through untouched
    pub frame: Option<String>,
}

impl DefectObservation {
    /// Build an observation without auxiliary fields
    pub fn new(
        inspection_id: impl Into<String>,
        defect_code: impl Into<String>,
        distance: f64,
    ) -> Self {
        Self {
            inspection_id: inspection_id.into(),
            defect_code: defect_code.into(),
            distance,
            condition_id: None,
            frame: None,
        }
    }

    /// Attach condition id and frame counter
    pub fn with_auxiliary(
        mut self,
        condition_id: Option<String>,
        frame: Option<String>,
    ) -> Self {
        self.condition_id = condition_id;
        self.frame = frame;
        self
    }
}

/// A single inspection run and its observations in ascending distance order
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    id: String,
    observations: Vec<DefectObservation>,
}

impl Inspection {
    /// Create an inspection, sorting observations by distance.
    ///
    /// The sort is stable so observations at equal distance keep their input
    /// order. Fails if any distance is negative or not finite.
    pub fn new(
        id: impl Into<String>,
        mut observations: Vec<DefectObservation>,
    ) -> Result<Self, AnalysisError> {
        let id = id.into();
        if let Some(bad) = observations
            .iter()
            .find(|obs| !obs.distance.is_finite() || obs.distance < 0.0)
        {
            return Err(AnalysisError::InvalidDistance {
                inspection_id: id,
                defect_code: bad.defect_code.clone(),
                distance: bad.distance,
            });
        }

        observations.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(Self { id, observations })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn observations(&self) -> &[DefectObservation] {
        &self.observations
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Keep only observations whose code is in `codes`
    fn retain_codes(&mut self, codes: &HashSet<&str>) {
        self.observations
            .retain(|obs| codes.contains(obs.defect_code.as_str()));
    }
}

/// Group observations by inspection id, ascending by id.
///
/// Inspections come back in a fixed order so clustering output is
/// reproducible across runs.
pub fn group_inspections(
    observations: Vec<DefectObservation>,
) -> Result<Vec<Inspection>, AnalysisError> {
    let mut grouped: BTreeMap<String, Vec<DefectObservation>> = BTreeMap::new();
    for obs in observations {
        grouped
            .entry(obs.inspection_id.clone())
            .or_default()
            .push(obs);
    }

    grouped
        .into_iter()
        .map(|(id, observations)| Inspection::new(id, observations))
        .collect()
}

/// Drop observations whose code is outside the analysed vocabulary.
///
/// Inspections left without observations are removed entirely.
pub fn retain_vocabulary(inspections: Vec<Inspection>, vocabulary: &[String]) -> Vec<Inspection> {
    let codes: HashSet<&str> = vocabulary.iter().map(String::as_str).collect();
    let before = inspections.len();

    let kept: Vec<Inspection> = inspections
        .into_iter()
        .filter_map(|mut inspection| {
            inspection.retain_codes(&codes);
            (!inspection.is_empty()).then_some(inspection)
        })
        .collect();

    info!(
        inspections_total = before,
        inspections_with_defects = kept.len(),
        "Filtered inspections to analysed defect codes"
    );
    kept
}

/// Load a PACP condition database from CSV and group it into inspections.
///
/// # Arguments
/// * `file_path` - Path to a CSV file with `InspectionID`, `PACP_Code` and
///   `Distance` columns; `ConditionID` and `Counter` are optional
///
/// # Returns
/// * Inspections sorted ascending by id, observations sorted by distance
pub fn load_inspections(file_path: impl AsRef<Path>) -> crate::Result<Vec<Inspection>> {
    let file_path = file_path.as_ref();
    let raw = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(file_path.to_path_buf()))?
        .finish()?;

    for required in ["InspectionID", "PACP_Code", "Distance"] {
        if raw.column(required).is_err() {
            anyhow::bail!(
                "Missing required column '{}' in {}",
                required,
                file_path.display()
            );
        }
    }

    let total_rows = raw.height();
    let df = raw
        .lazy()
        .filter(
            col("InspectionID")
                .is_not_null()
                .and(col("PACP_Code").is_not_null())
                .and(col("Distance").is_not_null()),
        )
        .collect()?;

    let dropped = total_rows - df.height();
    if dropped > 0 {
        warn!(dropped, "Dropped rows with missing InspectionID, PACP_Code or Distance");
    }

    let observations = extract_observations(&df)?;
    let inspections = group_inspections(observations)?;
    info!(
        rows = df.height(),
        inspections = inspections.len(),
        path = %file_path.display(),
        "Loaded condition database"
    );
    Ok(inspections)
}

/// Convert DataFrame rows into observations
fn extract_observations(df: &DataFrame) -> crate::Result<Vec<DefectObservation>> {
    let inspection_ids = string_column(df, "InspectionID")?;
    let codes = string_column(df, "PACP_Code")?;
    let distances: Vec<Option<f64>> = df
        .column("Distance")?
        .cast(&DataType::Float64)?
        .f64()?
        .into_iter()
        .collect();

    let condition_ids = optional_string_column(df, "ConditionID")?;
    let frames = optional_string_column(df, "Counter")?;

    let mut observations = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        // Nulls were filtered out above, so only a failed numeric cast is left
        let inspection_id = inspection_ids[row].clone().unwrap_or_default();
        let code = codes[row].clone().unwrap_or_default();
        let Some(distance) = distances[row] else {
            anyhow::bail!(
                "Non-numeric Distance for {} in inspection {}",
                code.trim(),
                inspection_id
            );
        };

        let observation = DefectObservation::new(inspection_id, code.trim(), distance)
            .with_auxiliary(
                condition_ids.as_ref().and_then(|c| c[row].clone()),
                frames.as_ref().and_then(|f| f[row].clone()),
            );
        observations.push(observation);
    }

    Ok(observations)
}

fn string_column(df: &DataFrame, name: &str) -> crate::Result<Vec<Option<String>>> {
    let series = df.column(name)?.cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

fn optional_string_column(df: &DataFrame, name: &str) -> crate::Result<Option<Vec<Option<String>>>> {
    if df.column(name).is_err() {
        return Ok(None);
    }
    string_column(df, name).map(Some)
}
