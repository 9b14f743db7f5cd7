//! PACP defect catalog: category membership and severity grades.
//!
//! Scoring and filtering only ever see the [`DefectCatalog`] trait, so the
//! tables below can be replaced without touching the analysis code.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Group of defect codes selected for analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DefectCategory {
    All,
    #[default]
    Structural,
    Operational,
}

impl DefectCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DefectCategory::All => "all",
            DefectCategory::Structural => "structural",
            DefectCategory::Operational => "operational",
        }
    }
}

impl fmt::Display for DefectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DefectCategory {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(DefectCategory::All),
            "structural" => Ok(DefectCategory::Structural),
            "operational" => Ok(DefectCategory::Operational),
            _ => Err(AnalysisError::InvalidCategory(s.to_string())),
        }
    }
}

/// Read-only lookup service for defect codes.
///
/// Implementations must be shareable across rayon workers.
pub trait DefectCatalog: Send + Sync {
    /// Severity grade of a defect code.
    ///
    /// Fails with [`AnalysisError::UnknownCode`] when the code is absent;
    /// callers must not substitute a default grade.
    fn grade(&self, code: &str) -> Result<u32, AnalysisError>;

    /// Ordered vocabulary of codes in a category.
    fn codes(&self, category: DefectCategory) -> Vec<String>;

    /// Ordered vocabulary for a category given by name.
    fn codes_for_category(&self, category: &str) -> Result<Vec<String>, AnalysisError> {
        let category = category.parse::<DefectCategory>()?;
        Ok(self.codes(category))
    }
}

const DEPOSIT_CODES: &[&str] = &[
    "DAE", "DAGS", "DAR", "DAZ", "DSV", "DSGV", "DSC", "DSZ", "DNF", "DNGV", "DNZ",
];
const DEFORMED_CODES: &[&str] = &["DR", "DFBR", "DFBI", "DFC", "DFE", "DTBR", "DTBI"];
const INFILTRATION_CODES: &[&str] = &[
    "IS", "ISB", "ISJ", "ISC", "ISL", "IW", "IWB", "IWC", "IWJ", "IWL", "ID", "IDB", "IDC", "IDJ",
    "IDL", "IR", "IRB", "IRC", "IRJ", "IRL", "IG", "IGB", "IGC", "IGL", "IGJ",
];
const HOLE_CODES: &[&str] = &["H", "HSV", "HVV"];
const FRACTURE_CODES: &[&str] = &["FL", "FC", "FM", "FS", "FH", "FH2", "FH3", "FH4"];
const CRACK_CODES: &[&str] = &["CL", "CC", "CM", "CS", "CH", "CH2", "CH3", "CH4"];
const BROKEN_CODES: &[&str] = &["B", "BSV", "BVV"];
const COLLAPSE_CODES: &[&str] = &["X"];
const ROOT_CODES: &[&str] = &[
    "RFB", "RFL", "RFC", "RFJ", "RMB", "RML", "RMC", "RMJ", "RBB", "RBL", "RBC", "RBJ", "RTB",
    "RTL", "RTC", "RTJ",
];
const JOINT_OFFSET_CODES: &[&str] = &[
    "JOS", "JOM", "JOL", "JOSD", "JOMD", "JOLD", "JSS", "JSM", "JSL", "JAS", "JAM", "JAL",
];

static ALL_CODES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    [
        DEPOSIT_CODES,
        DEFORMED_CODES,
        INFILTRATION_CODES,
        HOLE_CODES,
        FRACTURE_CODES,
        CRACK_CODES,
        BROKEN_CODES,
        ROOT_CODES,
        JOINT_OFFSET_CODES,
        COLLAPSE_CODES,
    ]
    .concat()
});

static STRUCTURAL_CODES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    [
        DEFORMED_CODES,
        HOLE_CODES,
        FRACTURE_CODES,
        CRACK_CODES,
        BROKEN_CODES,
        JOINT_OFFSET_CODES,
        COLLAPSE_CODES,
    ]
    .concat()
});

static OPERATIONAL_CODES: Lazy<Vec<&'static str>> =
    Lazy::new(|| [ROOT_CODES, DEPOSIT_CODES].concat());

static STRUCTURAL_GRADES: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("JOM", 1),
        ("JOL", 2),
        ("JOMD", 1),
        ("JOLD", 2),
        ("JSM", 1),
        ("JSL", 2),
        ("JAM", 1),
        ("JAL", 2),
        ("X", 5),
        ("B", 4),
        ("BSV", 5),
        ("BVV", 5),
        ("DR", 5),
        ("DFBR", 5),
        ("DFBI", 5),
        ("DFC", 5),
        ("DFE", 5),
        ("DTBR", 5),
        ("DTBI", 5),
        ("H", 4),
        ("HSV", 5),
        ("HVV", 5),
        ("FL", 3),
        ("FC", 2),
        ("FM", 4),
        ("FS", 3),
        ("FH2", 4),
        ("FH3", 5),
        ("FH4", 5),
        ("CL", 2),
        ("CC", 1),
        ("CM", 3),
        ("CS", 2),
        ("CH2", 4),
        ("CH3", 5),
        ("CH4", 5),
    ])
});

/// Static PACP catalog.
///
/// Grades cover the structural codes of the PACP grading table. Six
/// structural codes have no grade: `FH`, `CH`, `JOS`, `JOSD`, `JSS` and
/// `JAS`. They are still part of the structural vocabulary, so a cluster
/// large enough to be scored that contains one of them fails with
/// [`AnalysisError::UnknownCode`], as does any operational code.
#[derive(Debug, Clone, Copy, Default)]
pub struct PacpCatalog;

impl DefectCatalog for PacpCatalog {
    fn grade(&self, code: &str) -> Result<u32, AnalysisError> {
        STRUCTURAL_GRADES
            .get(code)
            .copied()
            .ok_or_else(|| AnalysisError::UnknownCode(code.to_string()))
    }

    fn codes(&self, category: DefectCategory) -> Vec<String> {
        let codes = match category {
            DefectCategory::All => &*ALL_CODES,
            DefectCategory::Structural => &*STRUCTURAL_CODES,
            DefectCategory::Operational => &*OPERATIONAL_CODES,
        };
        codes.iter().map(|code| code.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grade_lookup() {
        let catalog = PacpCatalog;
        assert_eq!(catalog.grade("X").unwrap(), 5);
        assert_eq!(catalog.grade("CC").unwrap(), 1);
        assert_eq!(catalog.grade("FM").unwrap(), 4);
    }

    #[test]
    fn test_unknown_code_is_an_error() {
        let catalog = PacpCatalog;
        assert_eq!(
            catalog.grade("RFB"),
            Err(AnalysisError::UnknownCode("RFB".to_string()))
        );
        assert!(catalog.grade("").is_err());
    }

    #[test]
    fn test_category_vocabularies() {
        let catalog = PacpCatalog;
        let all = catalog.codes(DefectCategory::All);
        let structural = catalog.codes(DefectCategory::Structural);
        let operational = catalog.codes(DefectCategory::Operational);

        assert_eq!(all.len(), 94);
        assert_eq!(structural.len(), 42);
        assert_eq!(operational.len(), 27);

        // Vocabulary order is stable and starts with the first group listed
        assert_eq!(structural[0], "DR");
        assert_eq!(operational[0], "RFB");
        assert_eq!(all[0], "DAE");
        assert_eq!(all.last().map(String::as_str), Some("X"));

        assert!(structural.iter().all(|code| all.contains(code)));
        assert!(operational.iter().all(|code| all.contains(code)));
        assert!(!all.iter().any(|code| code == "TB"));
    }

    #[test]
    fn test_codes_for_category_by_name() {
        let catalog = PacpCatalog;
        assert_eq!(
            catalog.codes_for_category(" Structural ").unwrap(),
            catalog.codes(DefectCategory::Structural)
        );

        let result = catalog.codes_for_category("hydraulic");
        assert_eq!(
            result,
            Err(AnalysisError::InvalidCategory("hydraulic".to_string()))
        );
    }

    #[test]
    fn test_ungraded_structural_codes() {
        let catalog = PacpCatalog;
        let structural = catalog.codes(DefectCategory::Structural);
        for code in ["FH", "CH", "JOS", "JOSD", "JSS", "JAS"] {
            assert!(structural.iter().any(|c| c == code), "{code} not structural");
            assert_eq!(
                catalog.grade(code),
                Err(AnalysisError::UnknownCode(code.to_string()))
            );
        }
    }

    #[test]
    fn test_every_graded_code_is_structural() {
        let structural = PacpCatalog.codes(DefectCategory::Structural);
        for code in STRUCTURAL_GRADES.keys() {
            assert!(structural.iter().any(|c| c == code), "{code} not structural");
        }
    }
}
