//! Integration tests for DefectForge

use defectforge::{
    analyze_clusters, cluster_size_histogram, interesting_rules, load_inspections,
    mine_defect_rules, retain_vocabulary, AnalysisConfig, AnalysisError, DefectCatalog,
    DefectCategory, Granularity, PacpCatalog, DEFAULT_MIN_LIFT,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Create a test CSV file with sample condition records
fn create_test_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "InspectionID,PACP_Code,Distance,ConditionID,Counter").unwrap();

    // Inspection 501 - tight fracture/crack cluster, then an isolated joint defect
    writeln!(file, "501,FL,12.0,1,00:01:00").unwrap();
    writeln!(file, "501,CM,13.5,2,00:01:05").unwrap();
    writeln!(file, "501,FM,14.0,3,00:01:08").unwrap();
    writeln!(file, "501,JOM,80.0,4,00:04:00").unwrap();

    // Inspection 502 - same pairing, listed out of distance order
    writeln!(file, "502,CM,31.0,5,00:02:10").unwrap();
    writeln!(file, "502,FL,30.0,6,00:02:00").unwrap();
    writeln!(file, "502,RFB,30.5,7,00:02:05").unwrap();

    // Inspection 503 - spread-out joint offsets
    writeln!(file, "503,JOM,5.0,8,00:00:20").unwrap();
    writeln!(file, "503,JOL,40.0,9,00:01:40").unwrap();

    // Inspection 504 - operational only
    writeln!(file, "504,DAE,2.0,10,00:00:05").unwrap();

    // Row with missing distance is dropped
    writeln!(file, "505,FL,,11,00:00:01").unwrap();

    file
}

fn load_structural(file: &NamedTempFile) -> Vec<defectforge::Inspection> {
    let vocabulary = PacpCatalog.codes(DefectCategory::Structural);
    let inspections = load_inspections(file.path()).unwrap();
    retain_vocabulary(inspections, &vocabulary)
}

#[test]
fn test_end_to_end_clusters() {
    let test_file = create_test_csv();
    let inspections = load_structural(&test_file);

    // 504 has no structural defects, 505 had no usable rows
    let ids: Vec<&str> = inspections.iter().map(|i| i.id()).collect();
    assert_eq!(ids, vec!["501", "502", "503"]);

    let analysis = analyze_clusters(&inspections, &AnalysisConfig::default(), &PacpCatalog).unwrap();

    // 501: [FL, CM, FM], [JOM]; 502: [FL, CM]; 503: [JOM], [JOL]
    assert_eq!(analysis.clusters.len(), 5);

    // Only the 501 fracture cluster has 3 members: (3 + 3 + 4) / 3 > 1
    assert_eq!(analysis.retained.len(), 1);
    let retained = &analysis.retained[0];
    assert_eq!(retained.inspection_id(), "501");
    assert_eq!(retained.members()[0].condition_id.as_deref(), Some("1"));

    let histogram = cluster_size_histogram(&analysis.clusters);
    assert_eq!(histogram.counts.get(&1), Some(&3));
    assert_eq!(histogram.max_size, 3);
}

#[test]
fn test_end_to_end_rules() {
    let test_file = create_test_csv();
    let inspections = load_structural(&test_file);

    let config = AnalysisConfig {
        rules_gap_threshold: 6.0,
        min_support: 0.1,
        min_confidence: 0.5,
        ..AnalysisConfig::default()
    };
    let mining = mine_defect_rules(&inspections, &config, &PacpCatalog).unwrap();

    // Transactions: {FL,CM,FM}, {JOM}, {FL,CM}, {JOM}, {JOL}
    assert_eq!(mining.matrix.n_rows(), 5);

    let fl_cm = mining
        .rules
        .iter()
        .find(|r| r.antecedent == "FL" && r.consequent == "CM")
        .unwrap();
    assert_eq!(fl_cm.support, 0.4);
    assert_eq!(fl_cm.confidence, 1.0);
    assert!((fl_cm.lift - 2.5).abs() < 1e-9);

    // FM -> FL holds, FL -> FM only half the time
    assert!(mining
        .rules
        .iter()
        .any(|r| r.antecedent == "FM" && r.consequent == "FL"));
    assert!(!mining
        .rules
        .iter()
        .any(|r| r.antecedent == "FL" && r.consequent == "FM"));

    let interesting = interesting_rules(&mining.rules, DEFAULT_MIN_LIFT);
    assert!(interesting.iter().all(|r| r.lift > 1.5));
    assert!(!interesting.is_empty());
}

#[test]
fn test_default_rules_gap_keeps_inspections_whole() {
    let test_file = create_test_csv();
    let inspections = load_structural(&test_file);

    let config = AnalysisConfig {
        min_support: 0.1,
        min_confidence: 0.5,
        ..AnalysisConfig::default()
    };
    let mining = mine_defect_rules(&inspections, &config, &PacpCatalog).unwrap();

    // Gap 1000: {FL,CM,FM,JOM}, {FL,CM}, {JOM,JOL}
    assert_eq!(mining.matrix.n_rows(), 3);
    assert!(mining
        .rules
        .iter()
        .any(|r| r.antecedent == "JOL" && r.consequent == "JOM"));
}

#[test]
fn test_inspection_granularity() {
    let test_file = create_test_csv();
    let inspections = load_structural(&test_file);

    let config = AnalysisConfig {
        granularity: Granularity::Inspection,
        min_support: 0.1,
        min_confidence: 0.5,
        ..AnalysisConfig::default()
    };
    let mining = mine_defect_rules(&inspections, &config, &PacpCatalog).unwrap();

    // One row per inspection: {FL,CM,FM,JOM}, {FL,CM}, {JOM,JOL}
    assert_eq!(mining.matrix.n_rows(), 3);
    assert!(mining
        .rules
        .iter()
        .any(|r| r.antecedent == "JOL" && r.consequent == "JOM"));
}

#[test]
fn test_unknown_code_surfaces_from_filtering() {
    let test_file = create_test_csv();
    // Operational codes have no grades, so the all-category vocabulary lets
    // RFB into a three-member cluster that must be graded
    let vocabulary = PacpCatalog.codes(DefectCategory::All);
    let inspections = retain_vocabulary(load_inspections(test_file.path()).unwrap(), &vocabulary);

    let config = AnalysisConfig {
        active_category: DefectCategory::All,
        ..AnalysisConfig::default()
    };
    let result = analyze_clusters(&inspections, &config, &PacpCatalog);
    assert_eq!(result.unwrap_err(), AnalysisError::UnknownCode("RFB".to_string()));
}

#[test]
fn test_invalid_category() {
    let result = PacpCatalog.codes_for_category("hydraulic");
    assert!(matches!(result, Err(AnalysisError::InvalidCategory(_))));
}

#[test]
fn test_missing_file() {
    assert!(load_inspections("/nonexistent/conditions.csv").is_err());
}
