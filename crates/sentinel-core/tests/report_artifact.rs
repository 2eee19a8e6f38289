use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use sentinel_core::reporting::{DIGEST_FILE, REPORT_FILE};
use sentinel_core::{
    read_report_artifact, render_report_md, write_report_artifact, SentinelConfig, SentinelEngine,
    SentinelError,
};
use sentinel_data::{AffiliationRecord, Identity, MemoryDataSource, SubjectHistory};
use tempfile::tempdir;

async fn sample_report() -> sentinel_core::AnalysisReport {
    let now = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
    let identity = Identity {
        id: 501,
        name: "Artifact Pilot".to_string(),
        organization_id: 9,
        organization_name: "Fresh Corp".to_string(),
        group_id: None,
        group_name: None,
        standing: -4.0,
    };
    let history = SubjectHistory {
        affiliations: vec![AffiliationRecord {
            organization_id: 9,
            organization_name: "Fresh Corp".to_string(),
            start: now - Duration::days(2),
            end: None,
            dissolved: false,
            group_id: None,
        }],
        ..SubjectHistory::default()
    };
    let source = MemoryDataSource::new()
        .with_identity(identity)
        .with_history(501, history);
    SentinelEngine::new(Arc::new(source), SentinelConfig::default())
        .unwrap()
        .analyze(501, now)
        .await
        .unwrap()
}

#[tokio::test]
async fn artifact_round_trips_with_digest() {
    let report = sample_report().await;
    let dir = tempdir().unwrap();

    let path = write_report_artifact(&report, dir.path()).unwrap();
    assert_eq!(path, dir.path().join("501").join(REPORT_FILE));
    assert!(dir.path().join("501").join(DIGEST_FILE).exists());

    let back = read_report_artifact(501, dir.path()).unwrap();
    assert_eq!(back, report);
}

#[tokio::test]
async fn tampered_artifact_is_rejected() {
    let report = sample_report().await;
    let dir = tempdir().unwrap();
    let path = write_report_artifact(&report, dir.path()).unwrap();

    let tampered = std::fs::read_to_string(&path)
        .unwrap()
        .replace("Artifact Pilot", "Trusted Pilot");
    std::fs::write(&path, tampered).unwrap();

    let err = read_report_artifact(501, dir.path()).unwrap_err();
    assert!(matches!(err, SentinelError::DigestMismatch { .. }));
}

#[tokio::test]
async fn missing_artifact_is_io_error() {
    let dir = tempdir().unwrap();
    let err = read_report_artifact(404, dir.path()).unwrap_err();
    assert!(matches!(err, SentinelError::Io(_)));
}

#[tokio::test]
async fn markdown_summarises_findings() {
    let report = sample_report().await;
    let md = render_report_md(&report);

    assert!(md.starts_with("# Risk Report: Artifact Pilot (501)"));
    assert!(md.contains("## Suspected Flags"));
    assert!(md.contains("Negative standing"));
    assert!(md.contains("Brand-new identity"));
    assert!(md.contains("Joined Fresh Corp"));
    assert!(md.contains("## Questions"));
}
