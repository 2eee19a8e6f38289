//! Analysis engine: fetch a subject snapshot, run the detectors, fuse.
//!
//! One call to [`SentinelEngine::analyze`] performs every fetch up front,
//! validates the records at the boundary, runs the five detectors over the
//! immutable snapshot (sequentially or as parallel tokio tasks), and
//! assembles the report. Nothing is retained between calls.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde_json::json;

use sentinel_data::{
    validate_all, AffiliationRecord, AgreementRecord, DataSource, FinancialEvent, Identity,
    IdentityId, RelationshipRecord, Resource, Validate,
};

use crate::config::{DetectorMode, SentinelConfig};
use crate::detectors::employment::referenced_groups;
use crate::detectors::{
    detect_contract_patterns, detect_employment_risk, detect_financial_patterns,
    detect_indirect_indicators, link_alts, name_search_prefix, DetectorKind, GroupDirectory,
};
use crate::domain::{AnalysisReport, Flag, Result, SentinelError};
use crate::fusion::{alt_score, fuse, DetectorResults};
use crate::graph::build_alt_network;
use crate::metrics::METRICS;
use crate::obs::{
    emit_analysis_finished, emit_analysis_started, emit_detector_completed, emit_fetch_failed,
    emit_subject_not_found, emit_validation_failed, AnalysisSpan,
};
use crate::questions::generate_questions;
use crate::timeline::reconstruct_timeline;

/// Everything fetched for one subject, validated and read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectSnapshot {
    pub identity: Identity,
    pub affiliations: Vec<AffiliationRecord>,
    pub financial_events: Vec<FinancialEvent>,
    pub agreements: Vec<AgreementRecord>,
    pub relationships: Vec<RelationshipRecord>,
    /// Results of the name search on the subject's name prefix.
    pub search_hits: Vec<Identity>,
    /// Groups referenced by the affiliation history that could be resolved.
    pub groups: GroupDirectory,
}

impl SubjectSnapshot {
    /// Boundary validation; the first violation aborts the analysis.
    pub fn validate(&self) -> Result<()> {
        self.identity.validate()?;
        validate_all(&self.affiliations)?;
        validate_all(&self.financial_events)?;
        validate_all(&self.agreements)?;
        validate_all(&self.relationships)?;
        validate_all(&self.search_hits)?;
        Ok(())
    }
}

/// Run all five detectors in the calling thread.
pub fn run_detectors(snapshot: &SubjectSnapshot, now: DateTime<Utc>) -> DetectorResults {
    DetectorResults {
        alts: link_alts(
            &snapshot.identity,
            &snapshot.financial_events,
            &snapshot.relationships,
            &snapshot.search_hits,
        ),
        financial: detect_financial_patterns(&snapshot.financial_events),
        contracts: detect_contract_patterns(&snapshot.agreements),
        employment: detect_employment_risk(&snapshot.affiliations, &snapshot.groups, now),
        indirect: detect_indirect_indicators(
            &snapshot.identity,
            &snapshot.affiliations,
            &snapshot.relationships,
            now,
        ),
    }
}

/// Run each detector as its own tokio task over a shared snapshot.
pub async fn run_detectors_parallel(
    snapshot: Arc<SubjectSnapshot>,
    now: DateTime<Utc>,
) -> Result<DetectorResults> {
    let s = Arc::clone(&snapshot);
    let alts = tokio::spawn(async move {
        link_alts(
            &s.identity,
            &s.financial_events,
            &s.relationships,
            &s.search_hits,
        )
    });
    let s = Arc::clone(&snapshot);
    let financial = tokio::spawn(async move { detect_financial_patterns(&s.financial_events) });
    let s = Arc::clone(&snapshot);
    let contracts = tokio::spawn(async move { detect_contract_patterns(&s.agreements) });
    let s = Arc::clone(&snapshot);
    let employment =
        tokio::spawn(async move { detect_employment_risk(&s.affiliations, &s.groups, now) });
    let s = Arc::clone(&snapshot);
    let indirect = tokio::spawn(async move {
        detect_indirect_indicators(&s.identity, &s.affiliations, &s.relationships, now)
    });

    let (alts, financial, contracts, employment, indirect) =
        tokio::try_join!(alts, financial, contracts, employment, indirect)
            .map_err(|e| SentinelError::DetectorTask(e.to_string()))?;

    Ok(DetectorResults {
        alts,
        financial,
        contracts,
        employment,
        indirect,
    })
}

/// The risk-fusion engine.
pub struct SentinelEngine {
    source: Arc<dyn DataSource>,
    config: SentinelConfig,
}

impl SentinelEngine {
    /// Refuses to build with invalid fusion weights.
    pub fn new(source: Arc<dyn DataSource>, config: SentinelConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &SentinelConfig {
        &self.config
    }

    /// Analyze one subject as of `now`.
    ///
    /// Returns [`SentinelError::SubjectNotFound`] for an unknown subject and
    /// [`SentinelError::Fetch`] if any retrieval fails; no partial report is
    /// ever produced.
    pub async fn analyze(&self, subject: IdentityId, now: DateTime<Utc>) -> Result<AnalysisReport> {
        let _span = AnalysisSpan::enter(subject);
        let mode = self.config.engine.detector_mode;
        emit_analysis_started(subject, &mode.to_string());

        let fetched = self
            .fetch_snapshot(subject)
            .await
            .and_then(|snapshot| snapshot.validate().map(|()| snapshot));
        let snapshot = match fetched {
            Ok(snapshot) => snapshot,
            Err(err) => {
                record_failure(subject, &err);
                return Err(err);
            }
        };

        let snapshot = Arc::new(snapshot);
        let results = match mode {
            DetectorMode::Sequential => run_detectors(&snapshot, now),
            DetectorMode::Parallel => run_detectors_parallel(Arc::clone(&snapshot), now).await?,
        };
        log_detector_results(&results);

        let report = self.assemble(&snapshot, &results, now);

        METRICS.inc_analyses_completed();
        METRICS.add_flags_raised(report.flag_count() as u64);
        emit_analysis_finished(
            subject,
            report.risk_score.overall,
            report.definite_flags.len(),
            report.suspected_flags.len(),
            report.alt_candidates.len(),
        );
        Ok(report)
    }

    async fn fetch_snapshot(&self, subject: IdentityId) -> Result<SubjectSnapshot> {
        let source = self.source.as_ref();
        let limits = self.config.limits;

        let identity = source
            .identity(subject)
            .await
            .map_err(SentinelError::fetch(Resource::Identity))?
            .ok_or(SentinelError::SubjectNotFound(subject))?;

        let prefix = name_search_prefix(&identity.name);
        let (affiliations, financial_events, agreements, relationships, search_hits) = tokio::try_join!(
            async {
                source
                    .affiliations(subject)
                    .await
                    .map_err(SentinelError::fetch(Resource::Affiliations))
            },
            async {
                source
                    .financial_events(subject, limits.financial_events)
                    .await
                    .map_err(SentinelError::fetch(Resource::FinancialEvents))
            },
            async {
                source
                    .agreements(subject, limits.agreements)
                    .await
                    .map_err(SentinelError::fetch(Resource::Agreements))
            },
            async {
                source
                    .relationships(subject)
                    .await
                    .map_err(SentinelError::fetch(Resource::Relationships))
            },
            async {
                source
                    .search_identities(&prefix)
                    .await
                    .map_err(SentinelError::fetch(Resource::NameSearch))
            },
        )?;

        let group_ids = referenced_groups(&affiliations);
        let resolved = try_join_all(group_ids.iter().map(|id| source.group(*id)))
            .await
            .map_err(SentinelError::fetch(Resource::Groups))?;
        let groups: GroupDirectory = resolved.into_iter().flatten().collect();
        tracing::debug!(
            requested = group_ids.len(),
            resolved = groups.len(),
            "group lookups complete"
        );

        Ok(SubjectSnapshot {
            identity,
            affiliations,
            financial_events,
            agreements,
            relationships,
            search_hits,
            groups,
        })
    }

    fn assemble(
        &self,
        snapshot: &SubjectSnapshot,
        results: &DetectorResults,
        now: DateTime<Utc>,
    ) -> AnalysisReport {
        let identity = &snapshot.identity;
        let fused = fuse(&self.config.weights, results);
        let flags: Vec<Flag> = fused.all_flags().cloned().collect();

        let timeline = reconstruct_timeline(
            &snapshot.affiliations,
            &snapshot.financial_events,
            &snapshot.agreements,
            &flags,
            now,
        );
        let follow_up = generate_questions(
            &flags,
            &results.alts,
            snapshot.affiliations.len(),
            fused.risk_score.overall,
        );

        let mut metadata = BTreeMap::new();
        metadata.insert("organization".to_string(), json!(identity.organization_name));
        metadata.insert("group".to_string(), json!(identity.group_name));
        metadata.insert("standing".to_string(), json!(identity.standing));
        metadata.insert(
            "affiliation_count".to_string(),
            json!(snapshot.affiliations.len()),
        );
        metadata.insert(
            "financial_event_count".to_string(),
            json!(snapshot.financial_events.len()),
        );
        metadata.insert(
            "agreement_count".to_string(),
            json!(snapshot.agreements.len()),
        );
        metadata.insert(
            "relationship_count".to_string(),
            json!(snapshot.relationships.len()),
        );
        metadata.insert("engine_version".to_string(), json!(crate::VERSION));

        AnalysisReport {
            subject_id: identity.id,
            subject_name: identity.name.clone(),
            generated_at: now,
            risk_score: fused.risk_score,
            definite_flags: fused.definite_flags,
            suspected_flags: fused.suspected_flags,
            alt_network: build_alt_network(identity.id, &identity.name, &results.alts),
            alt_candidates: results.alts.clone(),
            timeline,
            questions: follow_up.questions,
            notes: follow_up.notes,
            metadata,
        }
    }
}

fn log_detector_results(results: &DetectorResults) {
    emit_detector_completed(DetectorKind::AltLinker, 0, alt_score(&results.alts));
    for (kind, output) in [
        (DetectorKind::Financial, &results.financial),
        (DetectorKind::Contracts, &results.contracts),
        (DetectorKind::Employment, &results.employment),
        (DetectorKind::Indirect, &results.indirect),
    ] {
        emit_detector_completed(kind, output.flags.len(), output.score);
    }
}

fn record_failure(subject: IdentityId, err: &SentinelError) {
    match err {
        SentinelError::SubjectNotFound(_) => {
            METRICS.inc_not_found();
            emit_subject_not_found(subject);
        }
        SentinelError::Fetch { resource, source } => {
            METRICS.inc_fetch_failures();
            emit_fetch_failed(subject, *resource, source);
        }
        SentinelError::Validation(violation) => {
            METRICS.inc_validation_failures();
            emit_validation_failed(subject, violation);
        }
        _ => {}
    }
}
