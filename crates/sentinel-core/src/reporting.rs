//! Report export: digest-verified JSON artifact and markdown summary.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use sentinel_data::IdentityId;

use crate::domain::{AnalysisReport, Flag, Result, SentinelError};

pub const REPORT_FILE: &str = "report.json";
pub const DIGEST_FILE: &str = "report.digest";
/// Timeline entries shown in the markdown summary.
pub const MD_TIMELINE_LIMIT: usize = 20;

/// Hex SHA-256 of the given bytes.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Write `<dir>/<subject_id>/report.json` plus its digest.
pub fn write_report_artifact(report: &AnalysisReport, dir: &Path) -> Result<PathBuf> {
    let subject_dir = dir.join(report.subject_id.to_string());
    std::fs::create_dir_all(&subject_dir)?;

    let path = subject_dir.join(REPORT_FILE);
    let digest_path = subject_dir.join(DIGEST_FILE);
    let json = serde_json::to_vec_pretty(report)?;
    let digest = content_digest(&json);

    std::fs::write(&path, &json)?;
    std::fs::write(&digest_path, digest.as_bytes())?;

    tracing::debug!(path = %path.display(), digest = %digest, "report artifact written");
    Ok(path)
}

/// Read and verify `<dir>/<subject_id>/report.json` integrity.
pub fn read_report_artifact(subject_id: IdentityId, dir: &Path) -> Result<AnalysisReport> {
    let subject_dir = dir.join(subject_id.to_string());
    let json = std::fs::read(subject_dir.join(REPORT_FILE))?;
    let digest = std::fs::read_to_string(subject_dir.join(DIGEST_FILE))?;

    let actual = content_digest(&json);
    if digest.trim() != actual {
        return Err(SentinelError::DigestMismatch {
            expected: digest.trim().to_string(),
            actual,
        });
    }
    let report: AnalysisReport = serde_json::from_slice(&json)?;
    Ok(report)
}

/// Render a recruiter-facing markdown summary.
pub fn render_report_md(report: &AnalysisReport) -> String {
    let mut out = String::new();
    let score = &report.risk_score;

    let _ = writeln!(
        out,
        "# Risk Report: {} ({})\n",
        report.subject_name, report.subject_id
    );
    let _ = writeln!(out, "Generated: {}\n", report.generated_at.to_rfc3339());
    let _ = writeln!(out, "**Overall risk: {:.1} / 100**\n", score.overall);

    out.push_str("| Component | Score |\n|---|---|\n");
    for (name, value) in score.components() {
        let _ = writeln!(out, "| {name} | {value:.1} |");
    }
    out.push('\n');

    render_flags(&mut out, "Definite Flags", &report.definite_flags);
    render_flags(&mut out, "Suspected Flags", &report.suspected_flags);

    if !report.alt_candidates.is_empty() {
        out.push_str("## Possible Alts\n");
        for alt in &report.alt_candidates {
            let _ = writeln!(
                out,
                "- {} ({}): {:.0}%",
                alt.name,
                alt.identity_id,
                alt.probability * 100.0
            );
            for evidence in &alt.evidence {
                let _ = writeln!(out, "  - {evidence}");
            }
        }
        out.push('\n');
    }

    if !report.timeline.is_empty() {
        out.push_str("## Timeline\n");
        for entry in report.timeline.iter().take(MD_TIMELINE_LIMIT) {
            let marker = if entry.risk_indicator { " **[risk]**" } else { "" };
            let _ = writeln!(
                out,
                "- {}: {}{}",
                entry.timestamp.format("%Y-%m-%d"),
                entry.description,
                marker
            );
        }
        if report.timeline.len() > MD_TIMELINE_LIMIT {
            let _ = writeln!(
                out,
                "- ... {} earlier entries omitted",
                report.timeline.len() - MD_TIMELINE_LIMIT
            );
        }
        out.push('\n');
    }

    out.push_str("## Questions\n");
    for (i, question) in report.questions.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, question);
    }
    out.push('\n');

    if !report.notes.is_empty() {
        out.push_str("## Notes\n");
        for note in &report.notes {
            let _ = writeln!(out, "- {note}");
        }
        out.push('\n');
    }

    out
}

fn render_flags(out: &mut String, heading: &str, flags: &[Flag]) {
    if flags.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {heading}");
    for flag in flags {
        let _ = writeln!(
            out,
            "- **{}** [{}] ({:.0}% confidence): {}",
            flag.title,
            flag.category,
            flag.confidence * 100.0,
            flag.description
        );
        for evidence in &flag.evidence {
            let _ = writeln!(out, "  - {evidence}");
        }
    }
    out.push('\n');
}

/// Short one-line summary used by the CLI.
pub fn summary_line(report: &AnalysisReport) -> String {
    format!(
        "{} ({}): overall {:.1}, {} definite / {} suspected flags, {} alt candidates, {} timeline entries",
        report.subject_name,
        report.subject_id,
        report.risk_score.overall,
        report.definite_flags.len(),
        report.suspected_flags.len(),
        report.alt_candidates.len(),
        report.timeline.len(),
    )
}
