use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use crate::manifest::SplitManifest;
use crate::pipeline::PipelineCounts;
use crate::split::SplitBoundaries;

/// Summary of one workflow run: what was partitioned how, and what each
/// stage produced per split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub boundaries: SplitBoundaries,
    pub counts: PipelineCounts,
}

/// Writes run artifacts under `<state>/runs/<run_id>/`, one directory per
/// run: `report.json` plus the split manifest the run used.
#[derive(Debug, Clone)]
pub struct RunLogger {
    runs_dir: PathBuf,
}

impl RunLogger {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            runs_dir: state_dir.join("runs"),
        }
    }

    pub fn runs_dir(&self) -> &Path {
        &self.runs_dir
    }

    /// Timestamp-derived run id, sortable by start time.
    pub fn next_run_id(&self) -> String {
        Utc::now().format("%Y%m%d_%H%M%S").to_string()
    }

    /// Persist the report and its manifest, returning the run directory.
    pub fn write(&self, report: &RunReport, manifest: &SplitManifest) -> Result<PathBuf> {
        let run_dir = self.runs_dir.join(&report.run_id);
        fs::create_dir_all(&run_dir)
            .with_context(|| format!("failed to create run directory {}", run_dir.display()))?;

        let report_json = serde_json::to_string_pretty(report)?;
        fs::write(run_dir.join("report.json"), report_json)
            .with_context(|| format!("failed to write report under {}", run_dir.display()))?;

        manifest.write(&run_dir.join("manifest.json"))?;

        Ok(run_dir)
    }

    /// All recorded reports, most recent last. Run directories without a
    /// readable report are skipped with a warning.
    pub fn list(&self) -> Result<Vec<RunReport>> {
        if !self.runs_dir.exists() {
            return Ok(Vec::new());
        }

        let mut reports = Vec::new();
        for entry in fs::read_dir(&self.runs_dir)
            .with_context(|| format!("unable to read runs directory {}", self.runs_dir.display()))?
        {
            let entry = entry?;
            let report_path = entry.path().join("report.json");
            if !report_path.is_file() {
                continue;
            }

            let content = fs::read_to_string(&report_path)
                .with_context(|| format!("failed to read {}", report_path.display()))?;
            match serde_json::from_str::<RunReport>(&content) {
                Ok(report) => reports.push(report),
                Err(err) => {
                    tracing::warn!("skipping malformed report {}: {err}", report_path.display());
                }
            }
        }

        reports.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(reports)
    }
}
