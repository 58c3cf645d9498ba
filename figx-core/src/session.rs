use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;

use crate::config::AppConfig;
use crate::config::AppPaths;
use crate::config::ConfigBundle;
use crate::config::load_or_initialize_config;
use crate::corpus::Document;
use crate::corpus::load_corpus;
use crate::manifest::SplitManifest;
use crate::matchers::FigureMatcher;
use crate::matchers::Throttler;
use crate::pipeline::CandidateExtractor;
use crate::pipeline::DocumentParser;
use crate::pipeline::MatcherMentionExtractor;
use crate::pipeline::MentionExtractor;
use crate::pipeline::PipelineCounts;
use crate::pipeline::ThrottledCandidateExtractor;
use crate::report::RunLogger;
use crate::report::RunReport;
use crate::split::SplitAssignment;
use crate::split::SplitBoundaries;
use crate::split::SplitError;
use crate::split::assign_splits;

/// Explicitly passed workflow handle.
///
/// A `Session` owns the loaded configuration and drives corpus discovery,
/// split assignment, and the extraction stages. Everything that needs the
/// configuration or the runtime paths reaches them through a session rather
/// than through process-global state.
#[derive(Debug)]
pub struct Session {
    bundle: ConfigBundle,
}

impl Session {
    /// Load configuration from disk (creating defaults if needed) and
    /// produce a ready-to-use session.
    pub fn load(app_name: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            bundle: load_or_initialize_config(app_name)?,
        })
    }

    /// Construct a session from an existing [`ConfigBundle`]. Useful for
    /// tests.
    pub fn from_bundle(bundle: ConfigBundle) -> Self {
        Self { bundle }
    }

    pub fn config(&self) -> &AppConfig {
        &self.bundle.config
    }

    pub fn paths(&self) -> &AppPaths {
        &self.bundle.paths
    }

    pub fn boundaries(&self) -> SplitBoundaries {
        self.bundle.config.split.boundaries()
    }

    pub fn docs_dir(&self) -> Result<PathBuf> {
        self.bundle.config.resolved_docs_dir(&self.bundle.paths)
    }

    pub fn run_logger(&self) -> RunLogger {
        RunLogger::new(&self.bundle.paths.state_dir)
    }

    /// Discover the configured corpus, sorted by name and capped at
    /// `corpus.max_docs`.
    pub fn load_corpus(&self) -> Result<Vec<Document>> {
        let dir = self.docs_dir()?;
        load_corpus(&dir, self.bundle.config.corpus.max_docs)
    }

    /// Partition a corpus with the configured boundaries.
    pub fn assign_splits(&self, docs: Vec<Document>) -> Result<SplitAssignment, SplitError> {
        assign_splits(docs, self.boundaries())
    }

    /// Run the full workflow with the default extraction stages: discover,
    /// partition, parse each document through the external parser, extract
    /// mentions and candidates, and persist the manifest and run report.
    pub fn run(
        &self,
        parser: &dyn DocumentParser,
        matcher: &dyn FigureMatcher,
        throttler: &dyn Throttler,
    ) -> Result<RunReport> {
        self.run_with_extractors(
            parser,
            &MatcherMentionExtractor,
            &ThrottledCandidateExtractor,
            matcher,
            throttler,
        )
    }

    /// Like [`Session::run`] but with caller-supplied extraction stages.
    pub fn run_with_extractors(
        &self,
        parser: &dyn DocumentParser,
        mention_extractor: &dyn MentionExtractor,
        candidate_extractor: &dyn CandidateExtractor,
        matcher: &dyn FigureMatcher,
        throttler: &dyn Throttler,
    ) -> Result<RunReport> {
        let boundaries = self.boundaries();
        let corpus = self.load_corpus()?;
        let assignment = assign_splits(corpus, boundaries)?;

        let logger = self.run_logger();
        let run_id = logger.next_run_id();
        let started_at = Utc::now();

        let mut counts = PipelineCounts::default();
        for (split, doc) in assignment.iter() {
            let parsed = match parser.parse(doc) {
                Ok(parsed) => parsed,
                Err(err) => {
                    tracing::warn!("skipping document '{}': {err:#}", doc.name);
                    continue;
                }
            };

            let mentions = mention_extractor.extract(&parsed, matcher);
            let candidates = candidate_extractor.extract(&mentions, throttler);

            let group = counts.group_mut(split);
            group.documents += 1;
            group.mentions += mentions.len();
            group.candidates += candidates.len();
        }

        let manifest = SplitManifest::from_assignment(&assignment, boundaries);
        let report = RunReport {
            run_id,
            started_at,
            boundaries,
            counts,
        };

        let run_dir = logger.write(&report, &manifest)?;
        tracing::info!(
            "run {} complete: {} documents across splits, artifacts in {}",
            report.run_id,
            report.counts.total_documents(),
            run_dir.display()
        );

        Ok(report)
    }
}
