use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

use crate::corpus::Document;
use crate::matchers::FigureMatcher;
use crate::matchers::Throttler;
use crate::split::Split;

/// A figure or embedded image surfaced by the external parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// Location of the image asset as it appears in the document.
    pub url: String,
    pub caption: Option<String>,
}

/// A document after it has been through the external parsing stage.
///
/// Only the figure inventory crosses the seam; sentences, tables, and layout
/// stay inside the framework.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    pub name: String,
    pub figures: Vec<Figure>,
}

/// A figure mention: one matched figure anchored to its source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureMention {
    pub document: String,
    pub figure: Figure,
}

/// A candidate built from a mention, ready for downstream storage keyed by
/// split id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FigureCandidate {
    pub mention: FigureMention,
}

/// Seam to the external document parser. Implementations own PDF/HTML
/// parsing, tokenization, and structural alignment; this crate never does.
pub trait DocumentParser {
    fn parse(&self, document: &Document) -> Result<ParsedDocument>;
}

/// Seam to the external mention-extraction stage.
pub trait MentionExtractor {
    fn extract(&self, parsed: &ParsedDocument, matcher: &dyn FigureMatcher) -> Vec<FigureMention>;
}

/// Mention extractor that applies the matcher over the parser's figure
/// inventory, one mention per matching figure.
#[derive(Debug, Default)]
pub struct MatcherMentionExtractor;

impl MentionExtractor for MatcherMentionExtractor {
    fn extract(&self, parsed: &ParsedDocument, matcher: &dyn FigureMatcher) -> Vec<FigureMention> {
        parsed
            .figures
            .iter()
            .filter(|figure| matcher.matches(figure))
            .map(|figure| FigureMention {
                document: parsed.name.clone(),
                figure: figure.clone(),
            })
            .collect()
    }
}

/// Seam to the external candidate-extraction stage.
pub trait CandidateExtractor {
    fn extract(&self, mentions: &[FigureMention], throttler: &dyn Throttler)
    -> Vec<FigureCandidate>;
}

/// Candidate extractor that promotes each mention to a unary candidate and
/// drops the ones the throttler rejects.
#[derive(Debug, Default)]
pub struct ThrottledCandidateExtractor;

impl CandidateExtractor for ThrottledCandidateExtractor {
    fn extract(
        &self,
        mentions: &[FigureMention],
        throttler: &dyn Throttler,
    ) -> Vec<FigureCandidate> {
        mentions
            .iter()
            .map(|mention| FigureCandidate {
                mention: mention.clone(),
            })
            .filter(|candidate| throttler.keep(candidate))
            .collect()
    }
}

/// Stage totals for one split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts {
    pub documents: usize,
    pub mentions: usize,
    pub candidates: usize,
}

/// Stage totals for all three splits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineCounts {
    pub train: StageCounts,
    pub dev: StageCounts,
    pub test: StageCounts,
}

impl PipelineCounts {
    pub fn group(&self, split: Split) -> &StageCounts {
        match split {
            Split::Train => &self.train,
            Split::Dev => &self.dev,
            Split::Test => &self.test,
        }
    }

    pub fn group_mut(&mut self, split: Split) -> &mut StageCounts {
        match split {
            Split::Train => &mut self.train,
            Split::Dev => &mut self.dev,
            Split::Test => &mut self.test,
        }
    }

    pub fn total_documents(&self) -> usize {
        Split::ALL
            .into_iter()
            .map(|split| self.group(split).documents)
            .sum()
    }
}
