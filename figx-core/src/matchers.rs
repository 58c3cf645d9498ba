use crate::pipeline::Figure;
use crate::pipeline::FigureCandidate;

/// Predicate deciding whether a parsed figure should become a mention.
///
/// Matchers are handed across the seam to the external mention extractor,
/// which calls them on every figure it surfaces.
pub trait FigureMatcher {
    fn matches(&self, figure: &Figure) -> bool;
}

/// Wrap a plain closure as a matcher.
pub struct FnMatcher<F>(pub F);

impl<F> FigureMatcher for FnMatcher<F>
where
    F: Fn(&Figure) -> bool,
{
    fn matches(&self, figure: &Figure) -> bool {
        (self.0)(figure)
    }
}

/// Match figures whose URL ends with one of the given file suffixes,
/// case-insensitively.
pub struct UrlSuffixMatcher {
    suffixes: Vec<String>,
}

impl UrlSuffixMatcher {
    pub fn new(suffixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            suffixes: suffixes
                .into_iter()
                .map(|suffix| suffix.into().trim_start_matches('.').to_ascii_lowercase())
                .collect(),
        }
    }

    /// The raster formats datasheet figures are typically exported as.
    pub fn images() -> Self {
        Self::new(["png", "jpg", "jpeg", "gif", "bmp"])
    }
}

impl FigureMatcher for UrlSuffixMatcher {
    fn matches(&self, figure: &Figure) -> bool {
        let url = figure.url.to_ascii_lowercase();
        self.suffixes
            .iter()
            .any(|suffix| url.ends_with(&format!(".{suffix}")))
    }
}

/// Matches when any inner matcher does.
pub struct AnyOf {
    matchers: Vec<Box<dyn FigureMatcher>>,
}

impl AnyOf {
    pub fn new(matchers: Vec<Box<dyn FigureMatcher>>) -> Self {
        Self { matchers }
    }
}

impl FigureMatcher for AnyOf {
    fn matches(&self, figure: &Figure) -> bool {
        self.matchers.iter().any(|matcher| matcher.matches(figure))
    }
}

/// Matches only when every inner matcher does.
pub struct AllOf {
    matchers: Vec<Box<dyn FigureMatcher>>,
}

impl AllOf {
    pub fn new(matchers: Vec<Box<dyn FigureMatcher>>) -> Self {
        Self { matchers }
    }
}

impl FigureMatcher for AllOf {
    fn matches(&self, figure: &Figure) -> bool {
        self.matchers.iter().all(|matcher| matcher.matches(figure))
    }
}

/// Predicate deciding whether a candidate survives extraction.
///
/// The external candidate extractor consults the throttler once per
/// candidate; dropped candidates are never stored.
pub trait Throttler {
    fn keep(&self, candidate: &FigureCandidate) -> bool;
}

/// Keeps every candidate. The default when no throttling is configured.
pub struct KeepAll;

impl Throttler for KeepAll {
    fn keep(&self, _candidate: &FigureCandidate) -> bool {
        true
    }
}

/// Wrap a plain closure as a throttler.
pub struct FnThrottler<F>(pub F);

impl<F> Throttler for FnThrottler<F>
where
    F: Fn(&FigureCandidate) -> bool,
{
    fn keep(&self, candidate: &FigureCandidate) -> bool {
        (self.0)(candidate)
    }
}
