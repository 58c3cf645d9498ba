use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::corpus::Document;

/// One of the three disjoint corpus partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Split {
    Train,
    Dev,
    Test,
}

impl Split {
    pub const ALL: [Split; 3] = [Split::Train, Split::Dev, Split::Test];

    /// Integer identifier stored with candidates so downstream consumers can
    /// filter by split: 0 = train, 1 = dev, 2 = test.
    pub fn id(self) -> u8 {
        match self {
            Split::Train => 0,
            Split::Dev => 1,
            Split::Test => 2,
        }
    }

    pub fn from_id(id: u8) -> Option<Split> {
        match id {
            0 => Some(Split::Train),
            1 => Some(Split::Dev),
            2 => Some(Split::Test),
            _ => None,
        }
    }
}

impl std::fmt::Display for Split {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Split::Train => write!(f, "train"),
            Split::Dev => write!(f, "dev"),
            Split::Test => write!(f, "test"),
        }
    }
}

/// Cumulative cut fractions over the name-sorted corpus.
///
/// Train covers sorted indices below `floor(train * N)`, dev the indices from
/// there up to `floor(dev * N)`, test the remainder. Must satisfy
/// `0 <= train <= dev <= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitBoundaries {
    pub train: f64,
    pub dev: f64,
}

impl SplitBoundaries {
    pub fn new(train: f64, dev: f64) -> Result<Self, SplitError> {
        let boundaries = Self { train, dev };
        boundaries.validate()?;
        Ok(boundaries)
    }

    pub fn validate(&self) -> Result<(), SplitError> {
        let in_range = |f: f64| (0.0..=1.0).contains(&f);
        if !in_range(self.train) || !in_range(self.dev) || self.train > self.dev {
            return Err(SplitError::InvalidBoundary {
                train: self.train,
                dev: self.dev,
            });
        }
        Ok(())
    }
}

impl Default for SplitBoundaries {
    fn default() -> Self {
        Self {
            train: 0.8,
            dev: 0.9,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SplitError {
    #[error("split boundaries must satisfy 0 <= train <= dev <= 1, got train={train}, dev={dev}")]
    InvalidBoundary { train: f64, dev: f64 },

    #[error("duplicate document name '{name}' makes the corpus order ambiguous")]
    DuplicateName { name: String },
}

/// The computed three-way partition. The groups are pairwise disjoint and
/// together contain every input document exactly once, each group sorted by
/// document name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitAssignment {
    pub train: Vec<Document>,
    pub dev: Vec<Document>,
    pub test: Vec<Document>,
}

impl SplitAssignment {
    pub fn group(&self, split: Split) -> &[Document] {
        match split {
            Split::Train => &self.train,
            Split::Dev => &self.dev,
            Split::Test => &self.test,
        }
    }

    /// Total number of documents across all three groups.
    pub fn len(&self) -> usize {
        self.train.len() + self.dev.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate `(split, document)` pairs in split order, each group in name
    /// order.
    pub fn iter(&self) -> impl Iterator<Item = (Split, &Document)> {
        Split::ALL
            .into_iter()
            .flat_map(|split| self.group(split).iter().map(move |doc| (split, doc)))
    }
}

/// Partition a corpus into train/dev/test groups by sorted document name.
///
/// The partition is a pure function of the input set and the boundaries:
/// documents are sorted lexicographically by name and cut at
/// `floor(train * N)` and `floor(dev * N)`. Invalid boundaries and duplicate
/// names fail before any partial result is produced; duplicates are rejected
/// rather than tie-broken, so the assignment never depends on discovery
/// order.
pub fn assign_splits(
    docs: Vec<Document>,
    boundaries: SplitBoundaries,
) -> Result<SplitAssignment, SplitError> {
    boundaries.validate()?;

    let mut docs = docs;
    docs.sort_by(|a, b| a.name.cmp(&b.name));

    if let Some(pair) = docs.windows(2).find(|pair| pair[0].name == pair[1].name) {
        return Err(SplitError::DuplicateName {
            name: pair[0].name.clone(),
        });
    }

    let total = docs.len();
    // train <= dev after validation, so the cut indices are ordered too.
    let train_end = cut_index(boundaries.train, total);
    let dev_end = cut_index(boundaries.dev, total);

    let test = docs.split_off(dev_end);
    let dev = docs.split_off(train_end);

    Ok(SplitAssignment {
        train: docs,
        dev,
        test,
    })
}

/// Cut index over a sequence of `total` items: `floor(fraction * total)`,
/// clamped into range.
fn cut_index(fraction: f64, total: usize) -> usize {
    ((fraction * total as f64).floor() as usize).min(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(names: &[&str]) -> Vec<Document> {
        names
            .iter()
            .map(|name| Document::new(*name, format!("{name}.html")))
            .collect()
    }

    fn names(docs: &[Document]) -> Vec<&str> {
        docs.iter().map(|doc| doc.name.as_str()).collect()
    }

    #[test]
    fn partitions_sorted_corpus_at_cut_points() {
        let docs = corpus(&["b", "a", "d", "c"]);
        let assignment = assign_splits(docs, SplitBoundaries::new(0.5, 0.75).unwrap()).unwrap();

        assert_eq!(names(&assignment.train), ["a", "b"]);
        assert_eq!(names(&assignment.dev), ["c"]);
        assert_eq!(names(&assignment.test), ["d"]);
    }

    #[test]
    fn groups_are_exhaustive_and_disjoint() {
        let docs = corpus(&["e", "c", "a", "d", "b", "g", "f"]);
        let total = docs.len();
        let assignment = assign_splits(docs, SplitBoundaries::default()).unwrap();

        assert_eq!(assignment.len(), total);

        let mut all: Vec<&str> = assignment.iter().map(|(_, doc)| doc.name.as_str()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), total);
    }

    #[test]
    fn group_sizes_follow_floor_semantics() {
        // 7 docs at (0.8, 0.9): floor(5.6) = 5 train, floor(6.3) - 5 = 1 dev.
        let docs = corpus(&["a", "b", "c", "d", "e", "f", "g"]);
        let assignment = assign_splits(docs, SplitBoundaries::default()).unwrap();

        assert_eq!(assignment.train.len(), 5);
        assert_eq!(assignment.dev.len(), 1);
        assert_eq!(assignment.test.len(), 1);
    }

    #[test]
    fn assignment_is_deterministic_across_input_orderings() {
        let boundaries = SplitBoundaries::new(0.6, 0.8).unwrap();
        let forward = assign_splits(corpus(&["a", "b", "c", "d", "e"]), boundaries).unwrap();
        let shuffled = assign_splits(corpus(&["e", "c", "a", "d", "b"]), boundaries).unwrap();

        assert_eq!(forward, shuffled);
    }

    #[test]
    fn empty_corpus_yields_three_empty_groups() {
        let assignment = assign_splits(Vec::new(), SplitBoundaries::default()).unwrap();
        assert!(assignment.is_empty());
        assert!(assignment.train.is_empty());
        assert!(assignment.dev.is_empty());
        assert!(assignment.test.is_empty());
    }

    #[test]
    fn zero_boundaries_send_everything_to_test() {
        let docs = corpus(&["a", "b", "c"]);
        let assignment = assign_splits(docs, SplitBoundaries::new(0.0, 0.0).unwrap()).unwrap();

        assert!(assignment.train.is_empty());
        assert!(assignment.dev.is_empty());
        assert_eq!(names(&assignment.test), ["a", "b", "c"]);
    }

    #[test]
    fn unit_boundaries_send_everything_to_train() {
        let docs = corpus(&["a", "b", "c"]);
        let assignment = assign_splits(docs, SplitBoundaries::new(1.0, 1.0).unwrap()).unwrap();

        assert_eq!(names(&assignment.train), ["a", "b", "c"]);
        assert!(assignment.dev.is_empty());
        assert!(assignment.test.is_empty());
    }

    #[test]
    fn unordered_boundaries_are_rejected() {
        let err = assign_splits(corpus(&["a"]), SplitBoundaries { train: 0.6, dev: 0.4 })
            .unwrap_err();
        assert_eq!(
            err,
            SplitError::InvalidBoundary {
                train: 0.6,
                dev: 0.4
            }
        );
    }

    #[test]
    fn out_of_range_boundaries_are_rejected() {
        for (train, dev) in [(-0.1, 0.5), (0.5, 1.5), (1.2, 1.3)] {
            let err = SplitBoundaries::new(train, dev).unwrap_err();
            assert!(matches!(err, SplitError::InvalidBoundary { .. }));
        }
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let docs = vec![
            Document::new("lmp2014", "a/lmp2014.html"),
            Document::new("lmp2011", "lmp2011.html"),
            Document::new("lmp2014", "b/lmp2014.html"),
        ];

        let err = assign_splits(docs, SplitBoundaries::default()).unwrap_err();
        assert_eq!(
            err,
            SplitError::DuplicateName {
                name: "lmp2014".to_string()
            }
        );
    }

    #[test]
    fn split_ids_match_downstream_convention() {
        assert_eq!(Split::Train.id(), 0);
        assert_eq!(Split::Dev.id(), 1);
        assert_eq!(Split::Test.id(), 2);
        for split in Split::ALL {
            assert_eq!(Split::from_id(split.id()), Some(split));
        }
        assert_eq!(Split::from_id(3), None);
    }
}
