use std::fs;
use std::path::Path;

use anyhow::Context;
use anyhow::Result;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::split::Split;
use crate::split::SplitAssignment;
use crate::split::SplitBoundaries;

/// One document's recorded assignment. The split is stored as the integer id
/// (0 = train, 1 = dev, 2 = test) that downstream consumers filter stored
/// candidates by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    pub split: u8,
}

/// Persisted record of one split assignment.
///
/// The manifest records; it never re-partitions. Re-running the splitter over
/// the same corpus with the same boundaries reproduces it exactly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitManifest {
    pub generated_at: DateTime<Utc>,
    pub boundaries: SplitBoundaries,
    pub documents: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ManifestError {
    #[error("manifest entry '{name}' has unknown split id {id}")]
    UnknownSplitId { name: String, id: u8 },
}

impl SplitManifest {
    pub fn from_assignment(assignment: &SplitAssignment, boundaries: SplitBoundaries) -> Self {
        let documents = assignment
            .iter()
            .map(|(split, doc)| ManifestEntry {
                name: doc.name.clone(),
                split: split.id(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            boundaries,
            documents,
        }
    }

    /// Names recorded under the given split, in manifest order.
    pub fn group(&self, split: Split) -> Vec<&str> {
        self.documents
            .iter()
            .filter(|entry| entry.split == split.id())
            .map(|entry| entry.name.as_str())
            .collect()
    }

    /// Reject entries whose split id is outside the 0/1/2 convention.
    pub fn validate(&self) -> Result<(), ManifestError> {
        for entry in &self.documents {
            if Split::from_id(entry.split).is_none() {
                return Err(ManifestError::UnknownSplitId {
                    name: entry.name.clone(),
                    id: entry.split,
                });
            }
        }
        Ok(())
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create manifest directory {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write manifest to {}", path.display()))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read manifest from {}", path.display()))?;
        let manifest: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse manifest at {}", path.display()))?;
        manifest.validate()?;
        Ok(manifest)
    }
}
