use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;
use serde::Serialize;

/// A single datasheet discovered in the corpus directory.
///
/// The name is the file stem shared by the HTML rendition and the optional
/// sibling PDF, and is the document's unique sort key everywhere downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub html_path: PathBuf,
    pub pdf_path: Option<PathBuf>,
}

impl Document {
    pub fn new(name: impl Into<String>, html_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            html_path: html_path.into(),
            pdf_path: None,
        }
    }

    pub fn with_pdf(mut self, pdf_path: impl Into<PathBuf>) -> Self {
        self.pdf_path = Some(pdf_path.into());
        self
    }

    pub fn has_pdf(&self) -> bool {
        self.pdf_path.is_some()
    }
}

/// Scan a directory for `.html` datasheets and pair each with a sibling
/// `.pdf` of the same stem when one exists.
///
/// Entries that are not `.html` files are skipped. The result is sorted by
/// document name; an optional `limit` truncates the sorted sequence so that
/// repeated runs over the same directory see the same subset.
pub fn load_corpus(dir: &Path, limit: Option<usize>) -> Result<Vec<Document>> {
    let mut docs = Vec::new();

    for entry in
        fs::read_dir(dir).with_context(|| format!("unable to read corpus directory {}", dir.display()))?
    {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("html") {
            continue;
        }

        let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) else {
            tracing::warn!("skipping '{}': non-UTF-8 file stem", path.display());
            continue;
        };

        let pdf = path.with_extension("pdf");
        let pdf_path = pdf.exists().then_some(pdf);
        if pdf_path.is_none() {
            tracing::debug!("document '{name}' has no sibling PDF");
        }

        docs.push(Document {
            name: name.to_string(),
            html_path: path,
            pdf_path,
        });
    }

    docs.sort_by(|a, b| a.name.cmp(&b.name));
    if let Some(limit) = limit {
        docs.truncate(limit);
    }

    tracing::info!("discovered {} documents in {}", docs.len(), dir.display());
    Ok(docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        fs::write(dir.join(name), b"x").unwrap();
    }

    #[test]
    fn pairs_html_with_sibling_pdf() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "lmp2014mt.html");
        touch(tmp.path(), "lmp2014mt.pdf");
        touch(tmp.path(), "lmp2011.html");

        let docs = load_corpus(tmp.path(), None).unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].name, "lmp2011");
        assert!(!docs[0].has_pdf());
        assert_eq!(docs[1].name, "lmp2014mt");
        assert!(docs[1].has_pdf());
    }

    #[test]
    fn ignores_unrelated_files() {
        let tmp = TempDir::new().unwrap();
        touch(tmp.path(), "notes.txt");
        touch(tmp.path(), "orphan.pdf");
        touch(tmp.path(), "sheet.html");

        let docs = load_corpus(tmp.path(), None).unwrap();

        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].name, "sheet");
    }

    #[test]
    fn sorts_by_name_then_truncates() {
        let tmp = TempDir::new().unwrap();
        for name in ["d.html", "b.html", "c.html", "a.html"] {
            touch(tmp.path(), name);
        }

        let docs = load_corpus(tmp.path(), Some(2)).unwrap();

        let names: Vec<&str> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["a", "b"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("nope");

        let err = load_corpus(&missing, None).unwrap_err();
        assert!(err.to_string().contains("unable to read corpus directory"));
    }
}
