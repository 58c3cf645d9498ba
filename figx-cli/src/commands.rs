use std::path::Path;

use anyhow::Result;
use figx_core::Session;
use figx_core::Split;
use figx_core::SplitBoundaries;
use figx_core::SplitManifest;
use figx_core::assign_splits;

pub fn handle_info(session: &Session) -> Result<()> {
    println!(
        "Loaded configuration from {}",
        session.paths().config_file.display()
    );
    println!("Corpus directory: {}", session.docs_dir()?.display());
    if let Some(max_docs) = session.config().corpus.max_docs {
        println!("Document limit: {max_docs}");
    }

    let boundaries = session.boundaries();
    println!(
        "Split boundaries: train < {}, dev < {}, test otherwise",
        boundaries.train, boundaries.dev
    );
    println!(
        "Run artifacts: {}",
        session.run_logger().runs_dir().display()
    );

    Ok(())
}

pub fn handle_corpus(session: &Session) -> Result<()> {
    let docs = session.load_corpus()?;

    if docs.is_empty() {
        println!(
            "No documents found in {}. Drop .html datasheets there to get started.",
            session.docs_dir()?.display()
        );
        return Ok(());
    }

    println!("{} documents:", docs.len());
    for doc in &docs {
        let pdf = if doc.has_pdf() { " [pdf]" } else { "" };
        println!("  {}{pdf}", doc.name);
    }

    Ok(())
}

pub fn handle_split(
    session: &Session,
    train: Option<f64>,
    dev: Option<f64>,
    manifest_path: Option<&Path>,
) -> Result<()> {
    let configured = session.boundaries();
    let boundaries = SplitBoundaries::new(
        train.unwrap_or(configured.train),
        dev.unwrap_or(configured.dev),
    )?;

    let docs = session.load_corpus()?;
    let total = docs.len();
    let assignment = assign_splits(docs, boundaries)?;

    println!(
        "Partitioned {} documents at ({}, {}):",
        total, boundaries.train, boundaries.dev
    );
    for split in Split::ALL {
        let group = assignment.group(split);
        let names: Vec<&str> = group.iter().map(|doc| doc.name.as_str()).collect();
        println!("  {split} ({}): {}", group.len(), names.join(", "));
    }

    if let Some(path) = manifest_path {
        let manifest = SplitManifest::from_assignment(&assignment, boundaries);
        manifest.write(path)?;
        println!("Manifest written to {}", path.display());
    }

    Ok(())
}

pub fn handle_runs(session: &Session, detailed: bool) -> Result<()> {
    let reports = session.run_logger().list()?;

    if reports.is_empty() {
        println!("No recorded runs yet.");
        return Ok(());
    }

    for report in &reports {
        println!(
            "{}  started {}  ({} documents, boundaries {}/{})",
            report.run_id,
            report.started_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.counts.total_documents(),
            report.boundaries.train,
            report.boundaries.dev
        );

        if detailed {
            for split in Split::ALL {
                let counts = report.counts.group(split);
                println!(
                    "  {split}: {} documents, {} mentions, {} candidates",
                    counts.documents, counts.mentions, counts.candidates
                );
            }
        }
    }

    Ok(())
}
