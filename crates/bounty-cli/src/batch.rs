//! Concurrent batch processing of documents.
//!
//! One task per document, bounded by a semaphore. Tasks share nothing but
//! the read-only [`Analyzer`]; results are collected and sorted by path so
//! the merge is the same on every run. Ctrl-C stops new documents from
//! starting and lets in-flight ones finish.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use bounty_core::document::{Analyzer, BatchReport, Fact, Outcome};
use bounty_core::rollup::{Precedence, Rollup};

/// A document and how it ended.
#[derive(Debug)]
pub struct Processed {
    pub source: PathBuf,
    pub outcome: Outcome<Fact>,
}

fn is_text_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
}

/// Expand `roots` into a sorted list of documents.
///
/// Directories are walked recursively for `*.txt`; files named directly are
/// taken whatever their extension.
pub async fn collect_inputs(roots: &[PathBuf]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let mut pending: Vec<PathBuf> = roots.to_vec();

    while let Some(path) = pending.pop() {
        let meta = tokio::fs::metadata(&path)
            .await
            .with_context(|| format!("cannot access {}", path.display()))?;
        if !meta.is_dir() {
            files.push(path);
            continue;
        }
        let mut entries = tokio::fs::read_dir(&path)
            .await
            .with_context(|| format!("cannot list {}", path.display()))?;
        while let Some(entry) = entries.next_entry().await? {
            let child = entry.path();
            if entry.file_type().await?.is_dir() {
                pending.push(child);
            } else if is_text_file(&child) {
                files.push(child);
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

async fn process_file(analyzer: &Analyzer, path: &Path) -> Outcome<Fact> {
    match tokio::fs::read(path).await {
        // Exports are not always valid UTF-8; bad bytes are replaced.
        Ok(bytes) => analyzer.analyze(&String::from_utf8_lossy(&bytes)),
        Err(e) => Outcome::Failed(format!("cannot read file: {e}")),
    }
}

/// Process every file with at most `jobs` documents in flight.
pub async fn run(analyzer: Arc<Analyzer>, files: Vec<PathBuf>, jobs: usize) -> Vec<Processed> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let mut set = JoinSet::new();
    let mut started: Vec<PathBuf> = Vec::with_capacity(files.len());
    let mut not_started: Vec<PathBuf> = Vec::new();

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut queue = files.into_iter();
    while let Some(path) = queue.next() {
        let permit = tokio::select! {
            biased;
            _ = &mut shutdown => None,
            permit = Arc::clone(&semaphore).acquire_owned() => permit.ok(),
        };
        let Some(permit) = permit else {
            tracing::warn!(remaining = queue.len() + 1, "interrupted, no new documents will start");
            not_started.push(path);
            not_started.extend(queue.by_ref());
            break;
        };

        started.push(path.clone());
        let analyzer = Arc::clone(&analyzer);
        set.spawn(async move {
            let _permit = permit;
            let outcome = process_file(&analyzer, &path).await;
            Processed { source: path, outcome }
        });
    }

    let mut processed = Vec::with_capacity(started.len() + not_started.len());
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok(done) => processed.push(done),
            Err(e) => tracing::error!(error = %e, "document task aborted"),
        }
    }

    // A task that panicked never reported its path back.
    let finished: HashSet<PathBuf> = processed.iter().map(|p| p.source.clone()).collect();
    for path in started {
        if !finished.contains(&path) {
            processed.push(Processed {
                source: path,
                outcome: Outcome::Failed("processing aborted".to_string()),
            });
        }
    }
    processed.extend(not_started.into_iter().map(|source| Processed {
        source,
        outcome: Outcome::Skipped("interrupted".to_string()),
    }));

    processed.sort_by(|a, b| a.source.cmp(&b.source));
    processed
}

/// Count every outcome and merge the successful facts per tournament.
pub fn tally(processed: Vec<Processed>, precedence: Precedence) -> (BatchReport, Rollup) {
    let mut batch = BatchReport::default();
    let mut rollup = Rollup::new(precedence);
    for Processed { source, outcome } in processed {
        batch.record(&source.display().to_string(), &outcome);
        match outcome {
            Outcome::Success(Fact::Summary(summary)) => {
                rollup.add_summary(summary);
            }
            Outcome::Success(Fact::HandHistory(report)) => {
                rollup.add_hand_history(report);
            }
            Outcome::Skipped(_) | Outcome::Failed(_) => {}
        }
    }
    (batch, rollup)
}
