use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::assemble::{METADATA_FILE_NAME, TopicRecord};
use crate::classify::FileRole;
use crate::metadata;
use crate::plan::Plan;

/// A single step of a topic that could not be carried out.
#[derive(Debug, thiserror::Error)]
pub enum CopyFailure {
    #[error("create topic dir {} for {topic_id}: {cause}", path.display())]
    TopicDir {
        topic_id: String,
        path: PathBuf,
        cause: String,
    },
    #[error("copy {role} {source_name} -> {}: {cause}", destination.display())]
    File {
        topic_id: String,
        role: FileRole,
        source_name: String,
        destination: PathBuf,
        cause: String,
    },
    #[error("write metadata for {topic_id}: {cause}")]
    Metadata { topic_id: String, cause: String },
}

#[derive(Debug, Default)]
pub struct ExecutionSummary {
    pub topics: usize,
    pub files_copied: usize,
    pub metadata_written: usize,
    pub failures: Vec<CopyFailure>,
}

impl ExecutionSummary {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Copies every mapped file into the content tree and writes one
/// `metadata.json` per topic.
///
/// Per-file failures are recorded and skipped; the run always finishes.
pub fn run(plan: &Plan) -> ExecutionSummary {
    let mut summary = ExecutionSummary::default();

    for product in &plan.products {
        tracing::info!(product = %product.product, "execute: product");
        for module in &product.modules {
            tracing::info!(module = %module.module, topics = module.topics.len(), "execute: module");
            for topic in &module.topics {
                summary.topics += 1;
                execute_topic(topic, &mut summary);
            }
        }
    }

    tracing::info!(
        files_copied = summary.files_copied,
        metadata_written = summary.metadata_written,
        failures = summary.failures.len(),
        "execute: done"
    );
    summary
}

fn execute_topic(topic: &TopicRecord, summary: &mut ExecutionSummary) {
    if let Err(err) = std::fs::create_dir_all(&topic.new_path) {
        tracing::warn!(topic = %topic.id, path = %topic.new_path.display(), %err, "cannot create topic dir; skipping topic");
        summary.failures.push(CopyFailure::TopicDir {
            topic_id: topic.id.clone(),
            path: topic.new_path.clone(),
            cause: err.to_string(),
        });
        return;
    }

    for mapping in &topic.file_mappings {
        match std::fs::copy(&mapping.source, &mapping.destination) {
            Ok(_) => summary.files_copied += 1,
            Err(err) => {
                let source_name = crate::snapshot::file_name_lossy(&mapping.source);
                tracing::warn!(topic = %topic.id, source = %source_name, %err, "copy failed");
                summary.failures.push(CopyFailure::File {
                    topic_id: topic.id.clone(),
                    role: mapping.role,
                    source_name,
                    destination: mapping.destination.clone(),
                    cause: err.to_string(),
                });
            }
        }
    }

    match write_metadata(topic) {
        Ok(()) => {
            summary.metadata_written += 1;
            tracing::info!(topic = %topic.id, position = topic.position, title = %topic.title, "topic written");
        }
        Err(err) => {
            tracing::warn!(topic = %topic.id, err = %format!("{err:#}"), "metadata write failed");
            summary.failures.push(CopyFailure::Metadata {
                topic_id: topic.id.clone(),
                cause: format!("{err:#}"),
            });
        }
    }
}

fn write_metadata(topic: &TopicRecord) -> anyhow::Result<()> {
    let path = metadata_path(&topic.new_path);
    let json = serde_json::to_string_pretty(&metadata::derive(topic))
        .context("serialize topic metadata")?;

    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&path)
        .with_context(|| format!("open metadata: {}", path.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("write metadata: {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush metadata: {}", path.display()))?;
    Ok(())
}

/// Renders the end-of-run summary printed after execution.
pub fn render_summary(summary: &ExecutionSummary) -> String {
    let mut out = String::new();
    out.push_str("Reorganization complete.\n");
    out.push_str(&format!("  Topics:                 {}\n", summary.topics));
    out.push_str(&format!("  Files copied:           {}\n", summary.files_copied));
    out.push_str(&format!("  Metadata files created: {}\n", summary.metadata_written));
    if !summary.failures.is_empty() {
        out.push_str(&format!("  Failures:               {}\n", summary.failures.len()));
        for failure in &summary.failures {
            out.push_str(&format!("    - {failure}\n"));
        }
    }
    out
}

pub fn metadata_path(topic_dir: &Path) -> PathBuf {
    topic_dir.join(METADATA_FILE_NAME)
}
