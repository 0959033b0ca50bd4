use std::fs::OpenOptions;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;

use crate::assemble::TopicRecord;
use crate::classify::FileRole;
use crate::formats::{DemoFileRecord, ExtractedTopic, PageRecord};
use crate::plan::Plan;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Turns a slide deck or document into ordered page records.
///
/// Implementations own all format knowledge; the records are stored as-is.
pub trait PageExtractor {
    fn extract(&self, path: &Path) -> anyhow::Result<Vec<PageRecord>>;
}

/// Runs `<program> <path>` and reads a JSON array of page records from stdout.
#[derive(Debug, Clone)]
pub struct CommandExtractor {
    pub program: String,
}

impl CommandExtractor {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PageExtractor for CommandExtractor {
    fn extract(&self, path: &Path) -> anyhow::Result<Vec<PageRecord>> {
        tracing::debug!(program = %self.program, path = %path.display(), "run extractor");
        let output = Command::new(&self.program)
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("spawn extractor: {}", self.program))?;
        if !output.status.success() {
            anyhow::bail!(
                "extractor failed ({}): {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        serde_json::from_slice(&output.stdout).context("parse extractor output")
    }
}

#[derive(Debug, Default)]
pub struct ExtractionSummary {
    pub topics_written: usize,
    pub slides: usize,
    pub assignment_pages: usize,
    pub failed_files: Vec<PathBuf>,
}

/// Extracts text for every topic of `plan` and writes one `{id}.json` per topic
/// into `out_dir`.
///
/// Reads the destination files, so it is meant to run after `execute`. A file
/// the extractor cannot handle contributes no pages; topics without any pages
/// are not written. A topic whose output cannot be written is counted as failed
/// and the run moves on.
pub fn run(
    plan: &Plan,
    extractor: &dyn PageExtractor,
    out_dir: &Path,
) -> anyhow::Result<ExtractionSummary> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("create extraction output dir: {}", out_dir.display()))?;

    let mut summary = ExtractionSummary::default();
    for topic in plan.topics() {
        let extracted = extract_topic(topic, &plan.content_root, extractor, &mut summary);
        if extracted.slides.is_empty() && extracted.assignment_pages.is_empty() {
            tracing::info!(topic = %topic.id, "no content extracted");
            continue;
        }

        if let Err(err) = write_topic(out_dir, &extracted) {
            tracing::warn!(topic = %topic.id, err = %format!("{err:#}"), "write extracted topic failed");
            summary.failed_files.push(topic_path(out_dir, &topic.id));
            continue;
        }
        summary.slides += extracted.slides.len();
        summary.assignment_pages += extracted.assignment_pages.len();
        summary.topics_written += 1;
        tracing::info!(
            topic = %topic.id,
            slides = extracted.slides.len(),
            assignment_pages = extracted.assignment_pages.len(),
            demos = extracted.demo_files.len(),
            "content extracted"
        );
    }
    Ok(summary)
}

fn extract_topic(
    topic: &TopicRecord,
    content_root: &Path,
    extractor: &dyn PageExtractor,
    summary: &mut ExtractionSummary,
) -> ExtractedTopic {
    let mut extracted = ExtractedTopic {
        topic_code: topic.id.clone(),
        slides: Vec::new(),
        assignment_pages: Vec::new(),
        demo_files: Vec::new(),
    };

    for mapping in &topic.file_mappings {
        match mapping.role {
            FileRole::Slides => {
                extracted.slides = pages_or_empty(extractor, &mapping.destination, summary);
            }
            FileRole::Assignment => {
                extracted.assignment_pages =
                    pages_or_empty(extractor, &mapping.destination, summary);
            }
            FileRole::Demo => extracted.demo_files.push(demo_record(&mapping.destination, content_root)),
            FileRole::Other => {}
        }
    }
    extracted
}

fn pages_or_empty(
    extractor: &dyn PageExtractor,
    path: &Path,
    summary: &mut ExtractionSummary,
) -> Vec<PageRecord> {
    match extractor.extract(path) {
        Ok(pages) => pages,
        Err(err) => {
            tracing::warn!(path = %path.display(), err = %format!("{err:#}"), "extraction failed");
            summary.failed_files.push(path.to_path_buf());
            Vec::new()
        }
    }
}

fn demo_record(path: &Path, content_root: &Path) -> DemoFileRecord {
    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let relative = path.strip_prefix(content_root).unwrap_or(path);
    DemoFileRecord {
        filename: crate::snapshot::file_name_lossy(path),
        path: relative.to_string_lossy().to_string(),
        size_mb: round_2(size as f64 / BYTES_PER_MB),
    }
}

fn round_2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn topic_path(out_dir: &Path, topic_id: &str) -> PathBuf {
    out_dir.join(format!("{topic_id}.json"))
}

fn write_topic(out_dir: &Path, extracted: &ExtractedTopic) -> anyhow::Result<()> {
    let out_path = topic_path(out_dir, &extracted.topic_code);
    let json = serde_json::to_string_pretty(extracted).context("serialize extracted topic")?;
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(&out_path)
        .with_context(|| format!("open extracted topic: {}", out_path.display()))?;
    file.write_all(json.as_bytes())
        .with_context(|| format!("write extracted topic: {}", out_path.display()))?;
    Ok(())
}
