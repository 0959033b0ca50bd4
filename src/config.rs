use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::chapters::ChapterMapping;
use crate::cli::PathArgs;
use crate::plan::{self, Plan};

/// Run-wide settings, resolved once from the command line and environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub content_dir: PathBuf,
    pub chapters: ChapterMapping,
}

impl Config {
    pub fn from_cli(args: &PathArgs) -> anyhow::Result<Self> {
        let chapters = match args.chapters.as_deref() {
            Some(path) => ChapterMapping::from_yaml_file(Path::new(path))
                .context("load chapter table")?,
            None => ChapterMapping::builtin(),
        };
        if chapters.is_empty() {
            anyhow::bail!("chapter table is empty");
        }

        Ok(Self {
            data_dir: PathBuf::from(&args.data),
            content_dir: PathBuf::from(&args.content),
            chapters,
        })
    }

    pub fn build_plan(&self) -> anyhow::Result<Plan> {
        tracing::info!(data = %self.data_dir.display(), "scan input tree");
        let plan = plan::build(&self.data_dir, &self.content_dir, &self.chapters)
            .context("build reorganization plan")?;
        tracing::info!(
            topics = plan.topic_count(),
            files = plan.file_count(),
            warnings = plan.warnings.len(),
            "plan built"
        );
        Ok(plan)
    }
}
