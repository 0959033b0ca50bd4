use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::assemble::{ClassifiedLesson, PositionCounter, TopicRecord, assemble};
use crate::chapters::{ChapterMapping, Product};
use crate::classify::classify_files;
use crate::collapse::lesson_folders;
use crate::snapshot::{self, FolderNode};

/// Recoverable problems found while scanning; they never stop a run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScanWarning {
    #[error("unknown chapter: {name}")]
    UnknownChapter { name: String },
    #[error("cannot list folder {}: {cause}", path.display())]
    UnreadableFolder { path: PathBuf, cause: String },
    #[error("ignoring file at input root: {}", path.display())]
    StrayRootFile { path: PathBuf },
}

#[derive(Debug, Clone, Serialize)]
pub struct ModulePlan {
    pub module: String,
    pub topics: Vec<TopicRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPlan {
    pub product: Product,
    pub modules: Vec<ModulePlan>,
}

/// The full reorganization, computed once and consumed by the sinks.
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub content_root: PathBuf,
    pub products: Vec<ProductPlan>,
    #[serde(skip)]
    pub warnings: Vec<ScanWarning>,
}

impl Plan {
    pub fn topics(&self) -> impl Iterator<Item = &TopicRecord> {
        self.products
            .iter()
            .flat_map(|p| p.modules.iter())
            .flat_map(|m| m.topics.iter())
    }

    pub fn topic_count(&self) -> usize {
        self.topics().count()
    }

    pub fn file_count(&self) -> usize {
        self.topics().map(|t| t.file_mappings.len()).sum()
    }
}

/// Scans `data_root` and assembles the plan for `content_root`.
pub fn build(
    data_root: &Path,
    content_root: &Path,
    chapters: &ChapterMapping,
) -> anyhow::Result<Plan> {
    let mut warnings = Vec::new();
    let tree = snapshot::take(data_root, &mut warnings)?;
    Ok(build_from_snapshot(&tree, content_root, chapters, warnings))
}

/// Same as [`build`], over an already taken snapshot.
pub fn build_from_snapshot(
    tree: &FolderNode,
    content_root: &Path,
    chapters: &ChapterMapping,
    mut warnings: Vec<ScanWarning>,
) -> Plan {
    for file in &tree.files {
        tracing::debug!(path = %file.display(), "ignoring file at input root");
        warnings.push(ScanWarning::StrayRootFile { path: file.clone() });
    }

    let grouped = group_lessons(tree, chapters, &mut warnings);

    let mut counter = PositionCounter::new();
    let products = grouped
        .into_iter()
        .map(|(product, modules)| ProductPlan {
            product,
            modules: modules
                .into_iter()
                .map(|(module, lessons)| {
                    let topics = assemble(product, &module, &lessons, content_root, &mut counter);
                    ModulePlan { module, topics }
                })
                .collect(),
        })
        .collect();

    Plan {
        content_root: content_root.to_path_buf(),
        products,
        warnings,
    }
}

type Grouped = Vec<(Product, Vec<(String, Vec<ClassifiedLesson>)>)>;

/// Groups lessons by product, then module, in first-seen order.
fn group_lessons(
    tree: &FolderNode,
    chapters: &ChapterMapping,
    warnings: &mut Vec<ScanWarning>,
) -> Grouped {
    let mut grouped: Grouped = Vec::new();

    for chapter in &tree.subfolders {
        let Some(target) = chapters.classify(&chapter.name) else {
            tracing::warn!(chapter = %chapter.name, "unknown chapter; skipping");
            warnings.push(ScanWarning::UnknownChapter {
                name: chapter.name.clone(),
            });
            continue;
        };

        let product_idx = match grouped.iter().position(|(p, _)| *p == target.product) {
            Some(idx) => idx,
            None => {
                grouped.push((target.product, Vec::new()));
                grouped.len() - 1
            }
        };
        let modules = &mut grouped[product_idx].1;
        let module_idx = match modules.iter().position(|(m, _)| *m == target.module) {
            Some(idx) => idx,
            None => {
                modules.push((target.module.clone(), Vec::new()));
                modules.len() - 1
            }
        };
        let lessons = &mut modules[module_idx].1;

        for folder in lesson_folders(chapter) {
            let files = classify_files(folder);
            if files.is_empty() {
                tracing::debug!(path = %folder.path.display(), "empty lesson folder");
                continue;
            }
            lessons.push(ClassifiedLesson {
                path: folder.path.clone(),
                name: folder.name.clone(),
                files,
            });
        }
    }

    grouped
}
