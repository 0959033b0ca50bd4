use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::chapters::Product;
use crate::classify::{ClassifiedFileSet, FileRole};
use crate::naming::{clean_topic_name, module_number, title_from_slide};
use crate::snapshot::file_name_lossy;

/// Generated per-topic metadata; no copied file may take this name.
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Hands out 1-based positions, one sequence per product.
#[derive(Debug, Clone, Default)]
pub struct PositionCounter {
    next: HashMap<Product, u32>,
}

impl PositionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, product: Product) -> u32 {
        let slot = self.next.entry(product).or_insert(1);
        let position = *slot;
        *slot += 1;
        position
    }

    /// Position the next topic of `product` would receive.
    pub fn peek(&self, product: Product) -> u32 {
        self.next.get(&product).copied().unwrap_or(1)
    }
}

/// A resolved lesson folder together with its classified files.
#[derive(Debug, Clone)]
pub struct ClassifiedLesson {
    pub path: PathBuf,
    pub name: String,
    pub files: ClassifiedFileSet,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileMapping {
    pub role: FileRole,
    pub source: PathBuf,
    pub destination: PathBuf,
}

impl FileMapping {
    pub fn destination_name(&self) -> String {
        file_name_lossy(&self.destination)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicRecord {
    pub id: String,
    pub product: Product,
    pub module: String,
    pub position: u32,
    pub title: String,
    pub clean_name: String,
    pub original_path: PathBuf,
    pub new_path: PathBuf,
    pub file_mappings: Vec<FileMapping>,
}

impl TopicRecord {
    pub fn mappings_with_role(&self, role: FileRole) -> impl Iterator<Item = &FileMapping> {
        self.file_mappings.iter().filter(move |m| m.role == role)
    }
}

pub fn topic_id(product: Product, module: &str, position: u32) -> String {
    match product.id_code() {
        Some(code) => format!("{code}-{}-{position:03}", module_number(module)),
        None => format!("{product}-{position:03}"),
    }
}

/// Turns the classified lessons of one module into positioned topics.
///
/// Empty lessons are skipped and do not consume a position.
pub fn assemble(
    product: Product,
    module: &str,
    lessons: &[ClassifiedLesson],
    content_root: &Path,
    counter: &mut PositionCounter,
) -> Vec<TopicRecord> {
    let mut topics = Vec::new();
    for lesson in lessons {
        if lesson.files.is_empty() {
            continue;
        }

        let position = counter.next(product);
        let clean_name = clean_topic_name(&lesson.name);
        let new_path = content_root
            .join(product.as_str())
            .join(module)
            .join(format!("{position:03}-{clean_name}"));
        let title = match lesson.files.slides.first() {
            Some(slide) => title_from_slide(slide),
            None => lesson.name.clone(),
        };

        topics.push(TopicRecord {
            id: topic_id(product, module, position),
            product,
            module: module.to_owned(),
            position,
            title,
            clean_name,
            original_path: lesson.path.clone(),
            file_mappings: file_mappings(&lesson.files, &new_path),
            new_path,
        });
    }
    topics
}

/// One slide deck and one assignment per topic; every demo and stray file is kept.
///
/// A stray file whose name is already taken in the topic dir gets an `original-`
/// prefix.
fn file_mappings(files: &ClassifiedFileSet, new_path: &Path) -> Vec<FileMapping> {
    let mut mappings = Vec::new();

    if let Some(source) = files.slides.first() {
        mappings.push(FileMapping {
            role: FileRole::Slides,
            destination: new_path.join(renamed("slides", source)),
            source: source.clone(),
        });
    }

    for (idx, source) in files.demos.iter().enumerate() {
        mappings.push(FileMapping {
            role: FileRole::Demo,
            destination: new_path.join(renamed(&format!("demo-{:02}", idx + 1), source)),
            source: source.clone(),
        });
    }

    if let Some(source) = files.assignments.first() {
        mappings.push(FileMapping {
            role: FileRole::Assignment,
            destination: new_path.join(renamed("assignment", source)),
            source: source.clone(),
        });
    }

    let mut taken = mappings
        .iter()
        .map(|m| m.destination_name().to_ascii_lowercase())
        .collect::<HashSet<_>>();
    taken.insert(METADATA_FILE_NAME.to_owned());
    for source in &files.other {
        let mut name = file_name_lossy(source);
        while !taken.insert(name.to_ascii_lowercase()) {
            name = format!("original-{name}");
        }
        mappings.push(FileMapping {
            role: FileRole::Other,
            destination: new_path.join(name),
            source: source.clone(),
        });
    }

    mappings
}

/// `stem` plus the source's original extension (case preserved).
fn renamed(stem: &str, source: &Path) -> String {
    match source.extension() {
        Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
        None => stem.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(name: &str, files: &[&str]) -> ClassifiedLesson {
        let path = PathBuf::from("/data/ch").join(name);
        let node = files
            .iter()
            .fold(crate::snapshot::FolderNode::new(&path), |node, f| node.with_file(f));
        ClassifiedLesson {
            path,
            name: name.to_owned(),
            files: crate::classify::classify_files(&node),
        }
    }

    fn names(topic: &TopicRecord) -> Vec<String> {
        topic
            .file_mappings
            .iter()
            .map(FileMapping::destination_name)
            .collect()
    }

    #[test]
    fn ids_and_paths() {
        let mut counter = PositionCounter::new();
        let topics = assemble(
            Product::Policycenter,
            "02-configuration",
            &[lesson("01 Data Model", &["deck.pptx"]), lesson("02 Gosu", &["gosu.pptx"])],
            Path::new("content"),
            &mut counter,
        );
        assert_eq!(topics[0].id, "pc-02-001");
        assert_eq!(topics[1].id, "pc-02-002");
        assert_eq!(
            topics[1].new_path,
            Path::new("content/policycenter/02-configuration/002-gosu")
        );
        assert_eq!(counter.peek(Product::Policycenter), 3);
    }

    #[test]
    fn common_ids_have_no_module_number() {
        let mut counter = PositionCounter::new();
        let topics = assemble(
            Product::Common,
            "002-surepath",
            &[lesson("Overview", &["overview.pdf"])],
            Path::new("content"),
            &mut counter,
        );
        assert_eq!(topics[0].id, "common-001");
    }

    #[test]
    fn counter_spans_modules_but_not_products() {
        let mut counter = PositionCounter::new();
        let root = Path::new("content");
        let a = assemble(
            Product::Claimcenter,
            "01-introduction",
            &[lesson("a", &["a.pptx"]), lesson("b", &["b.pptx"])],
            root,
            &mut counter,
        );
        let b = assemble(
            Product::Billingcenter,
            "01-introduction",
            &[lesson("c", &["c.pptx"])],
            root,
            &mut counter,
        );
        let c = assemble(
            Product::Claimcenter,
            "02-configuration",
            &[lesson("d", &["d.pptx"])],
            root,
            &mut counter,
        );
        let positions = a.iter().chain(&c).map(|t| t.position).collect::<Vec<_>>();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(b[0].position, 1);
        assert_eq!(c[0].id, "cc-02-003");
    }

    #[test]
    fn empty_lessons_do_not_consume_positions() {
        let mut counter = PositionCounter::new();
        let topics = assemble(
            Product::Policycenter,
            "01-introduction",
            &[lesson("empty", &[]), lesson("real", &["x.pptx"])],
            Path::new("content"),
            &mut counter,
        );
        assert_eq!(topics.len(), 1);
        assert_eq!(topics[0].position, 1);
    }

    #[test]
    fn mapping_keeps_one_slide_and_one_assignment() {
        let mut counter = PositionCounter::new();
        let topics = assemble(
            Product::Policycenter,
            "01-introduction",
            &[lesson(
                "Lesson",
                &[
                    "b-deck.pptx",
                    "a-deck.pptx",
                    "demo2.mkv",
                    "demo1.MP4",
                    "assignment-2.docx",
                    "assignment-1.pdf",
                    "notes.txt",
                ],
            )],
            Path::new("content"),
            &mut counter,
        );
        let topic = &topics[0];
        assert_eq!(
            names(topic),
            vec![
                "slides.pptx",
                "demo-01.MP4",
                "demo-02.mkv",
                "assignment.pdf",
                "notes.txt"
            ]
        );
        assert_eq!(topic.file_mappings[0].source.file_name().unwrap(), "a-deck.pptx");
        assert_eq!(topic.title, "A Deck");
    }

    #[test]
    fn title_falls_back_to_folder_name() {
        let mut counter = PositionCounter::new();
        let topics = assemble(
            Product::Common,
            "005-integration",
            &[lesson("03 Web Services", &["demo.mp4"])],
            Path::new("content"),
            &mut counter,
        );
        assert_eq!(topics[0].title, "03 Web Services");
        assert_eq!(topics[0].clean_name, "web-services");
    }

    #[test]
    fn stray_files_never_shadow_generated_metadata() {
        let mut counter = PositionCounter::new();
        let topics = assemble(
            Product::Common,
            "001-foundations",
            &[lesson(
                "01 A",
                &["a.pptx", "metadata.json", "original-metadata.json"],
            )],
            Path::new("content"),
            &mut counter,
        );
        assert_eq!(
            names(&topics[0]),
            vec![
                "slides.pptx",
                "original-metadata.json",
                "original-original-metadata.json"
            ]
        );
    }
}
