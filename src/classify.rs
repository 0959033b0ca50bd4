use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::snapshot::{FolderNode, file_name_lossy};

/// Extensions that make a folder count as "holding lessons" while collapsing.
const LESSON_EXTENSIONS: &[&str] = &["pptx", "pdf", "mp4", "mkv", "docx", "xlsx"];

const SLIDE_EXTENSIONS: &[&str] = &["pptx", "ppt"];
const DEMO_EXTENSIONS: &[&str] = &["mp4", "mkv"];
const ASSIGNMENT_EXTENSIONS: &[&str] = &["pdf", "docx", "xlsx"];
const ASSIGNMENT_MARKERS: &[&str] = &["assignment", "exercise", "solution"];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FileRole {
    Slides,
    Demo,
    Assignment,
    Other,
}

impl FileRole {
    pub fn as_str(self) -> &'static str {
        match self {
            FileRole::Slides => "slides",
            FileRole::Demo => "demo",
            FileRole::Assignment => "assignment",
            FileRole::Other => "other",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassifiedFileSet {
    pub slides: Vec<PathBuf>,
    pub demos: Vec<PathBuf>,
    pub assignments: Vec<PathBuf>,
    pub other: Vec<PathBuf>,
}

impl ClassifiedFileSet {
    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
            && self.demos.is_empty()
            && self.assignments.is_empty()
            && self.other.is_empty()
    }

    pub fn len(&self) -> usize {
        self.slides.len() + self.demos.len() + self.assignments.len() + self.other.len()
    }

    fn bucket_mut(&mut self, role: FileRole) -> &mut Vec<PathBuf> {
        match role {
            FileRole::Slides => &mut self.slides,
            FileRole::Demo => &mut self.demos,
            FileRole::Assignment => &mut self.assignments,
            FileRole::Other => &mut self.other,
        }
    }
}

pub fn lowercase_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

pub fn is_lesson_file(path: &Path) -> bool {
    lowercase_extension(path).is_some_and(|ext| LESSON_EXTENSIONS.contains(&ext.as_str()))
}

/// Role of a single file, from its extension and name alone.
pub fn role_of(path: &Path) -> FileRole {
    let Some(ext) = lowercase_extension(path) else {
        return FileRole::Other;
    };
    let ext = ext.as_str();
    let name = file_name_lossy(path).to_lowercase();

    // Assignment-named documents win over the PDF-as-slides rule.
    if ASSIGNMENT_EXTENSIONS.contains(&ext)
        && ASSIGNMENT_MARKERS.iter().any(|m| name.contains(m))
    {
        return FileRole::Assignment;
    }
    if SLIDE_EXTENSIONS.contains(&ext) || (ext == "pdf" && !name.contains("assignment")) {
        return FileRole::Slides;
    }
    if DEMO_EXTENSIONS.contains(&ext) {
        return FileRole::Demo;
    }
    FileRole::Other
}

pub fn classify_files(lesson: &FolderNode) -> ClassifiedFileSet {
    let mut set = ClassifiedFileSet::default();
    for file in &lesson.files {
        set.bucket_mut(role_of(file)).push(file.clone());
    }
    for bucket in [
        &mut set.slides,
        &mut set.demos,
        &mut set.assignments,
        &mut set.other,
    ] {
        bucket.sort_by_key(|p| file_name_lossy(p));
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> FileRole {
        role_of(Path::new(name))
    }

    #[test]
    fn slide_formats() {
        assert_eq!(role("intro.pptx"), FileRole::Slides);
        assert_eq!(role("intro.PPT"), FileRole::Slides);
        assert_eq!(role("handout.pdf"), FileRole::Slides);
    }

    #[test]
    fn assignment_named_documents() {
        assert_eq!(role("assignment-1.pdf"), FileRole::Assignment);
        assert_eq!(role("Lab_Exercise.docx"), FileRole::Assignment);
        assert_eq!(role("SOLUTION.xlsx"), FileRole::Assignment);
        assert_eq!(role("exercise-walkthrough.pdf"), FileRole::Assignment);
    }

    #[test]
    fn assignment_named_slides_stay_slides() {
        assert_eq!(role("assignment-review.pptx"), FileRole::Slides);
    }

    #[test]
    fn demos_and_other() {
        assert_eq!(role("demo.MP4"), FileRole::Demo);
        assert_eq!(role("walkthrough.mkv"), FileRole::Demo);
        assert_eq!(role("notes.docx"), FileRole::Other);
        assert_eq!(role("README"), FileRole::Other);
        assert_eq!(role("clip.mov"), FileRole::Other);
    }

    #[test]
    fn every_file_lands_in_exactly_one_bucket() {
        let lesson = FolderNode::new("/data/lesson")
            .with_file("b-demo.mp4")
            .with_file("a-demo.mkv")
            .with_file("lecture.pptx")
            .with_file("assignment-1.pdf")
            .with_file("readme.txt")
            .with_file("extra.pdf");
        let set = classify_files(&lesson);

        assert_eq!(set.len(), lesson.files.len());
        for file in &lesson.files {
            let hits = [&set.slides, &set.demos, &set.assignments, &set.other]
                .iter()
                .filter(|bucket| bucket.contains(file))
                .count();
            assert_eq!(hits, 1, "{}", file.display());
        }

        let names = |v: &Vec<PathBuf>| v.iter().map(|p| file_name_lossy(p)).collect::<Vec<_>>();
        assert_eq!(names(&set.slides), vec!["extra.pdf", "lecture.pptx"]);
        assert_eq!(names(&set.demos), vec!["a-demo.mkv", "b-demo.mp4"]);
        assert_eq!(names(&set.assignments), vec!["assignment-1.pdf"]);
        assert_eq!(names(&set.other), vec!["readme.txt"]);
    }

    #[test]
    fn empty_folder_classifies_empty() {
        assert!(classify_files(&FolderNode::new("/data/empty")).is_empty());
    }

    #[test]
    fn lesson_file_set_excludes_ppt() {
        assert!(is_lesson_file(Path::new("x.PDF")));
        assert!(!is_lesson_file(Path::new("x.ppt")));
        assert!(!is_lesson_file(Path::new("README.md")));
    }
}
