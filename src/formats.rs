use serde::{Deserialize, Serialize};

use crate::chapters::Product;

/// Contents of a topic's `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicMetadata {
    pub id: String,
    pub product: Product,
    pub module: String,
    pub position: u32,
    pub title: String,
    pub description: String,
    pub duration_minutes: u32,
    pub prerequisites: Vec<String>,
    pub learning_objectives: Vec<String>,
    pub files: FileManifest,
    pub keywords: Vec<String>,
}

/// Renamed destination file names of a topic, by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    pub slides: Option<String>,
    pub demos: Vec<String>,
    pub assignment: Option<String>,
}

/// One slide or page of text, as returned by an extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub number: u32,
    pub content: String,
    pub word_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemoFileRecord {
    pub filename: String,
    pub path: String,
    pub size_mb: f64,
}

/// Per-topic extraction output, written as `{topic_id}.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedTopic {
    pub topic_code: String,
    pub slides: Vec<PageRecord>,
    pub assignment_pages: Vec<PageRecord>,
    pub demo_files: Vec<DemoFileRecord>,
}

impl PageRecord {
    pub fn new(number: u32, content: impl Into<String>) -> Self {
        let content = content.into();
        let word_count = content.split_whitespace().count();
        Self {
            number,
            content,
            word_count,
        }
    }
}
