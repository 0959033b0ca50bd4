use crate::assemble::TopicRecord;
use crate::classify::FileRole;
use crate::formats::{FileManifest, TopicMetadata};

const BASE_MINUTES: u32 = 15;
const MINUTES_PER_DEMO: u32 = 10;

/// Derives the metadata record of a topic. Pure: same topic, same record.
pub fn derive(topic: &TopicRecord) -> TopicMetadata {
    let files = file_manifest(topic);
    let demo_count = u32::try_from(files.demos.len()).unwrap_or(u32::MAX);

    TopicMetadata {
        id: topic.id.clone(),
        product: topic.product,
        module: topic.module.clone(),
        position: topic.position,
        title: topic.title.clone(),
        description: format!(
            "Learn about {} in {}",
            topic.title,
            topic.product.display_name()
        ),
        duration_minutes: BASE_MINUTES.saturating_add(MINUTES_PER_DEMO.saturating_mul(demo_count)),
        prerequisites: prerequisites(topic),
        learning_objectives: vec![
            format!("Understand {} concepts", topic.title),
            format!("Apply {} in practice", topic.title),
            "Complete hands-on exercises".to_owned(),
        ],
        files,
        keywords: keywords(&topic.title),
    }
}

pub fn file_manifest(topic: &TopicRecord) -> FileManifest {
    let mut manifest = FileManifest::default();
    for mapping in &topic.file_mappings {
        match mapping.role {
            FileRole::Slides => manifest.slides = Some(mapping.destination_name()),
            FileRole::Demo => manifest.demos.push(mapping.destination_name()),
            FileRole::Assignment => manifest.assignment = Some(mapping.destination_name()),
            FileRole::Other => {}
        }
    }
    manifest
}

// Placeholder reference to the previous position of the same product; the
// module number is not resolved here.
fn prerequisites(topic: &TopicRecord) -> Vec<String> {
    if topic.position <= 1 {
        return Vec::new();
    }
    vec![format!("{}-xxx-{:03}", topic.product, topic.position - 1)]
}

fn keywords(title: &str) -> Vec<String> {
    title
        .split_whitespace()
        .filter(|word| word.chars().count() > 3)
        .map(str::to_lowercase)
        .collect()
}
