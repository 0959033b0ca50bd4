use crate::classify::is_lesson_file;
use crate::snapshot::FolderNode;

/// Descends through single-subfolder chains until reaching a folder that either
/// holds lesson files or branches.
///
/// Stray non-lesson files (readmes, shortcuts) do not stop the descent.
pub fn collapse(folder: &FolderNode) -> &FolderNode {
    match folder.subfolders.as_slice() {
        [only] if folder.files.iter().all(|f| !is_lesson_file(f)) => {
            tracing::debug!(
                from = %folder.path.display(),
                to = %only.path.display(),
                "collapse single-child folder"
            );
            collapse(only)
        }
        _ => folder,
    }
}

/// Resolves the lesson folders of one chapter, in order.
///
/// A chapter without subfolders is its own single lesson. Otherwise every
/// subfolder is collapsed; when the collapsed folder still branches, each of its
/// subfolders becomes a lesson on its own, without collapsing further.
pub fn lesson_folders(chapter: &FolderNode) -> Vec<&FolderNode> {
    if chapter.subfolders.is_empty() {
        return vec![chapter];
    }

    let mut lessons = Vec::new();
    for child in &chapter.subfolders {
        let resolved = collapse(child);
        if resolved.subfolders.is_empty() {
            lessons.push(resolved);
        } else {
            lessons.extend(resolved.subfolders.iter());
        }
    }
    lessons
}
