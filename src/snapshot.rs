use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::plan::ScanWarning;

/// Immutable view of one directory of the input tree.
///
/// Children are sorted by name and hidden entries (leading `.`) are left out, so
/// every later stage sees the same deterministic order without touching the
/// filesystem again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderNode {
    pub path: PathBuf,
    pub name: String,
    pub subfolders: Vec<FolderNode>,
    pub files: Vec<PathBuf>,
}

impl FolderNode {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = file_name_lossy(&path);
        Self {
            path,
            name,
            subfolders: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_subfolder(mut self, node: FolderNode) -> Self {
        self.subfolders.push(node);
        self.subfolders.sort_by(|a, b| a.name.cmp(&b.name));
        self
    }

    pub fn with_file(mut self, name: &str) -> Self {
        self.files.push(self.path.join(name));
        self.files.sort();
        self
    }

    pub fn depth(&self) -> usize {
        1 + self
            .subfolders
            .iter()
            .map(FolderNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// Reads `root` and everything below it into memory.
///
/// Only the root itself must be readable; a nested directory that cannot be
/// listed becomes an empty node and a warning.
pub fn take(root: &Path, warnings: &mut Vec<ScanWarning>) -> anyhow::Result<FolderNode> {
    let mut node = FolderNode::new(root);
    let entries = read_sorted(root)
        .with_context(|| format!("read input root: {}", root.display()))?;
    fill(&mut node, entries, warnings);
    Ok(node)
}

fn fill(node: &mut FolderNode, entries: Vec<Entry>, warnings: &mut Vec<ScanWarning>) {
    for entry in entries {
        match entry.kind {
            EntryKind::File => node.files.push(entry.path),
            EntryKind::Dir => {
                let mut child = FolderNode::new(&entry.path);
                match read_sorted(&entry.path) {
                    Ok(children) => fill(&mut child, children, warnings),
                    Err(err) => {
                        tracing::warn!(path = %entry.path.display(), %err, "cannot list folder; treating as empty");
                        warnings.push(ScanWarning::UnreadableFolder {
                            path: entry.path.clone(),
                            cause: err.to_string(),
                        });
                    }
                }
                node.subfolders.push(child);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    kind: EntryKind,
}

fn read_sorted(dir: &Path) -> std::io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        let file_type = entry.file_type()?;
        let path = entry.path();
        let kind = if file_type.is_dir() {
            EntryKind::Dir
        } else if file_type.is_file() {
            EntryKind::File
        } else if file_type.is_symlink() {
            // Symlinked folders are not followed; that keeps the walk acyclic.
            match std::fs::metadata(&path) {
                Ok(meta) if meta.is_file() => EntryKind::File,
                _ => {
                    tracing::debug!(path = %path.display(), "skipping symlink");
                    continue;
                }
            }
        } else {
            continue;
        };
        entries.push(Entry { path, kind });
    }
    entries.sort_by(|a, b| a.path.file_name().cmp(&b.path.file_name()));
    Ok(entries)
}

pub fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string_lossy().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_sorts_and_skips_hidden() -> anyhow::Result<()> {
        let temp = tempfile::TempDir::new()?;
        let root = temp.path();
        std::fs::create_dir_all(root.join("b-folder"))?;
        std::fs::create_dir_all(root.join("a-folder/inner"))?;
        std::fs::create_dir_all(root.join(".git"))?;
        std::fs::write(root.join("z.pptx"), b"")?;
        std::fs::write(root.join("a.pdf"), b"")?;
        std::fs::write(root.join(".DS_Store"), b"")?;

        let mut warnings = Vec::new();
        let node = take(root, &mut warnings)?;

        let names = node
            .subfolders
            .iter()
            .map(|n| n.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["a-folder", "b-folder"]);
        let files = node.files.iter().map(|p| file_name_lossy(p)).collect::<Vec<_>>();
        assert_eq!(files, vec!["a.pdf", "z.pptx"]);
        assert_eq!(node.subfolders[0].subfolders[0].name, "inner");
        assert!(warnings.is_empty());
        Ok(())
    }

    #[test]
    fn missing_root_is_an_error() {
        let mut warnings = Vec::new();
        let result = take(Path::new("/definitely/not/here"), &mut warnings);
        assert!(result.is_err());
    }

    #[test]
    fn depth_counts_levels() {
        let node = FolderNode::new("/r")
            .with_subfolder(FolderNode::new("/r/a").with_subfolder(FolderNode::new("/r/a/b")));
        assert_eq!(node.depth(), 3);
    }
}
