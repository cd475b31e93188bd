// src/archive.rs

use crate::error::AppResult;
use crate::models::ResolvedArtifact;
use crate::utils;
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

enum Entry {
    Dir(DirNode),
    File { name: String, bytes: Vec<u8> },
}

struct DirNode {
    name: String,
    entries: Vec<Entry>,
}

impl DirNode {
    fn new(name: String) -> Self {
        Self { name, entries: Vec::new() }
    }

    fn child_dir(&mut self, name: &str) -> &mut DirNode {
        // Index-based lookup keeps the borrow checker out of the way.
        let pos = self.entries.iter().position(|e| matches!(e, Entry::Dir(d) if d.name == name));
        let pos = match pos {
            Some(pos) => pos,
            None => {
                self.entries.push(Entry::Dir(DirNode::new(name.to_string())));
                self.entries.len() - 1
            }
        };
        match &mut self.entries[pos] {
            Entry::Dir(dir) => dir,
            Entry::File { .. } => unreachable!("position matched a directory entry"),
        }
    }

    fn has_entry(&self, name: &str) -> bool {
        self.entries.iter().any(|e| match e {
            Entry::Dir(d) => d.name == name,
            Entry::File { name: n, .. } => n == name,
        })
    }

    // First free variant of `name`, counting up through "name (2)", "name (3)"...
    fn disambiguate(&self, name: &str) -> String {
        if !self.has_entry(name) {
            return name.to_string();
        }
        let (stem, ext) = match name.rsplit_once('.') {
            Some((s, e)) if !s.is_empty() => (s, Some(e)),
            _ => (name, None),
        };
        let mut n = 2usize;
        loop {
            let candidate = match ext {
                Some(e) => format!("{stem} ({n}).{e}"),
                None => format!("{name} ({n})"),
            };
            if !self.has_entry(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }

    fn file_count(&self) -> usize {
        self.entries
            .iter()
            .map(|e| match e {
                Entry::Dir(d) => d.file_count(),
                Entry::File { .. } => 1,
            })
            .sum()
    }
}

/// Accumulates the section → folder → file tree for one run, then serializes
/// it into a ZIP buffer. Insertion order is preserved end-to-end; sibling
/// name collisions are resolved with " (n)" suffixes.
pub struct ArchiveBuilder {
    root: DirNode,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self { root: DirNode::new(String::new()) }
    }

    /// Files the artifact under `section` (and `folder` below it, if given).
    /// Directories are created on first use and reused afterwards. An empty
    /// section name files at the archive root (flat layout).
    pub fn add_artifact(&mut self, section: &str, artifact: ResolvedArtifact, folder: Option<&str>) {
        // Directory names share the file sanitizer so a title containing a
        // path separator cannot introduce extra nesting.
        let mut dir = &mut self.root;
        if !section.trim().is_empty() {
            dir = dir.child_dir(&utils::sanitize_filename(section));
        }
        if let Some(folder) = folder {
            if !folder.trim().is_empty() {
                dir = dir.child_dir(&utils::sanitize_filename(folder));
            }
        }
        let name = dir.disambiguate(&artifact.name);
        dir.entries.push(Entry::File { name, bytes: artifact.bytes });
    }

    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }

    pub fn file_count(&self) -> usize {
        self.root.file_count()
    }

    /// Consumes the tree and writes it out; nothing can be added afterwards.
    pub fn finalize(self) -> AppResult<Vec<u8>> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        write_dir(&mut writer, &self.root, "", options)?;
        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn write_dir(
    writer: &mut ZipWriter<Cursor<Vec<u8>>>,
    dir: &DirNode,
    prefix: &str,
    options: SimpleFileOptions,
) -> AppResult<()> {
    for entry in &dir.entries {
        match entry {
            Entry::Dir(sub) => {
                let path = format!("{prefix}{}/", sub.name);
                writer.add_directory(path.as_str(), options)?;
                write_dir(writer, sub, &path, options)?;
            }
            Entry::File { name, bytes } => {
                writer.start_file(format!("{prefix}{name}"), options)?;
                writer.write_all(bytes)?;
            }
        }
    }
    Ok(())
}
