//! Leaf directory discovery
//!
//! A leaf is a directory with no subdirectories. [`leaves`] walks a tree
//! depth-first and yields only those, lazily: each call to `next` reads just
//! enough directories to find the next leaf.
//!
//! Symbolic links to directories are followed. Every directory is recorded by
//! its canonical path, and a directory already reached by another route is
//! not treated as a subdirectory a second time, so link cycles terminate.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Start a fresh depth-first leaf traversal of `root`
pub fn leaves(root: impl AsRef<Path>) -> LeafDirs {
    let root = root.as_ref().to_path_buf();
    let mut seen = HashSet::new();
    seen.insert(canonical(&root));

    LeafDirs {
        stack: vec![root],
        seen,
    }
}

/// Iterator over the leaf directories of a tree
///
/// Yields `Err` for a directory that cannot be listed and carries on with
/// the rest of the tree.
#[derive(Debug)]
pub struct LeafDirs {
    /// Directories still to visit; the next one is at the end
    stack: Vec<PathBuf>,

    /// Canonical paths of every directory queued so far
    seen: HashSet<PathBuf>,
}

impl Iterator for LeafDirs {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(dir) = self.stack.pop() {
            let children = match subdirectories(&dir, &mut self.seen) {
                Ok(children) => children,
                Err(e) => {
                    return Some(Err(io::Error::new(
                        e.kind(),
                        format!("{}: {}", dir.display(), e),
                    )))
                }
            };

            if children.is_empty() {
                trace!(path = %dir.display(), "Leaf found");
                return Some(Ok(dir));
            }

            // Reverse so the first child enumerated is visited first
            self.stack.extend(children.into_iter().rev());
        }

        None
    }
}

impl std::iter::FusedIterator for LeafDirs {}

/// Direct subdirectories of `dir` not reached before, in enumeration order
fn subdirectories(dir: &Path, seen: &mut HashSet<PathBuf>) -> io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        let is_dir = if file_type.is_symlink() {
            // A dangling link is not a directory
            fs::metadata(&path).map(|m| m.is_dir()).unwrap_or(false)
        } else {
            file_type.is_dir()
        };
        if !is_dir {
            continue;
        }

        if !seen.insert(canonical(&path)) {
            debug!(path = %path.display(), "Directory already visited, not descending");
            continue;
        }

        dirs.push(path);
    }
    Ok(dirs)
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
