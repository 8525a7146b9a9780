//! Recursive directory listing
//!
//! One pass over a folder produces flat pre-order lists of every file and
//! every directory below it. Entries within a directory are visited in
//! path order so the same tree always lists the same way.
//!
//! Failures below the root do not abort the walk: the unreadable directory
//! is still listed in `dirs` and recorded in `skipped`, whatever was read
//! from it before the failure is kept, and its siblings are visited as
//! usual. Only a root that cannot be opened is an error.

use crate::ScanError;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Directory whose contents could not be read
#[derive(Debug)]
pub struct SkippedDir {
    pub path: PathBuf,
    pub error: ScanError,
}

/// Flat listing of a directory tree
#[derive(Debug, Default)]
pub struct TreeListing {
    /// Every leaf entry, in pre-order
    pub files: Vec<PathBuf>,
    /// Every directory below the root (empty ones included), in pre-order
    pub dirs: Vec<PathBuf>,
    /// Directories that could not be read
    pub skipped: Vec<SkippedDir>,
}

impl TreeListing {
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryKind {
    File,
    Dir,
    /// Symlink to a directory: listed, never descended into
    LinkedDir,
}

struct Entry {
    path: PathBuf,
    kind: EntryKind,
}

async fn entry_kind(entry: &fs::DirEntry) -> io::Result<EntryKind> {
    let file_type = entry.file_type().await?;
    if file_type.is_dir() {
        return Ok(EntryKind::Dir);
    }
    if file_type.is_symlink() {
        // Dangling links are leaves
        let target_is_dir = fs::metadata(entry.path())
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false);
        if target_is_dir {
            return Ok(EntryKind::LinkedDir);
        }
    }
    Ok(EntryKind::File)
}

/// Entries of one directory, sorted by path. `error` is set when reading
/// stopped early; `entries` then holds what was read before it.
struct DirRead {
    entries: Vec<Entry>,
    error: Option<io::Error>,
}

impl DirRead {
    fn new(mut entries: Vec<Entry>, error: Option<io::Error>) -> Self {
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        Self { entries, error }
    }
}

/// Fails only when the directory cannot be opened
async fn read_sorted(dir: &Path) -> io::Result<DirRead> {
    let mut reader = fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    loop {
        let entry = match reader.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => return Ok(DirRead::new(entries, Some(e))),
        };
        match entry_kind(&entry).await {
            Ok(kind) => entries.push(Entry {
                path: entry.path(),
                kind,
            }),
            Err(e) => return Ok(DirRead::new(entries, Some(e))),
        }
    }

    Ok(DirRead::new(entries, None))
}

fn skip(listing: &mut TreeListing, path: &Path, error: io::Error) {
    let error = ScanError::from_io(path, error);
    tracing::warn!("Skipping {}: {}", path.display(), error);
    listing.skipped.push(SkippedDir {
        path: path.to_path_buf(),
        error,
    });
}

/// Walk `root` and list everything below it.
///
/// Holds no state between calls; every call reads the tree afresh.
pub async fn collect_tree(root: &Path) -> Result<TreeListing, ScanError> {
    let metadata = fs::metadata(root)
        .await
        .map_err(|e| ScanError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let top = read_sorted(root)
        .await
        .map_err(|e| ScanError::from_io(root, e))?;

    let mut listing = TreeListing::default();
    if let Some(e) = top.error {
        skip(&mut listing, root, e);
    }
    let mut stack = vec![top.entries.into_iter()];

    while let Some(level) = stack.last_mut() {
        let Some(entry) = level.next() else {
            stack.pop();
            continue;
        };

        match entry.kind {
            EntryKind::File => listing.files.push(entry.path),
            EntryKind::LinkedDir => listing.dirs.push(entry.path),
            EntryKind::Dir => {
                let read = read_sorted(&entry.path).await;
                listing.dirs.push(entry.path.clone());
                match read {
                    Ok(read) => {
                        if let Some(e) = read.error {
                            skip(&mut listing, &entry.path, e);
                        }
                        stack.push(read.entries.into_iter());
                    }
                    Err(e) => skip(&mut listing, &entry.path, e),
                }
            }
        }
    }

    tracing::debug!(
        "Collected {} files and {} directories under {}",
        listing.files.len(),
        listing.dirs.len(),
        root.display()
    );

    Ok(listing)
}
