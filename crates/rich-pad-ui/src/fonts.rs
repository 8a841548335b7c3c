//! Background enumeration of installed font families.
//!
//! Scanning font directories and parsing name tables is slow, so it runs on
//! its own thread. Results come back over a channel that the UI thread
//! drains each frame; the worker never touches editor state.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

const FONT_EXTENSIONS: [&str; 4] = ["ttf", "otf", "ttc", "otc"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontEvent {
    Family(String),
    /// Scanning finished after reading `files` font files.
    Done { files: usize },
}

#[derive(Debug)]
pub struct FontCatalog {
    rx: Receiver<FontEvent>,
    families: BTreeSet<String>,
    done: bool,
}

impl FontCatalog {
    /// Starts scanning `dirs` recursively on a background thread.
    pub fn spawn(dirs: Vec<PathBuf>) -> Result<Self> {
        let (tx, rx) = crossbeam_channel::unbounded();
        thread::Builder::new()
            .name("rich-pad-font-catalog".to_string())
            .spawn(move || {
                tracing::debug!("Font catalog scanning {} directories", dirs.len());
                let files = scan(&dirs, &tx);
                tracing::debug!("Font catalog done, {files} files read");
                let _ = tx.send(FontEvent::Done { files });
            })
            .context("failed to spawn font catalog thread")?;
        Ok(Self {
            rx,
            families: BTreeSet::new(),
            done: false,
        })
    }

    /// Takes everything the worker has sent so far. Returns the number of
    /// new families.
    pub fn drain(&mut self) -> usize {
        let mut added = 0;
        while let Ok(event) = self.rx.try_recv() {
            added += usize::from(self.accept(event));
        }
        added
    }

    /// Blocks until scanning finishes or `timeout` passes. Returns whether
    /// the scan finished.
    pub fn wait(&mut self, timeout: Duration) -> bool {
        let deadline = std::time::Instant::now() + timeout;
        while !self.done {
            let left = deadline.saturating_duration_since(std::time::Instant::now());
            match self.rx.recv_timeout(left) {
                Ok(event) => {
                    self.accept(event);
                }
                Err(RecvTimeoutError::Timeout) => return false,
                Err(RecvTimeoutError::Disconnected) => {
                    self.done = true;
                }
            }
        }
        true
    }

    fn accept(&mut self, event: FontEvent) -> bool {
        match event {
            FontEvent::Family(name) => self.families.insert(name),
            FontEvent::Done { .. } => {
                self.done = true;
                false
            }
        }
    }

    pub fn families(&self) -> impl Iterator<Item = &str> {
        self.families.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// The user font directory plus the usual system locations that exist.
pub fn default_font_dirs() -> Vec<PathBuf> {
    let mut dirs_found: Vec<PathBuf> = dirs::font_dir().into_iter().collect();
    let system: &[&str] = if cfg!(target_os = "windows") {
        &["C:\\Windows\\Fonts"]
    } else if cfg!(target_os = "macos") {
        &["/System/Library/Fonts", "/Library/Fonts"]
    } else {
        &["/usr/share/fonts", "/usr/local/share/fonts"]
    };
    dirs_found.extend(system.iter().map(PathBuf::from));
    dirs_found.retain(|d| d.is_dir());
    dirs_found
}

fn is_font_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| FONT_EXTENSIONS.iter().any(|f| e.eq_ignore_ascii_case(f)))
}

/// Walks `dirs`, sending every family found. Returns the number of font
/// files read.
fn scan(dirs: &[PathBuf], tx: &Sender<FontEvent>) -> usize {
    let mut pending: Vec<PathBuf> = dirs.to_vec();
    let mut files = 0;
    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::debug!("Skipping font directory {}: {e}", dir.display());
                continue;
            }
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                pending.push(path);
            } else if is_font_file(&path) {
                files += 1;
                for family in read_families(&path) {
                    if tx.send(FontEvent::Family(family)).is_err() {
                        // Receiver dropped; nobody is listening.
                        return files;
                    }
                }
            }
        }
    }
    files
}

/// Family names of every face in a font file or collection.
fn read_families(path: &Path) -> Vec<String> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!("Failed to read font {}: {e}", path.display());
            return Vec::new();
        }
    };
    let faces = ttf_parser::fonts_in_collection(&data).unwrap_or(1);
    let mut families = Vec::new();
    for index in 0..faces {
        match ttf_parser::Face::parse(&data, index) {
            Ok(face) => families.extend(family_name(&face)),
            Err(e) => tracing::warn!("Failed to parse font {} #{index}: {e}", path.display()),
        }
    }
    families
}

fn family_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    face.names()
        .into_iter()
        .filter(|name| name.name_id == ttf_parser::name_id::FAMILY)
        .find_map(|name| name.to_string())
        .filter(|name| !name.trim().is_empty())
}
