// SPDX-FileCopyrightText: 2026 Marginalia Contributors
// SPDX-License-Identifier: MIT

//! Folder-scoped page loading.
//!
//! Pages live as `<name>.page.json` files in one directory. Loading is
//! report-and-continue: one unreadable or malformed page never costs the
//! folder its other pages.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::model::{PageDoc, PageSpec};

const PAGE_FILE_SUFFIX: &str = ".page.json";

#[derive(Debug)]
pub enum PageFolderError {
    ReadDir { path: PathBuf, source: io::Error },
    ReadFile { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for PageFolderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadDir { path, source } => {
                write!(f, "cannot list page folder {}: {source}", path.display())
            }
            Self::ReadFile { path, source } => {
                write!(f, "cannot read page file {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse page file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for PageFolderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ReadDir { source, .. } | Self::ReadFile { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
        }
    }
}

/// One successfully loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedPage {
    name: String,
    doc: PageDoc,
}

impl LoadedPage {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &PageDoc {
        &self.doc
    }

    pub fn into_doc(self) -> PageDoc {
        self.doc
    }
}

/// Pages plus the per-file errors the load survived.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub pages: Vec<LoadedPage>,
    pub errors: Vec<PageFolderError>,
}

#[derive(Debug, Clone)]
pub struct PageFolder {
    dir: PathBuf,
}

impl PageFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Loads every page file in the folder, in parallel, names sorted.
    pub fn load_pages(&self) -> Result<LoadOutcome, PageFolderError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| PageFolderError::ReadDir {
            path: self.dir.clone(),
            source,
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| PageFolderError::ReadDir {
                path: self.dir.clone(),
                source,
            })?;
            let path = entry.path();
            if page_name(&path).is_some() {
                paths.push(path);
            }
        }
        paths.sort();

        let results: Vec<Result<LoadedPage, PageFolderError>> =
            paths.par_iter().map(|path| load_page(path)).collect();

        let mut outcome = LoadOutcome::default();
        for result in results {
            match result {
                Ok(page) => outcome.pages.push(page),
                Err(err) => outcome.errors.push(err),
            }
        }
        Ok(outcome)
    }
}

fn load_page(path: &Path) -> Result<LoadedPage, PageFolderError> {
    let name = page_name(path).expect("pre-filtered page path");
    let raw = fs::read_to_string(path).map_err(|source| PageFolderError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    let spec: PageSpec = serde_json::from_str(&raw).map_err(|source| PageFolderError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LoadedPage { name, doc: PageDoc::from_spec(spec) })
}

fn page_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.strip_suffix(PAGE_FILE_SUFFIX)?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_owned())
}
