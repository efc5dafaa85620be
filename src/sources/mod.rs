pub mod csv;
pub mod jsonl;

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::error::{ReportError, Result};
use crate::types::{ReportParams, UsageRecord};

/// Upstream supplier of usage rows, already joined with pool names.
pub trait UsageSource: Send + Sync {
    fn name(&self) -> &str;

    /// Every record this source holds that `params` accepts, in source order.
    fn load(&self, params: &ReportParams) -> Result<Vec<UsageRecord>>;
}

/// Pick a source for `path` by extension. A directory is expanded into
/// one source per `.jsonl`/`.csv` file, ordered by file name.
pub fn open(path: &Path) -> Result<Box<dyn UsageSource>> {
    if path.is_dir() {
        let files = discover_files(path)?;
        let sources = files
            .iter()
            .map(|f| file_source(f))
            .collect::<Result<Vec<_>>>()?;
        return Ok(Box::new(DirectorySource {
            root: path.to_path_buf(),
            sources,
        }));
    }
    file_source(path)
}

fn file_source(path: &Path) -> Result<Box<dyn UsageSource>> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("jsonl") => Ok(Box::new(jsonl::JsonlSource::new(path))),
        Some("csv") => Ok(Box::new(csv::CsvSource::new(path))),
        _ => Err(ReportError::UnsupportedInput(path.to_path_buf())),
    }
}

fn discover_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path
            .extension()
            .is_some_and(|ext| ext == "jsonl" || ext == "csv")
        {
            files.push(path.to_path_buf());
        }
    }
    if files.is_empty() {
        return Err(ReportError::UnsupportedInput(root.to_path_buf()));
    }
    Ok(files)
}

/// Every usage file under a directory, parsed in parallel.
pub struct DirectorySource {
    root: PathBuf,
    sources: Vec<Box<dyn UsageSource>>,
}

impl UsageSource for DirectorySource {
    fn name(&self) -> &str {
        self.root.to_str().unwrap_or("directory")
    }

    fn load(&self, params: &ReportParams) -> Result<Vec<UsageRecord>> {
        // Indexed collect keeps file order, so first-seen pool order is stable.
        let per_file: Vec<Vec<UsageRecord>> = self
            .sources
            .par_iter()
            .map(|s| s.load(params))
            .collect::<Result<_>>()?;
        Ok(per_file.into_iter().flatten().collect())
    }
}

pub(crate) fn malformed(path: &Path, line: u64, message: impl ToString) -> ReportError {
    ReportError::MalformedRecord {
        path: path.to_path_buf(),
        line,
        message: message.to_string(),
    }
}
