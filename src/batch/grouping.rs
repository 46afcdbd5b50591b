use std::{collections::BTreeMap, path::Path};

use regex::Regex;

use crate::foundation::error::{CoverError, CoverResult, ResourceKind};

/// Marker used by `overlay_directory` output names (`{bg}_with_{element}.jpg`).
pub const DEFAULT_MARKER: &str = "with";

/// Group name → sorted member file names.
pub type Groups = BTreeMap<String, Vec<String>>;

struct MarkerPatterns {
    underscore: Regex,
    extension: Regex,
}

impl MarkerPatterns {
    fn new(marker: &str) -> CoverResult<Self> {
        let m = regex::escape(marker);
        let build = |pattern: String| {
            Regex::new(&pattern).map_err(|e| {
                CoverError::validation(format!("invalid marker '{marker}': {e}"))
            })
        };
        Ok(Self {
            underscore: build(format!("_{m}_(.+?)_"))?,
            extension: build(format!(r"_{m}_(.+?)\."))?,
        })
    }

    /// The name between `_{marker}_` and the next `_`, else the next `.`.
    fn group_of<'a>(&self, filename: &'a str) -> Option<&'a str> {
        self.underscore
            .captures(filename)
            .or_else(|| self.extension.captures(filename))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }
}

/// Group `filenames` by the name that follows `_{marker}_`.
///
/// Names without the marker are skipped. Groups and their members come back sorted.
pub fn group_by_marker<I, S>(filenames: I, marker: &str) -> CoverResult<Groups>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let patterns = MarkerPatterns::new(marker)?;
    let mut groups = Groups::new();
    for name in filenames {
        let name = name.as_ref();
        match patterns.group_of(name) {
            Some(group) => {
                tracing::debug!(file = name, group, "grouped");
                groups
                    .entry(group.to_string())
                    .or_default()
                    .push(name.to_string());
            }
            None => tracing::debug!(file = name, "no group marker, skipped"),
        }
    }
    for members in groups.values_mut() {
        members.sort();
    }
    Ok(groups)
}

/// [`group_by_marker`] over the regular files directly inside `dir`.
#[tracing::instrument(skip_all, fields(dir = %dir.display(), marker = marker))]
pub fn scan_directory(dir: &Path, marker: &str) -> CoverResult<Groups> {
    if !dir.is_dir() {
        return Err(CoverError::not_found(ResourceKind::Directory, dir));
    }
    let entries = std::fs::read_dir(dir).map_err(|e| {
        CoverError::Other(anyhow::Error::new(e).context(format!("read dir '{}'", dir.display())))
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|e| CoverError::Other(anyhow::Error::new(e).context("read dir entry")))?
            .path();
        if !path.is_file() {
            continue;
        }
        match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => names.push(name.to_string()),
            None => tracing::warn!(path = %path.display(), "skipping non UTF-8 file name"),
        }
    }

    let groups = group_by_marker(&names, marker)?;
    tracing::info!(files = names.len(), groups = groups.len(), "directory grouped");
    Ok(groups)
}

/// Write `groups` as pretty-printed JSON.
pub fn write_groups_json(groups: &Groups, path: &Path) -> CoverResult<()> {
    let json = serde_json::to_string_pretty(groups).map_err(|e| CoverError::write(path, e))?;
    crate::render::output::ensure_parent_dir(path)?;
    std::fs::write(path, json + "\n").map_err(|e| CoverError::write(path, e))
}

#[cfg(test)]
#[path = "../../tests/unit/batch/grouping.rs"]
mod tests;
