// Copyright 2026 Saucesort Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::Context;
use anyhow::Result;
use globset::Glob;
use globset::GlobMatcher;
use time::Date;
use time::OffsetDateTime;
use time::PrimitiveDateTime;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use walkdir::WalkDir;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[day padding:none].[month padding:none].[year]");
const MINUTE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[day padding:none].[month padding:none].[year] [hour padding:none]:[minute]"
);
const SECOND_FORMAT: &[BorrowedFormatItem<'static>] = format_description!(
    "[day padding:none].[month padding:none].[year] [hour padding:none]:[minute]:[second]"
);

const ILLEGAL_FOLDER_CHARS: &[char] = &['"', '/', '\\', '?', '*', ':', '<', '>', '|'];

#[derive(Debug, Clone, Default)]
pub struct FileFilter {
    pub created_after: Option<OffsetDateTime>,
    pub modified_after: Option<OffsetDateTime>,
    pub name_glob: Option<GlobMatcher>,
}

impl FileFilter {
    pub fn with_glob(mut self, pattern: Option<&str>) -> Result<Self> {
        if let Some(pat) = pattern {
            let glob = Glob::new(pat).with_context(|| format!("invalid glob {pat}"))?;
            self.name_glob = Some(glob.compile_matcher());
        }
        Ok(self)
    }

    fn accepts(&self, name: &str, metadata: &std::fs::Metadata) -> bool {
        if let Some(glob) = &self.name_glob
            && !glob.is_match(name)
        {
            return false;
        }
        if let Some(after) = self.modified_after
            && !is_at_or_after(metadata.modified().ok(), after)
        {
            return false;
        }
        if let Some(after) = self.created_after {
            let created = metadata.created().or_else(|_| metadata.modified()).ok();
            if !is_at_or_after(created, after) {
                return false;
            }
        }
        true
    }
}

fn is_at_or_after(time: Option<SystemTime>, after: OffsetDateTime) -> bool {
    time.map(OffsetDateTime::from)
        .is_some_and(|t| t >= after)
}

/// Parse `d.m.Y`, `d.m.Y H:M` or `d.m.Y H:M:S` as a UTC timestamp.
pub fn parse_filter_date(input: &str) -> Result<OffsetDateTime> {
    let input = input.trim();
    let (date_part, time_part) = match input.split_once(' ') {
        Some((d, t)) => (d, Some(t.trim())),
        None => (input, None),
    };
    let Some(time_part) = time_part else {
        let date = Date::parse(date_part, DATE_FORMAT)
            .with_context(|| format!("date {input:?} does not match d.m.Y[ H:M[:S]]"))?;
        return Ok(date.midnight().assume_utc());
    };

    let full = match time_part.matches(':').count() {
        1 => MINUTE_FORMAT,
        2 => SECOND_FORMAT,
        _ => anyhow::bail!("date {input:?} does not match d.m.Y[ H:M[:S]]"),
    };
    let stamp = PrimitiveDateTime::parse(&format!("{date_part} {time_part}"), full)
        .with_context(|| format!("date {input:?} does not match d.m.Y[ H:M[:S]]"))?;
    Ok(stamp.assume_utc())
}

/// Regular files directly inside `dir`, sorted by name.
pub fn list_files(dir: &Path, filter: &FileFilter) -> Result<Vec<String>> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let metadata = entry
            .metadata()
            .with_context(|| format!("metadata {}", entry.path().display()))?;
        if filter.accepts(name, &metadata) {
            files.push(name.to_string());
        }
    }
    Ok(files)
}

/// Start at `start_file` when it is present in the listing.
pub fn resume_from(files: Vec<String>, start_file: Option<&str>) -> Vec<String> {
    let Some(start) = start_file else {
        return files;
    };
    match files.iter().position(|f| f == start) {
        Some(idx) => files.into_iter().skip(idx).collect(),
        None => files,
    }
}

/// Folder name for an untrusted category string.
pub fn sanitize_category(category: &str) -> String {
    decode_entities(category)
        .chars()
        .filter(|c| !ILLEGAL_FOLDER_CHARS.contains(c))
        .map(|c| if matches!(c, '\n' | '\t' | '\r') { ' ' } else { c })
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .trim()
        .to_string()
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&amp;", "&")
}

/// Move `base_dir/filename` into `base_dir/<category>/filename`.
pub fn move_to_category(base_dir: &Path, filename: &str, category: &str) -> Result<PathBuf> {
    let folder_name = sanitize_category(category);
    if folder_name.is_empty() {
        anyhow::bail!("category {category:?} is empty after sanitizing");
    }
    let folder = base_dir.join(&folder_name);
    std::fs::create_dir_all(&folder).with_context(|| format!("create dir {}", folder.display()))?;

    let source = base_dir.join(filename);
    let target = folder.join(filename);
    if target.exists() {
        anyhow::bail!("{} already exists", target.display());
    }
    std::fs::rename(&source, &target)
        .with_context(|| format!("move {} to {}", source.display(), target.display()))?;
    Ok(target)
}
