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

use log::debug;
use log::info;
use log::warn;

use crate::extract::CREATOR_LABEL;
use crate::extract::MATERIAL_LABEL;
use crate::extract::extract_labeled_field;
use crate::extract::extract_title_field;
use crate::model::CategoryResolution;
use crate::model::CategorySource;
use crate::model::FileReport;
use crate::model::MatchRecord;
use crate::titles::SimilarTitles;

const ORIGINAL_TAG: &str = "original";

#[derive(Debug, Clone)]
pub struct CategorizeOptions {
    pub use_author: bool,
    pub move_to_categories: bool,
    /// Percent, compared against title similarity scaled to percent.
    pub title_min_similarity: f64,
    /// Lowercased category names that are never acted upon.
    pub excludes: Vec<String>,
}

impl CategorizeOptions {
    pub fn is_excluded(&self, category: &str) -> bool {
        let lowered = category.to_lowercase();
        self.excludes.iter().any(|ex| *ex == lowered)
    }
}

/// Split a comma separated exclusion list into lowercased names.
pub fn parse_excludes<S: AsRef<str>>(items: &[S]) -> Vec<String> {
    items
        .iter()
        .flat_map(|item| item.as_ref().split(','))
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Terminal state for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    NoMatch,
    NoCategory,
    Excluded(CategoryResolution),
    Unmoved(FileReport),
    Relocate(CategoryResolution),
}

/// Pick one category from the extracted candidates.
///
/// The first "original" is dropped when other candidates exist; the first
/// remaining candidate wins.
pub fn select_category(mut candidates: Vec<String>) -> Option<String> {
    if candidates.len() > 1
        && let Some(pos) = candidates.iter().position(|c| c == ORIGINAL_TAG)
    {
        candidates.remove(pos);
    }
    candidates.into_iter().next()
}

pub struct Categorizer<'a> {
    options: &'a CategorizeOptions,
    titles: &'a dyn SimilarTitles,
}

impl<'a> Categorizer<'a> {
    pub fn new(options: &'a CategorizeOptions, titles: &'a dyn SimilarTitles) -> Self {
        Self { options, titles }
    }

    /// Drive one file's filtered results to a terminal state.
    pub fn decide(&self, filename: &str, filtered: Vec<MatchRecord>) -> Disposition {
        if filtered.is_empty() {
            info!("no results found for image: {filename}");
            return Disposition::NoMatch;
        }

        let (candidates, source) = if self.options.use_author {
            (
                extract_title_field(&filtered, CREATOR_LABEL),
                CategorySource::AuthorField,
            )
        } else {
            (
                extract_labeled_field(&filtered, MATERIAL_LABEL),
                CategorySource::ContentField,
            )
        };
        debug!("categories for {filename}: {}", candidates.join(", "));

        let selected = if source == CategorySource::ContentField {
            select_category(candidates)
        } else {
            candidates.into_iter().next()
        };
        let Some(raw) = selected.filter(|c| !c.trim().is_empty()) else {
            info!("no categories found for file: {filename}");
            return Disposition::NoCategory;
        };

        let resolution = match source {
            CategorySource::ContentField => self.resolve(raw),
            CategorySource::AuthorField => CategoryResolution::unresolved(raw, source),
        };

        if self.options.is_excluded(&resolution.resolved_category) {
            info!(
                "skipping excluded category: {} ({filename})",
                resolution.resolved_category
            );
            return Disposition::Excluded(resolution);
        }

        if !self.options.move_to_categories {
            return Disposition::Unmoved(FileReport {
                filename: filename.to_string(),
                category: resolution,
                results: filtered,
            });
        }

        Disposition::Relocate(resolution)
    }

    /// Adopt the top similar title when it clears the configured threshold.
    pub fn resolve(&self, raw: String) -> CategoryResolution {
        let mut resolution = CategoryResolution::unresolved(raw, CategorySource::ContentField);
        let candidates = match self.titles.similar_titles(&resolution.raw_category) {
            Ok(candidates) => candidates,
            Err(err) => {
                warn!(
                    "similar title lookup failed for {}: {err:#}",
                    resolution.raw_category
                );
                return resolution;
            }
        };
        if let Some(top) = candidates.into_iter().next() {
            let percent = top.similarity * 100.0;
            if percent >= self.options.title_min_similarity {
                info!(
                    "similar title found: {}, {} ({percent:.2}%)",
                    resolution.raw_category, top.title
                );
                resolution.resolved_category = top.title;
            }
        }
        resolution
    }
}
