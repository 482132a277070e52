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

//! Similarity filtering and `Label: value` extraction.
//!
//! All label scraping goes through [`split_label`]; callers never match
//! upstream text themselves.

use crate::model::MatchRecord;

pub const MATERIAL_LABEL: &str = "Material";
pub const CREATOR_LABEL: &str = "Creator";
pub const CHARACTERS_LABEL: &str = "Characters";

/// Keep the leading records whose similarity reaches `threshold` (percent).
///
/// Input must already be sorted by descending similarity; the first record
/// below the threshold ends the scan.
pub fn filter_by_similarity(records: Vec<MatchRecord>, threshold: f64) -> Vec<MatchRecord> {
    records
        .into_iter()
        .take_while(|record| record.similarity >= threshold)
        .collect()
}

/// Values of the first content block, across all records, carrying `label`.
pub fn extract_labeled_field(records: &[MatchRecord], label: &str) -> Vec<String> {
    records
        .iter()
        .flat_map(|record| record.content.iter())
        .find_map(|block| split_label(block, label))
        .unwrap_or_default()
}

/// Same as [`extract_labeled_field`] but reads titles, which must start with the label.
pub fn extract_title_field(records: &[MatchRecord], label: &str) -> Vec<String> {
    records
        .iter()
        .filter(|record| record.title.starts_with(&label_prefix(label)))
        .find_map(|record| split_label(&record.title, label))
        .unwrap_or_default()
}

fn label_prefix(label: &str) -> String {
    format!("{label}: ")
}

/// Everything after the first `"<label>: "`, one value per line.
pub fn split_label(text: &str, label: &str) -> Option<Vec<String>> {
    let prefix = label_prefix(label);
    let start = text.find(&prefix)? + prefix.len();
    let rest = text[start..].trim_end_matches('\n');
    Some(rest.split('\n').map(str::to_string).collect())
}
