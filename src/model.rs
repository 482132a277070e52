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

//! Shared domain types used across searching, normalization, and categorization.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

/// One candidate source for a submitted image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MatchRecord {
    /// Percentage in 0..=100.
    pub similarity: f64,
    #[serde(default)]
    pub title: String,
    /// Free-text blocks, usually made of `Label: value` lines.
    #[serde(default)]
    pub content: Vec<String>,
    #[serde(default)]
    pub external_links: Vec<String>,
    /// Upstream fields without a canonical slot (member names, index ids, ...).
    #[serde(default, flatten, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

impl MatchRecord {
    #[cfg(test)]
    pub fn new(similarity: f64) -> Self {
        Self {
            similarity,
            ..Default::default()
        }
    }

    /// Union `other` into `self`; fields present on `other` win.
    ///
    /// Empty title/content/link fields count as absent so data only one
    /// response shape carries survives the union.
    pub fn merge_from(&mut self, other: MatchRecord) {
        self.similarity = other.similarity;
        if !other.title.is_empty() {
            self.title = other.title;
        }
        if !other.content.is_empty() {
            self.content = other.content;
        }
        if !other.external_links.is_empty() {
            self.external_links = other.external_links;
        }
        self.extra.extend(other.extra);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SearchResponse {
    pub matches: Vec<MatchRecord>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CategorySource {
    ContentField,
    AuthorField,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryResolution {
    pub raw_category: String,
    pub resolved_category: String,
    pub source: CategorySource,
}

impl CategoryResolution {
    pub fn unresolved(raw_category: String, source: CategorySource) -> Self {
        Self {
            resolved_category: raw_category.clone(),
            raw_category,
            source,
        }
    }
}

/// Results emitted for a file that was categorized but not relocated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub filename: String,
    pub category: CategoryResolution,
    pub results: Vec<MatchRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovedFile {
    pub filename: String,
    pub category: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn merge_prefers_present_fields_from_other() {
        let mut markup = MatchRecord {
            similarity: 91.0,
            title: "Markup title".to_string(),
            content: vec!["Material: clannad".to_string()],
            external_links: vec!["https://a.example/1".to_string()],
            extra: Map::new(),
        };
        let mut structured = MatchRecord::new(91.5);
        structured.title = "Structured title".to_string();
        structured
            .extra
            .insert("member_name".to_string(), json!("someone"));

        markup.merge_from(structured);

        assert_eq!(markup.similarity, 91.5);
        assert_eq!(markup.title, "Structured title");
        assert_eq!(markup.content, vec!["Material: clannad".to_string()]);
        assert_eq!(markup.external_links, vec!["https://a.example/1".to_string()]);
        assert_eq!(markup.extra.get("member_name"), Some(&json!("someone")));
    }

    #[test]
    fn extra_fields_flatten_on_serialize() {
        let mut record = MatchRecord::new(70.0);
        record.extra.insert("index_id".to_string(), json!(5));
        let value = serde_json::to_value(&record).expect("serialize");
        assert_eq!(value.get("index_id"), Some(&json!(5)));
        assert_eq!(value.get("similarity"), Some(&json!(70.0)));
    }
}
