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

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::extract::CHARACTERS_LABEL;
use crate::extract::MATERIAL_LABEL;
use crate::extract::extract_labeled_field;
use crate::model::FileReport;
use crate::model::MatchRecord;
use crate::model::MovedFile;
use crate::worker::RunSummary;

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonResponse {
    pub ok: bool,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub moved: Option<Vec<MovedFile>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub databases: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<RunSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            schema_version: "1".to_string(),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            schema_version: "1".to_string(),
            error: Some(ErrorOut {
                code: code.to_string(),
                message: message.to_string(),
            }),
            ..Default::default()
        }
    }

    pub fn with_results(mut self, results: Vec<Value>) -> Self {
        self.results = Some(results);
        self
    }

    pub fn with_moved(mut self, moved: Vec<MovedFile>) -> Self {
        self.moved = Some(moved);
        self
    }

    pub fn with_databases(mut self, databases: Vec<Value>) -> Self {
        self.databases = Some(databases);
        self
    }

    pub fn with_stats(mut self, stats: RunSummary) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn print_json(resp: &JsonResponse) -> Result<()> {
    let text = serde_json::to_string_pretty(resp)?;
    println!("{text}");
    Ok(())
}

pub fn print_records(records: &[MatchRecord]) {
    for record in records {
        let title = record.title.replace('\n', " ");
        println!("{:.2}%\t{}", record.similarity, title.trim());
        for link in &record.external_links {
            println!("  {link}");
        }
    }
}

pub fn print_file_report(report: &FileReport) {
    println!(
        "{}\t{}",
        report.filename, report.category.resolved_category
    );
    let characters = extract_labeled_field(&report.results, CHARACTERS_LABEL);
    if !characters.is_empty() {
        println!("  characters: {}", characters.join(", "));
    }
    let material = extract_labeled_field(&report.results, MATERIAL_LABEL);
    if material.len() > 1 {
        println!("  material: {}", material.join(", "));
    }
    if let Some(best) = report.results.first() {
        println!("  best match: {:.2}%", best.similarity);
    }
}

pub fn print_summary(summary: &RunSummary) {
    println!(
        "Checked {} of {} files: {} moved, {} listed, {} excluded, {} without match, {} without category",
        summary.files_checked,
        summary.files_total,
        summary.moved,
        summary.emitted,
        summary.excluded,
        summary.no_match,
        summary.no_category
    );
}
