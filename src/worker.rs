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

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use log::debug;
use log::info;
use log::warn;
use serde::Serialize;

use crate::categorize::CategorizeOptions;
use crate::categorize::Categorizer;
use crate::categorize::Disposition;
use crate::client::OutputMode;
use crate::client::SearchClient;
use crate::client::Transport;
use crate::files;
use crate::model::FileReport;
use crate::model::MovedFile;
use crate::rate::Clock;
use crate::titles::SimilarTitles;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub directory: PathBuf,
    pub mode: OutputMode,
    /// Percent.
    pub min_similarity: f64,
    pub start_file: Option<String>,
    pub categorize: CategorizeOptions,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub files_total: usize,
    pub files_checked: usize,
    pub no_match: usize,
    pub no_category: usize,
    pub excluded: usize,
    pub moved: usize,
    pub emitted: usize,
    pub took_ms: i64,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub reports: Vec<FileReport>,
    pub moved: Vec<MovedFile>,
    pub warnings: Vec<String>,
    pub summary: RunSummary,
}

/// Process files one at a time in listing order.
///
/// Search errors are fatal and end the run; files already moved stay moved.
/// `on_report` sees every unmoved report as soon as it is produced.
pub fn run<T, C>(
    client: &mut SearchClient<T, C>,
    titles: &dyn SimilarTitles,
    files: Vec<String>,
    opts: &RunOptions,
    mut on_report: impl FnMut(&FileReport),
) -> Result<RunReport>
where
    T: Transport,
    C: Clock,
{
    let started = Instant::now();
    let categorizer = Categorizer::new(&opts.categorize, titles);
    let files = files::resume_from(files, opts.start_file.as_deref());

    let mut report = RunReport::default();
    report.summary.files_total = files.len();

    let count = files.len();
    for (idx, file_name) in files.into_iter().enumerate() {
        client.begin_file();
        let path = opts.directory.join(&file_name);
        let filtered = client.check_file(&path, opts.mode, opts.min_similarity)?;
        report.summary.files_checked += 1;

        match categorizer.decide(&file_name, filtered) {
            Disposition::NoMatch => report.summary.no_match += 1,
            Disposition::NoCategory => report.summary.no_category += 1,
            Disposition::Excluded(resolution) => {
                debug!(
                    "left {file_name} in place, category {} is excluded",
                    resolution.resolved_category
                );
                report.summary.excluded += 1;
            }
            Disposition::Unmoved(file_report) => {
                on_report(&file_report);
                report.summary.emitted += 1;
                report.reports.push(file_report);
            }
            Disposition::Relocate(resolution) => {
                let category = resolution.resolved_category;
                match files::move_to_category(&opts.directory, &file_name, &category) {
                    Ok(target) => {
                        info!("moved {file_name} to {}", target.display());
                        report.summary.moved += 1;
                        report.moved.push(MovedFile {
                            filename: file_name,
                            category,
                        });
                    }
                    Err(err) => {
                        warn!("could not move {file_name}: {err:#}");
                        report.warnings.push(format!("{file_name}: {err:#}"));
                    }
                }
            }
        }

        if idx + 1 < count {
            client.pace();
        }
    }

    report.summary.took_ms = started.elapsed().as_millis() as i64;
    Ok(report)
}
