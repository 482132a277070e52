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

use std::process::Command;

use anyhow::Context;
use anyhow::Result;
use log::debug;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TitleCandidate {
    pub title: String,
    /// Fraction in 0..=1.
    pub similarity: f64,
}

/// External lookup returning titles ranked by descending similarity.
pub trait SimilarTitles {
    fn similar_titles(&self, query: &str) -> Result<Vec<TitleCandidate>>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoTitleLookup;

impl SimilarTitles for NoTitleLookup {
    fn similar_titles(&self, _query: &str) -> Result<Vec<TitleCandidate>> {
        Ok(Vec::new())
    }
}

/// Runs a program with the query appended and reads a JSON array of
/// candidates from its stdout.
#[derive(Debug, Clone)]
pub struct CommandTitleLookup {
    program: String,
    args: Vec<String>,
}

impl CommandTitleLookup {
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }
}

impl SimilarTitles for CommandTitleLookup {
    fn similar_titles(&self, query: &str) -> Result<Vec<TitleCandidate>> {
        debug!("title lookup: {} {:?}", self.program, query);
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(query)
            .output()
            .with_context(|| format!("run title lookup {}", self.program))?;
        if !output.status.success() {
            anyhow::bail!(
                "title lookup {} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        parse_candidates(&output.stdout)
    }
}

fn parse_candidates(stdout: &[u8]) -> Result<Vec<TitleCandidate>> {
    let text = String::from_utf8_lossy(stdout);
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut candidates: Vec<TitleCandidate> =
        serde_json::from_str(text.trim()).context("parse title lookup output")?;
    candidates.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_is_split_on_whitespace() {
        let lookup = CommandTitleLookup::from_command_line("titlesearch --json").expect("cmd");
        assert_eq!(lookup.program, "titlesearch");
        assert_eq!(lookup.args, vec!["--json".to_string()]);
        assert!(CommandTitleLookup::from_command_line("   ").is_none());
    }

    #[test]
    fn candidates_are_ranked() {
        let out = br#"[{"title": "Clannad", "similarity": 0.8}, {"title": "CLANNAD", "similarity": 0.97}]"#;
        let candidates = parse_candidates(out).expect("parse");
        assert_eq!(candidates[0].title, "CLANNAD");
        assert!(parse_candidates(b"  \n").expect("empty").is_empty());
        assert!(parse_candidates(b"not json").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn command_lookup_reads_stdout() {
        let lookup = CommandTitleLookup::from_command_line("echo").expect("cmd");
        // echo prints the query back, which is not a candidate list
        assert!(lookup.similar_titles("[]").expect("run").is_empty());
        assert!(lookup.similar_titles("clannad").is_err());
    }
}
