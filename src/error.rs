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

use thiserror::Error;

/// Conditions that end a run. Per-file skips never surface as errors.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("{0}")]
    DailyLimitExceeded(String),
    #[error("invalid or wrong API key")]
    InvalidApiKey,
    #[error("{0}")]
    UnknownStatus(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SearchError {
    /// Stable code reported in JSON error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            SearchError::DailyLimitExceeded(_) => "daily_limit",
            SearchError::InvalidApiKey => "invalid_api_key",
            SearchError::UnknownStatus(_) => "unknown_status",
            SearchError::MalformedResponse(_) => "malformed_response",
            SearchError::Transport(_) => "transport",
            SearchError::Io { .. } => "io",
        }
    }
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::Transport(err.to_string())
    }
}
