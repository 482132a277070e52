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
use std::time::Duration;

use clap::ValueEnum;
use log::debug;
use log::error;
use log::info;
use log::warn;
use reqwest::blocking::Client as HttpClient;
use reqwest::blocking::multipart;
use reqwest::header::ACCEPT;
use reqwest::header::ACCEPT_LANGUAGE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use serde::Deserialize;
use serde::Serialize;

use crate::database;
use crate::error::SearchError;
use crate::extract::filter_by_similarity;
use crate::model::MatchRecord;
use crate::model::SearchResponse;
use crate::normalize;
use crate::rate::AccountTier;
use crate::rate::Clock;
use crate::rate::RateState;
use crate::status::StatusVerdict;
use crate::status::verify_status;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/63.0.3239.84 Safari/537.36";
const ACCEPT_VALUE: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,image/apng,*/*;q=0.8";
const ACCEPT_LANGUAGE_VALUE: &str = "en-DE,en-US;q=0.9,en;q=0.8";

/// Response shape requested from the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    Markup,
    Structured,
}

impl OutputMode {
    /// Value of the endpoint's `output_type` parameter.
    pub fn code(self) -> u8 {
        match self {
            OutputMode::Markup => 0,
            OutputMode::Structured => 2,
        }
    }

    pub fn parse(self, body: &str) -> Result<SearchResponse, SearchError> {
        match self {
            OutputMode::Markup => normalize::parse_markup(body),
            OutputMode::Structured => normalize::parse_structured(body),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
    pub params: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// One POST to the search endpoint.
pub trait Transport {
    fn send(&self, request: &SearchRequest) -> Result<RawResponse, SearchError>;
}

pub struct HttpTransport {
    client: HttpClient,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, SearchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE));
        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));
        let client = HttpClient::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &SearchRequest) -> Result<RawResponse, SearchError> {
        let part = multipart::Part::bytes(request.bytes.clone())
            .file_name(request.file_name.clone())
            .mime_str(&request.mime)?;
        let form = multipart::Form::new().part("file", part);
        let response = self
            .client
            .post(&self.endpoint)
            .query(&request.params)
            .multipart(form)
            .send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub databases: u32,
    pub api_key: Option<String>,
    pub premium: bool,
    /// Issue both response shapes per file and merge them.
    pub dual_mode: bool,
    pub retry_cooldown: Duration,
}

/// Search client owning the run's rate and retry state.
pub struct SearchClient<T, C> {
    transport: T,
    clock: C,
    options: ClientOptions,
    state: RateState,
}

impl<T: Transport, C: Clock> SearchClient<T, C> {
    pub fn new(transport: T, clock: C, options: ClientOptions) -> Self {
        let tier = AccountTier::from_credentials(options.api_key.as_deref(), options.premium);
        if database::is_uncompleted_code(options.databases) {
            warn!(
                "database #{} is uncompleted and should not be used",
                options.databases
            );
        }
        let state = RateState::new(tier, options.dual_mode);
        debug!(
            "account tier {:?}: {} requests per 30 seconds",
            state.account_tier, state.requests_per_30s
        );
        Self {
            transport,
            clock,
            options,
            state,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &RateState {
        &self.state
    }

    /// Submit one image and normalize the response.
    ///
    /// A rejected payload yields an empty response. A transient status is
    /// retried once after the cooldown; a second one in a row is fatal.
    pub fn search_image(
        &mut self,
        path: &Path,
        mode: OutputMode,
    ) -> Result<SearchResponse, SearchError> {
        let request = self.build_request(path, mode)?;
        loop {
            let response = self.transport.send(&request)?;
            let verdict = match verify_status(response.status, &response.body, &request.file_name)
            {
                Ok(verdict) => verdict,
                Err(err) => {
                    self.state.previous_transient_status = None;
                    return Err(err);
                }
            };
            match verdict {
                StatusVerdict::Ok => {
                    self.state.previous_transient_status = None;
                    return mode.parse(&response.body);
                }
                StatusVerdict::Skip(msg) => {
                    self.state.previous_transient_status = None;
                    error!("{msg}");
                    return Ok(SearchResponse::empty());
                }
                StatusVerdict::Repeat(msg) => {
                    if self.state.previous_transient_status.take().is_some() {
                        return Err(SearchError::UnknownStatus(msg));
                    }
                    info!(
                        "received an unexpected status ({msg}), repeating after {}s",
                        self.options.retry_cooldown.as_secs_f64()
                    );
                    self.state.previous_transient_status = Some(msg);
                    self.clock.sleep(self.options.retry_cooldown);
                }
            }
        }
    }

    /// Sorted, threshold-filtered matches for one file, merging both
    /// response shapes in dual mode.
    pub fn check_file(
        &mut self,
        path: &Path,
        mode: OutputMode,
        min_similarity: f64,
    ) -> Result<Vec<MatchRecord>, SearchError> {
        info!("checking file: {}", path.display());
        if !self.options.dual_mode {
            let response = self.search_image(path, mode)?;
            return Ok(filter_by_similarity(response.matches, min_similarity));
        }

        let markup = self.search_image(path, OutputMode::Markup)?;
        let structured = self.search_image(path, OutputMode::Structured)?;
        Ok(normalize::merge_results(
            filter_by_similarity(markup.matches, min_similarity),
            filter_by_similarity(structured.matches, min_similarity),
        ))
    }

    /// Mark the start of a file's requests for pacing.
    pub fn begin_file(&mut self) {
        self.state.last_request_started_at = Some(self.clock.now());
    }

    /// Sleep out whatever is left of the per-file budget.
    pub fn pace(&mut self) -> Duration {
        let remaining = self.state.remaining(self.clock.now());
        if !remaining.is_zero() {
            debug!("sleeping {:.2} seconds", remaining.as_secs_f64());
            self.clock.sleep(remaining);
        }
        remaining
    }

    fn build_request(&self, path: &Path, mode: OutputMode) -> Result<SearchRequest, SearchError> {
        let bytes = std::fs::read(path).map_err(|source| SearchError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mime = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();

        let mut params = vec![
            ("output_type".to_string(), mode.code().to_string()),
            ("db".to_string(), self.options.databases.to_string()),
            ("frame".to_string(), "1".to_string()),
            ("hide".to_string(), "0".to_string()),
        ];
        if let Some(key) = self.options.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
            params.push(("api_key".to_string(), key.to_string()));
        }

        Ok(SearchRequest {
            file_name,
            mime,
            bytes,
            params,
        })
    }
}
