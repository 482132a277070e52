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

use crate::error::SearchError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusVerdict {
    Ok,
    /// The file was rejected; treat it as having no matches.
    Skip(String),
    /// Transient; may be retried once after the cooldown.
    Repeat(String),
}

const UNREGISTERED_DAILY_PHRASE: &str = "limit of 150 searches";
const BASIC_DAILY_PHRASE: &str = "limit of 300 searches";
const GENERIC_DAILY_PHRASE: &str = "daily search limit";
const RATE_LIMIT_PHRASE: &str = "user's rate limit";

/// Classify an upstream status. Fatal conditions come back as errors.
pub fn verify_status(status: u16, body: &str, file_name: &str) -> Result<StatusVerdict, SearchError> {
    match status {
        200 => Ok(StatusVerdict::Ok),
        413 => Ok(StatusVerdict::Skip(format!(
            "payload too large, skipping file: {file_name}"
        ))),
        403 => Err(SearchError::InvalidApiKey),
        429 => {
            if let Some(msg) = daily_limit_message(body) {
                return Err(SearchError::DailyLimitExceeded(msg.to_string()));
            }
            if body.contains(RATE_LIMIT_PHRASE) {
                Ok(StatusVerdict::Repeat("search rate limit reached".to_string()))
            } else {
                Ok(StatusVerdict::Repeat(
                    "too many requests without a daily limit notice".to_string(),
                ))
            }
        }
        other => Ok(StatusVerdict::Repeat(format!("unknown status code: {other}"))),
    }
}

fn daily_limit_message(body: &str) -> Option<&'static str> {
    if body.contains(UNREGISTERED_DAILY_PHRASE) {
        Some("daily search limit for unregistered users reached")
    } else if body.contains(BASIC_DAILY_PHRASE) {
        Some("daily search limit for basic users reached")
    } else if body.to_lowercase().contains(GENERIC_DAILY_PHRASE) {
        Some("daily search limit reached")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_and_skip() {
        assert_eq!(verify_status(200, "", "a.jpg").unwrap(), StatusVerdict::Ok);
        match verify_status(413, "", "a.jpg").unwrap() {
            StatusVerdict::Skip(msg) => assert!(msg.contains("a.jpg")),
            other => panic!("unexpected verdict {other:?}"),
        }
    }

    #[test]
    fn forbidden_is_invalid_api_key() {
        let err = verify_status(403, "", "a.jpg").unwrap_err();
        assert!(matches!(err, SearchError::InvalidApiKey));
    }

    #[test]
    fn daily_limit_phrases_are_fatal() {
        let err = verify_status(
            429,
            "<strong>Daily Search Limit Exceeded.</strong> IP has exceeded the basic limit of 150 searches",
            "a.jpg",
        )
        .unwrap_err();
        match err {
            SearchError::DailyLimitExceeded(msg) => assert!(msg.contains("unregistered")),
            other => panic!("unexpected error {other:?}"),
        }

        let err = verify_status(429, "account has a limit of 300 searches", "a.jpg").unwrap_err();
        assert!(matches!(err, SearchError::DailyLimitExceeded(msg) if msg.contains("basic")));
    }

    #[test]
    fn unrecognized_429_and_other_codes_repeat() {
        assert!(matches!(
            verify_status(429, "Search Rate Too High. user's rate limit", "a.jpg").unwrap(),
            StatusVerdict::Repeat(_)
        ));
        assert!(matches!(
            verify_status(429, "", "a.jpg").unwrap(),
            StatusVerdict::Repeat(_)
        ));
        assert_eq!(
            verify_status(502, "", "a.jpg").unwrap(),
            StatusVerdict::Repeat("unknown status code: 502".to_string())
        );
    }
}
