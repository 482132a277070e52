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

use std::time::Duration;
use std::time::Instant;

use serde::Serialize;

const PACING_WINDOW_SECS: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountTier {
    Unregistered,
    Basic,
    Premium,
}

impl AccountTier {
    /// Without an API key the account is always unregistered.
    pub fn from_credentials(api_key: Option<&str>, premium: bool) -> Self {
        match api_key.map(str::trim) {
            Some(key) if !key.is_empty() => {
                if premium {
                    AccountTier::Premium
                } else {
                    AccountTier::Basic
                }
            }
            _ => AccountTier::Unregistered,
        }
    }

    pub fn requests_per_30s(self) -> u32 {
        match self {
            AccountTier::Unregistered => 4,
            AccountTier::Basic => 6,
            AccountTier::Premium => 15,
        }
    }
}

/// Source of time for pacing and retry cooldowns.
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

#[derive(Debug, Clone)]
pub struct RateState {
    pub account_tier: AccountTier,
    pub requests_per_30s: f64,
    pub last_request_started_at: Option<Instant>,
    pub previous_transient_status: Option<String>,
}

impl RateState {
    /// Dual mode issues two requests per file, so the allowance is halved.
    pub fn new(account_tier: AccountTier, dual_mode: bool) -> Self {
        let mut requests_per_30s = f64::from(account_tier.requests_per_30s());
        if dual_mode {
            requests_per_30s /= 2.0;
        }
        Self {
            account_tier,
            requests_per_30s,
            last_request_started_at: None,
            previous_transient_status: None,
        }
    }

    /// Wall-clock time one file may take before the next may start.
    pub fn budget(&self) -> Duration {
        Duration::from_secs_f64(PACING_WINDOW_SECS / self.requests_per_30s)
    }

    /// Portion of the budget not yet used by the file started last.
    pub fn remaining(&self, now: Instant) -> Duration {
        let Some(started) = self.last_request_started_at else {
            return Duration::ZERO;
        };
        self.budget()
            .saturating_sub(now.saturating_duration_since(started))
    }
}
