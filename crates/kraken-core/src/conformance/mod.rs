//! Conformance checklist for a running kraken site.
//!
//! Drives the demo site's endpoints over real HTTP with [`crate::probe`] and
//! reports each expectation separately, so one failure does not hide the
//! rest. Blocking; call from `spawn_blocking` in async code.

mod checks;

use std::fmt;

/// Where to point the checks.
#[derive(Debug, Clone)]
pub struct CheckPlan {
    /// Base URL without a trailing slash, e.g. `http://127.0.0.1:5000`.
    pub base_url: String,
    /// Path of an existing binary static asset, e.g. `/__logo/dyko.png`.
    pub asset_path: String,
    /// Expected byte length of the asset, when known.
    pub asset_len: Option<usize>,
    /// Name of the session cookie the site sets.
    pub session_cookie: String,
}

impl CheckPlan {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            asset_path: "/__logo/dyko.png".to_string(),
            asset_len: None,
            session_cookie: "kraken_session".to_string(),
        }
    }

    pub fn with_asset_path(mut self, path: &str) -> Self {
        self.asset_path = format!("/{}", path.trim_start_matches('/'));
        self
    }

    pub fn with_asset_len(mut self, len: usize) -> Self {
        self.asset_len = Some(len);
        self
    }

    pub fn with_session_cookie(mut self, name: &str) -> Self {
        self.session_cookie = name.to_string();
        self
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Result of one named check; `failure` is `None` when it passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckOutcome {
    pub name: &'static str,
    pub failure: Option<String>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.failure.is_none()
    }
}

impl fmt::Display for CheckOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.failure {
            None => write!(f, "ok    {}", self.name),
            Some(reason) => write!(f, "FAIL  {}: {}", self.name, reason),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    pub outcomes: Vec<CheckOutcome>,
}

impl Report {
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckOutcome> {
        self.outcomes.iter().filter(|o| !o.passed())
    }

    pub fn outcome(&self, name: &str) -> Option<&CheckOutcome> {
        self.outcomes.iter().find(|o| o.name == name)
    }
}

/// Run every check in order.
pub fn run(plan: &CheckPlan) -> Report {
    let outcomes = checks::ALL
        .iter()
        .map(|&(name, check)| {
            let failure = check(plan).err().map(|e| format!("{:#}", e));
            if let Some(reason) = &failure {
                tracing::warn!(check = name, %reason, "conformance check failed");
            }
            CheckOutcome { name, failure }
        })
        .collect();
    Report { outcomes }
}
