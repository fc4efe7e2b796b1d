//! Health of the services this frontend depends on.
//!
//! Checkers are registered once at startup and run periodically in the
//! background; `/health` reports the last observed state of each plus an
//! overall status.

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;
use tokio::task::{JoinHandle, JoinSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

/// Outcome of a single run of one checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: Status,
    pub status_code: Option<u16>,
    pub message: String,
}

#[async_trait]
pub trait Checker: Send + Sync {
    async fn check(&self) -> CheckResult;
}

/// Last known state of one registered check. Times are unix seconds.
#[derive(Debug, Clone, Serialize)]
pub struct CheckState {
    pub name: String,
    pub status: Option<Status>,
    pub status_code: Option<u16>,
    pub message: String,
    pub last_checked: Option<u64>,
    pub last_success: Option<u64>,
    pub last_failure: Option<u64>,
}

impl CheckState {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: None,
            status_code: None,
            message: String::new(),
            last_checked: None,
            last_success: None,
            last_failure: None,
        }
    }

    fn update(&mut self, result: CheckResult, now: u64) {
        if result.status == Status::Ok {
            self.last_success = Some(now);
        } else {
            self.last_failure = Some(now);
        }
        self.status = Some(result.status);
        self.status_code = result.status_code;
        self.message = result.message;
        self.last_checked = Some(now);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    pub version: String,
    pub git_commit: String,
    pub build_time: String,
    pub language: String,
}

impl VersionInfo {
    /// Version of this build; commit and build time come from the `GIT_COMMIT`
    /// and `BUILD_TIME` environment variables at compile time.
    pub fn from_build() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            git_commit: option_env!("GIT_COMMIT").unwrap_or("unknown").to_string(),
            build_time: option_env!("BUILD_TIME").unwrap_or("unknown").to_string(),
            language: "rust".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: Status,
    pub version: VersionInfo,
    pub start_time: u64,
    /// Milliseconds since startup.
    pub uptime: u64,
    pub checks: Vec<CheckState>,
}

struct State {
    checks: Vec<CheckState>,
    unhealthy_since: Option<Instant>,
}

pub struct HealthCheck {
    checkers: Vec<(String, Arc<dyn Checker>)>,
    state: RwLock<State>,
    version: VersionInfo,
    started: Instant,
    start_time: u64,
    interval: Duration,
    critical_timeout: Duration,
}

impl HealthCheck {
    pub fn new(version: VersionInfo, critical_timeout: Duration, interval: Duration) -> Self {
        Self {
            checkers: Vec::new(),
            state: RwLock::new(State {
                checks: Vec::new(),
                unhealthy_since: None,
            }),
            version,
            started: Instant::now(),
            start_time: unix_now(),
            interval,
            critical_timeout,
        }
    }

    /// Register a checker. Must be called before the health check is shared.
    pub fn add_check(&mut self, name: impl Into<String>, checker: Arc<dyn Checker>) {
        let name = name.into();
        self.state.get_mut().checks.push(CheckState::new(&name));
        self.checkers.push((name, checker));
    }

    /// Run every checker concurrently and record the results.
    pub async fn run_checks(&self) {
        let mut join_set = JoinSet::new();

        for (index, (name, checker)) in self.checkers.iter().enumerate() {
            let checker = checker.clone();
            let name = name.clone();
            join_set.spawn(async move {
                let result = checker.check().await;
                if result.status != Status::Ok {
                    tracing::warn!(check = %name, status = ?result.status, message = %result.message, "health check not ok");
                }
                (index, result)
            });
        }

        let mut results = Vec::with_capacity(self.checkers.len());
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => tracing::error!("health check task panicked: {}", e),
            }
        }

        let now = unix_now();
        let mut state = self.state.write().await;
        for (index, result) in results {
            state.checks[index].update(result, now);
        }

        let all_ok = state
            .checks
            .iter()
            .all(|c| c.status == Some(Status::Ok));
        if all_ok {
            state.unhealthy_since = None;
        } else if state.unhealthy_since.is_none() {
            state.unhealthy_since = Some(Instant::now());
        }
    }

    /// Run checks now and then on every interval tick until the task is aborted.
    pub fn start(self: Arc<Self>) -> JoinHandle<()> {
        tokio::spawn(async move {
            // tokio panics on a zero period.
            let mut ticker = tokio::time::interval(self.interval.max(Duration::from_secs(1)));
            loop {
                ticker.tick().await;
                self.run_checks().await;
            }
        })
    }

    pub async fn report(&self) -> HealthReport {
        let state = self.state.read().await;
        HealthReport {
            status: self.overall_status(&state),
            version: self.version.clone(),
            start_time: self.start_time,
            uptime: self.started.elapsed().as_millis() as u64,
            checks: state.checks.clone(),
        }
    }

    fn overall_status(&self, state: &State) -> Status {
        if state.checks.is_empty() {
            return Status::Ok;
        }
        if state.checks.iter().any(|c| c.status.is_none()) {
            return Status::Warning;
        }
        if state.checks.iter().all(|c| c.status == Some(Status::Ok)) {
            return Status::Ok;
        }

        let any_critical = state
            .checks
            .iter()
            .any(|c| c.status == Some(Status::Critical));
        let past_timeout = state
            .unhealthy_since
            .is_some_and(|since| since.elapsed() >= self.critical_timeout);

        if any_critical && past_timeout {
            Status::Critical
        } else {
            Status::Warning
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
