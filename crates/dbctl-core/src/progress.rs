//! Convergence polling for a freshly created database
//!
//! After creation the service reports the database as `PROVISIONING` for a
//! while. [`wait_for_state`] polls it on a fixed interval until it reports the
//! target state, the deadline passes, a query fails, or the caller cancels.
//!
//! Terminal outcomes:
//!
//! | Outcome   | Returned as                    |
//! |-----------|--------------------------------|
//! | Converged | `Ok(PollReport)`               |
//! | TimedOut  | `Err(CoreError::Timeout)`      |
//! | Failed    | the status query's error       |
//! | Cancelled | `Err(CoreError::Cancelled)`    |
//!
//! # Deadline precedence
//!
//! The ticker and the deadline are two independent wake sources, selected
//! with a bias toward the ticker. A query starts only when its tick was
//! scheduled at or before the deadline and the deadline has not yet passed
//! at the moment it would start. A match from a query that started in time
//! is returned as success even when the response arrives after the deadline.
//! The loop therefore issues at most `floor(deadline / interval)` queries.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::database::{DatabaseApi, LifecycleState};
use crate::error::{CoreError, Result};

/// Default polling interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);
/// Default overall deadline
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(3600);
/// Longest accepted interval or deadline (365 days)
pub const MAX_WAIT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// What to wait for and how long
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    target_state: Option<String>,
    interval: Duration,
    deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            target_state: None,
            interval: DEFAULT_INTERVAL,
            deadline: DEFAULT_DEADLINE,
        }
    }
}

impl PollConfig {
    /// Build a config; an empty target disables waiting
    pub fn new(target_state: Option<String>, interval: Duration, deadline: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(CoreError::Validation(
                "wait interval must be greater than zero".to_string(),
            ));
        }
        if deadline.is_zero() {
            return Err(CoreError::Validation(
                "max wait must be greater than zero".to_string(),
            ));
        }
        if interval > MAX_WAIT || deadline > MAX_WAIT {
            return Err(CoreError::Validation(format!(
                "wait interval and max wait must not exceed {}s",
                MAX_WAIT.as_secs()
            )));
        }

        Ok(Self {
            target_state: target_state.filter(|s| !s.is_empty()),
            interval,
            deadline,
        })
    }

    /// Target state, or `None` when waiting is disabled
    pub fn target_state(&self) -> Option<&str> {
        self.target_state.as_deref()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }
}

/// Summary of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReport {
    pub state: LifecycleState,
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Progress events emitted while waiting
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Waiting has begun
    Started {
        database_id: String,
        target_state: String,
    },
    /// A status query returned a non-matching state
    Polling {
        database_id: String,
        status: LifecycleState,
        attempt: u32,
        elapsed: Duration,
    },
    /// The target state was observed
    Converged {
        database_id: String,
        status: LifecycleState,
        elapsed: Duration,
    },
}

/// Callback type for progress updates
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Poll a database until it reaches the configured target state
///
/// # Arguments
///
/// * `api` - Remote client used for status queries
/// * `database_id` - Resource to watch
/// * `config` - Target state, interval and deadline; the target must be set
/// * `cancel` - Resolves to abandon the wait (pass `std::future::pending()` for none)
/// * `on_progress` - Optional callback for progress updates
///
/// # Example
///
/// ```rust,ignore
/// use dbctl_core::{PollConfig, wait_for_state};
/// use std::time::Duration;
///
/// let config = PollConfig::new(
///     Some("AVAILABLE".to_string()),
///     Duration::from_secs(30),
///     Duration::from_secs(3600),
/// )?;
/// let report = wait_for_state(&client, &db.id, &config, tokio::signal::ctrl_c(), None).await?;
/// println!("reached {} after {} checks", report.state, report.attempts);
/// ```
pub async fn wait_for_state<A, C, T>(
    api: &A,
    database_id: &str,
    config: &PollConfig,
    cancel: C,
    on_progress: Option<ProgressCallback>,
) -> Result<PollReport>
where
    A: DatabaseApi + ?Sized,
    C: Future<Output = T>,
{
    let target = config.target_state().ok_or_else(|| {
        CoreError::Validation("no target state to wait for".to_string())
    })?;

    let start = Instant::now();
    let (Some(deadline_at), Some(first_tick)) = (
        start.checked_add(config.deadline),
        start.checked_add(config.interval),
    ) else {
        return Err(CoreError::Validation(
            "wait interval or max wait is out of range".to_string(),
        ));
    };

    // First tick fires one full interval after start
    let mut ticker = tokio::time::interval_at(first_tick, config.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let deadline = tokio::time::sleep_until(deadline_at);
    tokio::pin!(deadline);
    tokio::pin!(cancel);

    emit(
        &on_progress,
        ProgressEvent::Started {
            database_id: database_id.to_string(),
            target_state: target.to_string(),
        },
    );
    debug!(
        "Waiting for database {} to reach {} (interval {:?}, deadline {:?})",
        database_id, target, config.interval, config.deadline
    );

    let timed_out = || CoreError::Timeout {
        target_state: target.to_string(),
        waited: config.deadline,
    };

    let mut attempts: u32 = 0;
    loop {
        tokio::select! {
            biased;

            _ = &mut cancel => {
                warn!("Wait for database {} cancelled", database_id);
                return Err(CoreError::Cancelled {
                    target_state: target.to_string(),
                });
            }

            scheduled = ticker.tick() => {
                // A tick delayed by a slow query may fire after the deadline
                if scheduled > deadline_at || Instant::now() > deadline_at {
                    return Err(timed_out());
                }

                attempts += 1;
                let status = api.get_status(database_id).await?;
                let elapsed = start.elapsed();

                if status.matches(target) {
                    emit(
                        &on_progress,
                        ProgressEvent::Converged {
                            database_id: database_id.to_string(),
                            status: status.clone(),
                            elapsed,
                        },
                    );
                    return Ok(PollReport {
                        state: status,
                        attempts,
                        elapsed,
                    });
                }

                debug!("Database {} status is {}", database_id, status);
                emit(
                    &on_progress,
                    ProgressEvent::Polling {
                        database_id: database_id.to_string(),
                        status,
                        attempt: attempts,
                        elapsed,
                    },
                );
            }

            _ = &mut deadline => {
                return Err(timed_out());
            }
        }
    }
}

/// Helper to emit progress events
fn emit(callback: &Option<ProgressCallback>, event: ProgressEvent) {
    if let Some(cb) = callback {
        cb(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedApi;
    use std::future::pending;
    use std::sync::{Arc, Mutex};

    fn config(target: &str, interval_secs: u64, deadline_secs: u64) -> PollConfig {
        PollConfig::new(
            Some(target.to_string()),
            Duration::from_secs(interval_secs),
            Duration::from_secs(deadline_secs),
        )
        .unwrap()
    }

    #[test]
    fn test_poll_config_validation() {
        assert!(PollConfig::new(None, Duration::ZERO, Duration::from_secs(1)).is_err());
        assert!(PollConfig::new(None, Duration::from_secs(1), Duration::ZERO).is_err());

        let cfg = PollConfig::new(Some(String::new()), Duration::from_secs(1), Duration::from_secs(1))
            .unwrap();
        assert_eq!(cfg.target_state(), None);

        let defaults = PollConfig::default();
        assert_eq!(defaults.interval(), Duration::from_secs(30));
        assert_eq!(defaults.deadline(), Duration::from_secs(3600));
    }

    #[test]
    fn test_poll_config_rejects_oversized_durations() {
        let huge = Duration::from_secs(u64::MAX);
        let one = Duration::from_secs(1);

        let err = PollConfig::new(Some("AVAILABLE".to_string()), one, huge).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(PollConfig::new(Some("AVAILABLE".to_string()), huge, one).is_err());
        assert!(PollConfig::new(Some("AVAILABLE".to_string()), one, MAX_WAIT).is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_longest_accepted_wait_does_not_overflow() {
        let api = ScriptedApi::new(["PROVISIONING", "AVAILABLE"]);
        let cfg = PollConfig::new(Some("AVAILABLE".to_string()), Duration::from_secs(60), MAX_WAIT)
            .unwrap();

        let report = wait_for_state(&api, "db1", &cfg, pending::<()>(), None)
            .await
            .unwrap();

        assert_eq!(report.attempts, 2);
        assert_eq!(report.elapsed, Duration::from_secs(120));
    }

    #[tokio::test(start_paused = true)]
    async fn test_converges_on_first_tick() {
        let api = ScriptedApi::new(["AVAILABLE"]);

        let report = wait_for_state(&api, "db1", &config("AVAILABLE", 30, 3600), pending::<()>(), None)
            .await
            .unwrap();

        assert_eq!(report.attempts, 1);
        assert_eq!(report.state.as_str(), "AVAILABLE");
        assert_eq!(report.elapsed, Duration::from_secs(30));
        assert_eq!(api.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_converges_after_several_ticks() {
        let api = ScriptedApi::new(["PROVISIONING", "PROVISIONING", "AVAILABLE"]);

        let report = wait_for_state(&api, "db1", &config("AVAILABLE", 10, 600), pending::<()>(), None)
            .await
            .unwrap();

        assert_eq!(report.attempts, 3);
        assert_eq!(report.elapsed, Duration::from_secs(30));
        assert_eq!(api.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queries_are_interval_spaced() {
        let api = ScriptedApi::new(["PROVISIONING", "PROVISIONING", "PROVISIONING", "AVAILABLE"]);
        let start = Instant::now();

        wait_for_state(&api, "db1", &config("AVAILABLE", 5, 600), pending::<()>(), None)
            .await
            .unwrap();

        let offsets: Vec<Duration> = api
            .status_call_times()
            .into_iter()
            .map(|t| t - start)
            .collect();
        assert_eq!(
            offsets,
            vec![
                Duration::from_secs(5),
                Duration::from_secs(10),
                Duration::from_secs(15),
                Duration::from_secs(20),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_never_reached() {
        let api = ScriptedApi::new(["PROVISIONING"]);

        let err = wait_for_state(&api, "db1", &config("AVAILABLE", 1, 3), pending::<()>(), None)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert!(err.to_string().contains("AVAILABLE"));
        assert_eq!(api.status_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_fires_between_ticks() {
        let api = ScriptedApi::new(["PROVISIONING"]);
        let start = Instant::now();

        let err = wait_for_state(&api, "db1", &config("AVAILABLE", 2, 5), pending::<()>(), None)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(api.status_calls(), 2);
        assert_eq!(start.elapsed(), Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_shorter_than_interval_never_queries() {
        let api = ScriptedApi::new(["AVAILABLE"]);

        let err = wait_for_state(&api, "db1", &config("AVAILABLE", 30, 10), pending::<()>(), None)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(api.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_count_bounded_by_deadline_over_interval() {
        for (interval, deadline) in [(1, 3), (2, 5), (3, 3), (4, 15), (7, 20), (10, 9)] {
            let api = ScriptedApi::new(["PROVISIONING"]);

            let err = wait_for_state(
                &api,
                "db1",
                &config("AVAILABLE", interval, deadline),
                pending::<()>(),
                None,
            )
            .await
            .unwrap_err();

            assert!(err.is_timeout());
            let bound = deadline.div_ceil(interval) as usize;
            assert!(
                api.status_calls() <= bound,
                "interval={interval} deadline={deadline}: {} calls > {bound}",
                api.status_calls()
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_straddling_deadline_counts_as_success() {
        let api = ScriptedApi::new(["PROVISIONING", "PROVISIONING", "AVAILABLE"])
            .with_latency(Duration::from_millis(500));
        let start = Instant::now();

        let report = wait_for_state(&api, "db1", &config("AVAILABLE", 1, 3), pending::<()>(), None)
            .await
            .unwrap();

        assert_eq!(report.attempts, 3);
        assert!(start.elapsed() > Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_tick_after_deadline_does_not_query() {
        // First query runs 1s..3.2s, so the next tick is only taken after the deadline
        let api = ScriptedApi::new(["PROVISIONING", "AVAILABLE"])
            .with_latency(Duration::from_millis(2200));

        let err = wait_for_state(&api, "db1", &config("AVAILABLE", 1, 3), pending::<()>(), None)
            .await
            .unwrap_err();

        assert!(err.is_timeout());
        assert_eq!(api.status_calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_error_stops_polling() {
        let api = ScriptedApi::new(["PROVISIONING", "AVAILABLE"]).fail_on_call(2, 500);

        let err = wait_for_state(&api, "db1", &config("AVAILABLE", 1, 60), pending::<()>(), None)
            .await
            .unwrap_err();

        assert!(err.is_server_error());
        assert_eq!(api.status_calls(), 2);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(api.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation() {
        let api = ScriptedApi::new(["PROVISIONING"]);
        let cancel = tokio::time::sleep(Duration::from_secs(25));

        let err = wait_for_state(&api, "db1", &config("AVAILABLE", 10, 600), cancel, None)
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(api.status_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requires_target_state() {
        let api = ScriptedApi::new(["AVAILABLE"]);
        let cfg = PollConfig::new(None, Duration::from_secs(1), Duration::from_secs(5)).unwrap();

        let err = wait_for_state(&api, "db1", &cfg, pending::<()>(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Validation(_)));
        assert_eq!(api.status_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_events() {
        let api = ScriptedApi::new(["PROVISIONING", "AVAILABLE"]);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let callback: ProgressCallback = Box::new(move |event| {
            let label = match event {
                ProgressEvent::Started { target_state, .. } => format!("started:{target_state}"),
                ProgressEvent::Polling { status, attempt, .. } => format!("polling:{status}:{attempt}"),
                ProgressEvent::Converged { status, .. } => format!("converged:{status}"),
            };
            sink.lock().unwrap().push(label);
        });

        wait_for_state(&api, "db1", &config("AVAILABLE", 1, 60), pending::<()>(), Some(callback))
            .await
            .unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "started:AVAILABLE".to_string(),
                "polling:PROVISIONING:1".to_string(),
                "converged:AVAILABLE".to_string(),
            ]
        );
    }
}
