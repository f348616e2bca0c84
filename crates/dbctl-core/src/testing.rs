//! In-memory [`DatabaseApi`] for tests
//!
//! Available in this crate's tests and to other crates through the
//! `test-support` feature.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::database::{CreationSpec, Database, DatabaseApi, LifecycleState};
use crate::error::{CoreError, Result};

/// Database id handed out by [`ScriptedApi::create`]
pub const SCRIPTED_DATABASE_ID: &str = "ocid1.database.oc1..scripted";

/// A fake API that replays a fixed sequence of lifecycle states
///
/// Each status query consumes the next scripted state; once the script is
/// exhausted the last state repeats. Calls are recorded with their (tokio)
/// timestamps so tests can check spacing under paused time.
#[derive(Debug)]
pub struct ScriptedApi {
    states: Mutex<VecDeque<String>>,
    last: Mutex<Option<String>>,
    fail_on: Option<(usize, u16)>,
    create_failure: Option<u16>,
    latency: Duration,
    status_calls: Mutex<Vec<Instant>>,
    created: Mutex<Vec<CreationSpec>>,
}

impl ScriptedApi {
    pub fn new<I, S>(states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            states: Mutex::new(states.into_iter().map(Into::into).collect()),
            last: Mutex::new(None),
            fail_on: None,
            create_failure: None,
            latency: Duration::ZERO,
            status_calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    /// Make the `call`-th status query (1-based) fail with an API error
    #[must_use]
    pub fn fail_on_call(mut self, call: usize, status: u16) -> Self {
        self.fail_on = Some((call, status));
        self
    }

    /// Make `create` fail with an API error
    #[must_use]
    pub fn fail_create(mut self, status: u16) -> Self {
        self.create_failure = Some(status);
        self
    }

    /// Delay every status response by `latency`
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    pub fn status_call_times(&self) -> Vec<Instant> {
        self.status_calls
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Specs passed to `create`, in call order
    pub fn created_specs(&self) -> Vec<CreationSpec> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn next_state(&self) -> String {
        let next = self.states.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(state) = next {
            *last = Some(state);
        }
        last.clone().unwrap_or_default()
    }
}

#[async_trait]
impl DatabaseApi for ScriptedApi {
    async fn create(&self, spec: &CreationSpec) -> Result<Database> {
        if let Ok(mut created) = self.created.lock() {
            created.push(spec.clone());
        }
        if let Some(status) = self.create_failure {
            return Err(CoreError::Api {
                status,
                message: "scripted create failure".to_string(),
            });
        }

        let mut db = Database::new(SCRIPTED_DATABASE_ID, "PROVISIONING");
        db.db_name = Some(spec.name.clone());
        db.db_home_id = Some(spec.home_id.clone());
        Ok(db)
    }

    async fn get_status(&self, _database_id: &str) -> Result<LifecycleState> {
        let call = {
            let mut calls = self.status_calls.lock().unwrap_or_else(|e| e.into_inner());
            calls.push(Instant::now());
            calls.len()
        };

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let state = self.next_state();
        if let Some((fail_call, status)) = self.fail_on
            && fail_call == call
        {
            return Err(CoreError::Api {
                status,
                message: "scripted status failure".to_string(),
            });
        }
        Ok(LifecycleState::new(state))
    }
}
