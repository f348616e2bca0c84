//! Response types returned by the database API

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Opaque lifecycle status reported by the service
///
/// Values such as `PROVISIONING`, `AVAILABLE` or `FAILED` are not enumerated
/// here. The only thing the poller does with a state is compare it to the
/// caller's target string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LifecycleState(String);

impl LifecycleState {
    pub fn new(state: impl Into<String>) -> Self {
        Self(state.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Exact, case-sensitive comparison against a target state
    pub fn matches(&self, target: &str) -> bool {
        self.0 == target
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A database resource as described by the service
///
/// Only `id` is required. Known fields are typed; everything else the service
/// returns is kept in `extra` so printing the resource loses nothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_home_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compartment_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdb_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_workload: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub character_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ncharacter_set: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_state: Option<LifecycleState>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifecycle_details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_created: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Database {
    /// Minimal resource with just an id and a state
    pub fn new(id: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            db_name: None,
            db_unique_name: None,
            db_home_id: None,
            compartment_id: None,
            pdb_name: None,
            db_workload: None,
            character_set: None,
            ncharacter_set: None,
            lifecycle_state: Some(LifecycleState::new(state)),
            lifecycle_details: None,
            time_created: None,
            extra: Map::new(),
        }
    }
}

/// Error body returned by the service on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_database_keeps_unknown_fields() {
        let body = json!({
            "id": "ocid1.database.oc1..aaaa",
            "dbName": "orcl",
            "lifecycleState": "PROVISIONING",
            "isCdb": true,
            "connectionStrings": {"cdbDefault": "host:1521/orcl"}
        });

        let db: Database = serde_json::from_value(body).unwrap();
        assert_eq!(db.id, "ocid1.database.oc1..aaaa");
        assert_eq!(db.db_name.as_deref(), Some("orcl"));
        assert_eq!(
            db.lifecycle_state.as_ref().map(LifecycleState::as_str),
            Some("PROVISIONING")
        );
        assert_eq!(db.extra["isCdb"], true);

        let round = serde_json::to_value(&db).unwrap();
        assert_eq!(round["connectionStrings"]["cdbDefault"], "host:1521/orcl");
        assert!(round.get("pdbName").is_none());
    }

    #[test]
    fn test_lifecycle_state_matches_exactly() {
        let state = LifecycleState::new("AVAILABLE");
        assert!(state.matches("AVAILABLE"));
        assert!(!state.matches("available"));
        assert!(!state.matches(""));
        assert_eq!(state.to_string(), "AVAILABLE");
    }
}
