//! Creation parameters and their wire representation
//!
//! [`CreationSpec`] is what the caller asks for. [`CreateDatabaseRequest`] is
//! what goes over the wire. The conversion between the two applies the
//! defaults and the omission rule: optional values that are empty never reach
//! the request body.

use secrecy::SecretString;
use serde::{Serialize, Serializer};
use std::fmt;

use crate::error::{CoreError, Result};

/// Default database character set
pub const DEFAULT_CHARACTER_SET: &str = "AL32UTF8";
/// Default national character set
pub const DEFAULT_NATIONAL_CHARACTER_SET: &str = "AL16UTF16";

/// Database workload profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum WorkloadType {
    #[default]
    #[serde(rename = "OLTP")]
    Oltp,
    #[serde(rename = "DSS")]
    Dss,
}

impl WorkloadType {
    /// Normalize caller input
    ///
    /// Only the exact literal `OLTP` selects OLTP. Everything else, including
    /// lowercase `oltp` and the empty string, selects DSS.
    #[must_use]
    pub fn from_input(value: &str) -> Self {
        if value == "OLTP" {
            WorkloadType::Oltp
        } else {
            WorkloadType::Dss
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadType::Oltp => "OLTP",
            WorkloadType::Dss => "DSS",
        }
    }
}

impl fmt::Display for WorkloadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters for creating a database
///
/// Built once from caller input. Secrets are held as [`SecretString`] so
/// neither `Debug` nor [`Serialize`] reveal them; serialization prints a
/// redaction marker instead, which is what dry-run output relies on.
///
/// # Example
///
/// ```rust
/// use dbctl_core::database::{CreationSpec, WorkloadType};
///
/// let spec = CreationSpec::new("orcl", "ocid1.dbhome.oc1..aaaa", "Welcome#1234")
///     .with_workload("DSS")
///     .with_pdb_name("pdb1");
///
/// assert_eq!(spec.workload_type, WorkloadType::Dss);
/// assert!(spec.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreationSpec {
    /// Database name (required)
    pub name: String,
    pub workload_type: WorkloadType,
    /// Parent database home id (required)
    pub home_id: String,
    #[serde(serialize_with = "redact")]
    pub admin_credential: SecretString,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    pub character_set: String,
    pub national_character_set: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pluggable_database_name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "redact_optional"
    )]
    pub encryption_wallet_credential: Option<SecretString>,
}

impl CreationSpec {
    /// Create a spec with the required fields and defaults for the rest
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        home_id: impl Into<String>,
        admin_credential: impl Into<String>,
    ) -> Self {
        let admin_credential: String = admin_credential.into();
        Self {
            name: name.into(),
            workload_type: WorkloadType::default(),
            home_id: home_id.into(),
            admin_credential: SecretString::new(admin_credential.into()),
            unique_name: None,
            character_set: DEFAULT_CHARACTER_SET.to_string(),
            national_character_set: DEFAULT_NATIONAL_CHARACTER_SET.to_string(),
            pluggable_database_name: None,
            encryption_wallet_credential: None,
        }
    }

    /// Set workload from raw input (see [`WorkloadType::from_input`])
    #[must_use]
    pub fn with_workload(mut self, workload: &str) -> Self {
        self.workload_type = WorkloadType::from_input(workload);
        self
    }

    /// Set the unique name; empty input leaves it unset
    #[must_use]
    pub fn with_unique_name(mut self, unique_name: impl Into<String>) -> Self {
        self.unique_name = non_empty(unique_name.into());
        self
    }

    /// Set the character set
    #[must_use]
    pub fn with_character_set(mut self, character_set: impl Into<String>) -> Self {
        self.character_set = character_set.into();
        self
    }

    /// Set the national character set
    #[must_use]
    pub fn with_national_character_set(mut self, character_set: impl Into<String>) -> Self {
        self.national_character_set = character_set.into();
        self
    }

    /// Set the pluggable database name; empty input leaves it unset
    #[must_use]
    pub fn with_pdb_name(mut self, pdb_name: impl Into<String>) -> Self {
        self.pluggable_database_name = non_empty(pdb_name.into());
        self
    }

    /// Set the TDE wallet password; empty input leaves it unset
    #[must_use]
    pub fn with_wallet_credential(mut self, credential: impl Into<String>) -> Self {
        self.encryption_wallet_credential =
            non_empty(credential.into()).map(|c| SecretString::new(c.into()));
        self
    }

    /// Reject specs that cannot be submitted
    pub fn validate(&self) -> Result<()> {
        use secrecy::ExposeSecret;

        if self.name.trim().is_empty() {
            return Err(CoreError::Validation(
                "database name must not be empty".to_string(),
            ));
        }
        if self.home_id.trim().is_empty() {
            return Err(CoreError::Validation(
                "database home id must not be empty".to_string(),
            ));
        }
        if self.admin_credential.expose_secret().is_empty() {
            return Err(CoreError::Validation(
                "admin password must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Convert to the wire request, copying only populated optional fields
    #[must_use]
    pub fn to_request(&self) -> CreateDatabaseRequest {
        CreateDatabaseRequest {
            db_home_id: self.home_id.clone(),
            source: "NONE",
            database: CreateDatabaseDetails {
                db_name: self.name.clone(),
                admin_password: self.admin_credential.clone(),
                db_workload: self.workload_type,
                character_set: self.character_set.clone(),
                ncharacter_set: self.national_character_set.clone(),
                db_unique_name: self.unique_name.clone().and_then(non_empty),
                pdb_name: self.pluggable_database_name.clone().and_then(non_empty),
                tde_wallet_password: self.encryption_wallet_credential.clone(),
            },
        }
    }
}

/// Body of `POST /databases`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseRequest {
    pub db_home_id: String,
    pub source: &'static str,
    pub database: CreateDatabaseDetails,
}

/// Nested `database` object of the create request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDatabaseDetails {
    pub db_name: String,
    #[serde(serialize_with = "expose")]
    pub admin_password: SecretString,
    pub db_workload: WorkloadType,
    pub character_set: String,
    pub ncharacter_set: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_unique_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdb_name: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "expose_optional"
    )]
    pub tde_wallet_password: Option<SecretString>,
}

const REDACTED: &str = "********";

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn expose<S: Serializer>(
    secret: &SecretString,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    use secrecy::ExposeSecret;
    serializer.serialize_str(secret.expose_secret())
}

fn expose_optional<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match secret {
        Some(s) => expose(s, serializer),
        None => serializer.serialize_none(),
    }
}

fn redact<S: Serializer>(_: &SecretString, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(REDACTED)
}

fn redact_optional<S: Serializer>(
    secret: &Option<SecretString>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match secret {
        Some(s) => redact(s, serializer),
        None => serializer.serialize_none(),
    }
}
