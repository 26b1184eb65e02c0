//! Token claims and subscription plans.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use error::AuthError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Claim holding the student identifier. Every issued token carries it.
pub const STUDENT_ID: &str = "student_id";
pub const EMAIL: &str = "email";
pub const NAME: &str = "name";
pub const PLAN: &str = "plan";
/// Issued at (Unix timestamp)
pub const ISSUED_AT: &str = "iat";
/// Expiration time (Unix timestamp). Reserved; tokens without it never expire.
pub const EXPIRES_AT: &str = "exp";

/// Subscription plan tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Associates,
    Bachelors,
    Masters,
    Doctorate,
}

impl Default for Plan {
    fn default() -> Self {
        Self::Associates
    }
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Associates => "associates",
            Plan::Bachelors => "bachelors",
            Plan::Masters => "masters",
            Plan::Doctorate => "doctorate",
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("unknown plan: {0}")]
pub struct UnknownPlan(String);

impl FromStr for Plan {
    type Err = UnknownPlan;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "associates" => Ok(Plan::Associates),
            "bachelors" => Ok(Plan::Bachelors),
            "masters" => Ok(Plan::Masters),
            "doctorate" => Ok(Plan::Doctorate),
            other => Err(UnknownPlan(other.to_string())),
        }
    }
}

/// Flat, ordered claim set carried by a token.
///
/// Keys are kept sorted so serialization is deterministic. Values must be
/// scalars (string, number, bool or null).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(BTreeMap<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the standard claim set for a signed-in student.
    pub fn for_student(
        student_id: impl Into<String>,
        email: impl Into<String>,
        name: impl Into<String>,
        plan: Plan,
    ) -> Self {
        Self::new()
            .with(STUDENT_ID, student_id.into())
            .with(EMAIL, email.into())
            .with(NAME, name.into())
            .with(PLAN, plan.as_str())
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn student_id(&self) -> Option<&str> {
        self.get_str(STUDENT_ID).filter(|s| !s.is_empty())
    }

    pub fn email(&self) -> Option<&str> {
        self.get_str(EMAIL)
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str(NAME)
    }

    /// Plan claim, falling back to the default tier when absent or unknown.
    pub fn plan(&self) -> Plan {
        self.get_str(PLAN)
            .and_then(|p| p.parse().ok())
            .unwrap_or_default()
    }

    pub fn expires_at(&self) -> Option<i64> {
        self.0.get(EXPIRES_AT).and_then(Value::as_i64)
    }

    /// A token without `exp` never expires.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at().is_some_and(|exp| now > exp)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check the claim set is signable: identity present, values flat.
    pub(crate) fn validate(&self) -> Result<(), AuthError> {
        if self.student_id().is_none() {
            return Err(AuthError::MissingIdentity);
        }
        if let Some((key, _)) = self
            .0
            .iter()
            .find(|(_, v)| v.is_array() || v.is_object())
        {
            tracing::error!("Claim '{}' is not a scalar value", key);
            return Err(AuthError::TokenCreationFailed);
        }
        if let Some(key) = self.malformed_time_claim() {
            tracing::error!("Claim '{}' must be an integer timestamp", key);
            return Err(AuthError::TokenCreationFailed);
        }
        Ok(())
    }

    /// First of `iat`/`exp` present with a value other than an `i64`.
    pub(crate) fn malformed_time_claim(&self) -> Option<&'static str> {
        [ISSUED_AT, EXPIRES_AT]
            .into_iter()
            .find(|key| self.0.get(*key).is_some_and(|v| v.as_i64().is_none()))
    }
}
