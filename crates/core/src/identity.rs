//! Identity keys
//!
//! `GameId` is the primary key of every roster record (member, warning
//! ledger, ban). It is case-preserving: `Alpha` and `alpha` are different
//! players.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur when parsing identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("Empty game id")]
    EmptyGameId,

    #[error("Game id must not contain whitespace: {0:?}")]
    ContainsWhitespace(String),

    #[error("Game id must not contain control characters: {0:?}")]
    ControlCharacter(String),

    #[error("At least one game id is required")]
    EmptyBatch,

    #[error("Empty linked identity")]
    EmptyLinkedIdentity,
}

/// External game identifier
///
/// Surrounding whitespace is trimmed; anything else is kept verbatim.
///
/// # Examples
/// ```
/// use roster_core::GameId;
///
/// let id: GameId = "  Kaito_77 ".parse().unwrap();
/// assert_eq!(id.as_str(), "Kaito_77");
/// assert_ne!(id, "kaito_77".parse().unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GameId(String);

impl GameId {
    /// Validate and normalize a raw identifier
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityError> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(IdentityError::EmptyGameId);
        }
        if trimmed.chars().any(char::is_whitespace) {
            return Err(IdentityError::ContainsWhitespace(trimmed.to_string()));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(IdentityError::ControlCharacter(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GameId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for GameId {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> Self {
        id.0
    }
}

impl AsRef<str> for GameId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for GameId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Split a whitespace-separated batch into game ids
///
/// Duplicates are dropped (first occurrence wins) so a batch behaves as a set
/// while keeping the caller's order.
pub fn parse_batch(raw: &str) -> Result<Vec<GameId>, IdentityError> {
    let mut ids: Vec<GameId> = Vec::new();

    for token in raw.split_whitespace() {
        let id = GameId::new(token)?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }

    if ids.is_empty() {
        return Err(IdentityError::EmptyBatch);
    }

    Ok(ids)
}

/// User identifier on the external chat platform
///
/// Only used for role-sync and direct-message side effects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkedIdentity(String);

impl LinkedIdentity {
    pub fn new(raw: impl AsRef<str>) -> Result<Self, IdentityError> {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            return Err(IdentityError::EmptyLinkedIdentity);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LinkedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LinkedIdentity {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for LinkedIdentity {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<LinkedIdentity> for String {
    fn from(id: LinkedIdentity) -> Self {
        id.0
    }
}
