/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::Error as AnyhowError;
use sea_orm::DbErr;
use std::fmt;
use uuid::Uuid;

/// Outcome taxonomy shared by every store operation. The request layer maps
/// the kind to a transport status code; the core only guarantees a
/// distinguishable kind plus a readable message.
#[derive(Debug)]
pub enum CoreError {
    NotFound(String),
    Validation(String),
    InvalidTimeRange(String),
    OverlapConflict(String),
    CyclicParent(String),
    HasChildren(String),
    InUse(String),
    Unauthorized(String),
    Unauthenticated(String),
    /// Store or transaction failure. Safe to retry only for idempotent
    /// calls; creates carry no dedupe key.
    Store(DbErr),
    Internal(AnyhowError),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            CoreError::Validation(msg) => write!(f, "Validation error: {}", msg),
            CoreError::InvalidTimeRange(msg) => write!(f, "Invalid time range: {}", msg),
            CoreError::OverlapConflict(msg) => write!(f, "Overlap conflict: {}", msg),
            CoreError::CyclicParent(msg) => write!(f, "Cyclic parent: {}", msg),
            CoreError::HasChildren(msg) => write!(f, "Has children: {}", msg),
            CoreError::InUse(msg) => write!(f, "In use: {}", msg),
            CoreError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            CoreError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            CoreError::Store(err) => write!(f, "Store error: {}", err),
            CoreError::Internal(err) => write!(f, "Internal error: {}", err),
        }
    }
}

impl std::error::Error for CoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoreError::Store(err) => Some(err),
            CoreError::Internal(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<DbErr> for CoreError {
    fn from(err: DbErr) -> Self {
        CoreError::Store(err)
    }
}

impl From<AnyhowError> for CoreError {
    fn from(err: AnyhowError) -> Self {
        CoreError::Internal(err)
    }
}

impl CoreError {
    /// Stable machine-readable kind, for logs and transport mapping.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "not_found",
            CoreError::Validation(_) => "validation",
            CoreError::InvalidTimeRange(_) => "invalid_time_range",
            CoreError::OverlapConflict(_) => "overlap_conflict",
            CoreError::CyclicParent(_) => "cyclic_parent",
            CoreError::HasChildren(_) => "has_children",
            CoreError::InUse(_) => "in_use",
            CoreError::Unauthorized(_) => "unauthorized",
            CoreError::Unauthenticated(_) => "unauthenticated",
            CoreError::Store(_) => "store",
            CoreError::Internal(_) => "internal",
        }
    }

    pub fn not_found(entity: &str) -> Self {
        CoreError::NotFound(format!("{} not found", entity))
    }

    pub fn invalid_time_range() -> Self {
        CoreError::InvalidTimeRange("start time must be before end time".to_string())
    }

    pub fn overlap_conflict(conflicting: Uuid) -> Self {
        CoreError::OverlapConflict(format!(
            "the user already has an overlapping entry {}",
            conflicting
        ))
    }

    pub fn cyclic_parent() -> Self {
        CoreError::CyclicParent(
            "an organization cannot be moved under itself or one of its descendants".to_string(),
        )
    }

    pub fn has_children() -> Self {
        CoreError::HasChildren(
            "the organization still has child organizations".to_string(),
        )
    }

    pub fn in_use(entity: &str) -> Self {
        CoreError::InUse(format!("{} is referenced by schedule entries", entity))
    }

    pub fn unauthenticated() -> Self {
        CoreError::Unauthenticated("no verified user identity supplied".to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        assert_eq!(CoreError::not_found("Organization").kind(), "not_found");
        assert_eq!(CoreError::invalid_time_range().kind(), "invalid_time_range");
        assert_eq!(CoreError::cyclic_parent().kind(), "cyclic_parent");
        assert_eq!(CoreError::has_children().kind(), "has_children");
        assert_eq!(CoreError::in_use("Resource").kind(), "in_use");
    }

    #[test]
    fn display_carries_the_message() {
        let err = CoreError::not_found("Resource");
        assert_eq!(err.to_string(), "Not found: Resource not found");

        let err = CoreError::Validation("weekly template must have 7 entries".to_string());
        assert!(err.to_string().starts_with("Validation error:"));
    }

    #[test]
    fn store_errors_wrap_their_source() {
        let err: CoreError = DbErr::Custom("connection reset".to_string()).into();
        assert_eq!(err.kind(), "store");
        assert!(std::error::Error::source(&err).is_some());
    }
}
