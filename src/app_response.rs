use std::fmt::{Display, Formatter};

use lmdb::Error as LmdbError;
use serde::{Deserialize, Serialize};
use serde_json::Error as SerdeError;

/// Outcome envelope shared by the service layer and the FFI surface.
///
/// Every fallible call in the crate returns `Result<_, AppResponse>`; the FFI
/// functions serialize either branch back to the host as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppResponse {
    DatabaseError(String),
    SerializationError(String),
    NotFound(String),
    ValidationError(String),
    BadRequest(String),
    Ok(String),
}

impl Display for AppResponse {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AppResponse::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppResponse::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            AppResponse::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppResponse::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            AppResponse::BadRequest(msg) => write!(f, "Bad Request: {}", msg),
            AppResponse::Ok(msg) => write!(f, "Ok: {}", msg),
        }
    }
}

impl std::error::Error for AppResponse {}

impl From<LmdbError> for AppResponse {
    fn from(err: LmdbError) -> Self {
        match err {
            LmdbError::NotFound => AppResponse::NotFound("Key not found".to_string()),
            LmdbError::MapFull => {
                AppResponse::DatabaseError("Storage map is full; raise map_size".to_string())
            }
            LmdbError::Corrupted => {
                AppResponse::DatabaseError("Database is corrupted".to_string())
            }
            other => AppResponse::DatabaseError(format!("LMDB error: {}", other)),
        }
    }
}

impl From<SerdeError> for AppResponse {
    fn from(err: SerdeError) -> Self {
        AppResponse::SerializationError(format!("JSON serialization error: {}", err))
    }
}

impl From<std::io::Error> for AppResponse {
    fn from(err: std::io::Error) -> Self {
        AppResponse::DatabaseError(format!("IO error: {}", err))
    }
}

impl AppResponse {
    pub fn success(msg: impl Into<String>) -> Self {
        AppResponse::Ok(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lmdb_not_found_maps_to_not_found() {
        let response = AppResponse::from(LmdbError::NotFound);
        assert!(matches!(response, AppResponse::NotFound(_)));
    }

    #[test]
    fn serde_failure_maps_to_serialization_error() {
        let err = serde_json::from_str::<Vec<String>>("{not json").unwrap_err();
        let response = AppResponse::from(err);
        assert!(response.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn serializes_as_externally_tagged_json() {
        let json = serde_json::to_string(&AppResponse::success("done")).unwrap();
        assert_eq!(json, r#"{"Ok":"done"}"#);
    }
}
