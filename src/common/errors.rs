use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::{DbErr, SqlErr};
use serde_json::json;
use std::fmt;
use uuid::Uuid;

/// Errors surfaced by the storage core to its callers
#[derive(Debug, Clone, PartialEq)]
pub enum BusinessError {
    /// Malformed input or a step selection outside its choice set (400 Bad Request)
    ValidationError { field: String, message: String },
    /// Referenced resource does not exist (404 Not Found)
    NotFound { resource: String, id: String },
    /// Target slot already holds a different sample (409 Conflict)
    PositionConflict {
        sample_id: String,
        box_id: Uuid,
        slot: String,
        occupied_by: Option<String>,
    },
    /// Uniqueness violation other than a slot clash (409 Conflict)
    Duplicate { resource: String, field: String },
    /// Generic application error (500 Internal Server Error)
    InternalError { message: String },
}

impl fmt::Display for BusinessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BusinessError::ValidationError { field, message } => {
                write!(f, "Validation error in field '{field}': {message}")
            }
            BusinessError::NotFound { resource, id } => {
                write!(f, "{resource} with id '{id}' not found")
            }
            BusinessError::PositionConflict {
                sample_id,
                box_id,
                slot,
                occupied_by,
            } => match occupied_by {
                Some(other) => write!(
                    f,
                    "Cannot place sample '{sample_id}' at {slot} in box '{box_id}': occupied by '{other}'"
                ),
                None => write!(
                    f,
                    "Cannot place sample '{sample_id}' at {slot} in box '{box_id}': slot is occupied"
                ),
            },
            BusinessError::Duplicate { resource, field } => {
                write!(f, "{resource} with this {field} already exists")
            }
            BusinessError::InternalError { message } => {
                write!(f, "Internal error: {message}")
            }
        }
    }
}

impl std::error::Error for BusinessError {}

impl BusinessError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            BusinessError::ValidationError { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            BusinessError::NotFound { .. } => (StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
            BusinessError::PositionConflict { .. } => (StatusCode::CONFLICT, "POSITION_CONFLICT"),
            BusinessError::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE_RESOURCE"),
            BusinessError::InternalError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }

    /// Convert back into a `DbErr` for crudcrate hooks, which must return one
    pub fn into_db_err(self) -> DbErr {
        match self {
            BusinessError::ValidationError { field, message } => {
                DbErr::Custom(format!("Validation failed: {field} {message}"))
            }
            BusinessError::NotFound { resource, id } => {
                DbErr::RecordNotFound(format!("{resource} with id '{id}' not found"))
            }
            other => DbErr::Custom(other.to_string()),
        }
    }
}

impl IntoResponse for BusinessError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();
        let mut error = json!({
            "code": error_code,
            "message": self.to_string(),
            "type": format!("{self:?}").split([' ', '{']).next().unwrap_or("Unknown"),
        });
        if let BusinessError::PositionConflict {
            sample_id,
            occupied_by,
            ..
        } = &self
        {
            error["sample_id"] = json!(sample_id);
            error["occupied_by"] = json!(occupied_by);
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<DbErr> for BusinessError {
    fn from(err: DbErr) -> Self {
        ErrorMapper::map_db_error(err, "storage")
    }
}

/// Translates storage-layer errors into business errors
pub struct ErrorMapper;

impl ErrorMapper {
    pub fn map_db_error(err: DbErr, context: &str) -> BusinessError {
        if let Some(SqlErr::UniqueConstraintViolation(detail)) = err.sql_err() {
            return BusinessError::Duplicate {
                resource: Self::resource_from_context(context),
                field: Self::field_from_constraint(&detail),
            };
        }

        match err {
            DbErr::RecordNotFound(msg) => BusinessError::NotFound {
                resource: Self::resource_from_context(context),
                id: Self::id_from_message(&msg),
            },
            DbErr::Custom(msg) => {
                if let Some(rest) = msg.strip_prefix("Validation failed:") {
                    let rest = rest.trim();
                    let field = rest.split_whitespace().next().unwrap_or("unknown");
                    BusinessError::ValidationError {
                        field: field.to_string(),
                        message: rest.to_string(),
                    }
                } else {
                    BusinessError::InternalError { message: msg }
                }
            }
            other => BusinessError::InternalError {
                message: other.to_string(),
            },
        }
    }

    fn resource_from_context(context: &str) -> String {
        context.replace('_', " ")
    }

    /// Pull an identifier out of messages like "Sample with id 'S-001' not found"
    fn id_from_message(msg: &str) -> String {
        msg.find(" id '")
            .map(|start| &msg[start + 5..])
            .and_then(|rest| rest.find('\'').map(|end| rest[..end].to_string()))
            .unwrap_or_else(|| "unknown".to_string())
    }

    fn field_from_constraint(detail: &str) -> String {
        if detail.contains("sample_id") {
            "sample_id".to_string()
        } else if detail.contains("name") {
            "name".to_string()
        } else {
            "field".to_string()
        }
    }
}

#[macro_export]
macro_rules! validation_error {
    ($field:expr, $message:expr) => {
        $crate::common::errors::BusinessError::ValidationError {
            field: $field.to_string(),
            message: $message.to_string(),
        }
    };
}

#[macro_export]
macro_rules! not_found {
    ($resource:expr, $id:expr) => {
        $crate::common::errors::BusinessError::NotFound {
            resource: $resource.to_string(),
            id: $id.to_string(),
        }
    };
}

pub type BusinessResult<T> = Result<T, BusinessError>;
