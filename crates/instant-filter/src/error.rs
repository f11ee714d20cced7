//! Error types for the filter compiler.
//!
//! [`FilterError::OperatorNotFound`] and [`FilterError::ValueInvalid`] are
//! client-input errors: the HTTP layer should surface them to the caller as
//! they are, using [`FilterError::to_body`] for a structured response.

use serde::Serialize;
use thiserror::Error;

use crate::value::RawValue;

/// Errors that can occur when compiling a filter set.
#[derive(Debug, Error)]
pub enum FilterError {
    /// Operator suffix is not registered.
    #[error("invalid filter operator: '{operator}'. Allowed: {}", .allowed.join(", "))]
    OperatorNotFound {
        operator: String,
        allowed: Vec<String>,
    },

    /// A value failed the coercion its operator requires.
    #[error("invalid filter value: {field}={value}. Reason: {reason}")]
    ValueInvalid {
        field: String,
        value: RawValue,
        #[source]
        reason: CoercionError,
    },

    /// Operator alias table or identity field list is malformed.
    #[error("invalid filter configuration: {0}")]
    Config(String),
}

/// Reasons a raw value cannot be coerced for an operator.
#[derive(Debug, Error)]
pub enum CoercionError {
    /// Value is outside the boolean vocabulary.
    #[error("'{0}' is not a valid boolean value")]
    InvalidBooleanValue(String),

    /// Value does not compile as a regular expression.
    #[error("invalid regex pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A repeated key was given to an operator that takes one value.
    #[error("operator '{operator}' accepts a single value, got a list")]
    ExpectedScalar { operator: &'static str },
}

/// Structured, serializable view of a [`FilterError`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorBody {
    pub kind: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<RawValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl FilterError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Returns `true` if the error was caused by the request, not the server.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, FilterError::Config(_))
    }

    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            FilterError::OperatorNotFound { .. } => "FilterOperatorNotFound",
            FilterError::ValueInvalid { .. } => "FilterValueInvalid",
            FilterError::Config(_) => "FilterConfig",
        }
    }

    /// Builds the structured body the HTTP layer sends back.
    pub fn to_body(&self) -> ErrorBody {
        let mut body = ErrorBody {
            kind: self.kind(),
            message: self.to_string(),
            operator: None,
            allowed: None,
            field: None,
            value: None,
            reason: None,
        };

        match self {
            FilterError::OperatorNotFound { operator, allowed } => {
                body.operator = Some(operator.clone());
                body.allowed = Some(allowed.clone());
            }
            FilterError::ValueInvalid {
                field,
                value,
                reason,
            } => {
                body.field = Some(field.clone());
                body.value = Some(value.clone());
                body.reason = Some(reason.to_string());
            }
            FilterError::Config(_) => {}
        }

        body
    }
}

/// Result type for filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
