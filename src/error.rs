//! Error types for the CRUD-to-SQL translator.

use thiserror::Error;

/// The main error type for translation and dispatch failures.
///
/// Every variant carries the wire-stable taxonomy code returned by [`CrudError::code`];
/// that code, not the `Display` text, is what callers should match on.
#[derive(Debug, Error)]
pub enum CrudError {
    /// Unparseable payload, or a message type the dispatcher has no builder for.
    #[error("bad message: {0}")]
    BadMessage(String),

    /// Wrong projection shape for an Insert.
    #[error("bad projection: {0}")]
    BadProjection(String),

    /// Insert row length does not match the projection size.
    #[error("bad insert data: {0}")]
    BadInsertData(String),

    /// Empty operation list, or a value supplied where none is allowed.
    #[error("bad update data: {0}")]
    BadUpdateData(String),

    /// Forbidden or malformed column reference in an update operation.
    #[error("bad column to update: {0}")]
    BadColumnToUpdate(String),

    /// Missing or malformed document_path in a document update operation.
    #[error("bad member to update: {0}")]
    BadMemberToUpdate(String),

    /// Operation code not valid for the statement's data model.
    #[error("bad type of update: {0}")]
    BadTypeOfUpdate(String),

    /// Placeholder index out of range, empty object key, and similar value errors.
    #[error("bad expression value: {0}")]
    ExprBadValue(String),

    /// Unknown scalar, octet content-type, or document-path variant.
    #[error("bad expression type value: {0}")]
    ExprBadTypeValue(String),

    /// A qualified reference is missing a required part (e.g. schema without table).
    #[error("missing expression argument: {0}")]
    ExprMissingArg(String),

    /// The downstream session failed to execute the generated SQL.
    #[error("execution error: {0}")]
    Execution(String),

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error (config loading, fixtures).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrudError {
    /// The stable wire taxonomy code for this error kind.
    ///
    /// These strings travel verbatim in the protocol's Error frame and must never change
    /// shape once a client depends on them.
    pub fn code(&self) -> &'static str {
        match self {
            CrudError::BadMessage(_) => "ER_X_BAD_MESSAGE",
            CrudError::BadProjection(_) => "ER_X_BAD_PROJECTION",
            CrudError::BadInsertData(_) => "ER_X_BAD_INSERT_DATA",
            CrudError::BadUpdateData(_) => "ER_X_BAD_UPDATE_DATA",
            CrudError::BadColumnToUpdate(_) => "ER_X_BAD_COLUMN_TO_UPDATE",
            CrudError::BadMemberToUpdate(_) => "ER_X_BAD_MEMBER_TO_UPDATE",
            CrudError::BadTypeOfUpdate(_) => "ER_X_BAD_TYPE_OF_UPDATE",
            CrudError::ExprBadValue(_) => "ER_X_EXPR_BAD_VALUE",
            CrudError::ExprBadTypeValue(_) => "ER_X_EXPR_BAD_TYPE_VALUE",
            CrudError::ExprMissingArg(_) => "ER_X_EXPR_MISSING_ARG",
            CrudError::Execution(_) => "ER_X_EXECUTION",
            CrudError::Config(_) => "ER_X_CONFIG",
            CrudError::Io(_) => "ER_X_IO",
        }
    }
}

/// Result type alias for translation and dispatch operations.
pub type CrudResult<T> = Result<T, CrudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CrudError::ExprBadValue("placeholder 1 out of range".into());
        assert_eq!(err.to_string(), "bad expression value: placeholder 1 out of range");
    }

    #[test]
    fn test_error_code() {
        let err = CrudError::BadColumnToUpdate("Forbidden update operation on '$._id' member".into());
        assert_eq!(err.code(), "ER_X_BAD_COLUMN_TO_UPDATE");
    }
}
