use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("{field} {value} is not supported. Use one of {}", allowed.join(" "))]
    InvalidEnumValue {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("Invalid value for {field}: expected {expected}, got {value}")]
    InvalidType {
        field: String,
        expected: &'static str,
        value: String,
    },

    #[error("Could not find attribute: {0}")]
    AttributeNotFound(String),

    #[error("Unknown method: {0}")]
    UnknownMethod(String),

    #[error("Table {0} must have at least one column family")]
    NoColumnFamilyDefined(String),

    #[error("Table not found: {0}")]
    TableNotFound(String),

    #[error("Table already exists: {0}")]
    TableExists(String),

    #[error("Namespace not found: {0}")]
    NamespaceNotFound(String),

    #[error("Namespace already exists: {0}")]
    NamespaceExists(String),

    #[error("Admin error: {0}")]
    Admin(String),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Get the error type as a string for metrics labeling
    pub fn error_type(&self) -> &'static str {
        match self {
            Error::InvalidArgument(_) => "invalid_argument",
            Error::MissingRequiredField(_) => "missing_required_field",
            Error::InvalidEnumValue { .. } => "invalid_enum_value",
            Error::InvalidType { .. } => "invalid_type",
            Error::AttributeNotFound(_) => "attribute_not_found",
            Error::UnknownMethod(_) => "unknown_method",
            Error::NoColumnFamilyDefined(_) => "no_column_family",
            Error::TableNotFound(_) => "table_not_found",
            Error::TableExists(_) => "table_exists",
            Error::NamespaceNotFound(_) => "namespace_not_found",
            Error::NamespaceExists(_) => "namespace_exists",
            Error::Admin(_) => "admin",
            Error::Crypto(_) => "crypto",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Yaml(_) => "yaml",
            Error::Json(_) => "json",
        }
    }

    /// Whether the error was raised while validating input, before any
    /// request reached the admin service.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_)
                | Error::MissingRequiredField(_)
                | Error::InvalidEnumValue { .. }
                | Error::InvalidType { .. }
                | Error::AttributeNotFound(_)
                | Error::UnknownMethod(_)
                | Error::NoColumnFamilyDefined(_)
        )
    }

    pub(crate) fn invalid_enum(field: &str, value: impl Into<String>, allowed: &[&str]) -> Self {
        Error::InvalidEnumValue {
            field: field.to_string(),
            value: value.into(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub(crate) fn invalid_type(
        field: &str,
        expected: &'static str,
        value: &serde_json::Value,
    ) -> Self {
        Error::InvalidType {
            field: field.to_string(),
            expected,
            value: value.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_enum_lists_legal_values() {
        let err = Error::invalid_enum("BLOOMFILTER", "FOO", &["NONE", "ROW"]);
        assert_eq!(
            err.to_string(),
            "BLOOMFILTER FOO is not supported. Use one of NONE ROW"
        );
        assert_eq!(err.error_type(), "invalid_enum_value");
        assert!(err.is_validation());
    }

    #[test]
    fn test_admin_errors_are_not_validation() {
        assert!(!Error::TableNotFound("t1".into()).is_validation());
        assert!(!Error::Admin("boom".into()).is_validation());
    }
}
