use compact_str::CompactString;

/// Error type for credential construction and (de)serialization
///
/// Code generation and verification never fail; every variant here is raised while turning a
/// configuration record into a credential, or while reading/writing its JSON form.
#[derive(Debug, thiserror::Error)]
pub enum OtpError {
    /// The configuration record has no `type`
    #[error("Missing credential type")]
    MissingType,

    /// The configuration record names a credential type that does not exist
    #[error("Invalid credential type: {0}")]
    UnknownType(CompactString),

    /// A field failed validation under [ValidationPolicy::Strict](crate::ValidationPolicy::Strict)
    #[error("Invalid value for `{field}`: {value}")]
    InvalidField {
        /// Name of the offending field, as it appears in the configuration record
        field: &'static str,
        /// The rejected value, rendered as JSON
        value: String,
    },

    /// The text-encoded key could not be decoded under [ValidationPolicy::Strict](crate::ValidationPolicy::Strict)
    #[error("Failed to decode base32 key: {0}")]
    InvalidKey(fast32::DecodeError),

    /// Failed to read or write the JSON form of a configuration record
    #[error("Failed to (de)serialize configuration: {0}")]
    Json(#[from] serde_json::Error),
}
