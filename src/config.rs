use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::OtpError;
use crate::secret::OtpSecret;

/// Configuration record a credential is built from and exported to
///
/// Every field is optional and loosely typed so that records written by other tools can be
/// read as-is; values are normalized once, when [OtpFactory](crate::OtpFactory) turns the
/// record into a credential.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpConfig {
    /// `"hotp"` or `"totp"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<CompactString>,
    /// Shared secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeyMaterial>,
    /// HOTP counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counter: Option<Value>,
    /// TOTP start time, in seconds since the UNIX epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Value>,
    /// TOTP time step, in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_step: Option<Value>,
    /// Number of digits in a code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digits: Option<Value>,
    /// Digest algorithm name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<Value>,
}

impl OtpConfig {
    /// Parse a configuration record from JSON
    pub fn from_json(json: &str) -> Result<Self, OtpError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Render the configuration record as JSON
    pub fn to_json(&self) -> Result<String, OtpError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Secret as it appears in a configuration record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyMaterial {
    /// Base32 text
    Encoded(String),
    /// Raw bytes
    Raw(Vec<u8>),
}

impl From<&OtpSecret> for KeyMaterial {
    fn from(secret: &OtpSecret) -> Self {
        KeyMaterial::Encoded(secret.to_base32())
    }
}

/// How invalid configuration fields are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Replace invalid values with their defaults
    #[default]
    Lenient,
    /// Reject invalid values with [OtpError::InvalidField] or [OtpError::InvalidKey]
    Strict,
}

/// Outcome of reading one field of a configuration record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Field<T> {
    Absent,
    Valid(T),
    Invalid,
}

impl ValidationPolicy {
    /// Pick the effective value of a field, substituting `default` where the policy allows it
    pub(crate) fn resolve<T>(
        self,
        name: &'static str,
        raw: Option<&Value>,
        field: Field<T>,
        default: T,
    ) -> Result<T, OtpError> {
        match field {
            Field::Valid(value) => Ok(value),
            Field::Absent => Ok(default),
            Field::Invalid => match self {
                ValidationPolicy::Lenient => {
                    tracing::warn!(field = name, "invalid value, falling back to default");
                    Ok(default)
                }
                ValidationPolicy::Strict => Err(OtpError::InvalidField {
                    field: name,
                    value: raw.map(Value::to_string).unwrap_or_default(),
                }),
            },
        }
    }

    pub(crate) fn secret(self, key: Option<&KeyMaterial>) -> Result<OtpSecret, OtpError> {
        match key {
            None => Ok(OtpSecret::default()),
            Some(KeyMaterial::Raw(bytes)) => Ok(OtpSecret::new(bytes)),
            Some(KeyMaterial::Encoded(text)) => match OtpSecret::try_from_base32(text) {
                Ok(secret) => Ok(secret),
                Err(err) => match self {
                    ValidationPolicy::Lenient => {
                        tracing::warn!(field = "key", "undecodable key, using an empty secret");
                        Ok(OtpSecret::default())
                    }
                    ValidationPolicy::Strict => Err(OtpError::InvalidKey(err)),
                },
            },
        }
    }
}

/// Read an integer field no smaller than `min`
///
/// Accepts JSON integers, floats (rounded half-up) and numeric strings. `null` and empty
/// strings count as absent.
pub(crate) fn integer_field(value: Option<&Value>, min: u64) -> Field<u64> {
    let integer = match value {
        None | Some(Value::Null) => return Field::Absent,
        Some(Value::Number(number)) => match number.as_u64() {
            Some(integer) => Some(integer),
            None if number.is_i64() => None,
            None => number.as_f64().and_then(round_to_u64),
        },
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                return Field::Absent;
            }
            match text.parse::<u64>() {
                Ok(integer) => Some(integer),
                Err(_) => text.parse::<f64>().ok().and_then(round_to_u64),
            }
        }
        Some(_) => return Field::Invalid,
    };

    match integer {
        Some(integer) if integer >= min => Field::Valid(integer),
        _ => Field::Invalid,
    }
}

fn round_to_u64(float: f64) -> Option<u64> {
    let rounded = (float + 0.5).floor();
    // 2^64 itself is not representable as a u64
    if rounded.is_finite() && rounded >= 0.0 && rounded < 18_446_744_073_709_551_616.0 {
        Some(rounded as u64)
    } else {
        None
    }
}

/// Read a string field
pub(crate) fn string_field(value: Option<&Value>) -> Field<&str> {
    match value {
        None | Some(Value::Null) => Field::Absent,
        Some(Value::String(text)) if text.is_empty() => Field::Absent,
        Some(Value::String(text)) => Field::Valid(text.as_str()),
        Some(_) => Field::Invalid,
    }
}
