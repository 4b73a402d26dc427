use std::fmt;

use fast32::base32;

/// Shared OTP secret
///
/// Raw key bytes, immutable once constructed. Base32 is only used at the boundary, when a
/// secret is read from or written to a configuration record.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct OtpSecret(Box<[u8]>);

impl AsRef<[u8]> for OtpSecret {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for OtpSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpSecret")
            .field("len", &self.0.len())
            .finish_non_exhaustive()
    }
}

impl From<&[u8]> for OtpSecret {
    fn from(secret: &[u8]) -> Self {
        Self::new(secret)
    }
}

impl From<Vec<u8>> for OtpSecret {
    fn from(secret: Vec<u8>) -> Self {
        Self(secret.into_boxed_slice())
    }
}

impl OtpSecret {
    /// Create a new OTP secret from a byte array
    pub fn new(secret: &[u8]) -> Self {
        Self(secret.into())
    }

    /// Create a new OTP secret from a base32 encoded string
    ///
    /// Padding is optional and the alphabet is matched case-insensitively. An empty string is
    /// an empty secret.
    pub fn try_from_base32(secret: impl AsRef<str>) -> Result<Self, fast32::DecodeError> {
        let normalized: String = secret
            .as_ref()
            .chars()
            .filter(|c| *c != '=' && !c.is_whitespace())
            .map(|c| c.to_ascii_uppercase())
            .collect();
        if normalized.is_empty() {
            return Ok(Self::default());
        }
        let secret = base32::RFC4648_NOPAD
            .decode_str(&normalized)?
            .into_boxed_slice();
        Ok(Self(secret))
    }

    /// Encode the secret as unpadded base32
    pub fn to_base32(&self) -> String {
        base32::RFC4648_NOPAD.encode(&self.0)
    }

    /// Length of the secret in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the secret has no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
