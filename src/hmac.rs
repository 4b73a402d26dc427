use std::fmt;

use ring::hmac;

/// Name of the digest algorithm used when none (or an unsupported one) is configured
pub const DEFAULT_HASH: &str = "sha1";

/// Keyed-hash capability used to derive codes
///
/// Credentials only ever call [HmacProvider::sign] with names for which
/// [HmacProvider::supports] returned `true` at construction time, so implementations may treat
/// any other name as unreachable. Implementations must be safe to call concurrently.
pub trait HmacProvider {
    /// Whether the named digest algorithm can be used with [HmacProvider::sign]
    fn supports(&self, algorithm: &str) -> bool;

    /// Compute `HMAC(algorithm, key, message)`
    fn sign(&self, algorithm: &str, key: &[u8], message: &[u8]) -> Box<[u8]>;
}

/// Digest algorithms available through [RingHmac]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum HashAlgorithm {
    /// HMAC-SHA1, the algorithm prescribed by RFC 4226
    #[default]
    Sha1,
    /// HMAC-SHA256, allowed by RFC 6238
    Sha256,
    /// HMAC-SHA384
    Sha384,
    /// HMAC-SHA512, allowed by RFC 6238
    Sha512,
}

impl HashAlgorithm {
    /// Every supported algorithm
    pub const ALL: [HashAlgorithm; 4] = [
        HashAlgorithm::Sha1,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha384,
        HashAlgorithm::Sha512,
    ];

    /// Look up an algorithm by its (case-insensitive) name, e.g. `"sha256"`
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(name))
    }

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Sha1 => "sha1",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha384 => "sha384",
            HashAlgorithm::Sha512 => "sha512",
        }
    }

    fn ring_algorithm(self) -> hmac::Algorithm {
        match self {
            HashAlgorithm::Sha1 => hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY,
            HashAlgorithm::Sha256 => hmac::HMAC_SHA256,
            HashAlgorithm::Sha384 => hmac::HMAC_SHA384,
            HashAlgorithm::Sha512 => hmac::HMAC_SHA512,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// [HmacProvider] backed by `ring`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingHmac;

impl HmacProvider for RingHmac {
    fn supports(&self, algorithm: &str) -> bool {
        HashAlgorithm::from_name(algorithm).is_some()
    }

    fn sign(&self, algorithm: &str, key: &[u8], message: &[u8]) -> Box<[u8]> {
        let algorithm = HashAlgorithm::from_name(algorithm).unwrap_or_default();
        let key = hmac::Key::new(algorithm.ring_algorithm(), key);
        hmac::sign(&key, message).as_ref().into()
    }
}
