use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::codec::{DEFAULT_DIGITS, MAX_DIGITS, MIN_DIGITS};
use crate::config::{Field, OtpConfig, ValidationPolicy, integer_field, string_field};
use crate::error::OtpError;
use crate::hmac::{DEFAULT_HASH, HmacProvider, RingHmac};
use crate::hotp::{self, Hotp, Window};
use crate::secret::OtpSecret;
use crate::totp::Totp;

/// Configuration shared by every credential kind
#[derive(Debug, Clone)]
pub(crate) struct OtpParams<H> {
    pub(crate) secret: OtpSecret,
    pub(crate) digits: u8,
    pub(crate) hash: CompactString,
    pub(crate) provider: H,
}

impl<H: HmacProvider> OtpParams<H> {
    pub(crate) fn new(provider: H, secret: OtpSecret) -> Self {
        Self {
            secret,
            digits: DEFAULT_DIGITS,
            hash: DEFAULT_HASH.into(),
            provider,
        }
    }

    pub(crate) fn from_config(
        provider: H,
        config: &OtpConfig,
        policy: ValidationPolicy,
    ) -> Result<Self, OtpError> {
        let secret = policy.secret(config.key.as_ref())?;
        let digits = policy.resolve(
            "digits",
            config.digits.as_ref(),
            digits_field(config.digits.as_ref()),
            DEFAULT_DIGITS,
        )?;
        let hash = policy.resolve(
            "hash",
            config.hash.as_ref(),
            hash_field(&provider, config.hash.as_ref()),
            DEFAULT_HASH,
        )?;
        let hash = CompactString::from(hash);
        Ok(Self {
            secret,
            digits,
            hash,
            provider,
        })
    }

    pub(crate) fn set_digits(&mut self, digits: u8) {
        self.digits = if (MIN_DIGITS..=MAX_DIGITS).contains(&digits) {
            digits
        } else {
            tracing::warn!(field = "digits", digits, "invalid value, falling back to default");
            DEFAULT_DIGITS
        };
    }

    pub(crate) fn set_hash(&mut self, hash: &str) {
        self.hash = if self.provider.supports(hash) {
            hash.into()
        } else {
            tracing::warn!(field = "hash", hash, "unsupported digest, falling back to default");
            DEFAULT_HASH.into()
        };
    }

    pub(crate) fn generate(&self, counter: u64) -> String {
        hotp::generate(
            &self.provider,
            self.secret.as_ref(),
            counter,
            self.digits,
            &self.hash,
        )
    }

    pub(crate) fn range(&self, counter: u64, window: Window) -> Vec<String> {
        hotp::range(
            &self.provider,
            self.secret.as_ref(),
            counter,
            self.digits,
            &self.hash,
            window,
        )
    }

    pub(crate) fn verify(&self, counter: u64, candidate: &str, window: Window) -> bool {
        hotp::verify(
            &self.provider,
            self.secret.as_ref(),
            counter,
            self.digits,
            &self.hash,
            candidate,
            window,
        )
    }

    /// Fill in the fields shared by both kinds
    pub(crate) fn export(&self, kind: OtpKind) -> OtpConfig {
        OtpConfig {
            r#type: Some(kind.name().into()),
            key: Some((&self.secret).into()),
            digits: Some(Value::from(self.digits)),
            hash: Some(Value::from(self.hash.as_str())),
            ..Default::default()
        }
    }
}

fn digits_field(value: Option<&Value>) -> Field<u8> {
    match integer_field(value, MIN_DIGITS.into()) {
        Field::Valid(digits) => match u8::try_from(digits) {
            Ok(digits) if digits <= MAX_DIGITS => Field::Valid(digits),
            _ => Field::Invalid,
        },
        Field::Absent => Field::Absent,
        Field::Invalid => Field::Invalid,
    }
}

fn hash_field<'a, H: HmacProvider>(provider: &H, value: Option<&'a Value>) -> Field<&'a str> {
    match string_field(value) {
        Field::Valid(name) if provider.supports(name) => Field::Valid(name),
        Field::Valid(_) => Field::Invalid,
        other => other,
    }
}

/// Kind of one-time password credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OtpKind {
    /// Counter-based, RFC 4226
    Hotp,
    /// Time-based, RFC 6238
    Totp,
}

impl OtpKind {
    /// Look up a kind by the name used in the `type` field
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hotp" => Some(OtpKind::Hotp),
            "totp" => Some(OtpKind::Totp),
            _ => None,
        }
    }

    /// Name used in the `type` field
    pub fn name(self) -> &'static str {
        match self {
            OtpKind::Hotp => "hotp",
            OtpKind::Totp => "totp",
        }
    }
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A credential of either kind, as built by [OtpFactory]
#[derive(Debug, Clone)]
pub enum Otp<H = RingHmac> {
    /// Counter-based credential
    Hotp(Hotp<H>),
    /// Time-based credential
    Totp(Totp<H>),
}

impl<H> From<Hotp<H>> for Otp<H> {
    fn from(hotp: Hotp<H>) -> Self {
        Otp::Hotp(hotp)
    }
}

impl<H> From<Totp<H>> for Otp<H> {
    fn from(totp: Totp<H>) -> Self {
        Otp::Totp(totp)
    }
}

impl<H: HmacProvider> Otp<H> {
    /// Kind of the credential
    pub fn kind(&self) -> OtpKind {
        match self {
            Otp::Hotp(_) => OtpKind::Hotp,
            Otp::Totp(_) => OtpKind::Totp,
        }
    }

    /// Shared secret
    pub fn secret(&self) -> &OtpSecret {
        match self {
            Otp::Hotp(hotp) => hotp.secret(),
            Otp::Totp(totp) => totp.secret(),
        }
    }

    /// Number of digits in a code
    pub fn digits(&self) -> u8 {
        match self {
            Otp::Hotp(hotp) => hotp.digits(),
            Otp::Totp(totp) => totp.digits(),
        }
    }

    /// Digest algorithm name
    pub fn hash(&self) -> &str {
        match self {
            Otp::Hotp(hotp) => hotp.hash(),
            Otp::Totp(totp) => totp.hash(),
        }
    }

    /// Generate the current code: at the configured counter for HOTP, at the current time for TOTP
    pub fn generate(&self) -> String {
        match self {
            Otp::Hotp(hotp) => hotp.generate(),
            Otp::Totp(totp) => totp.generate(),
        }
    }

    /// Generate the codes of every counter in `window` around the current counter
    pub fn range(&self, window: Window) -> Vec<String> {
        match self {
            Otp::Hotp(hotp) => hotp.range(window),
            Otp::Totp(totp) => totp.range(window),
        }
    }

    /// Check `candidate` against every counter in `window` around the current counter
    pub fn verify(&self, candidate: &str, window: Window) -> bool {
        match self {
            Otp::Hotp(hotp) => hotp.verify(candidate, window),
            Otp::Totp(totp) => totp.verify(candidate, window),
        }
    }

    /// The counter-based credential, if this is one
    pub fn as_hotp(&self) -> Option<&Hotp<H>> {
        match self {
            Otp::Hotp(hotp) => Some(hotp),
            Otp::Totp(_) => None,
        }
    }

    /// The time-based credential, if this is one
    pub fn as_totp(&self) -> Option<&Totp<H>> {
        match self {
            Otp::Hotp(_) => None,
            Otp::Totp(totp) => Some(totp),
        }
    }

    /// Export the credential as a configuration record
    pub fn to_config(&self) -> OtpConfig {
        match self {
            Otp::Hotp(hotp) => hotp.to_config(),
            Otp::Totp(totp) => totp.to_config(),
        }
    }

    /// Export the credential as a JSON configuration record
    pub fn to_json(&self) -> Result<String, OtpError> {
        self.to_config().to_json()
    }
}

/// Builds credentials from configuration records
#[derive(Debug, Clone, Default)]
pub struct OtpFactory<H = RingHmac> {
    provider: H,
    policy: ValidationPolicy,
}

impl OtpFactory<RingHmac> {
    /// Creates a new [OtpFactory] backed by [RingHmac] with the lenient policy
    pub fn new() -> Self {
        Self::default()
    }
}

impl<H: HmacProvider + Clone> OtpFactory<H> {
    /// Creates a new [OtpFactory] with the given keyed-hash provider
    pub fn with_provider(provider: H) -> Self {
        Self {
            provider,
            policy: ValidationPolicy::default(),
        }
    }

    /// Set how invalid fields are handled
    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a credential, dispatching on the record's `type`
    ///
    /// A missing or unrecognized type is always an error, whatever the policy.
    pub fn create(&self, config: &OtpConfig) -> Result<Otp<H>, OtpError> {
        let kind = match config.r#type.as_deref() {
            None => return Err(OtpError::MissingType),
            Some(name) => match OtpKind::from_name(name) {
                Some(kind) => kind,
                None => {
                    tracing::debug!(credential_type = name, "rejecting unknown credential type");
                    return Err(OtpError::UnknownType(name.into()));
                }
            },
        };
        let otp: Otp<H> = match kind {
            OtpKind::Hotp => Hotp::from_config(self.provider.clone(), config, self.policy)?.into(),
            OtpKind::Totp => Totp::from_config(self.provider.clone(), config, self.policy)?.into(),
        };
        tracing::debug!(
            kind = %kind,
            digits = otp.digits(),
            hash = otp.hash(),
            "credential created"
        );
        Ok(otp)
    }

    /// Build a credential from a JSON configuration record
    pub fn from_json(&self, json: &str) -> Result<Otp<H>, OtpError> {
        self.create(&OtpConfig::from_json(json)?)
    }
}

/// Build a credential with the default provider and lenient validation
pub fn create_otp(config: &OtpConfig) -> Result<Otp, OtpError> {
    OtpFactory::new().create(config)
}
