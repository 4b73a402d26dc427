use std::num::NonZeroU64;
use std::time::SystemTime;

use serde_json::Value;

use crate::config::{OtpConfig, ValidationPolicy, integer_field};
use crate::credential::{OtpKind, OtpParams};
use crate::error::OtpError;
use crate::hmac::{HmacProvider, RingHmac};
use crate::hotp::Window;
use crate::secret::OtpSecret;

/// The default period of TOTP code in seconds
pub const RFC6238_TOTP_PERIOD: u64 = 30;

/// The default start time (T0) in seconds since the UNIX epoch
pub const RFC6238_TOTP_START_TIME: u64 = 0;

const DEFAULT_TIME_STEP: NonZeroU64 = match NonZeroU64::new(RFC6238_TOTP_PERIOD) {
    Some(step) => step,
    None => unreachable!(),
};

/// Number of whole time steps elapsed between `start_time` and `unix_seconds`
///
/// This is `floor((unix_seconds - start_time) / time_step)`. It is negative when the clock
/// reads earlier than `start_time`, and is never clamped.
pub fn current_counter(start_time: u64, time_step: NonZeroU64, unix_seconds: u64) -> i128 {
    (i128::from(unix_seconds) - i128::from(start_time)).div_euclid(i128::from(time_step.get()))
}

/// Current wall-clock time in seconds since the UNIX epoch; clocks set before the epoch read 0
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map_or(0, |elapsed| elapsed.as_secs())
}

/// Time-based one-time password credential (RFC 6238)
///
/// Every call reads the clock afresh; nothing is cached between calls. The `*_at` variants
/// take the time explicitly.
#[derive(Debug, Clone)]
pub struct Totp<H = RingHmac> {
    params: OtpParams<H>,
    start_time: u64,
    time_step: NonZeroU64,
}

impl Totp<RingHmac> {
    /// Create a new TOTP credential with RFC 6238 defaults: T0 = 0, a 30 second step, 6 digits
    /// and HMAC-SHA1
    pub fn new(secret: OtpSecret) -> Self {
        Self::with_provider(RingHmac, secret)
    }
}

impl<H: HmacProvider> Totp<H> {
    /// Create a new TOTP credential with the given keyed-hash provider
    pub fn with_provider(provider: H, secret: OtpSecret) -> Self {
        Self {
            params: OtpParams::new(provider, secret),
            start_time: RFC6238_TOTP_START_TIME,
            time_step: DEFAULT_TIME_STEP,
        }
    }

    /// Set the start time (T0), in seconds since the UNIX epoch
    pub fn with_start_time(mut self, start_time: u64) -> Self {
        self.start_time = start_time;
        self
    }

    /// Set the time step in seconds; 0 falls back to 30
    pub fn with_time_step(mut self, time_step: u64) -> Self {
        self.time_step = NonZeroU64::new(time_step).unwrap_or_else(|| {
            tracing::warn!(field = "timeStep", "invalid value, falling back to default");
            DEFAULT_TIME_STEP
        });
        self
    }

    /// Set the number of digits; values outside `6..=19` fall back to 6
    pub fn with_digits(mut self, digits: u8) -> Self {
        self.params.set_digits(digits);
        self
    }

    /// Set the digest algorithm; names the provider does not support fall back to `"sha1"`
    pub fn with_hash(mut self, hash: &str) -> Self {
        self.params.set_hash(hash);
        self
    }

    pub(crate) fn from_config(
        provider: H,
        config: &OtpConfig,
        policy: ValidationPolicy,
    ) -> Result<Self, OtpError> {
        let params = OtpParams::from_config(provider, config, policy)?;
        let start_time = policy.resolve(
            "startTime",
            config.start_time.as_ref(),
            integer_field(config.start_time.as_ref(), 0),
            RFC6238_TOTP_START_TIME,
        )?;
        let time_step = policy.resolve(
            "timeStep",
            config.time_step.as_ref(),
            integer_field(config.time_step.as_ref(), 1),
            RFC6238_TOTP_PERIOD,
        )?;
        Ok(Self {
            params,
            start_time,
            time_step: NonZeroU64::new(time_step).unwrap_or(DEFAULT_TIME_STEP),
        })
    }

    /// Shared secret
    pub fn secret(&self) -> &OtpSecret {
        &self.params.secret
    }

    /// Start time (T0) in seconds since the UNIX epoch
    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    /// Time step in seconds
    pub fn time_step(&self) -> u64 {
        self.time_step.get()
    }

    /// Number of digits in a code
    pub fn digits(&self) -> u8 {
        self.params.digits
    }

    /// Digest algorithm name
    pub fn hash(&self) -> &str {
        &self.params.hash
    }

    /// Time-step counter at the current time
    pub fn counter(&self) -> i128 {
        self.counter_at(unix_now())
    }

    /// Time-step counter at the given UNIX time
    pub fn counter_at(&self, unix_seconds: u64) -> i128 {
        current_counter(self.start_time, self.time_step, unix_seconds)
    }

    // A counter before T0 is hashed as its 64-bit two's complement
    fn baseline_at(&self, unix_seconds: u64) -> u64 {
        self.counter_at(unix_seconds) as u64
    }

    /// Generate the code for the current time step
    pub fn generate(&self) -> String {
        self.generate_at(unix_now())
    }

    /// Generate the code for the time step containing `unix_seconds`
    pub fn generate_at(&self, unix_seconds: u64) -> String {
        self.params.generate(self.baseline_at(unix_seconds))
    }

    /// Generate the codes of every time step in `window` around the current one
    pub fn range(&self, window: Window) -> Vec<String> {
        self.range_at(unix_now(), window)
    }

    /// Generate the codes of every time step in `window` around the one containing `unix_seconds`
    pub fn range_at(&self, unix_seconds: u64, window: Window) -> Vec<String> {
        self.params.range(self.baseline_at(unix_seconds), window)
    }

    /// Check `candidate` against every time step in `window` around the current one
    pub fn verify(&self, candidate: &str, window: Window) -> bool {
        self.verify_at(unix_now(), candidate, window)
    }

    /// Check `candidate` against every time step in `window` around the one containing
    /// `unix_seconds`
    pub fn verify_at(&self, unix_seconds: u64, candidate: &str, window: Window) -> bool {
        self.params
            .verify(self.baseline_at(unix_seconds), candidate, window)
    }

    /// Export the credential as a configuration record
    pub fn to_config(&self) -> OtpConfig {
        OtpConfig {
            start_time: Some(Value::from(self.start_time)),
            time_step: Some(Value::from(self.time_step.get())),
            ..self.params.export(OtpKind::Totp)
        }
    }
}
