use serde_json::Value;

use crate::codec::{codes_match, encode_counter, truncate};
use crate::config::{OtpConfig, ValidationPolicy, integer_field};
use crate::credential::{OtpKind, OtpParams};
use crate::error::OtpError;
use crate::hmac::{HmacProvider, RingHmac};
use crate::secret::OtpSecret;

/// Default HOTP counter
pub const DEFAULT_COUNTER: u64 = 0;

/// Counter drift tolerated around a baseline counter
///
/// The two deltas are applied to the baseline and may be given in either order; the smaller
/// one becomes the start of the inclusive range. Counter arithmetic wraps modulo 2^64, so a
/// window reaching below zero continues at `u64::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Window {
    /// First delta
    pub delta_a: i64,
    /// Second delta
    pub delta_b: i64,
}

impl Window {
    /// Only the baseline counter itself
    pub const EXACT: Window = Window::new(0, 0);

    /// Creates a new [Window] from two deltas, in any order
    pub const fn new(delta_a: i64, delta_b: i64) -> Self {
        Self { delta_a, delta_b }
    }

    /// `steps` counters on either side of the baseline
    pub const fn around(steps: u32) -> Self {
        Self::new(-(steps as i64), steps as i64)
    }

    /// Number of counters in the window
    pub fn size(self) -> u128 {
        let (lo, hi) = self.bounds();
        (i128::from(hi) - i128::from(lo)) as u128 + 1
    }

    /// Counters covered by the window, in ascending order starting from `baseline + min(delta)`
    pub fn counters(self, baseline: u64) -> impl Iterator<Item = u64> {
        let start = baseline.wrapping_add_signed(self.bounds().0);
        (0..self.size()).map(move |step| start.wrapping_add(step as u64))
    }

    fn bounds(self) -> (i64, i64) {
        (
            self.delta_a.min(self.delta_b),
            self.delta_a.max(self.delta_b),
        )
    }
}

/// Generate the code for a single counter
pub fn generate<H: HmacProvider + ?Sized>(
    provider: &H,
    secret: &[u8],
    counter: u64,
    digits: u8,
    hash: &str,
) -> String {
    let digest = provider.sign(hash, secret, &encode_counter(counter));
    truncate(&digest, digits)
}

/// Generate the codes of every counter in `window` around `counter`, in ascending counter order
pub fn range<H: HmacProvider + ?Sized>(
    provider: &H,
    secret: &[u8],
    counter: u64,
    digits: u8,
    hash: &str,
    window: Window,
) -> Vec<String> {
    window
        .counters(counter)
        .map(|counter| generate(provider, secret, counter, digits, hash))
        .collect()
}

/// Check whether `candidate` is the code of any counter in `window` around `counter`
pub fn verify<H: HmacProvider + ?Sized>(
    provider: &H,
    secret: &[u8],
    counter: u64,
    digits: u8,
    hash: &str,
    candidate: &str,
    window: Window,
) -> bool {
    if candidate.len() != digits as usize {
        return false;
    }
    window.counters(counter).any(|counter| {
        let matched = codes_match(&generate(provider, secret, counter, digits, hash), candidate);
        if matched {
            tracing::trace!(counter, "candidate matched");
        }
        matched
    })
}

/// Counter-based one-time password credential (RFC 4226)
#[derive(Debug, Clone)]
pub struct Hotp<H = RingHmac> {
    params: OtpParams<H>,
    counter: u64,
}

impl Hotp<RingHmac> {
    /// Create a new HOTP credential with 6 digits and HMAC-SHA1
    pub fn new(secret: OtpSecret, counter: u64) -> Self {
        Self::with_provider(RingHmac, secret, counter)
    }
}

impl<H: HmacProvider> Hotp<H> {
    /// Create a new HOTP credential with the given keyed-hash provider
    pub fn with_provider(provider: H, secret: OtpSecret, counter: u64) -> Self {
        Self {
            params: OtpParams::new(provider, secret),
            counter,
        }
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
        let counter = policy.resolve(
            "counter",
            config.counter.as_ref(),
            integer_field(config.counter.as_ref(), 0),
            DEFAULT_COUNTER,
        )?;
        Ok(Self { params, counter })
    }

    /// Shared secret
    pub fn secret(&self) -> &OtpSecret {
        &self.params.secret
    }

    /// Configured counter
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Number of digits in a code
    pub fn digits(&self) -> u8 {
        self.params.digits
    }

    /// Digest algorithm name
    pub fn hash(&self) -> &str {
        &self.params.hash
    }

    /// Generate the code for the configured counter
    pub fn generate(&self) -> String {
        self.params.generate(self.counter)
    }

    /// Generate the code for an arbitrary counter
    pub fn generate_for(&self, counter: u64) -> String {
        self.params.generate(counter)
    }

    /// Generate the codes of every counter in `window` around the configured counter
    pub fn range(&self, window: Window) -> Vec<String> {
        self.params.range(self.counter, window)
    }

    /// Check `candidate` against every counter in `window` around the configured counter
    pub fn verify(&self, candidate: &str, window: Window) -> bool {
        self.params.verify(self.counter, candidate, window)
    }

    /// Export the credential as a configuration record
    pub fn to_config(&self) -> OtpConfig {
        OtpConfig {
            counter: Some(Value::from(self.counter)),
            ..self.params.export(OtpKind::Hotp)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC4226_SECRET: &[u8] = b"12345678901234567890";
    const RFC4226_CODES: [&str; 10] = [
        "755224", "287082", "359152", "969429", "338314", "254676", "287922", "162583", "399871",
        "520489",
    ];

    fn rfc_hotp(counter: u64) -> Hotp {
        Hotp::new(OtpSecret::new(RFC4226_SECRET), counter)
    }

    #[test]
    fn test_hotp() {
        for (counter, expected) in RFC4226_CODES.iter().enumerate() {
            assert_eq!(
                generate(&RingHmac, RFC4226_SECRET, counter as u64, 6, "sha1"),
                *expected
            );
            assert_eq!(rfc_hotp(counter as u64).generate(), *expected);
        }
    }

    #[test]
    fn window_is_order_independent() {
        let forward = rfc_hotp(5).range(Window::new(-2, 2));
        let backward = rfc_hotp(5).range(Window::new(2, -2));
        assert_eq!(forward, backward);
        assert_eq!(forward, RFC4226_CODES[3..=7]);
    }

    #[test]
    fn one_sided_windows() {
        assert_eq!(rfc_hotp(0).range(Window::new(0, 3)), RFC4226_CODES[0..=3]);
        assert_eq!(rfc_hotp(9).range(Window::new(-2, 0)), RFC4226_CODES[7..=9]);
        assert_eq!(rfc_hotp(4).range(Window::new(1, 3)), RFC4226_CODES[5..=7]);
    }

    #[test]
    fn exact_window_has_one_code() {
        let hotp = rfc_hotp(4);
        assert_eq!(hotp.range(Window::EXACT), vec![hotp.generate()]);
        assert_eq!(Window::EXACT.size(), 1);
    }

    #[test]
    fn window_counters() {
        assert_eq!(Window::around(2).counters(5).collect::<Vec<_>>(), [3, 4, 5, 6, 7]);
        assert_eq!(
            Window::new(0, -2).counters(1).collect::<Vec<_>>(),
            [u64::MAX, 0, 1]
        );
        assert_eq!(
            Window::new(0, 1).counters(u64::MAX).collect::<Vec<_>>(),
            [u64::MAX, 0]
        );
        assert_eq!(Window::new(i64::MIN, i64::MAX).size(), 1 << 64);
    }

    #[test]
    fn window_wraps_below_zero() {
        let hotp = rfc_hotp(0);
        let codes = hotp.range(Window::new(-1, 0));
        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0], hotp.generate_for(u64::MAX));
        assert_eq!(codes[1], RFC4226_CODES[0]);
    }

    #[test]
    fn verify_within_window() {
        let hotp = rfc_hotp(5);
        for code in &RFC4226_CODES[3..=7] {
            assert!(hotp.verify(code, Window::around(2)));
        }
        assert!(!hotp.verify(RFC4226_CODES[2], Window::around(2)));
        assert!(!hotp.verify(RFC4226_CODES[8], Window::around(2)));
        assert!(hotp.verify(RFC4226_CODES[5], Window::EXACT));
        assert!(!hotp.verify(RFC4226_CODES[6], Window::EXACT));
    }

    #[test]
    fn verify_rejects_wrong_length() {
        let hotp = rfc_hotp(0);
        assert!(!hotp.verify("75522", Window::EXACT));
        assert!(!hotp.verify("7552240", Window::EXACT));
        assert!(!hotp.verify("", Window::EXACT));
    }

    #[test]
    fn builder_normalizes() {
        let hotp = rfc_hotp(0).with_digits(3).with_hash("made-up");
        assert_eq!(hotp.digits(), 6);
        assert_eq!(hotp.hash(), "sha1");

        let hotp = rfc_hotp(0).with_digits(8).with_hash("sha256");
        assert_eq!(hotp.digits(), 8);
        assert_eq!(hotp.hash(), "sha256");
        assert_eq!(hotp.generate().len(), 8);
    }

    #[test]
    fn eight_digits_extend_six() {
        let six = rfc_hotp(1).generate();
        let eight = rfc_hotp(1).with_digits(8).generate();
        assert!(eight.ends_with(&six));
    }
}
