// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Opaque bearer tokens for sessions, API keys and reset links.
//!
//! A token is random bytes rendered as URL-safe base64 without padding. Only
//! its SHA-256 hex digest is stored; the plaintext is shown to the user once.
//! SHA-256 is sufficient for high-entropy random tokens (16+ bytes), and a
//! slow hash here would only make lookups a denial-of-service target.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::entropy::{EntropySource, OsEntropy};
use crate::error::CryptoError;

/// Number of random bytes in a token when the caller has no preference.
pub const DEFAULT_TOKEN_BYTES: usize = 32;

/// Below this many bytes (128 bits) a token is issued with a warning.
pub const MIN_TOKEN_BYTES: usize = 16;

/// Length of a lookup hash in hex characters.
pub const LOOKUP_HASH_LEN: usize = 64;

const REDACTED: &str = "[REDACTED]";

/// Token plaintext. Redacted in `Debug`/`Display` and zeroized on drop;
/// call [`TokenPlaintext::expose`] to read it.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct TokenPlaintext(String);

impl TokenPlaintext {
	pub fn expose(&self) -> &str {
		&self.0
	}

	/// Copy out the plaintext, leaving this wrapper to zeroize its own copy.
	pub fn into_inner(self) -> String {
		self.0.clone()
	}
}

impl fmt::Debug for TokenPlaintext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("TokenPlaintext").field(&REDACTED).finish()
	}
}

impl fmt::Display for TokenPlaintext {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(REDACTED)
	}
}

/// A freshly issued token: the plaintext for the user and the hash to store.
#[derive(Debug, Clone)]
pub struct IssuedToken {
	pub plaintext: TokenPlaintext,
	pub lookup_hash: String,
}

/// Issues tokens from an injected entropy source.
#[derive(Debug, Clone, Default)]
pub struct TokenIssuer<E = OsEntropy> {
	entropy: E,
}

impl TokenIssuer<OsEntropy> {
	pub fn new() -> Self {
		Self { entropy: OsEntropy }
	}
}

impl<E: EntropySource> TokenIssuer<E> {
	pub fn with_entropy(entropy: E) -> Self {
		Self { entropy }
	}

	/// Generate a token from `length` random bytes.
	pub fn generate(&self, length: usize) -> Result<IssuedToken, CryptoError> {
		if length == 0 {
			return Err(CryptoError::Configuration(
				"token length must be at least 1 byte".to_string(),
			));
		}
		if length < MIN_TOKEN_BYTES {
			warn!(
				length,
				min = MIN_TOKEN_BYTES,
				"issuing token below recommended entropy"
			);
		}

		let mut bytes = Zeroizing::new(vec![0u8; length]);
		self.entropy.fill(&mut bytes)?;

		let plaintext = TokenPlaintext(URL_SAFE_NO_PAD.encode(&*bytes));
		let lookup_hash = hash_token(plaintext.expose());
		debug!(length, "issued token");

		Ok(IssuedToken {
			plaintext,
			lookup_hash,
		})
	}
}

/// Generate a token from the OS CSPRNG.
pub fn generate_token(length: usize) -> Result<IssuedToken, CryptoError> {
	TokenIssuer::new().generate(length)
}

/// SHA-256 of the token's UTF-8 bytes, as lowercase hex.
///
/// Pure and deterministic; used at issuance and again to look up a presented
/// token.
pub fn hash_token(token: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(token.as_bytes());
	hex::encode(hasher.finalize())
}

/// Check a presented token against a stored lookup hash in constant time.
pub fn verify_token(candidate: &str, lookup_hash: &str) -> bool {
	hash_token(candidate)
		.as_bytes()
		.ct_eq(lookup_hash.as_bytes())
		.into()
}

/// Encoded length of a token made from `length` bytes: `ceil(4 * length / 3)`,
/// or `None` if that does not fit in `usize`.
pub fn encoded_token_len(length: usize) -> Option<usize> {
	let tail = match length % 3 {
		0 => 0,
		rem => rem + 1,
	};
	(length / 3).checked_mul(4)?.checked_add(tail)
}

/// Check if a string looks like a token made from `length` bytes.
pub fn is_valid_token_format(token: &str, length: usize) -> bool {
	encoded_token_len(length) == Some(token.len())
		&& URL_SAFE_NO_PAD
			.decode(token)
			.is_ok_and(|bytes| bytes.len() == length)
}
