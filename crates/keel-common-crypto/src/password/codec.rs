// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Codec for the self-describing Argon2id hash string.
//!
//! ```text
//! $argon2id$v=19$m=65536,t=3,p=2$<salt>$<digest>
//! ```
//!
//! Salt and digest use the standard base64 alphabet without padding. The key
//! length is not stored; it is the decoded digest length.

use base64::engine::general_purpose::STANDARD_NO_PAD;
use base64::Engine;
use tracing::{debug, warn};

use crate::error::CryptoError;

/// Algorithm tag in the second `$` field.
pub const ARGON2ID_TAG: &str = "argon2id";

/// Argon2 version compiled into this build (0x13).
pub const ARGON2_VERSION: u32 = argon2::Version::V0x13 as u32;

const FIELD_COUNT: usize = 6;

/// Cost parameters carried by an encoded hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Argon2Params {
	pub memory_kib: u32,
	pub iterations: u32,
	pub parallelism: u8,
}

/// An encoded Argon2id hash split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedHash {
	pub params: Argon2Params,
	pub salt: Vec<u8>,
	pub digest: Vec<u8>,
}

impl DecodedHash {
	/// Output length in bytes, taken from the digest itself.
	pub fn key_length(&self) -> usize {
		self.digest.len()
	}
}

/// Render parameters, salt and digest as an encoded Argon2id string.
pub fn encode(params: &Argon2Params, salt: &[u8], digest: &[u8]) -> String {
	format!(
		"${}$v={}$m={},t={},p={}${}${}",
		ARGON2ID_TAG,
		ARGON2_VERSION,
		params.memory_kib,
		params.iterations,
		params.parallelism,
		STANDARD_NO_PAD.encode(salt),
		STANDARD_NO_PAD.encode(digest),
	)
}

/// Parse an encoded Argon2id string.
///
/// Any grammar violation yields [`CryptoError::InvalidFormat`]. A well-formed
/// version field naming a different version yields
/// [`CryptoError::VersionMismatch`]. No hashing happens here.
pub fn decode(encoded: &str) -> Result<DecodedHash, CryptoError> {
	let parts: Vec<&str> = encoded.split('$').collect();
	if parts.len() != FIELD_COUNT || !parts[0].is_empty() {
		return Err(reject("wrong field count"));
	}

	if parts[1] != ARGON2ID_TAG {
		return Err(reject("wrong algorithm tag"));
	}

	let version: u32 = parts[2]
		.strip_prefix("v=")
		.and_then(parse_decimal)
		.ok_or_else(|| reject("unparsable version"))?;
	if version != ARGON2_VERSION {
		warn!(
			found = version,
			expected = ARGON2_VERSION,
			"encoded argon2id hash has unsupported version"
		);
		return Err(CryptoError::VersionMismatch {
			found: version,
			expected: ARGON2_VERSION,
		});
	}

	let params = parse_params(parts[3]).ok_or_else(|| reject("unparsable parameters"))?;

	let salt = STANDARD_NO_PAD
		.decode(parts[4])
		.map_err(|_| reject("invalid salt encoding"))?;
	let digest = STANDARD_NO_PAD
		.decode(parts[5])
		.map_err(|_| reject("invalid digest encoding"))?;

	Ok(DecodedHash {
		params,
		salt,
		digest,
	})
}

fn reject(reason: &'static str) -> CryptoError {
	debug!(reason, "rejected encoded argon2id hash");
	CryptoError::InvalidFormat
}

fn parse_params(field: &str) -> Option<Argon2Params> {
	let mut pairs = field.split(',');
	let memory_kib = pairs.next()?.strip_prefix("m=").and_then(parse_decimal)?;
	let iterations = pairs.next()?.strip_prefix("t=").and_then(parse_decimal)?;
	let parallelism = pairs.next()?.strip_prefix("p=").and_then(parse_decimal)?;
	if pairs.next().is_some() {
		return None;
	}
	Some(Argon2Params {
		memory_kib,
		iterations,
		parallelism,
	})
}

/// Canonical unsigned decimal: ASCII digits only, no sign, no leading zeros.
fn parse_decimal<T: std::str::FromStr>(s: &str) -> Option<T> {
	if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
		return None;
	}
	if s.len() > 1 && s.starts_with('0') {
		return None;
	}
	s.parse().ok()
}
