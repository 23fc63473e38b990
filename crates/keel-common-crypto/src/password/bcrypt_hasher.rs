// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Bcrypt password hasher, for hashes issued before Argon2id or where bcrypt
//! is mandated.
//!
//! The `$2b$<cost>$<salt+digest>` string is produced and consumed by the
//! `bcrypt` crate; this module only reads the cost back for rehash checks.
//!
//! Bcrypt only consumes the first 72 bytes of a password. Hashing a longer
//! password is refused with [`CryptoError::HashingFailure`] so two passwords
//! sharing a 72-byte prefix never produce interchangeable hashes. Verification
//! still accepts any input.

use tracing::{debug, instrument};

use super::{sealed, Algorithm, CredentialHasher, EncodedHash};
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::CryptoError;

/// Cost used when none is configured: the `bcrypt` crate's default of 12.
///
/// Hashes issued by services defaulting to cost 10 still verify, but
/// `needs_rehash` reports them as stale under this default.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Longest password, in bytes, that bcrypt hashes without truncation.
pub const MAX_BCRYPT_PASSWORD_LEN: usize = 72;

const BCRYPT_SALT_LEN: usize = 16;
const BCRYPT_PREFIXES: [&str; 4] = ["2a", "2b", "2x", "2y"];
/// 22 characters of salt followed by 31 of digest.
const BCRYPT_PAYLOAD_LEN: usize = 53;

/// Hashes passwords with bcrypt at a fixed cost.
#[derive(Debug, Clone)]
pub struct BcryptHasher<E = OsEntropy> {
	cost: u32,
	entropy: E,
}

impl BcryptHasher<OsEntropy> {
	/// Create a hasher at `cost`; 0 selects [`DEFAULT_BCRYPT_COST`].
	pub fn new(cost: u32) -> Result<Self, CryptoError> {
		Self::with_entropy(cost, OsEntropy)
	}
}

impl<E: EntropySource> BcryptHasher<E> {
	pub fn with_entropy(cost: u32, entropy: E) -> Result<Self, CryptoError> {
		let cost = if cost == 0 { DEFAULT_BCRYPT_COST } else { cost };
		if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
			return Err(CryptoError::Configuration(format!(
				"bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {cost}"
			)));
		}
		debug!(cost, "created bcrypt hasher");
		Ok(Self { cost, entropy })
	}

	pub fn cost(&self) -> u32 {
		self.cost
	}
}

impl<E: EntropySource> sealed::Sealed for BcryptHasher<E> {}

impl<E: EntropySource> CredentialHasher for BcryptHasher<E> {
	fn algorithm(&self) -> Algorithm {
		Algorithm::Bcrypt
	}

	#[instrument(skip_all, fields(algorithm = "bcrypt", cost = self.cost))]
	fn hash(&self, password: &str) -> Result<EncodedHash, CryptoError> {
		if password.len() > MAX_BCRYPT_PASSWORD_LEN {
			debug!(len = password.len(), "password too long for bcrypt");
			return Err(CryptoError::HashingFailure(format!(
				"password exceeds {MAX_BCRYPT_PASSWORD_LEN} bytes"
			)));
		}

		let mut salt = [0u8; BCRYPT_SALT_LEN];
		self.entropy.fill(&mut salt)?;

		let parts = bcrypt::hash_with_salt(password, self.cost, salt)
			.map_err(|e| CryptoError::HashingFailure(format!("failed to hash password: {e}")))?;
		Ok(EncodedHash::new(
			parts.format_for_version(bcrypt::Version::TwoB),
		))
	}

	#[instrument(skip_all, fields(algorithm = "bcrypt"))]
	fn verify(&self, password: &str, encoded: &str) -> Result<bool, CryptoError> {
		bcrypt::verify(password, encoded).map_err(|e| {
			debug!(error = %e, "rejected encoded bcrypt hash");
			CryptoError::InvalidFormat
		})
	}

	fn needs_rehash(&self, encoded: &str) -> Result<bool, CryptoError> {
		Ok(parse_cost(encoded)? != self.cost)
	}
}

/// Read the cost field of a `$2?$NN$...` string.
fn parse_cost(encoded: &str) -> Result<u32, CryptoError> {
	let mut parts = encoded.split('$');
	let (Some(""), Some(prefix), Some(cost), Some(payload), None) = (
		parts.next(),
		parts.next(),
		parts.next(),
		parts.next(),
		parts.next(),
	) else {
		return Err(CryptoError::InvalidFormat);
	};

	if !BCRYPT_PREFIXES.contains(&prefix)
		|| payload.len() != BCRYPT_PAYLOAD_LEN
		|| cost.len() != 2
		|| !cost.bytes().all(|b| b.is_ascii_digit())
	{
		return Err(CryptoError::InvalidFormat);
	}
	cost.parse().map_err(|_| CryptoError::InvalidFormat)
}
