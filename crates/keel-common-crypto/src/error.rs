// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for credential hashing and token issuance.

use thiserror::Error;

/// Errors produced while hashing, verifying, or issuing secrets.
///
/// A password or token mismatch is never an error: verification returns
/// `Ok(false)` instead.
#[derive(Debug, Error)]
pub enum CryptoError {
	// =========================================================================
	// Caller Data Errors
	// =========================================================================
	/// The encoded hash does not follow its algorithm's grammar.
	#[error("invalid hash format")]
	InvalidFormat,

	/// The encoded hash is well formed but declares a version this build
	/// cannot evaluate. The credential needs migration, it is not corrupt.
	#[error("incompatible argon2 version: found {found}, expected {expected}")]
	VersionMismatch { found: u32, expected: u32 },

	// =========================================================================
	// Infrastructure Errors
	// =========================================================================
	/// The secure random source could not supply bytes.
	#[error("entropy source failure: {0}")]
	EntropyFailure(String),

	/// The hashing primitive failed for a reason other than the above.
	#[error("hashing failure: {0}")]
	HashingFailure(String),

	/// Hasher or issuer parameters were rejected at construction time.
	#[error("configuration error: {0}")]
	Configuration(String),
}

impl CryptoError {
	/// Returns true if this error is a server-side fault rather than a
	/// problem with caller-supplied data.
	pub fn is_internal(&self) -> bool {
		matches!(
			self,
			CryptoError::EntropyFailure(_)
				| CryptoError::HashingFailure(_)
				| CryptoError::Configuration(_)
		)
	}

	/// Returns true if the stored credential should be re-issued under the
	/// current algorithm version.
	pub fn needs_migration(&self) -> bool {
		matches!(self, CryptoError::VersionMismatch { .. })
	}
}

impl From<rand::Error> for CryptoError {
	fn from(err: rand::Error) -> Self {
		CryptoError::EntropyFailure(err.to_string())
	}
}
