// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2id cost parameters.
//!
//! # Security Note
//!
//! The defaults are Argon2id with:
//! - Memory: 65536 KiB (64 MiB)
//! - Iterations: 3
//! - Parallelism: 2
//! - Salt: 16 bytes, key: 32 bytes
//!
//! Every hash and verify call allocates `memory_kib` KiB. Callers that run
//! many of them at once should bound concurrency using [`Argon2Config::memory_bytes`].

use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

pub const DEFAULT_MEMORY_KIB: u32 = 64 * 1024;
pub const DEFAULT_ITERATIONS: u32 = 3;
pub const DEFAULT_PARALLELISM: u8 = 2;
pub const DEFAULT_SALT_LENGTH: u32 = 16;
pub const DEFAULT_KEY_LENGTH: u32 = 32;

/// Smallest salt the primitive accepts.
pub const MIN_SALT_LENGTH: u32 = 8;

/// Upper bound on configured key length. Verification accepts any digest
/// length the primitive accepts.
pub const MAX_KEY_LENGTH: u32 = 1024;

/// Parameters for the Argon2id hasher. Validated once, when the hasher is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argon2Config {
	pub memory_kib: u32,
	pub iterations: u32,
	pub parallelism: u8,
	pub salt_length: u32,
	pub key_length: u32,
}

impl Default for Argon2Config {
	fn default() -> Self {
		Self {
			memory_kib: DEFAULT_MEMORY_KIB,
			iterations: DEFAULT_ITERATIONS,
			parallelism: DEFAULT_PARALLELISM,
			salt_length: DEFAULT_SALT_LENGTH,
			key_length: DEFAULT_KEY_LENGTH,
		}
	}
}

impl Argon2Config {
	/// Memory allocated by a single hash or verify call.
	pub fn memory_bytes(&self) -> u64 {
		u64::from(self.memory_kib) * 1024
	}

	/// Check that the primitive will accept these parameters.
	pub fn validate(&self) -> Result<(), CryptoError> {
		if self.salt_length < MIN_SALT_LENGTH {
			return Err(CryptoError::Configuration(format!(
				"argon2 salt length must be at least {MIN_SALT_LENGTH} bytes, got {}",
				self.salt_length
			)));
		}
		if self.key_length > MAX_KEY_LENGTH {
			return Err(CryptoError::Configuration(format!(
				"argon2 key length must be at most {MAX_KEY_LENGTH} bytes, got {}",
				self.key_length
			)));
		}
		argon2_instance(
			self.memory_kib,
			self.iterations,
			self.parallelism,
			self.key_length as usize,
		)
		.map(|_| ())
		.map_err(|e| CryptoError::Configuration(format!("invalid argon2 parameters: {e}")))
	}
}

/// Build an Argon2id instance at the compiled version for the given costs.
pub(crate) fn argon2_instance(
	memory_kib: u32,
	iterations: u32,
	parallelism: u8,
	key_length: usize,
) -> Result<Argon2<'static>, argon2::Error> {
	let params = Params::new(
		memory_kib,
		iterations,
		u32::from(parallelism),
		Some(key_length),
	)?;
	Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}
