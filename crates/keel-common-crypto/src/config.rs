// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for hashers and token issuance.
//!
//! This crate never reads files or the environment. Callers deserialize
//! [`CryptoConfigLayer`] from wherever they keep configuration, merge layers
//! in precedence order, and call [`CryptoConfigLayer::finalize`].

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::password::{
	Algorithm, Argon2Config, Argon2Hasher, BcryptHasher, HasherSet, PasswordHasher,
	DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MIN_BCRYPT_COST,
};
use crate::token::DEFAULT_TOKEN_BYTES;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Argon2ConfigLayer {
	pub memory_kib: Option<u32>,
	pub iterations: Option<u32>,
	pub parallelism: Option<u8>,
	pub salt_length: Option<u32>,
	pub key_length: Option<u32>,
}

impl Argon2ConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.memory_kib.is_some() {
			self.memory_kib = other.memory_kib;
		}
		if other.iterations.is_some() {
			self.iterations = other.iterations;
		}
		if other.parallelism.is_some() {
			self.parallelism = other.parallelism;
		}
		if other.salt_length.is_some() {
			self.salt_length = other.salt_length;
		}
		if other.key_length.is_some() {
			self.key_length = other.key_length;
		}
	}

	pub fn finalize(self) -> Argon2Config {
		let defaults = Argon2Config::default();
		Argon2Config {
			memory_kib: self.memory_kib.unwrap_or(defaults.memory_kib),
			iterations: self.iterations.unwrap_or(defaults.iterations),
			parallelism: self.parallelism.unwrap_or(defaults.parallelism),
			salt_length: self.salt_length.unwrap_or(defaults.salt_length),
			key_length: self.key_length.unwrap_or(defaults.key_length),
		}
	}
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CryptoConfigLayer {
	pub algorithm: Option<Algorithm>,
	pub bcrypt_cost: Option<u32>,
	pub token_bytes: Option<usize>,
	pub argon2: Option<Argon2ConfigLayer>,
}

impl CryptoConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.algorithm.is_some() {
			self.algorithm = other.algorithm;
		}
		if let Some(argon2) = other.argon2 {
			self.argon2.get_or_insert_with(Default::default).merge(argon2);
		}
		if other.bcrypt_cost.is_some() {
			self.bcrypt_cost = other.bcrypt_cost;
		}
		if other.token_bytes.is_some() {
			self.token_bytes = other.token_bytes;
		}
	}

	/// Apply defaults and validate.
	pub fn finalize(self) -> Result<CryptoConfig, CryptoError> {
		let argon2 = self.argon2.unwrap_or_default().finalize();
		argon2.validate()?;

		let bcrypt_cost = match self.bcrypt_cost.unwrap_or(0) {
			0 => DEFAULT_BCRYPT_COST,
			cost if (MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) => cost,
			cost => {
				return Err(CryptoError::Configuration(format!(
					"bcrypt cost must be between {MIN_BCRYPT_COST} and {MAX_BCRYPT_COST}, got {cost}"
				)))
			}
		};

		let token_bytes = self.token_bytes.unwrap_or(DEFAULT_TOKEN_BYTES);
		if token_bytes == 0 {
			return Err(CryptoError::Configuration(
				"token length must be at least 1 byte".to_string(),
			));
		}

		Ok(CryptoConfig {
			algorithm: self.algorithm.unwrap_or(Algorithm::Argon2id),
			argon2,
			bcrypt_cost,
			token_bytes,
		})
	}
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoConfig {
	pub algorithm: Algorithm,
	pub bcrypt_cost: u32,
	pub token_bytes: usize,
	pub argon2: Argon2Config,
}

impl Default for CryptoConfig {
	fn default() -> Self {
		Self {
			algorithm: Algorithm::Argon2id,
			argon2: Argon2Config::default(),
			bcrypt_cost: DEFAULT_BCRYPT_COST,
			token_bytes: DEFAULT_TOKEN_BYTES,
		}
	}
}

impl CryptoConfig {
	/// Hasher for the configured algorithm.
	pub fn password_hasher(&self) -> Result<PasswordHasher, CryptoError> {
		Ok(match self.algorithm {
			Algorithm::Argon2id => Argon2Hasher::new(self.argon2)?.into(),
			Algorithm::Bcrypt => BcryptHasher::new(self.bcrypt_cost)?.into(),
		})
	}

	/// Both hashers, preferring the configured algorithm.
	pub fn hasher_set(&self) -> Result<HasherSet, CryptoError> {
		Ok(HasherSet::new(
			Argon2Hasher::new(self.argon2)?,
			BcryptHasher::new(self.bcrypt_cost)?,
			self.algorithm,
		))
	}
}
