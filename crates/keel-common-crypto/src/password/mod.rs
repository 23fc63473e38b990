// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Password hashing.
//!
//! Callers program against [`CredentialHasher`]. The set of algorithms is
//! closed: [`Argon2Hasher`], [`BcryptHasher`], the [`PasswordHasher`] enum
//! over both, and [`HasherSet`] which routes stored hashes to the algorithm
//! that produced them.
//!
//! # Example
//!
//! ```
//! use keel_common_crypto::password::{Argon2Config, Argon2Hasher, CredentialHasher};
//!
//! let hasher = Argon2Hasher::new(Argon2Config {
//! 	memory_kib: 256,
//! 	iterations: 1,
//! 	parallelism: 1,
//! 	..Default::default()
//! })
//! .unwrap();
//!
//! let stored = hasher.hash("correct horse battery staple").unwrap();
//! assert!(hasher.verify("correct horse battery staple", stored.as_str()).unwrap());
//! assert!(!hasher.verify("Tr0ub4dor&3", stored.as_str()).unwrap());
//! ```

mod argon2_config;
mod argon2id;
mod bcrypt_hasher;
pub mod codec;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entropy::{EntropySource, OsEntropy};
use crate::error::CryptoError;

pub use argon2_config::{
	Argon2Config, DEFAULT_ITERATIONS, DEFAULT_KEY_LENGTH, DEFAULT_MEMORY_KIB, DEFAULT_PARALLELISM,
	DEFAULT_SALT_LENGTH, MAX_KEY_LENGTH, MIN_SALT_LENGTH,
};
pub use argon2id::Argon2Hasher;
pub use bcrypt_hasher::{
	BcryptHasher, DEFAULT_BCRYPT_COST, MAX_BCRYPT_COST, MAX_BCRYPT_PASSWORD_LEN, MIN_BCRYPT_COST,
};

mod sealed {
	pub trait Sealed {}
}

/// The shared hash/verify contract.
///
/// Implementations are safe for concurrent use. `verify` finishes every format
/// check before any password-dependent work, and a wrong password is
/// `Ok(false)`, never an error.
pub trait CredentialHasher: sealed::Sealed + Send + Sync {
	/// Algorithm new hashes are produced with.
	fn algorithm(&self) -> Algorithm;

	/// Hash `password` with a fresh salt.
	fn hash(&self, password: &str) -> Result<EncodedHash, CryptoError>;

	/// Check `password` against a previously stored hash.
	fn verify(&self, password: &str, encoded: &str) -> Result<bool, CryptoError>;

	/// Whether a valid stored hash was made with parameters other than the
	/// current ones and should be replaced on the next successful login.
	fn needs_rehash(&self, encoded: &str) -> Result<bool, CryptoError>;
}

/// Supported password hashing algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
	Argon2id,
	Bcrypt,
}

impl Algorithm {
	/// Identify the algorithm of a stored hash from its prefix.
	pub fn identify(encoded: &str) -> Option<Self> {
		if encoded.starts_with("$argon2id$") {
			return Some(Algorithm::Argon2id);
		}
		["$2a$", "$2b$", "$2x$", "$2y$"]
			.iter()
			.any(|prefix| encoded.starts_with(prefix))
			.then_some(Algorithm::Bcrypt)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Algorithm::Argon2id => "argon2id",
			Algorithm::Bcrypt => "bcrypt",
		}
	}
}

impl fmt::Display for Algorithm {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A stored password hash. Self-describing: it carries the algorithm, version
/// and every parameter needed to verify against it later.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedHash(String);

impl EncodedHash {
	pub(crate) fn new(encoded: String) -> Self {
		Self(encoded)
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_string(self) -> String {
		self.0
	}

	pub fn algorithm(&self) -> Option<Algorithm> {
		Algorithm::identify(&self.0)
	}
}

impl AsRef<str> for EncodedHash {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for EncodedHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<EncodedHash> for String {
	fn from(hash: EncodedHash) -> Self {
		hash.0
	}
}

/// One configured hasher, either algorithm.
#[derive(Debug, Clone)]
pub enum PasswordHasher<E = OsEntropy> {
	Argon2id(Argon2Hasher<E>),
	Bcrypt(BcryptHasher<E>),
}

impl<E: EntropySource> sealed::Sealed for PasswordHasher<E> {}

impl<E: EntropySource> CredentialHasher for PasswordHasher<E> {
	fn algorithm(&self) -> Algorithm {
		match self {
			PasswordHasher::Argon2id(h) => h.algorithm(),
			PasswordHasher::Bcrypt(h) => h.algorithm(),
		}
	}

	fn hash(&self, password: &str) -> Result<EncodedHash, CryptoError> {
		match self {
			PasswordHasher::Argon2id(h) => h.hash(password),
			PasswordHasher::Bcrypt(h) => h.hash(password),
		}
	}

	fn verify(&self, password: &str, encoded: &str) -> Result<bool, CryptoError> {
		match self {
			PasswordHasher::Argon2id(h) => h.verify(password, encoded),
			PasswordHasher::Bcrypt(h) => h.verify(password, encoded),
		}
	}

	fn needs_rehash(&self, encoded: &str) -> Result<bool, CryptoError> {
		match self {
			PasswordHasher::Argon2id(h) => h.needs_rehash(encoded),
			PasswordHasher::Bcrypt(h) => h.needs_rehash(encoded),
		}
	}
}

impl<E> From<Argon2Hasher<E>> for PasswordHasher<E> {
	fn from(hasher: Argon2Hasher<E>) -> Self {
		PasswordHasher::Argon2id(hasher)
	}
}

impl<E> From<BcryptHasher<E>> for PasswordHasher<E> {
	fn from(hasher: BcryptHasher<E>) -> Self {
		PasswordHasher::Bcrypt(hasher)
	}
}

/// Both hashers side by side, for deployments migrating between algorithms.
///
/// New hashes use the preferred algorithm. Stored hashes are verified by the
/// algorithm named in their prefix, and hashes from the other algorithm always
/// report `needs_rehash`.
#[derive(Debug, Clone)]
pub struct HasherSet<E = OsEntropy> {
	argon2id: Argon2Hasher<E>,
	bcrypt: BcryptHasher<E>,
	preferred: Algorithm,
}

impl<E: EntropySource> HasherSet<E> {
	pub fn new(argon2id: Argon2Hasher<E>, bcrypt: BcryptHasher<E>, preferred: Algorithm) -> Self {
		Self {
			argon2id,
			bcrypt,
			preferred,
		}
	}

	pub fn preferred(&self) -> Algorithm {
		self.preferred
	}

	fn route(&self, encoded: &str) -> Result<Algorithm, CryptoError> {
		Algorithm::identify(encoded).ok_or_else(|| {
			debug!("stored hash has no recognised algorithm prefix");
			CryptoError::InvalidFormat
		})
	}
}

impl<E: EntropySource> sealed::Sealed for HasherSet<E> {}

impl<E: EntropySource> CredentialHasher for HasherSet<E> {
	fn algorithm(&self) -> Algorithm {
		self.preferred
	}

	fn hash(&self, password: &str) -> Result<EncodedHash, CryptoError> {
		match self.preferred {
			Algorithm::Argon2id => self.argon2id.hash(password),
			Algorithm::Bcrypt => self.bcrypt.hash(password),
		}
	}

	fn verify(&self, password: &str, encoded: &str) -> Result<bool, CryptoError> {
		match self.route(encoded)? {
			Algorithm::Argon2id => self.argon2id.verify(password, encoded),
			Algorithm::Bcrypt => self.bcrypt.verify(password, encoded),
		}
	}

	fn needs_rehash(&self, encoded: &str) -> Result<bool, CryptoError> {
		let algorithm = self.route(encoded)?;
		let stale = match algorithm {
			Algorithm::Argon2id => self.argon2id.needs_rehash(encoded)?,
			Algorithm::Bcrypt => self.bcrypt.needs_rehash(encoded)?,
		};
		Ok(stale || algorithm != self.preferred)
	}
}
