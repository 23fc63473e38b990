// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Argon2id password hasher.

use subtle::ConstantTimeEq;
use tracing::{debug, instrument};
use zeroize::Zeroizing;

use super::argon2_config::{argon2_instance, Argon2Config, MIN_SALT_LENGTH};
use super::codec::{self, Argon2Params};
use super::{sealed, Algorithm, CredentialHasher, EncodedHash};
use crate::entropy::{EntropySource, OsEntropy};
use crate::error::CryptoError;

/// Hashes passwords with Argon2id and renders the self-describing
/// `$argon2id$v=19$...` string.
///
/// Verification uses the parameters embedded in the stored string, so hashes
/// issued under an older configuration keep verifying.
#[derive(Debug, Clone)]
pub struct Argon2Hasher<E = OsEntropy> {
	config: Argon2Config,
	entropy: E,
}

impl Argon2Hasher<OsEntropy> {
	/// Create a hasher drawing salts from the OS CSPRNG.
	pub fn new(config: Argon2Config) -> Result<Self, CryptoError> {
		Self::with_entropy(config, OsEntropy)
	}
}

impl<E: EntropySource> Argon2Hasher<E> {
	/// Create a hasher drawing salts from `entropy`.
	pub fn with_entropy(config: Argon2Config, entropy: E) -> Result<Self, CryptoError> {
		config.validate()?;
		debug!(
			memory_kib = config.memory_kib,
			iterations = config.iterations,
			parallelism = config.parallelism,
			salt_length = config.salt_length,
			key_length = config.key_length,
			"created argon2id hasher"
		);
		Ok(Self { config, entropy })
	}

	pub fn config(&self) -> &Argon2Config {
		&self.config
	}

	fn params(&self) -> Argon2Params {
		Argon2Params {
			memory_kib: self.config.memory_kib,
			iterations: self.config.iterations,
			parallelism: self.config.parallelism,
		}
	}
}

impl<E: EntropySource> sealed::Sealed for Argon2Hasher<E> {}

impl<E: EntropySource> CredentialHasher for Argon2Hasher<E> {
	fn algorithm(&self) -> Algorithm {
		Algorithm::Argon2id
	}

	#[instrument(skip_all, fields(algorithm = "argon2id"))]
	fn hash(&self, password: &str) -> Result<EncodedHash, CryptoError> {
		let mut salt = vec![0u8; self.config.salt_length as usize];
		self.entropy.fill(&mut salt)?;

		let params = self.params();
		let argon2 = argon2_instance(
			params.memory_kib,
			params.iterations,
			params.parallelism,
			self.config.key_length as usize,
		)
		.map_err(|e| CryptoError::HashingFailure(e.to_string()))?;

		let mut digest = Zeroizing::new(vec![0u8; self.config.key_length as usize]);
		argon2
			.hash_password_into(password.as_bytes(), &salt, &mut digest)
			.map_err(|e| CryptoError::HashingFailure(e.to_string()))?;

		Ok(EncodedHash::new(codec::encode(&params, &salt, &digest)))
	}

	/// Verify against the parameters embedded in `encoded`.
	///
	/// # Resource use
	///
	/// `m=` is taken from the stored string and is bounded only by what the
	/// `argon2` crate accepts. A stored value like `m=4294967295` requests
	/// about 4 TiB, and an allocation failure aborts the process rather than
	/// returning an error. Only verify against hashes from trusted storage.
	#[instrument(skip_all, fields(algorithm = "argon2id"))]
	fn verify(&self, password: &str, encoded: &str) -> Result<bool, CryptoError> {
		let decoded = codec::decode(encoded)?;

		// Everything the computation needs is validated before the password is touched.
		if decoded.salt.len() < MIN_SALT_LENGTH as usize {
			debug!(salt_len = decoded.salt.len(), "argon2id hash salt too short");
			return Err(CryptoError::InvalidFormat);
		}
		let argon2 = argon2_instance(
			decoded.params.memory_kib,
			decoded.params.iterations,
			decoded.params.parallelism,
			decoded.key_length(),
		)
		.map_err(|e| {
			debug!(error = %e, "argon2id hash parameters rejected by primitive");
			CryptoError::InvalidFormat
		})?;

		let mut computed = Zeroizing::new(vec![0u8; decoded.key_length()]);
		argon2
			.hash_password_into(password.as_bytes(), &decoded.salt, &mut computed)
			.map_err(|e| CryptoError::HashingFailure(e.to_string()))?;

		Ok(computed.as_slice().ct_eq(&decoded.digest).into())
	}

	fn needs_rehash(&self, encoded: &str) -> Result<bool, CryptoError> {
		let decoded = codec::decode(encoded)?;
		Ok(decoded.params != self.params()
			|| decoded.salt.len() != self.config.salt_length as usize
			|| decoded.key_length() != self.config.key_length as usize)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::entropy::testing::{CountingEntropy, FailingEntropy};
	use proptest::prelude::*;

	/// Cheap parameters so tests stay fast; never use outside tests.
	fn fast_config() -> Argon2Config {
		Argon2Config {
			memory_kib: 256,
			iterations: 1,
			parallelism: 1,
			salt_length: 16,
			key_length: 32,
		}
	}

	fn fast_hasher() -> Argon2Hasher {
		Argon2Hasher::new(fast_config()).unwrap()
	}

	mod hashing {
		use super::*;

		#[test]
		fn hash_produces_argon2id_format() {
			let hash = fast_hasher().hash("hunter2").unwrap();
			assert!(hash.as_str().starts_with("$argon2id$v=19$m=256,t=1,p=1$"));
			assert_eq!(hash.as_str().split('$').count(), 6);
		}

		#[test]
		fn same_password_produces_different_hashes() {
			let hasher = fast_hasher();
			let hash1 = hasher.hash("hunter2").unwrap();
			let hash2 = hasher.hash("hunter2").unwrap();
			assert_ne!(hash1, hash2, "Different salts should produce different hashes");
		}

		#[test]
		fn deterministic_entropy_gives_deterministic_hash() {
			let a = Argon2Hasher::with_entropy(fast_config(), CountingEntropy::default()).unwrap();
			let b = Argon2Hasher::with_entropy(fast_config(), CountingEntropy::default()).unwrap();
			assert_eq!(a.hash("hunter2").unwrap(), b.hash("hunter2").unwrap());
		}

		#[test]
		fn entropy_failure_propagates() {
			let hasher = Argon2Hasher::with_entropy(fast_config(), FailingEntropy).unwrap();
			assert!(matches!(
				hasher.hash("hunter2"),
				Err(CryptoError::EntropyFailure(_))
			));
		}

		#[test]
		fn invalid_config_is_rejected_at_construction() {
			let config = Argon2Config {
				iterations: 0,
				..fast_config()
			};
			assert!(matches!(
				Argon2Hasher::new(config),
				Err(CryptoError::Configuration(_))
			));
		}

		#[test]
		fn salt_and_key_lengths_follow_config() {
			let config = Argon2Config {
				salt_length: 24,
				key_length: 48,
				..fast_config()
			};
			let hash = Argon2Hasher::new(config).unwrap().hash("pw").unwrap();
			let decoded = codec::decode(hash.as_str()).unwrap();
			assert_eq!(decoded.salt.len(), 24);
			assert_eq!(decoded.key_length(), 48);
		}
	}

	mod verification {
		use super::*;

		#[test]
		fn correct_password_verifies() {
			let hasher = fast_hasher();
			let hash = hasher.hash("hunter2").unwrap();
			assert!(hasher.verify("hunter2", hash.as_str()).unwrap());
		}

		#[test]
		fn wrong_password_is_false_not_error() {
			let hasher = fast_hasher();
			let hash = hasher.hash("hunter2").unwrap();
			assert!(!hasher.verify("hunter3", hash.as_str()).unwrap());
		}

		#[test]
		fn empty_password_round_trips() {
			let hasher = fast_hasher();
			let hash = hasher.hash("").unwrap();
			assert!(hasher.verify("", hash.as_str()).unwrap());
			assert!(!hasher.verify(" ", hash.as_str()).unwrap());
		}

		#[test]
		fn hash_from_other_config_still_verifies() {
			let old = Argon2Hasher::new(Argon2Config {
				memory_kib: 128,
				key_length: 16,
				salt_length: 8,
				..fast_config()
			})
			.unwrap();
			let hash = old.hash("hunter2").unwrap();
			assert!(fast_hasher().verify("hunter2", hash.as_str()).unwrap());
		}

		#[test]
		fn tampered_digest_fails() {
			let hasher = fast_hasher();
			let hash = hasher.hash("hunter2").unwrap();
			let decoded = codec::decode(hash.as_str()).unwrap();
			let mut digest = decoded.digest.clone();
			digest[0] ^= 0x01;
			let tampered = codec::encode(&decoded.params, &decoded.salt, &digest);
			assert!(!hasher.verify("hunter2", &tampered).unwrap());
		}

		#[test]
		fn malformed_hash_is_invalid_format() {
			let hasher = fast_hasher();
			assert!(matches!(
				hasher.verify("hunter2", "not-a-hash"),
				Err(CryptoError::InvalidFormat)
			));
		}

		#[test]
		fn short_salt_is_invalid_format() {
			let encoded = codec::encode(
				&Argon2Params {
					memory_kib: 256,
					iterations: 1,
					parallelism: 1,
				},
				&[1, 2, 3],
				&[0; 32],
			);
			assert!(matches!(
				fast_hasher().verify("hunter2", &encoded),
				Err(CryptoError::InvalidFormat)
			));
		}

		#[test]
		fn out_of_range_parameters_are_invalid_format() {
			let zero_lanes = codec::encode(
				&Argon2Params {
					memory_kib: 256,
					iterations: 1,
					parallelism: 0,
				},
				&[1; 16],
				&[0; 32],
			);
			let empty_digest = codec::encode(
				&Argon2Params {
					memory_kib: 256,
					iterations: 1,
					parallelism: 1,
				},
				&[1; 16],
				&[],
			);
			let hasher = fast_hasher();
			assert!(matches!(
				hasher.verify("pw", &zero_lanes),
				Err(CryptoError::InvalidFormat)
			));
			assert!(matches!(
				hasher.verify("pw", &empty_digest),
				Err(CryptoError::InvalidFormat)
			));
		}

		#[test]
		fn other_version_is_version_mismatch() {
			let hasher = fast_hasher();
			let hash = hasher.hash("hunter2").unwrap();
			let old = hash.as_str().replacen("v=19", "v=16", 1);
			assert!(matches!(
				hasher.verify("hunter2", &old),
				Err(CryptoError::VersionMismatch {
					found: 16,
					expected: 19
				})
			));
		}
	}

	mod rehash {
		use super::*;

		#[test]
		fn current_parameters_do_not_need_rehash() {
			let hasher = fast_hasher();
			let hash = hasher.hash("pw").unwrap();
			assert!(!hasher.needs_rehash(hash.as_str()).unwrap());
		}

		#[test]
		fn changed_cost_needs_rehash() {
			let old = fast_hasher().hash("pw").unwrap();
			let stronger = Argon2Hasher::new(Argon2Config {
				iterations: 2,
				..fast_config()
			})
			.unwrap();
			assert!(stronger.needs_rehash(old.as_str()).unwrap());
		}

		#[test]
		fn changed_key_length_needs_rehash() {
			let old = fast_hasher().hash("pw").unwrap();
			let longer = Argon2Hasher::new(Argon2Config {
				key_length: 64,
				..fast_config()
			})
			.unwrap();
			assert!(longer.needs_rehash(old.as_str()).unwrap());
		}

		#[test]
		fn malformed_hash_is_an_error() {
			assert!(fast_hasher().needs_rehash("$argon2id$").is_err());
		}
	}

	mod property_tests {
		use super::*;

		proptest! {
			#![proptest_config(ProptestConfig::with_cases(16))]

			/// Any password verifies against its own hash.
			#[test]
			fn hash_then_verify_succeeds(password in ".{0,64}") {
				let hasher = fast_hasher();
				let hash = hasher.hash(&password).unwrap();
				prop_assert!(hasher.verify(&password, hash.as_str()).unwrap());
			}

			/// A different password never verifies, and is not an error.
			#[test]
			fn different_password_fails(
				password in "[a-zA-Z0-9]{1,32}",
				other in "[a-zA-Z0-9]{1,32}",
			) {
				prop_assume!(password != other);
				let hasher = fast_hasher();
				let hash = hasher.hash(&password).unwrap();
				prop_assert!(!hasher.verify(&other, hash.as_str()).unwrap());
			}
		}
	}
}
