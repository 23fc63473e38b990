// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Credential hashing and opaque token issuance for Keel.
//!
//! This crate provides:
//! - Argon2id password hashing with a self-describing `$argon2id$v=19$...` format
//! - Bcrypt password hashing for hashes issued under older policies
//! - Routing of stored hashes to the algorithm that produced them, plus
//!   rehash detection when parameters change
//! - Random bearer tokens stored only as SHA-256 lookup hashes
//!
//! # Security Considerations
//!
//! - Digest comparison is constant time
//! - Stored hash formats are fully validated before any password-dependent work
//! - Token plaintexts are redacted in `Debug`/`Display` and zeroized on drop
//! - All randomness goes through an injected [`EntropySource`]
//!
//! # Resource Use
//!
//! Everything here is synchronous and stateless. Argon2id deliberately costs
//! `memory_kib` KiB and `iterations` passes per call, with no interruption
//! point; callers bound concurrency themselves, sized with
//! [`Argon2Config::memory_bytes`].

pub mod config;
pub mod entropy;
pub mod error;
pub mod password;
pub mod token;

pub use config::{Argon2ConfigLayer, CryptoConfig, CryptoConfigLayer};
pub use entropy::{EntropySource, OsEntropy};
pub use error::CryptoError;
pub use password::{
	Algorithm, Argon2Config, Argon2Hasher, BcryptHasher, CredentialHasher, EncodedHash,
	HasherSet, PasswordHasher,
};
pub use token::{
	encoded_token_len, generate_token, hash_token, is_valid_token_format, verify_token,
	IssuedToken, TokenIssuer, TokenPlaintext, DEFAULT_TOKEN_BYTES, LOOKUP_HASH_LEN,
	MIN_TOKEN_BYTES,
};
