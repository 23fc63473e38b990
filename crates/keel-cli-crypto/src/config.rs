// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sources for the CLI: TOML file, then environment and flags.
//!
//! Environment variables are read by clap (`KEEL_CRYPTO_*`), so an explicit
//! flag beats the environment, which beats the file, which beats defaults.

use std::path::Path;

use anyhow::{Context, Result};
use keel_common_crypto::{Argon2ConfigLayer, CryptoConfig, CryptoConfigLayer};
use tracing::debug;

use crate::Args;

/// Load a config layer from a TOML file. A missing file is an error here,
/// since the path was given explicitly.
pub fn load_toml_layer(path: &Path) -> Result<CryptoConfigLayer> {
	debug!(path = %path.display(), "loading config file");
	let content = std::fs::read_to_string(path)
		.with_context(|| format!("failed to read config file {}", path.display()))?;
	toml::from_str(&content)
		.with_context(|| format!("failed to parse config file {}", path.display()))
}

/// Layer built from flags and `KEEL_CRYPTO_*` variables.
pub fn args_layer(args: &Args) -> CryptoConfigLayer {
	CryptoConfigLayer {
		algorithm: args.algorithm.map(Into::into),
		bcrypt_cost: args.bcrypt_cost,
		token_bytes: None,
		argon2: Some(Argon2ConfigLayer {
			memory_kib: args.memory_kib,
			iterations: args.iterations,
			parallelism: args.parallelism,
			salt_length: args.salt_length,
			key_length: args.key_length,
		}),
	}
}

/// Resolve the effective configuration for this invocation.
pub fn load_config(args: &Args) -> Result<CryptoConfig> {
	let mut merged = CryptoConfigLayer::default();
	if let Some(path) = &args.config {
		merged.merge(load_toml_layer(path)?);
	}
	merged.merge(args_layer(args));
	merged.finalize().context("invalid crypto configuration")
}

#[cfg(test)]
mod tests {
	use super::*;
	use clap::Parser;
	use keel_common_crypto::Algorithm;
	use std::io::Write;

	fn parse(argv: &[&str]) -> Args {
		Args::try_parse_from(argv).unwrap()
	}

	#[test]
	fn test_defaults_without_file_or_flags() {
		let config = load_config(&parse(&["keel-crypto", "hash"])).unwrap();
		assert_eq!(config, CryptoConfig::default());
	}

	#[test]
	fn test_flags_override_file() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(
			file,
			"algorithm = \"bcrypt\"\nbcrypt_cost = 11\n\n[argon2]\nmemory_kib = 1024\niterations = 4"
		)
		.unwrap();
		let path = file.path().to_str().unwrap();

		let args = parse(&[
			"keel-crypto",
			"--config",
			path,
			"--iterations",
			"2",
			"--algorithm",
			"argon2id",
			"hash",
		]);
		let config = load_config(&args).unwrap();

		assert_eq!(config.algorithm, Algorithm::Argon2id);
		assert_eq!(config.bcrypt_cost, 11);
		assert_eq!(config.argon2.memory_kib, 1024);
		assert_eq!(config.argon2.iterations, 2);
	}

	#[test]
	fn test_missing_file_is_an_error() {
		let args = parse(&["keel-crypto", "--config", "/nonexistent/keel.toml", "hash"]);
		assert!(load_config(&args).is_err());
	}

	#[test]
	fn test_malformed_file_is_an_error() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		writeln!(file, "bcrypt_cost = \"high\"").unwrap();
		let path = file.path().to_str().unwrap();
		let args = parse(&["keel-crypto", "--config", path, "hash"]);
		assert!(load_config(&args).is_err());
	}

	#[test]
	fn test_invalid_parameters_are_rejected() {
		let args = parse(&["keel-crypto", "--parallelism", "0", "hash"]);
		assert!(load_config(&args).is_err());
	}
}
