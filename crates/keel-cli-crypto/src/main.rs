// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! keel-crypto - hash passwords and issue opaque tokens from the shell.
//!
//! Secrets are read from stdin, never from arguments, so they stay out of
//! shell history and process listings.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use keel_common_crypto::{
	hash_token, Algorithm, CredentialHasher, CryptoError, HasherSet, TokenIssuer,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;
use zeroize::Zeroizing;

mod config;

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AlgorithmArg {
	Argon2id,
	Bcrypt,
}

impl From<AlgorithmArg> for Algorithm {
	fn from(v: AlgorithmArg) -> Self {
		match v {
			AlgorithmArg::Argon2id => Algorithm::Argon2id,
			AlgorithmArg::Bcrypt => Algorithm::Bcrypt,
		}
	}
}

/// Keel credential tool
#[derive(Parser, Debug)]
#[command(name = "keel-crypto", version, about, long_about = None)]
pub struct Args {
	/// Path to a TOML configuration file
	#[arg(long, global = true, env = "KEEL_CRYPTO_CONFIG")]
	config: Option<PathBuf>,

	/// Algorithm for new hashes
	#[arg(long, global = true, value_enum, env = "KEEL_CRYPTO_ALGORITHM")]
	algorithm: Option<AlgorithmArg>,

	/// Argon2id memory cost in KiB
	#[arg(long, global = true, env = "KEEL_CRYPTO_ARGON2_MEMORY_KIB")]
	memory_kib: Option<u32>,

	/// Argon2id iterations
	#[arg(long, global = true, env = "KEEL_CRYPTO_ARGON2_ITERATIONS")]
	iterations: Option<u32>,

	/// Argon2id lanes
	#[arg(long, global = true, env = "KEEL_CRYPTO_ARGON2_PARALLELISM")]
	parallelism: Option<u8>,

	/// Argon2id salt length in bytes
	#[arg(long, global = true, env = "KEEL_CRYPTO_ARGON2_SALT_LENGTH")]
	salt_length: Option<u32>,

	/// Argon2id output length in bytes
	#[arg(long, global = true, env = "KEEL_CRYPTO_ARGON2_KEY_LENGTH")]
	key_length: Option<u32>,

	/// Bcrypt cost (0 for the library default)
	#[arg(long, global = true, env = "KEEL_CRYPTO_BCRYPT_COST")]
	bcrypt_cost: Option<u32>,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Hash a password read from stdin
	Hash,

	/// Check a password read from stdin; exits 1 on mismatch
	Verify {
		/// Stored hash to check against
		#[arg(long)]
		hash: String,
	},

	/// Report whether a stored hash should be replaced; exits 1 if not
	NeedsRehash {
		/// Stored hash to inspect
		#[arg(long)]
		hash: String,
	},

	/// Opaque token operations
	Token {
		#[command(subcommand)]
		command: TokenCommand,
	},
}

#[derive(Subcommand, Debug)]
enum TokenCommand {
	/// Generate a token and print it with its lookup hash
	Generate {
		/// Number of random bytes
		#[arg(long)]
		length: Option<usize>,
	},

	/// Print the lookup hash of a token read from stdin
	Hash,
}

fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
		.with_writer(io::stderr)
		.init();

	match run(Args::parse()) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:#}");
			ExitCode::from(2)
		}
	}
}

fn run(args: Args) -> Result<ExitCode> {
	let config = config::load_config(&args)?;
	debug!(algorithm = %config.algorithm, "resolved configuration");

	let stdin = io::stdin();
	let mut stdout = io::stdout().lock();

	match args.command {
		Command::Hash => {
			let hasher = config.password_hasher()?;
			let password = read_secret(&mut stdin.lock())?;
			let hash = hasher.hash(&password)?;
			writeln!(stdout, "{hash}")?;
			Ok(ExitCode::SUCCESS)
		}
		Command::Verify { hash } => {
			let hasher = config.hasher_set()?;
			let password = read_secret(&mut stdin.lock())?;
			verify(&hasher, &password, &hash)
		}
		Command::NeedsRehash { hash } => {
			let hasher = config.hasher_set()?;
			let stale = hasher.needs_rehash(&hash)?;
			writeln!(stdout, "{stale}")?;
			Ok(if stale {
				ExitCode::SUCCESS
			} else {
				ExitCode::from(1)
			})
		}
		Command::Token {
			command: TokenCommand::Generate { length },
		} => {
			let length = length.unwrap_or(config.token_bytes);
			let token = TokenIssuer::new().generate(length)?;
			writeln!(stdout, "token: {}", token.plaintext.expose())?;
			writeln!(stdout, "lookup_hash: {}", token.lookup_hash)?;
			Ok(ExitCode::SUCCESS)
		}
		Command::Token {
			command: TokenCommand::Hash,
		} => {
			let token = read_secret(&mut stdin.lock())?;
			writeln!(stdout, "{}", hash_token(&token))?;
			Ok(ExitCode::SUCCESS)
		}
	}
}

fn verify(hasher: &HasherSet, password: &str, hash: &str) -> Result<ExitCode> {
	match hasher.verify(password, hash) {
		Ok(true) => Ok(ExitCode::SUCCESS),
		Ok(false) => Ok(ExitCode::from(1)),
		Err(e @ CryptoError::VersionMismatch { .. }) => {
			warn!("stored hash needs migration");
			Err(e).context("stored hash cannot be verified by this build")
		}
		Err(e) => Err(e).context("failed to verify password"),
	}
}

/// Read one line from `reader` without its trailing newline.
fn read_secret(reader: &mut impl BufRead) -> Result<Zeroizing<String>> {
	let mut line = Zeroizing::new(String::new());
	let read = reader
		.read_line(&mut line)
		.context("failed to read secret from stdin")?;
	if read == 0 {
		bail!("no input on stdin");
	}
	let trimmed = line.trim_end_matches(['\r', '\n']).len();
	line.truncate(trimmed);
	Ok(line)
}
