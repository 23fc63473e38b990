// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Injected source of secure random bytes.
//!
//! Salts and token secrets are drawn through [`EntropySource`] rather than a
//! process global, so tests can substitute a deterministic or failing source.
//! Production code uses [`OsEntropy`].

use std::sync::Arc;

use rand::rngs::OsRng;
use rand::RngCore;
use tracing::error;

use crate::error::CryptoError;

/// A source of cryptographically secure random bytes.
///
/// Implementations must be safe for concurrent use. A failure is reported
/// once as [`CryptoError::EntropyFailure`] and never retried.
pub trait EntropySource: Send + Sync {
	fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError>;
}

/// The operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
	fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
		OsRng.try_fill_bytes(dest).map_err(|e| {
			error!(error = %e, len = dest.len(), "OS entropy source failed");
			CryptoError::from(e)
		})
	}
}

impl<E> EntropySource for &E
where
	E: EntropySource + ?Sized,
{
	fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
		(**self).fill(dest)
	}
}

impl<E> EntropySource for Arc<E>
where
	E: EntropySource + ?Sized,
{
	fn fill(&self, dest: &mut [u8]) -> Result<(), CryptoError> {
		(**self).fill(dest)
	}
}


#[cfg(test)]
mod tests {
	use super::testing::*;
	use super::*;

	#[test]
	fn os_entropy_fills_buffer() {
		let mut a = [0u8; 32];
		let mut b = [0u8; 32];
		OsEntropy.fill(&mut a).unwrap();
		OsEntropy.fill(&mut b).unwrap();
		assert_ne!(a, b, "two 32-byte draws should differ");
	}

	#[test]
	fn os_entropy_accepts_empty_buffer() {
		let mut empty = [0u8; 0];
		assert!(OsEntropy.fill(&mut empty).is_ok());
	}

	#[test]
	fn counting_entropy_is_deterministic() {
		let source = CountingEntropy::default();
		let mut buf = [0u8; 4];
		source.fill(&mut buf).unwrap();
		assert_eq!(buf, [0, 1, 2, 3]);
		source.fill(&mut buf).unwrap();
		assert_eq!(buf, [4, 5, 6, 7]);
	}

	#[test]
	fn references_and_arcs_delegate() {
		let source = Arc::new(CountingEntropy::default());
		let mut buf = [0u8; 2];
		(&source).fill(&mut buf).unwrap();
		source.fill(&mut buf).unwrap();
		assert_eq!(buf, [2, 3]);
	}

	#[test]
	fn failing_entropy_reports_entropy_failure() {
		let mut buf = [0u8; 8];
		let err = FailingEntropy.fill(&mut buf).unwrap_err();
		assert!(matches!(err, CryptoError::EntropyFailure(_)));
	}
}
