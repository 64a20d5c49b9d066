use std::{fmt, str::FromStr};

use rand::{
    Rng, SeedableRng as _,
    distr::{Distribution, StandardUniform},
};
use rand_pcg::Pcg32;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Distance between the stream positions of consecutive child seeds.
const CHILD_STRIDE: u64 = 1 << 20;

/// Seed for deterministic simulation and permutation draws.
///
/// This is a 128-bit (16-byte) seed used to initialize a [`Pcg32`]. Seeds
/// form a tree: [`child`](Self::child) derives an independent seed for a
/// sub-task (a sweep cell, or one randomness source inside a cell), so any
/// part of a sweep can be recomputed in isolation.
///
/// Seeds are written as 32-character hex strings, both by [`Display`] and when
/// serialized.
///
/// # Example
///
/// ```
/// use permpower_stats::seed::Seed;
/// use rand::Rng as _;
///
/// let seed: Seed = "0123456789abcdeffedcba9876543210".parse().unwrap();
/// let mut a = seed.child(3).rng();
/// let mut b = seed.child(3).rng();
/// assert_eq!(a.random::<u64>(), b.random::<u64>());
/// ```
///
/// [`Display`]: fmt::Display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Seed([u8; 16]);

impl Seed {
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Expands a small integer into a full seed.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Pcg32::seed_from_u64(value).random()
    }

    /// Draws a fresh seed from the thread-local generator.
    #[must_use]
    pub fn random() -> Self {
        rand::rng().random()
    }

    /// Creates the generator initialized by this seed.
    #[must_use]
    pub fn rng(&self) -> Pcg32 {
        Pcg32::from_seed(self.0)
    }

    /// Derives the seed of sub-task `index`.
    ///
    /// Children with different indices start from disjoint positions of this
    /// seed's stream.
    #[must_use]
    pub fn child(&self, index: u64) -> Self {
        let mut rng = self.rng();
        rng.advance(index.wrapping_mul(CHILD_STRIDE));
        rng.random()
    }
}

impl fmt::Display for Seed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", u128::from_be_bytes(self.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("invalid hex: {message}")]
pub struct ParseSeedError {
    message: String,
}

impl FromStr for Seed {
    type Err = ParseSeedError;

    fn from_str(hex_str: &str) -> Result<Self, Self::Err> {
        if hex_str.len() != 32 {
            return Err(ParseSeedError {
                message: format!("expected 32 characters, got {}", hex_str.len()),
            });
        }
        let num = u128::from_str_radix(hex_str, 16).map_err(|e| ParseSeedError {
            message: format!("{hex_str} ({e})"),
        })?;
        Ok(Self(num.to_be_bytes()))
    }
}

impl Serialize for Seed {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Seed {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let hex_str = String::deserialize(deserializer)?;
        hex_str.parse().map_err(serde::de::Error::custom)
    }
}

/// Allows generating random `Seed` values using the standard random distribution.
impl Distribution<Seed> for StandardUniform {
    fn sample<R>(&self, rng: &mut R) -> Seed
    where
        R: Rng + ?Sized,
    {
        Seed(rng.random())
    }
}
