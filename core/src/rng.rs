//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through FieldRng instances derived
//! from the single master seed of the generation parameters.
//!
//! Each sampled dimension gets its own RNG stream, seeded
//! deterministically from (master_seed XOR slot_index). This means:
//!   - Adding a new dimension never changes existing dimensions' streams.
//!   - Each dimension's stream is fully reproducible in isolation.

use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single record dimension.
pub struct FieldRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl FieldRng {
    /// Create a dimension RNG from the master seed and a stable
    /// slot index. The index must never change once assigned.
    pub fn new(master_seed: u64, slot_index: u64) -> Self {
        let derived_seed = master_seed ^ (slot_index.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        use rand::RngCore;
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        use rand::RngCore;
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        use rand::RngCore;
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in [min, max] (both inclusive).
    pub fn uniform_inclusive(&mut self, min: u64, max: u64) -> u64 {
        assert!(min <= max, "min must be <= max");
        let span = max - min;
        if span == u64::MAX {
            return self.next_u64();
        }
        min + self.next_u64_below(span + 1)
    }

    /// Roll a float in [min, max).
    pub fn uniform_f64(&mut self, min: f64, max: f64) -> f64 {
        min + (max - min) * self.next_f64()
    }

    /// Pick an index into a slice of non-negative weights.
    /// Weights need not sum to 1; callers validate that the total is > 0.
    pub fn weighted_index(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        let mut roll = self.next_f64() * total;
        for (i, w) in weights.iter().enumerate() {
            if roll < *w {
                return i;
            }
            roll -= w;
        }
        // Float residue: fall back to the last non-zero weight.
        weights.iter().rposition(|w| *w > 0.0).unwrap_or(0)
    }

    /// Fill a 16-byte buffer, used for seeded dataset identifiers.
    pub fn next_bytes16(&mut self) -> [u8; 16] {
        let hi = self.next_u64().to_be_bytes();
        let lo = self.next_u64().to_be_bytes();
        let mut out = [0u8; 16];
        out[..8].copy_from_slice(&hi);
        out[8..].copy_from_slice(&lo);
        out
    }
}

/// All dimension RNGs for a single generation, indexed by stable slot.
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn for_field(&self, slot: FieldSlot) -> FieldRng {
        FieldRng::new(self.master_seed, slot as u64).with_name(slot.name())
    }
}

/// Stable slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every dimension's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum FieldSlot {
    Timestamp = 0,
    Theater = 1,
    Catalog = 2,
    Channel = 3,
    Team = 4,
    Units = 5,
    Inventory = 6,
    Rating = 7,
    DatasetId = 8,
    // Add new dimensions here, append only.
}

impl FieldSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Timestamp => "timestamp",
            Self::Theater => "theater",
            Self::Catalog => "catalog",
            Self::Channel => "channel",
            Self::Team => "team",
            Self::Units => "units",
            Self::Inventory => "inventory",
            Self::Rating => "rating",
            Self::DatasetId => "dataset_id",
        }
    }
}
