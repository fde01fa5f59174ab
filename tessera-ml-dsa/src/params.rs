//! ML-DSA parameter sets
//!
//! A parameter set is a plain `Copy` value chosen once when a verifier is
//! built, so several security levels can be used side by side.

use crate::reduce::Q;
use tessera_core::{Error, Result};

/// Dropped bits from t (Power2Round).
pub const D: u32 = 13;

/// Largest tau the 64 challenge sign bits can serve.
pub const MAX_TAU: usize = 64;

/// Seed size in bytes (rho, commitment seed prefix).
pub const SEED_BYTES: usize = 32;

/// Size of tr = H(pk) and of the message representative mu.
pub const CRH_BYTES: usize = 64;

/// Packed t1 polynomial: 256 coefficients of 10 bits.
pub const POLY_T1_PACKED_BYTES: usize = 320;

/// gamma2 for ML-DSA-44.
pub const GAMMA2_88: i32 = (Q - 1) / 88;

/// gamma2 for ML-DSA-65 and ML-DSA-87.
pub const GAMMA2_32: i32 = (Q - 1) / 32;

/// An immutable ML-DSA parameter set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParameterSet {
    /// Display name, e.g. `"ML-DSA-65"`.
    pub name: &'static str,
    /// Rows of the public matrix (commitment dimension).
    pub k: usize,
    /// Columns of the public matrix (response dimension).
    pub l: usize,
    /// Secret key coefficient range. Only used by signers.
    pub eta: usize,
    /// Number of nonzero challenge coefficients.
    pub tau: usize,
    /// tau * eta.
    pub beta: i32,
    /// Masking range for the response.
    pub gamma1: i32,
    /// Low-order rounding range.
    pub gamma2: i32,
    /// Maximum number of hint bits.
    pub omega: usize,
    /// Length of the commitment hash cTilde.
    pub c_tilde_bytes: usize,
}

/// ML-DSA-44 (NIST security category 2).
pub const ML_DSA_44: ParameterSet = ParameterSet {
    name: "ML-DSA-44",
    k: 4,
    l: 4,
    eta: 2,
    tau: 39,
    beta: 78,
    gamma1: 1 << 17,
    gamma2: GAMMA2_88,
    omega: 80,
    c_tilde_bytes: 32,
};

/// ML-DSA-65 (NIST security category 3).
pub const ML_DSA_65: ParameterSet = ParameterSet {
    name: "ML-DSA-65",
    k: 6,
    l: 5,
    eta: 4,
    tau: 49,
    beta: 196,
    gamma1: 1 << 19,
    gamma2: GAMMA2_32,
    omega: 55,
    c_tilde_bytes: 48,
};

/// ML-DSA-87 (NIST security category 5).
pub const ML_DSA_87: ParameterSet = ParameterSet {
    name: "ML-DSA-87",
    k: 8,
    l: 7,
    eta: 2,
    tau: 60,
    beta: 120,
    gamma1: 1 << 19,
    gamma2: GAMMA2_32,
    omega: 75,
    c_tilde_bytes: 64,
};

/// All shipped parameter sets.
pub const ALL: [ParameterSet; 3] = [ML_DSA_44, ML_DSA_65, ML_DSA_87];

impl ParameterSet {
    /// Look up a parameter set by name.
    ///
    /// Accepts `"ML-DSA-65"`, `"ml-dsa-65"`, `"mldsa65"` and `"65"` style
    /// spellings.
    pub fn from_name(name: &str) -> Option<Self> {
        let digits = name.trim_start_matches(|c: char| !c.is_ascii_digit());
        ALL.into_iter()
            .find(|p| p.name.strip_prefix("ML-DSA-") == Some(digits))
    }

    /// Reject parameter values the decoder and rounding code cannot handle.
    pub fn validate(&self) -> Result<()> {
        if self.gamma1 != 1 << 17 && self.gamma1 != 1 << 19 {
            return Err(Error::UnsupportedGamma1 { gamma1: self.gamma1 });
        }
        if self.gamma2 != GAMMA2_88 && self.gamma2 != GAMMA2_32 {
            return Err(Error::UnsupportedGamma2 { gamma2: self.gamma2 });
        }
        if self.k == 0 || self.l == 0 || self.tau > MAX_TAU || self.omega > u8::MAX as usize {
            return Err(Error::UnsupportedParameterSet);
        }
        Ok(())
    }

    /// Bits per packed response coefficient: 18 or 20.
    pub fn z_bits(&self) -> Result<u32> {
        match self.gamma1 {
            g if g == 1 << 17 => Ok(18),
            g if g == 1 << 19 => Ok(20),
            gamma1 => Err(Error::UnsupportedGamma1 { gamma1 }),
        }
    }

    /// Bits per packed high-bits coefficient: 6 or 4.
    pub fn w1_bits(&self) -> Result<u32> {
        match self.gamma2 {
            GAMMA2_88 => Ok(6),
            GAMMA2_32 => Ok(4),
            gamma2 => Err(Error::UnsupportedGamma2 { gamma2 }),
        }
    }

    /// Packed size of one response polynomial.
    pub fn poly_z_bytes(&self) -> usize {
        if self.gamma1 == 1 << 17 {
            576
        } else {
            640
        }
    }

    /// Packed size of one high-bits polynomial.
    pub fn poly_w1_bytes(&self) -> usize {
        if self.gamma2 == GAMMA2_88 {
            192
        } else {
            128
        }
    }

    /// Packed response vector size.
    pub fn z_bytes(&self) -> usize {
        self.l * self.poly_z_bytes()
    }

    /// Packed hint size: omega index slots plus k row boundaries.
    pub fn hint_bytes(&self) -> usize {
        self.omega + self.k
    }

    /// Packed w1 vector size.
    pub fn w1_bytes(&self) -> usize {
        self.k * self.poly_w1_bytes()
    }

    /// Total signature size.
    pub fn signature_bytes(&self) -> usize {
        self.c_tilde_bytes + self.z_bytes() + self.hint_bytes()
    }

    /// Total public key size.
    pub fn public_key_bytes(&self) -> usize {
        SEED_BYTES + self.k * POLY_T1_PACKED_BYTES
    }

    /// Largest centered response magnitude a valid signature may carry.
    pub fn z_bound(&self) -> i32 {
        self.gamma1 - self.beta
    }
}

impl core::fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}
