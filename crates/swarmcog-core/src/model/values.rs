use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Probabilistic belief attached to an atom: (strength, confidence) in [0, 1]².
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TruthValue {
    pub strength: f64,
    pub confidence: f64,
}

impl TruthValue {
    /// Build a truth value, clamping both components into [0, 1].
    pub fn new(strength: f64, confidence: f64) -> Self {
        Self {
            strength: clamp_unit(strength),
            confidence: clamp_unit(confidence),
        }
    }

    /// Build a truth value, rejecting components outside [0, 1].
    pub fn try_new(strength: f64, confidence: f64) -> Result<Self, CoreError> {
        let tv = Self {
            strength,
            confidence,
        };
        tv.validate()?;
        Ok(tv)
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        check_range("truth strength", self.strength, 0.0, 1.0)?;
        check_range("truth confidence", self.confidence, 0.0, 1.0)
    }

    /// Approximate equality used by tests and change detection.
    pub fn approx_eq(&self, other: &TruthValue) -> bool {
        (self.strength - other.strength).abs() < 1e-6
            && (self.confidence - other.confidence).abs() < 1e-6
    }
}

impl Default for TruthValue {
    fn default() -> Self {
        Self {
            strength: 0.5,
            confidence: 0.0,
        }
    }
}

/// Short, long and very-long term importance of an atom.
///
/// `sti` and `lti` live in [-1, 1], `vlti` in [0, 1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AttentionValue {
    pub sti: f64,
    pub lti: f64,
    pub vlti: f64,
}

impl AttentionValue {
    /// Build an attention value, clamping each component into its range.
    pub fn new(sti: f64, lti: f64, vlti: f64) -> Self {
        Self {
            sti: clamp_signed(sti),
            lti: clamp_signed(lti),
            vlti: clamp_unit(vlti),
        }
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        check_range("attention sti", self.sti, -1.0, 1.0)?;
        check_range("attention lti", self.lti, -1.0, 1.0)?;
        check_range("attention vlti", self.vlti, 0.0, 1.0)
    }

    /// Combined importance used for ranking.
    pub fn importance(&self) -> f64 {
        self.sti + self.lti + self.vlti
    }

    /// One decay step. Each term feeds the next using its already-decayed value.
    pub fn decayed(&self) -> Self {
        let sti = self.sti * 0.99;
        let lti = self.lti * 0.999 + sti * 0.001;
        let vlti = self.vlti * 0.9999 + lti * 0.0001;
        Self::new(sti, lti, vlti)
    }

    /// Apply deltas and clamp back into range.
    pub fn stimulated(&self, sti_delta: f64, lti_delta: f64, vlti_delta: f64) -> Self {
        Self::new(
            self.sti + sti_delta,
            self.lti + lti_delta,
            self.vlti + vlti_delta,
        )
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(0.0, 1.0)
    }
}

fn clamp_signed(v: f64) -> f64 {
    if v.is_nan() {
        0.0
    } else {
        v.clamp(-1.0, 1.0)
    }
}

fn check_range(what: &str, value: f64, min: f64, max: f64) -> Result<(), CoreError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidArgument(format!(
            "{what} must be within [{min}, {max}], got {value}"
        )))
    }
}
