//! Circular error between an instructed direction and a chosen one.
//!
//! Both angles live on the six-way lattice {0, 60, ..., 300}. The signed
//! difference is wrapped into the canonical range (-180, 180], so the
//! opposite target always reads as +180, never -180.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Spacing between neighbouring targets, in degrees.
pub const ANGLE_STEP: u16 = 60;

/// Number of targets on the lattice.
pub const N_TARGETS: usize = 6;

/// Expected share of neighbour errors among all errors when the wrong
/// answer is picked uniformly from the five incorrect targets (2 of 5).
pub const CHANCE_NEIGHBOR_PROPORTION: f64 = 0.4;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AngleError {
    #[error("{0} degrees is not one of the six target directions")]
    OffLattice(i64),
}

/// A direction restricted to the six-way lattice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u16")]
pub struct Angle(u16);

impl Angle {
    pub const ALL: [Angle; N_TARGETS] = [
        Angle(0),
        Angle(60),
        Angle(120),
        Angle(180),
        Angle(240),
        Angle(300),
    ];

    pub fn new(degrees: i64) -> Result<Self, AngleError> {
        if (0..360).contains(&degrees) && degrees % ANGLE_STEP as i64 == 0 {
            Ok(Angle(degrees as u16))
        } else {
            Err(AngleError::OffLattice(degrees))
        }
    }

    pub fn degrees(self) -> u16 {
        self.0
    }

    /// Position of this angle in `Angle::ALL`.
    pub fn index(self) -> usize {
        (self.0 / ANGLE_STEP) as usize
    }

    pub fn radians(self) -> f32 {
        (self.0 as f32).to_radians()
    }
}

impl TryFrom<i64> for Angle {
    type Error = AngleError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Angle::new(value)
    }
}

impl From<Angle> for u16 {
    fn from(angle: Angle) -> Self {
        angle.0
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Signed shortest angular difference `response - target`, in (-180, 180].
pub fn delta(target: Angle, response: Angle) -> i16 {
    wrap_degrees(response.0 as i32 - target.0 as i32)
}

/// Wraps any integer difference into (-180, 180].
pub fn wrap_degrees(diff: i32) -> i16 {
    let d = diff.rem_euclid(360);
    if d > 180 { (d - 360) as i16 } else { d as i16 }
}

/// Confusion bins for a six-target layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ErrorCategory {
    Correct,
    /// ±60°
    Neighbor,
    /// ±120°
    Distal,
    /// 180°
    Opposite,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 4] = [
        ErrorCategory::Correct,
        ErrorCategory::Neighbor,
        ErrorCategory::Distal,
        ErrorCategory::Opposite,
    ];

    /// Bins a delta. Wraps first, so a raw -180 still lands in `Opposite`.
    /// Returns `None` for deltas that are not multiples of the target spacing.
    pub fn from_delta(delta: i16) -> Option<Self> {
        match wrap_degrees(delta as i32).unsigned_abs() {
            0 => Some(ErrorCategory::Correct),
            60 => Some(ErrorCategory::Neighbor),
            120 => Some(ErrorCategory::Distal),
            180 => Some(ErrorCategory::Opposite),
            _ => None,
        }
    }

    pub fn classify(target: Angle, response: Angle) -> Self {
        match delta(target, response).unsigned_abs() {
            0 => ErrorCategory::Correct,
            60 => ErrorCategory::Neighbor,
            120 => ErrorCategory::Distal,
            _ => ErrorCategory::Opposite,
        }
    }

    pub fn is_error(self) -> bool {
        self != ErrorCategory::Correct
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorCategory::Correct => "Correct (Target)",
            ErrorCategory::Neighbor => "Neighbor Error (±60°)",
            ErrorCategory::Distal => "Distal Error (±120°)",
            ErrorCategory::Opposite => "Opposite Error (180°)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_rejects_off_grid_angles() {
        assert!(Angle::new(0).is_ok());
        assert!(Angle::new(300).is_ok());
        assert_eq!(Angle::new(360), Err(AngleError::OffLattice(360)));
        assert_eq!(Angle::new(45), Err(AngleError::OffLattice(45)));
        assert_eq!(Angle::new(-60), Err(AngleError::OffLattice(-60)));
    }

    #[test]
    fn delta_stays_in_canonical_range() {
        for t in Angle::ALL {
            assert_eq!(delta(t, t), 0);
            for r in Angle::ALL {
                let d = delta(t, r);
                assert!(d > -180 && d <= 180, "delta({t}, {r}) = {d}");
            }
        }
    }

    #[test]
    fn categories_partition_all_pairs() {
        let mut counts = [0usize; 4];
        for t in Angle::ALL {
            for r in Angle::ALL {
                let d = delta(t, r);
                assert!(matches!(d.unsigned_abs(), 0 | 60 | 120 | 180));
                let cat = ErrorCategory::classify(t, r);
                assert_eq!(ErrorCategory::from_delta(d), Some(cat));
                counts[cat as usize] += 1;
            }
        }
        assert_eq!(counts, [6, 12, 12, 6]);
    }

    #[test]
    fn minus_180_is_the_opposite_bin() {
        assert_eq!(wrap_degrees(-180), 180);
        assert_eq!(wrap_degrees(180), 180);
        assert_eq!(ErrorCategory::from_delta(-180), Some(ErrorCategory::Opposite));
        // 0 -> 180 and 180 -> 0 both read +180
        let zero = Angle::new(0).unwrap();
        let half = Angle::new(180).unwrap();
        assert_eq!(delta(zero, half), 180);
        assert_eq!(delta(half, zero), 180);
    }

    #[test]
    fn wrap_handles_large_differences() {
        assert_eq!(wrap_degrees(300), -60);
        assert_eq!(wrap_degrees(-300), 60);
        assert_eq!(wrap_degrees(-240), 120);
        assert_eq!(wrap_degrees(720), 0);
    }

    #[test]
    fn off_step_delta_has_no_category() {
        assert_eq!(ErrorCategory::from_delta(30), None);
    }
}
