//! The six response targets and the keys that select them.
//!
//! A `Layout` is built once at startup and checked for the ownership
//! invariant: every accepted identifier belongs to exactly one target.

use crate::metric::{Angle, N_TARGETS};
use std::collections::HashMap;
use thiserror::Error;

/// Identifier that ends the whole run. Never owned by a target.
pub const ABORT_KEY: &str = "escape";

/// Identifier used to leave instruction screens.
pub const CONTINUE_KEY: &str = "space";

/// Default distance of the targets from the screen center, in pixels.
pub const DEFAULT_RADIUS: f32 = 250.0;

/// Arrow-key identifiers found in older session files.
pub const LEGACY_ALIASES: &[(&str, u16)] = &[("right", 0), ("left", 180)];

const STANDARD_KEYS: [(u16, &[&str], &str); N_TARGETS] = [
    (0, &["d", "num_6", "6"], "D / 6"),
    (60, &["e", "num_9", "9"], "E / 9"),
    (120, &["q", "w", "num_7", "7"], "Q / 7"),
    (180, &["a", "num_4", "4"], "A / 4"),
    (240, &["z", "num_1", "1"], "Z / 1"),
    (300, &["x", "c", "num_3", "3"], "X / 3"),
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("expected {N_TARGETS} targets, got {0}")]
    TargetCount(usize),
    #[error("angle {0} is used by more than one target")]
    DuplicateAngle(Angle),
    #[error("target at {0} accepts no identifiers")]
    NoIdentifiers(Angle),
    #[error("identifier {identifier:?} is claimed by both {first} and {second}")]
    SharedIdentifier {
        identifier: String,
        first: Angle,
        second: Angle,
    },
    #[error("identifier {0:?} is reserved")]
    ReservedIdentifier(String),
    #[error(transparent)]
    Angle(#[from] crate::metric::AngleError),
}

/// One response direction.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    pub angle: Angle,
    pub keys: Vec<String>,
    pub label: String,
    /// Screen coordinates relative to the center, y pointing up.
    pub position: (f32, f32),
}

impl Target {
    pub fn accepts(&self, identifier: &str) -> bool {
        self.keys.iter().any(|k| k == identifier)
    }
}

#[derive(Debug, Clone)]
pub struct Layout {
    radius: f32,
    targets: Vec<Target>,
    owners: HashMap<String, usize>,
}

impl Layout {
    /// The six-target keyboard layout used by the task.
    pub fn standard(radius: f32) -> Result<Self, LayoutError> {
        let targets = STANDARD_KEYS
            .iter()
            .map(|(deg, keys, label)| {
                let angle = Angle::new(*deg as i64)?;
                Ok(Target {
                    angle,
                    keys: keys.iter().map(|k| k.to_string()).collect(),
                    label: label.to_string(),
                    position: polar(radius, angle),
                })
            })
            .collect::<Result<Vec<_>, LayoutError>>()?;
        Self::from_targets(radius, targets)
    }

    /// The standard layout plus the arrow-key aliases accepted offline.
    pub fn for_analysis() -> Result<Self, LayoutError> {
        Self::standard(DEFAULT_RADIUS)?.with_aliases(LEGACY_ALIASES)
    }

    /// Validates a target list and builds the identifier index.
    pub fn from_targets(radius: f32, mut targets: Vec<Target>) -> Result<Self, LayoutError> {
        if targets.len() != N_TARGETS {
            return Err(LayoutError::TargetCount(targets.len()));
        }
        targets.sort_by_key(|t| t.angle);
        for pair in targets.windows(2) {
            if pair[0].angle == pair[1].angle {
                return Err(LayoutError::DuplicateAngle(pair[0].angle));
            }
        }

        let mut owners: HashMap<String, usize> = HashMap::new();
        for (idx, target) in targets.iter().enumerate() {
            if target.keys.is_empty() {
                return Err(LayoutError::NoIdentifiers(target.angle));
            }
            for key in &target.keys {
                if key == ABORT_KEY || key == CONTINUE_KEY {
                    return Err(LayoutError::ReservedIdentifier(key.clone()));
                }
                if let Some(prev) = owners.insert(key.clone(), idx) {
                    return Err(LayoutError::SharedIdentifier {
                        identifier: key.clone(),
                        first: targets[prev].angle,
                        second: target.angle,
                    });
                }
            }
        }

        Ok(Self {
            radius,
            targets,
            owners,
        })
    }

    /// Returns a copy with extra identifiers attached to existing targets.
    pub fn with_aliases(&self, aliases: &[(&str, u16)]) -> Result<Self, LayoutError> {
        let mut targets = self.targets.clone();
        for (key, deg) in aliases {
            let angle = Angle::new(*deg as i64)?;
            let idx = angle.index();
            targets[idx].keys.push(key.to_string());
        }
        Self::from_targets(self.radius, targets)
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn target(&self, angle: Angle) -> &Target {
        &self.targets[angle.index()]
    }

    /// On-screen coordinate of the target at `degrees`, or `None` when the
    /// angle is not one of the six directions.
    pub fn target_position(&self, degrees: i64) -> Option<(f32, f32)> {
        Angle::new(degrees).ok().map(|a| self.target(a).position)
    }

    /// Index and target owning `identifier`.
    pub fn owner_of(&self, identifier: &str) -> Option<(usize, &Target)> {
        self.owners
            .get(identifier)
            .map(|&idx| (idx, &self.targets[idx]))
    }

    pub fn is_recognized(&self, identifier: &str) -> bool {
        self.owners.contains_key(identifier)
    }

    /// Every identifier that selects a target, in target order.
    pub fn allowed_identifiers(&self) -> Vec<&str> {
        self.targets
            .iter()
            .flat_map(|t| t.keys.iter().map(String::as_str))
            .collect()
    }
}

fn polar(radius: f32, angle: Angle) -> (f32, f32) {
    let theta = angle.radians();
    (radius * theta.cos(), radius * theta.sin())
}
