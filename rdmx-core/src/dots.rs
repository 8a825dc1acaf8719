//! Random-dot kinematogram.
//!
//! A fixed set of "signal" dots drifts in the trial direction while the rest
//! move in their own random directions. Dots live for a limited number of
//! frames and are respawned inside the circular aperture when they expire
//! or drift out of it. Coordinates are relative to the aperture center with
//! y pointing up.

use crate::metric::Angle;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DotFieldParams {
    pub n_dots: usize,
    /// Aperture diameter in pixels.
    pub field_size: f32,
    pub dot_size: f32,
    /// Pixels per frame.
    pub speed: f32,
    /// Frames a dot survives before being respawned.
    pub lifetime: u32,
}

impl Default for DotFieldParams {
    fn default() -> Self {
        Self {
            n_dots: 250,
            field_size: 300.0,
            dot_size: 6.0,
            speed: 1.5,
            lifetime: 40,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dot {
    pub x: f32,
    pub y: f32,
    heading: f32,
    life: f32,
    signal: bool,
}

impl Dot {
    pub fn is_signal(&self) -> bool {
        self.signal
    }
}

#[derive(Debug, Clone)]
pub struct DotField {
    params: DotFieldParams,
    dots: Vec<Dot>,
    direction: f32,
    coherence: f64,
}

impl DotField {
    pub fn new<R: Rng>(params: DotFieldParams, rng: &mut R) -> Self {
        let radius = params.field_size * 0.5;
        let dots = (0..params.n_dots)
            .map(|_| {
                let (x, y) = random_in_disc(radius, rng);
                Dot {
                    x,
                    y,
                    heading: rng.random_range(0.0..TAU),
                    life: rng.random::<f32>() * params.lifetime as f32,
                    signal: false,
                }
            })
            .collect();
        Self {
            params,
            dots,
            direction: 0.0,
            coherence: 0.0,
        }
    }

    /// Points the signal dots at `direction` and re-draws which dots carry
    /// the signal. The first `floor(coherence * n)` dots are signal dots and
    /// stay so until the next call.
    pub fn set_motion<R: Rng>(&mut self, direction: Angle, coherence: f64, rng: &mut R) {
        self.direction = direction.radians();
        self.coherence = coherence.clamp(0.0, 1.0);
        let n_signal = signal_count(self.params.n_dots, self.coherence);
        for (i, dot) in self.dots.iter_mut().enumerate() {
            dot.signal = i < n_signal;
            dot.heading = if dot.signal {
                self.direction
            } else {
                rng.random_range(0.0..TAU)
            };
        }
    }

    /// Advances every dot by one frame.
    pub fn step<R: Rng>(&mut self, rng: &mut R) {
        let radius = self.params.field_size * 0.5;
        let r2 = radius * radius;
        let speed = self.params.speed;
        let lifetime = self.params.lifetime as f32;

        for dot in &mut self.dots {
            dot.life -= 1.0;
            if dot.life <= 0.0 {
                (dot.x, dot.y) = random_in_disc(radius, rng);
                dot.life = lifetime;
                continue;
            }
            dot.x += speed * dot.heading.cos();
            dot.y += speed * dot.heading.sin();
            if dot.x * dot.x + dot.y * dot.y > r2 {
                (dot.x, dot.y) = random_in_disc(radius, rng);
            }
        }
    }

    pub fn dots(&self) -> &[Dot] {
        &self.dots
    }

    pub fn params(&self) -> &DotFieldParams {
        &self.params
    }

    pub fn coherence(&self) -> f64 {
        self.coherence
    }

    pub fn direction_radians(&self) -> f32 {
        self.direction
    }

    pub fn signal_dots(&self) -> usize {
        self.dots.iter().filter(|d| d.signal).count()
    }
}

/// Number of signal dots for a coherence level (truncated).
pub fn signal_count(n_dots: usize, coherence: f64) -> usize {
    ((coherence.clamp(0.0, 1.0) * n_dots as f64).floor() as usize).min(n_dots)
}

fn random_in_disc<R: Rng>(radius: f32, rng: &mut R) -> (f32, f32) {
    let r = radius * rng.random::<f32>().sqrt();
    let theta = rng.random_range(0.0..TAU);
    (r * theta.cos(), r * theta.sin())
}
