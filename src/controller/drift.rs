//! Drifting camera state
//!
//! The camera glides along a random velocity and is thrown to a new random
//! position every reset interval. All times are milliseconds on the frame
//! clock.

use bevy::{
    math::{Quat, Vec3},
    prelude::{Resource, Transform},
};
use rand::{rngs::StdRng, Rng, SeedableRng};

use crate::config::{camera::*, CameraConfig};

/// Position and velocity of the camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: Vec3,
    /// Each component lies in [0, 1]
    pub velocity: Vec3,
}

/// Ranges and pacing of the drift
#[derive(Debug, Clone)]
pub struct DriftSettings {
    pub x_range: (i32, i32),
    pub y_range: (i32, i32),
    pub z_range: (i32, i32),
    pub speed: f32,
    pub reset_interval_ms: f64,
}

impl From<&CameraConfig> for DriftSettings {
    fn from(config: &CameraConfig) -> Self {
        Self {
            x_range: config.x_range,
            y_range: config.y_range,
            z_range: config.z_range,
            speed: config.speed,
            reset_interval_ms: config.reset_interval_ms,
        }
    }
}

impl Default for DriftSettings {
    fn default() -> Self {
        Self::from(&CameraConfig::default())
    }
}

/// Outcome of one frame step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftStep {
    pub delta_ms: f64,
    /// Camera placement to render this frame, taken before any reset
    pub rendered: Transform,
    /// The camera was re-randomized after the frame was placed
    pub reset: bool,
}

#[derive(Resource)]
pub struct CameraDrift {
    state: CameraState,
    target: Vec3,
    settings: DriftSettings,
    last_render_ms: f64,
    last_change_ms: f64,
    rng: StdRng,
}

impl CameraDrift {
    /// Create a drift whose first state is already randomized at `now_ms`
    pub fn new(settings: DriftSettings, target: Vec3, rng: StdRng, now_ms: f64) -> Self {
        let mut drift = Self {
            state: CameraState {
                position: Vec3::ZERO,
                velocity: Vec3::ZERO,
            },
            target,
            settings,
            last_render_ms: now_ms,
            last_change_ms: now_ms,
            rng,
        };
        drift.randomize(now_ms);
        drift
    }

    pub fn from_config(config: &CameraConfig, now_ms: f64) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(DriftSettings::from(config), Vec3::from(config.target), rng, now_ms)
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    /// Override position and velocity, leaving the timers untouched
    pub fn set_state(&mut self, state: CameraState) {
        self.state = state;
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    pub fn last_render_ms(&self) -> f64 {
        self.last_render_ms
    }

    pub fn last_change_ms(&self) -> f64 {
        self.last_change_ms
    }

    /// Draw a new position from the integer ranges and a velocity in [0, 1]
    pub fn randomize(&mut self, now_ms: f64) {
        let s = &self.settings;
        let (x, y, z) = (s.x_range, s.y_range, s.z_range);
        self.state.position = Vec3::new(
            self.rng.random_range(x.0..=x.1) as f32,
            self.rng.random_range(y.0..=y.1) as f32,
            self.rng.random_range(z.0..=z.1) as f32,
        );
        self.state.velocity = Vec3::new(
            self.rng.random_range(0.0..=1.0),
            self.rng.random_range(0.0..=1.0),
            self.rng.random_range(0.0..=1.0),
        );
        self.last_change_ms = self.last_change_ms.max(now_ms);
        log::debug!(
            "camera reset: position {:?} velocity {:?}",
            self.state.position,
            self.state.velocity
        );
    }

    /// Move along the velocity for the time elapsed since the last frame
    ///
    /// Returns the frame delta; a clock that runs backwards counts as zero.
    pub fn advance(&mut self, timestamp_ms: f64) -> f64 {
        let delta_ms = (timestamp_ms - self.last_render_ms).max(0.0);
        self.last_render_ms = self.last_render_ms.max(timestamp_ms);
        self.state.position += self.state.velocity * self.settings.speed * delta_ms as f32;
        delta_ms
    }

    pub fn reset_due(&self, timestamp_ms: f64) -> bool {
        timestamp_ms - self.last_change_ms > self.settings.reset_interval_ms
    }

    /// One frame: advance and aim, then re-randomize when the interval has
    /// elapsed and `allow_reset` is set
    ///
    /// The new random state only shows from the next frame on.
    pub fn step(&mut self, timestamp_ms: f64, allow_reset: bool) -> DriftStep {
        let delta_ms = self.advance(timestamp_ms);
        let rendered = self.transform();
        let reset = allow_reset && self.reset_due(timestamp_ms);
        if reset {
            self.randomize(timestamp_ms);
        }
        DriftStep {
            delta_ms,
            rendered,
            reset,
        }
    }

    /// Camera transform aimed at the fixed target
    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.state.position).looking_at(self.target, Vec3::Y)
    }

    /// Swing the camera around the target; pitch is clamped against the horizon
    pub fn orbit(&mut self, yaw: f32, pitch: f32) {
        let offset = self.state.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }

        let current_pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let pitch = (current_pitch + pitch).clamp(MIN_PITCH, MAX_PITCH) - current_pitch;

        let yawed = Quat::from_rotation_y(yaw) * offset;
        let right = Vec3::Y.cross(yawed).normalize_or_zero();
        let rotated = if right == Vec3::ZERO {
            yawed
        } else {
            Quat::from_axis_angle(right, -pitch) * yawed
        };
        self.state.position = self.target + rotated;
    }

    /// Move toward (positive) or away from the target within the distance limits
    pub fn dolly(&mut self, amount: f32) {
        let offset = self.state.position - self.target;
        let distance = offset.length();
        if distance <= f32::EPSILON {
            return;
        }
        let new_distance = (distance - amount).clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.state.position = self.target + offset * (new_distance / distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drift(seed: u64) -> CameraDrift {
        CameraDrift::new(
            DriftSettings::default(),
            Vec3::ZERO,
            StdRng::seed_from_u64(seed),
            0.0,
        )
    }

    fn assert_in_ranges(state: CameraState) {
        let p = state.position;
        assert!((-200.0..=200.0).contains(&p.x), "x = {}", p.x);
        assert!((300.0..=500.0).contains(&p.y), "y = {}", p.y);
        assert!((-1000.0..=1000.0).contains(&p.z), "z = {}", p.z);
        for v in state.velocity.to_array() {
            assert!((0.0..=1.0).contains(&v), "velocity component {v}");
        }
    }

    #[test]
    fn randomize_stays_within_ranges() {
        let mut d = drift(1);
        for i in 0..1000 {
            d.randomize(i as f64);
            assert_in_ranges(d.state());
            assert_eq!(d.state().position, d.state().position.round());
        }
    }

    #[test]
    fn construction_randomizes() {
        let d = drift(2);
        assert_in_ranges(d.state());
        assert_eq!(d.last_change_ms(), 0.0);
        assert_eq!(d.last_render_ms(), 0.0);
    }

    #[test]
    fn last_change_never_decreases() {
        let mut d = drift(3);
        let mut previous = d.last_change_ms();
        for t in [10.0, 5.0, 20.0, 20.0, 1.0, 300.0] {
            d.randomize(t);
            assert!(d.last_change_ms() >= previous);
            previous = d.last_change_ms();
        }
        assert_eq!(previous, 300.0);
    }

    #[test]
    fn frames_advance_position_by_velocity() {
        let mut d = drift(4);
        d.set_state(CameraState {
            position: Vec3::ZERO,
            velocity: Vec3::X,
        });
        d.step(0.0, true);
        let step = d.step(100.0, true);
        assert_eq!(step.delta_ms, 100.0);
        assert!(!step.reset);
        assert_eq!(d.state().position, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(step.rendered.translation, d.state().position);
    }

    #[test]
    fn interval_elapsed_triggers_reset() {
        let mut d = drift(5);
        d.set_state(CameraState {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
        });
        let mut t = 0.0;
        while t <= 5000.0 {
            assert!(!d.step(t, true).reset, "no reset at {t}");
            t += 1000.0 / 60.0;
        }
        let step = d.step(5001.0, true);
        assert!(step.reset);
        // The reset frame still shows where the camera had drifted to
        assert_eq!(step.rendered.translation, Vec3::ZERO);
        assert_eq!(d.last_change_ms(), 5001.0);
        assert_ne!(d.state().position, Vec3::ZERO);
        assert_in_ranges(d.state());
    }

    #[test]
    fn reset_can_be_suppressed() {
        let mut d = drift(6);
        let before = d.last_change_ms();
        assert!(!d.step(6000.0, false).reset);
        assert_eq!(d.last_change_ms(), before);
    }

    #[test]
    fn backwards_clock_is_a_zero_delta() {
        let mut d = drift(7);
        d.step(500.0, false);
        let before = d.state().position;
        assert_eq!(d.step(400.0, false).delta_ms, 0.0);
        assert_eq!(d.state().position, before);
    }

    #[test]
    fn transform_looks_at_target() {
        let mut d = drift(8);
        d.set_state(CameraState {
            position: Vec3::new(0.0, 400.0, 800.0),
            velocity: Vec3::ZERO,
        });
        let t = d.transform();
        let to_target = (d.target() - t.translation).normalize();
        assert!(t.forward().dot(to_target) > 0.9999);
    }

    #[test]
    fn dolly_is_clamped() {
        let mut d = drift(9);
        d.set_state(CameraState {
            position: Vec3::new(0.0, 0.0, 1000.0),
            velocity: Vec3::ZERO,
        });
        d.dolly(100.0);
        assert!((d.state().position.z - 900.0).abs() < 1e-3);
        d.dolly(10_000.0);
        assert!((d.state().position.length() - MIN_DISTANCE).abs() < 1e-3);
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut d = drift(10);
        let distance = d.state().position.length();
        d.orbit(0.7, 0.2);
        assert!((d.state().position.length() - distance).abs() < 1e-2);
    }
}
