//! Tilt and keyboard input mapping
//!
//! Turns raw device samples into a gravity vector. The host polls its most
//! recent motion sample once per frame and hands it over; nothing here is
//! event driven or queued.
//!
//! Tilt is first expressed in degrees (`x` roll, `y` pitch where lying flat
//! reads about -90), then a deliberately narrow window of it is mapped to
//! gravity so small wrist movements give fine control.

use glam::Vec2;

use crate::consts::EARTH_GRAVITY;
use crate::settings::AccelConvention;

/// One raw reading from the host's motion sensors
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionSample {
    /// Acceleration including gravity (devicemotion-style)
    Acceleration { x: f32, y: f32, z: f32 },
    /// Absolute orientation angles in degrees (deviceorientation-style)
    Orientation { alpha: f32, beta: f32, gamma: f32 },
}

/// Device tilt in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tilt {
    pub x: f32,
    pub y: f32,
}

/// Pitch window that produces gravity; everything outside is clamped
pub const TILT_Y_RANGE: (f32, f32) = (-100.0, -80.0);
/// Roll window that produces gravity
pub const TILT_X_RANGE: (f32, f32) = (-10.0, 10.0);

/// Round to the nearest integer, halves toward positive infinity
#[inline]
fn round_half_up(v: f32) -> f32 {
    (v + 0.5).floor()
}

/// Convert a sample to tilt degrees. Returns `None` for non-finite input.
pub fn tilt_from_sample(sample: MotionSample, convention: AccelConvention) -> Option<Tilt> {
    let tilt = match sample {
        MotionSample::Acceleration { x, y, z } => {
            // z tells whether the screen faces up or down
            let facing_up = if z > 0.0 { 1.0 } else { -1.0 };
            match convention {
                AccelConvention::GeckoLegacy => Tilt {
                    x: round_half_up(x * -90.0),
                    y: round_half_up(y * 90.0) - 90.0,
                },
                AccelConvention::Standard => Tilt {
                    x: round_half_up(x / EARTH_GRAVITY * -90.0),
                    y: round_half_up((y + EARTH_GRAVITY) / EARTH_GRAVITY * 90.0 * facing_up),
                },
            }
        }
        MotionSample::Orientation { beta, gamma, .. } => Tilt {
            x: -gamma,
            y: beta - 90.0,
        },
    };

    if tilt.x.is_finite() && tilt.y.is_finite() {
        Some(tilt)
    } else {
        None
    }
}

/// Map tilt degrees to world gravity
pub fn gravity_from_tilt(tilt: Tilt) -> Vec2 {
    let y = tilt.y.clamp(TILT_Y_RANGE.0, TILT_Y_RANGE.1);
    let x = tilt.x.clamp(TILT_X_RANGE.0, TILT_X_RANGE.1);
    Vec2::new(-x, 90.0 + y)
}

/// Which sensor API the host exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionCapability {
    /// Acceleration samples are available
    Motion,
    /// Only orientation angles are available
    Orientation,
    /// No sensors: the player steers with the keyboard
    #[default]
    Unsupported,
}

/// Sample-to-gravity mapper for one host
#[derive(Debug, Clone, Copy, Default)]
pub struct InputMapper {
    pub capability: MotionCapability,
    pub convention: AccelConvention,
}

impl InputMapper {
    pub fn new(capability: MotionCapability, convention: AccelConvention) -> Self {
        Self {
            capability,
            convention,
        }
    }

    /// False means the host must fall back to keys and show a
    /// "no orientation support" hint
    pub fn supports_orientation(&self) -> bool {
        self.capability != MotionCapability::Unsupported
    }

    /// Whether samples of this kind come from the sensor API the host
    /// declared
    pub fn accepts(&self, sample: &MotionSample) -> bool {
        matches!(
            (self.capability, sample),
            (MotionCapability::Motion, MotionSample::Acceleration { .. })
                | (MotionCapability::Orientation, MotionSample::Orientation { .. })
        )
    }

    /// Gravity for a sample, or `None` if the sample is unusable or does
    /// not match the host's sensor API
    pub fn map(&self, sample: MotionSample) -> Option<Vec2> {
        if !self.accepts(&sample) {
            log::debug!("Ignoring {sample:?} for {:?} host", self.capability);
            return None;
        }
        match tilt_from_sample(sample, self.convention) {
            Some(tilt) => Some(gravity_from_tilt(tilt)),
            None => {
                log::debug!("Dropping non-finite motion sample {sample:?}");
                None
            }
        }
    }
}

/// Arrow-key state for keyboard steering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl KeyState {
    /// Apply held keys to the current gravity.
    ///
    /// Keys are sticky: releasing a key keeps the last gravity. Up wins
    /// over down and right over left when both are held. A key only acts
    /// while the gravity on that axis is under `ceiling` in the direction
    /// it would push against.
    pub fn steer(&self, current: Vec2, step: f32, ceiling: f32) -> Vec2 {
        let mut gravity = current;

        if self.up && gravity.y < ceiling {
            gravity.y = -step;
        } else if self.down && gravity.y > -ceiling {
            gravity.y = step;
        }

        if self.right && gravity.x < ceiling {
            gravity.x = -step;
        } else if self.left && gravity.x > -ceiling {
            gravity.x = step;
        }

        gravity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clamp_boundaries() {
        let g = gravity_from_tilt(Tilt { x: 0.0, y: -70.0 });
        assert_eq!(g.y, 10.0);
        let g = gravity_from_tilt(Tilt { x: 0.0, y: -110.0 });
        assert_eq!(g.y, -10.0);
        let g = gravity_from_tilt(Tilt { x: 15.0, y: -90.0 });
        assert_eq!(g.x, -10.0);
        assert_eq!(g.y, 0.0);
    }

    #[test]
    fn test_flat_device_means_no_gravity() {
        // Lying flat, face up: only z sees gravity
        let sample = MotionSample::Acceleration {
            x: 0.0,
            y: -EARTH_GRAVITY,
            z: EARTH_GRAVITY,
        };
        let tilt = tilt_from_sample(sample, AccelConvention::Standard).unwrap();
        assert_eq!(tilt.x, 0.0);
        assert_eq!(tilt.y, 0.0);
    }

    #[test]
    fn test_standard_acceleration_path() {
        // Tilted right by a quarter g, pitched toward the player
        let sample = MotionSample::Acceleration {
            x: EARTH_GRAVITY / 4.0,
            y: -2.0 * EARTH_GRAVITY,
            z: -1.0,
        };
        let tilt = tilt_from_sample(sample, AccelConvention::Standard).unwrap();
        assert_eq!(tilt.x, -22.0); // -22.5 rounds up
        // ((y + g) / g) * 90 * facing = (-1) * 90 * (-1)
        assert_eq!(tilt.y, 90.0);
    }

    #[test]
    fn test_gecko_legacy_path() {
        let sample = MotionSample::Acceleration {
            x: 0.1,
            y: 0.1,
            z: 1.0,
        };
        let tilt = tilt_from_sample(sample, AccelConvention::GeckoLegacy).unwrap();
        assert_eq!(tilt.x, -9.0);
        assert_eq!(tilt.y, -81.0);
    }

    #[test]
    fn test_orientation_path() {
        let sample = MotionSample::Orientation {
            alpha: 0.0,
            beta: 5.0,
            gamma: -4.0,
        };
        let tilt = tilt_from_sample(sample, AccelConvention::Standard).unwrap();
        assert_eq!(tilt, Tilt { x: 4.0, y: -85.0 });
        assert_eq!(gravity_from_tilt(tilt), Vec2::new(-4.0, 5.0));
    }

    #[test]
    fn test_mapper_unsupported_and_bad_samples() {
        let sample = MotionSample::Orientation {
            alpha: 0.0,
            beta: 0.0,
            gamma: 0.0,
        };
        let none = InputMapper::default();
        assert!(!none.supports_orientation());
        assert_eq!(none.map(sample), None);

        let mapper = InputMapper::new(MotionCapability::Orientation, AccelConvention::Standard);
        assert!(mapper.map(sample).is_some());
        let nan = MotionSample::Orientation {
            alpha: 0.0,
            beta: f32::NAN,
            gamma: 0.0,
        };
        assert_eq!(mapper.map(nan), None);
    }

    #[test]
    fn test_mapper_rejects_other_sensor_kind() {
        let accel = MotionSample::Acceleration {
            x: 0.1,
            y: 0.1,
            z: 1.0,
        };
        let orient = MotionSample::Orientation {
            alpha: 0.0,
            beta: 5.0,
            gamma: -4.0,
        };

        let orientation = InputMapper::new(MotionCapability::Orientation, AccelConvention::Standard);
        assert_eq!(orientation.map(accel), None);
        assert_eq!(orientation.map(orient), Some(Vec2::new(-4.0, 5.0)));

        let motion = InputMapper::new(MotionCapability::Motion, AccelConvention::GeckoLegacy);
        assert_eq!(motion.map(orient), None);
        assert_eq!(motion.map(accel), Some(Vec2::new(9.0, 9.0)));
    }

    #[test]
    fn test_key_steering() {
        let keys = KeyState {
            up: true,
            left: true,
            ..Default::default()
        };
        let g = keys.steer(Vec2::ZERO, 2.5, 10.0);
        assert_eq!(g, Vec2::new(2.5, -2.5));

        // Released keys keep the last gravity
        assert_eq!(KeyState::default().steer(g, 2.5, 10.0), g);

        // Up is ignored while gravity already pulls hard the other way
        let keys = KeyState {
            up: true,
            ..Default::default()
        };
        assert_eq!(keys.steer(Vec2::new(0.0, 10.0), 2.5, 10.0).y, 10.0);
    }

    proptest! {
        #[test]
        fn prop_gravity_stays_in_window(x in -360.0f32..360.0, y in -360.0f32..360.0) {
            let g = gravity_from_tilt(Tilt { x, y });
            prop_assert!((-10.0..=10.0).contains(&g.x));
            prop_assert!((-10.0..=10.0).contains(&g.y));
        }
    }
}
