//! Platform abstraction layer
//!
//! Hosts own the actual event listeners, timers and display. What they
//! hand to the core each frame is normalised here:
//! - Motion samples (accelerometer or orientation) to gravity
//! - Arrow-key state to gravity

pub mod input;

pub use input::{InputMapper, KeyState, MotionCapability, MotionSample, Tilt};
