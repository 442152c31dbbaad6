//! Named colors used by the pattern library.
//!
//! The device drives each channel fully on or fully off, so every color here is
//! a corner of the RGB cube. Components are `Srgb<f32>` in the 0.0-1.0 range;
//! [`RgbLed`](crate::RgbLed) implementations convert them to pin levels or PWM
//! duty cycles.

use palette::Srgb;

/// All channels off.
pub const COLOR_OFF: Srgb = Srgb::new(0.0, 0.0, 0.0);

pub const RED: Srgb = Srgb::new(1.0, 0.0, 0.0);
pub const GREEN: Srgb = Srgb::new(0.0, 1.0, 0.0);
pub const BLUE: Srgb = Srgb::new(0.0, 0.0, 1.0);

/// Green + blue.
pub const CYAN: Srgb = Srgb::new(0.0, 1.0, 1.0);
/// Red + blue.
pub const MAGENTA: Srgb = Srgb::new(1.0, 0.0, 1.0);
/// Red + green.
pub const YELLOW: Srgb = Srgb::new(1.0, 1.0, 0.0);
pub const WHITE: Srgb = Srgb::new(1.0, 1.0, 1.0);
