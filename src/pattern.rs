//! Procedural color patterns selected by color code.
//!
//! Provides [`PatternEngine`], which renders a [`ColorCode`] to an RGB LED on
//! every control-loop tick, and the [`RgbLed`] trait for hardware abstraction.
//!
//! The time-driven patterns share one [`PatternState`]: the step timestamp,
//! the two-color toggle and the rainbow index are common to all of them and
//! survive code changes. Switching rapidly between strobes resumes their phase
//! instead of restarting it.

use palette::Srgb;

use crate::colors::{BLUE, COLOR_OFF, CYAN, GREEN, MAGENTA, RED, WHITE, YELLOW};
use crate::config::PatternConfig;
use crate::event::ColorCode;
use crate::time::{TimeDuration, TimeInstant};

/// Hue order of the Fade pattern.
const FADE_HUES: [Srgb; 6] = [RED, YELLOW, GREEN, CYAN, BLUE, MAGENTA];

/// Hue order of the Rainbow pattern.
const RAINBOW_HUES: [Srgb; 6] = [RED, GREEN, BLUE, CYAN, YELLOW, MAGENTA];

/// Color order of the RGBStrobe pattern.
const RGB_STROBE_HUES: [Srgb; 3] = [RED, GREEN, BLUE];

/// Trait for abstracting RGB LED hardware.
///
/// Implement this for your LED hardware (GPIO, PWM, etc.) to allow the
/// pattern engine to drive it.
pub trait RgbLed {
    /// Sets the LED to the specified RGB color.
    ///
    /// Color components are in the range 0.0-1.0. Pin-driven LEDs can treat any
    /// non-zero component as "on"; PWM-driven LEDs can use the value as the
    /// duty cycle. Handle any hardware errors internally - this method cannot fail.
    fn set_color(&mut self, color: Srgb);
}

/// The pattern variants, one per color code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pattern {
    Red,
    Green,
    Blue,
    Cyan,
    Magenta,
    Yellow,
    White,
    /// Six-hue cycle whose step interval sweeps up and down between bounds.
    Fade,
    /// Reserved. Leaves the LED untouched.
    StrobePlus,
    /// Red, green, blue at the step interval.
    RgbStrobe,
    /// Red, green, blue, cyan, yellow, magenta at the step interval.
    Rainbow,
    /// Red / blue alternation.
    Halfstrobe,
    /// Green / red alternation.
    GrStrobe,
    /// Blue / green alternation.
    BgStrobe,
    Off,
}

impl Pattern {
    /// Selects the pattern for a color code. Unmatched codes select `Off`.
    pub fn from_code(code: ColorCode) -> Self {
        match code.0 {
            0 => Pattern::Red,
            1 => Pattern::Green,
            2 => Pattern::Blue,
            3 => Pattern::Cyan,
            4 => Pattern::Magenta,
            5 => Pattern::Yellow,
            6 => Pattern::White,
            7 => Pattern::Fade,
            8 => Pattern::StrobePlus,
            9 => Pattern::RgbStrobe,
            10 => Pattern::Rainbow,
            11 => Pattern::Halfstrobe,
            12 => Pattern::GrStrobe,
            13 => Pattern::BgStrobe,
            _ => Pattern::Off,
        }
    }

    /// Advances the pattern to `now`.
    ///
    /// Returns the color to write, or `None` if the LED should keep its
    /// current output this tick.
    pub fn step<I: TimeInstant>(
        &self,
        state: &mut PatternState<I>,
        config: &PatternConfig,
        now: I,
    ) -> Option<Srgb> {
        let interval = config.step_interval_ms;

        match self {
            Pattern::Red => Some(RED),
            Pattern::Green => Some(GREEN),
            Pattern::Blue => Some(BLUE),
            Pattern::Cyan => Some(CYAN),
            Pattern::Magenta => Some(MAGENTA),
            Pattern::Yellow => Some(YELLOW),
            Pattern::White => Some(WHITE),
            Pattern::Off => Some(COLOR_OFF),
            Pattern::StrobePlus => None,
            Pattern::Fade => {
                state.sweep_fade(config);
                let interval = state.fade_speed_ms;
                state
                    .interval_elapsed(now, interval)
                    .then(|| state.next_rainbow(&FADE_HUES))
            }
            Pattern::RgbStrobe => state.interval_elapsed(now, interval).then(|| {
                let color = RGB_STROBE_HUES[usize::from(state.strobe_index)];
                state.strobe_index = (state.strobe_index + 1) % RGB_STROBE_HUES.len() as u8;
                color
            }),
            Pattern::Rainbow => state
                .interval_elapsed(now, interval)
                .then(|| state.next_rainbow(&RAINBOW_HUES)),
            Pattern::Halfstrobe => state
                .interval_elapsed(now, interval)
                .then(|| state.alternate(RED, BLUE)),
            Pattern::GrStrobe => state
                .interval_elapsed(now, interval)
                .then(|| state.alternate(GREEN, RED)),
            Pattern::BgStrobe => state
                .interval_elapsed(now, interval)
                .then(|| state.alternate(BLUE, GREEN)),
        }
    }
}

/// Direction in which the Fade pattern's interval is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FadeDirection {
    Rising,
    Falling,
}

/// Mutable state shared by the time-driven patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternState<I> {
    /// Time of the last pattern step. `None` until the first step, which fires immediately.
    pub last_step: Option<I>,
    /// Two-color strobe phase.
    pub toggle: bool,
    /// Current Fade step interval.
    pub fade_speed_ms: u32,
    pub fade_direction: FadeDirection,
    /// Position in the six-hue cycle, shared by Fade and Rainbow.
    pub rainbow_index: u8,
    /// Position in the RGBStrobe cycle.
    pub strobe_index: u8,
}

impl<I: TimeInstant> PatternState<I> {
    /// Creates the initial state for `config`.
    pub fn new(config: &PatternConfig) -> Self {
        Self {
            last_step: None,
            toggle: false,
            fade_speed_ms: config.fade_start_ms,
            fade_direction: FadeDirection::Falling,
            rainbow_index: 0,
            strobe_index: 0,
        }
    }

    /// Returns true, and records `now` as the last step, once `interval_ms` has
    /// elapsed since the previous step.
    fn interval_elapsed(&mut self, now: I, interval_ms: u32) -> bool {
        let due = match self.last_step {
            None => true,
            Some(last) => now.duration_since(last).as_millis() >= u64::from(interval_ms),
        };
        if due {
            self.last_step = Some(now);
        }
        due
    }

    /// Moves the Fade interval one unit, reversing once a bound has been reached.
    fn sweep_fade(&mut self, config: &PatternConfig) {
        match self.fade_direction {
            FadeDirection::Falling if self.fade_speed_ms > config.fade_min_ms => {
                self.fade_speed_ms -= 1;
            }
            FadeDirection::Falling => self.fade_direction = FadeDirection::Rising,
            FadeDirection::Rising if self.fade_speed_ms < config.fade_max_ms => {
                self.fade_speed_ms += 1;
            }
            FadeDirection::Rising => self.fade_direction = FadeDirection::Falling,
        }
    }

    fn next_rainbow(&mut self, hues: &[Srgb; 6]) -> Srgb {
        let color = hues[usize::from(self.rainbow_index) % hues.len()];
        self.rainbow_index = (self.rainbow_index + 1) % hues.len() as u8;
        color
    }

    fn alternate(&mut self, first: Srgb, second: Srgb) -> Srgb {
        self.toggle = !self.toggle;
        if self.toggle { first } else { second }
    }
}

/// Renders color codes to a single RGB LED.
///
/// The engine owns the LED and only writes to it when the rendered color
/// changes.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `L` - LED implementation type
pub struct PatternEngine<I: TimeInstant, L: RgbLed> {
    led: L,
    config: PatternConfig,
    state: PatternState<I>,
    pattern: Pattern,
    current_color: Srgb,
}

impl<I: TimeInstant, L: RgbLed> PatternEngine<I, L> {
    /// Creates a new engine with the LED turned off.
    pub fn new(mut led: L, config: PatternConfig) -> Self {
        led.set_color(COLOR_OFF);

        Self {
            led,
            state: PatternState::new(&config),
            config,
            pattern: Pattern::Off,
            current_color: COLOR_OFF,
        }
    }

    /// Renders `code` at `now` and returns the color the LED is showing.
    pub fn render(&mut self, code: ColorCode, now: I) -> Srgb {
        let pattern = Pattern::from_code(code);
        if pattern != self.pattern {
            log::trace!("pattern {:?} -> {:?}", self.pattern, pattern);
            self.pattern = pattern;
        }

        if let Some(color) = pattern.step(&mut self.state, &self.config, now) {
            self.show(color);
        }
        self.current_color
    }

    /// Writes `color` directly, bypassing pattern selection.
    ///
    /// Used for start-up animations and blanking the LED while no timeline is loaded.
    pub fn show(&mut self, color: Srgb) {
        if color != self.current_color {
            self.led.set_color(color);
            self.current_color = color;
        }
    }

    /// Restores all pattern state to its initial values and turns the LED off.
    pub fn reset(&mut self) {
        self.state = PatternState::new(&self.config);
        self.pattern = Pattern::Off;
        self.show(COLOR_OFF);
    }

    /// Returns the current color being displayed on the LED.
    pub fn current_color(&self) -> Srgb {
        self.current_color
    }

    /// Returns the most recently rendered pattern.
    pub fn pattern(&self) -> Pattern {
        self.pattern
    }

    /// Returns the shared pattern state.
    pub fn state(&self) -> &PatternState<I> {
        &self.state
    }

    /// Returns a reference to the LED.
    pub fn led(&self) -> &L {
        &self.led
    }
}
