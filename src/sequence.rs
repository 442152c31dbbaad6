//! Short one-shot color sequences.
//!
//! Used for indicator animations that run outside timeline playback, such as
//! the loading animation shown at start-up.

use crate::colors::{BLUE, GREEN, RED};
use crate::time::TimeDuration;
use heapless::Vec;
use palette::Srgb;

/// Duration of each color in the loading animation.
pub const LOADING_STEP_MS: u64 = 500;

/// A single step in a [`Sequence`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequenceStep<D: TimeDuration> {
    /// Color shown for the whole step.
    pub color: Srgb,

    /// Step duration.
    pub duration: D,
}

/// Sequence validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SequenceError {
    /// No steps provided.
    #[error("sequence must have at least one step")]
    EmptySequence,

    /// Sequence capacity exceeded.
    #[error("sequence capacity exceeded")]
    CapacityExceeded,
}

/// A one-shot sequence of solid colors with fixed durations.
///
/// Used for short indicator animations, such as the loading animation shown
/// before the first timeline is available.
///
/// # Type Parameters
/// * `D` - The duration type
/// * `N` - Maximum number of steps this sequence can hold
#[derive(Debug, Clone)]
pub struct Sequence<D: TimeDuration, const N: usize> {
    steps: Vec<SequenceStep<D>, N>,
}

impl<D: TimeDuration, const N: usize> Sequence<D, N> {
    /// Creates a new sequence builder.
    pub fn builder() -> SequenceBuilder<D, N> {
        SequenceBuilder::new()
    }

    /// Returns the color to show `elapsed` after the sequence started.
    ///
    /// # Returns
    /// * `Some(color)` - The color to display at this time
    /// * `None` - The sequence has finished
    pub fn color_at(&self, elapsed: D) -> Option<Srgb> {
        let elapsed_millis = elapsed.as_millis();

        let mut step_end = 0u64;
        for step in &self.steps {
            step_end += step.duration.as_millis();
            if elapsed_millis < step_end {
                return Some(step.color);
            }
        }

        None
    }
}

/// Builder for constructing validated sequences.
#[derive(Debug)]
pub struct SequenceBuilder<D: TimeDuration, const N: usize> {
    steps: Vec<SequenceStep<D>, N>,
}

impl<D: TimeDuration, const N: usize> SequenceBuilder<D, N> {
    /// Creates a new empty sequence builder.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds a step to the sequence.
    ///
    /// # Errors
    /// Returns `CapacityExceeded` if the sequence already holds `N` steps.
    pub fn step(mut self, color: Srgb, duration: D) -> Result<Self, SequenceError> {
        self.steps
            .push(SequenceStep { color, duration })
            .map_err(|_| SequenceError::CapacityExceeded)?;
        Ok(self)
    }

    /// Builds and validates the sequence.
    ///
    /// # Errors
    /// * `EmptySequence` - No steps were added
    pub fn build(self) -> Result<Sequence<D, N>, SequenceError> {
        if self.steps.is_empty() {
            return Err(SequenceError::EmptySequence);
        }

        Ok(Sequence { steps: self.steps })
    }
}

impl<D: TimeDuration, const N: usize> Default for SequenceBuilder<D, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the red, green, blue loading animation shown at start-up.
pub fn loading_sequence<D: TimeDuration>() -> Result<Sequence<D, 3>, SequenceError> {
    let step = D::from_millis(LOADING_STEP_MS);
    Sequence::builder()
        .step(RED, step)?
        .step(GREEN, step)?
        .step(BLUE, step)?
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::MillisDuration;

    #[test]
    fn loading_sequence_shows_each_color_for_one_step() {
        let seq = loading_sequence::<MillisDuration>().unwrap();

        assert_eq!(seq.color_at(MillisDuration(0)), Some(RED));
        assert_eq!(seq.color_at(MillisDuration(499)), Some(RED));
        assert_eq!(seq.color_at(MillisDuration(500)), Some(GREEN));
        assert_eq!(seq.color_at(MillisDuration(1499)), Some(BLUE));
        assert_eq!(seq.color_at(MillisDuration(1500)), None);
    }

    #[test]
    fn builder_rejects_empty_sequence() {
        let result = Sequence::<MillisDuration, 4>::builder().build();
        assert!(matches!(result, Err(SequenceError::EmptySequence)));
    }

    #[test]
    fn builder_rejects_steps_beyond_capacity() {
        let result = Sequence::<MillisDuration, 1>::builder()
            .step(RED, MillisDuration(100))
            .and_then(|b| b.step(GREEN, MillisDuration(100)));
        assert!(matches!(result, Err(SequenceError::CapacityExceeded)));
    }

    #[test]
    fn zero_duration_steps_are_skipped() {
        let seq = Sequence::<MillisDuration, 4>::builder()
            .step(RED, MillisDuration(0))
            .and_then(|b| b.step(BLUE, MillisDuration(100)))
            .and_then(|b| b.build())
            .unwrap();

        assert_eq!(seq.color_at(MillisDuration(0)), Some(BLUE));
        assert_eq!(seq.color_at(MillisDuration(100)), None);
    }
}
