//! Timeline playback scheduler.
//!
//! Provides [`PlaybackScheduler`], which maps the time elapsed since a playback
//! epoch onto the active event of an [`EventTable`]. The scheduler advances at
//! most one event per tick and never re-synchronizes after falling behind:
//! overrunning an interval restarts the whole table from a fresh epoch.

use crate::event::{ColorCode, EventTable, TIMELINE_CAPACITY};
use crate::time::{TimeDuration, TimeInstant};

/// The current state of a playback scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SchedulerState {
    /// No table loaded. Ticks report [`ColorCode::NONE`].
    Idle,
    /// Cursor advancing through the table.
    Playing,
    /// Cursor reached or overran the end of the table. The next tick restarts
    /// playback from the first event with a fresh epoch.
    Wrapped,
}

/// Position of playback within the loaded table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackCursor<I> {
    /// Start of the current pass through the table.
    pub epoch_start: I,
    /// Index of the next event to be matched against elapsed time.
    pub run_index: usize,
    /// Last resolved color code.
    pub current_signal: ColorCode,
}

/// Replays an [`EventTable`] in a continuous loop.
///
/// Poll [`tick`](Self::tick) once per control-loop iteration with the current
/// time. Poll at least as often as the shortest gap between events, otherwise
/// the scheduler will detect the overrun and restart the table.
///
/// The final event of a table only bounds the interval of the one before it; its
/// own color code is never emitted. A table with a single event therefore never
/// leaves the wrapped state.
///
/// # Type Parameters
/// * `I` - Time instant type
/// * `N` - Maximum number of events in the table
#[derive(Debug, Clone)]
pub struct PlaybackScheduler<I: TimeInstant, const N: usize = TIMELINE_CAPACITY> {
    table: Option<EventTable<N>>,
    epoch_start: Option<I>,
    run_index: usize,
    current_signal: ColorCode,
}

impl<I: TimeInstant, const N: usize> PlaybackScheduler<I, N> {
    /// Creates a new idle scheduler.
    pub fn new() -> Self {
        Self {
            table: None,
            epoch_start: None,
            run_index: 0,
            current_signal: ColorCode::NONE,
        }
    }

    /// Loads a table and starts playing it from `now`. Can be called from any state.
    ///
    /// The current signal is kept until the first event is reached.
    pub fn load(&mut self, table: EventTable<N>, now: I) {
        log::debug!("playback loaded with {} events", table.len());
        self.table = Some(table);
        self.epoch_start = Some(now);
        self.run_index = 0;
    }

    /// Unloads the table and transitions to `Idle`.
    pub fn clear(&mut self) {
        self.table = None;
        self.epoch_start = None;
        self.run_index = 0;
        self.current_signal = ColorCode::NONE;
    }

    /// Advances playback to `now` and returns the active color code.
    ///
    /// Returns [`ColorCode::NONE`] while idle.
    pub fn tick(&mut self, now: I) -> ColorCode {
        let (Some(table), Some(epoch_start)) = (self.table.as_ref(), self.epoch_start) else {
            return ColorCode::NONE;
        };

        let events = table.events();

        // Wrapped: index + 1 must stay in bounds for the interval check below.
        if self.run_index + 2 > events.len() {
            log::debug!("playback wrapped at index {}", self.run_index);
            self.run_index = 0;
            self.epoch_start = Some(now);
            return self.current_signal;
        }

        let elapsed = now.duration_since(epoch_start).as_millis();
        let first = u64::from(events[0].offset_ms);
        let current = &events[self.run_index];
        let start = u64::from(current.offset_ms);
        let end = u64::from(events[self.run_index + 1].offset_ms);

        if elapsed < first {
            // Before the first event: hold.
        } else if start <= elapsed && elapsed <= end {
            self.current_signal = current.code;
            self.run_index += 1;
        } else if elapsed > end {
            log::debug!(
                "playback fell behind at index {} ({} ms > {} ms)",
                self.run_index,
                elapsed,
                end
            );
            self.run_index = events.len();
        }

        self.current_signal
    }

    /// Returns the current state of the scheduler.
    pub fn state(&self) -> SchedulerState {
        match &self.table {
            None => SchedulerState::Idle,
            Some(table) if self.run_index + 2 > table.len() => SchedulerState::Wrapped,
            Some(_) => SchedulerState::Playing,
        }
    }

    /// Returns the playback cursor, or `None` while idle.
    pub fn cursor(&self) -> Option<PlaybackCursor<I>> {
        self.epoch_start.map(|epoch_start| PlaybackCursor {
            epoch_start,
            run_index: self.run_index,
            current_signal: self.current_signal,
        })
    }

    /// Returns the last resolved color code.
    pub fn current_signal(&self) -> ColorCode {
        self.current_signal
    }

    /// Returns a reference to the loaded table, if any.
    pub fn table(&self) -> Option<&EventTable<N>> {
        self.table.as_ref()
    }

    /// Returns true if a table is loaded.
    pub fn is_loaded(&self) -> bool {
        self.table.is_some()
    }
}

impl<I: TimeInstant, const N: usize> Default for PlaybackScheduler<I, N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Event;
    use crate::time::MillisInstant;

    fn table(entries: &[(u32, u8)]) -> EventTable<8> {
        let mut table = EventTable::new();
        for &(offset, code) in entries {
            table.push(Event::new(offset, ColorCode(code)));
        }
        table
    }

    #[test]
    fn idle_reports_no_signal() {
        let mut scheduler = PlaybackScheduler::<MillisInstant, 8>::new();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.tick(MillisInstant(100)), ColorCode::NONE);
        assert!(scheduler.cursor().is_none());
    }

    #[test]
    fn load_resets_cursor_to_now() {
        let mut scheduler = PlaybackScheduler::<MillisInstant, 8>::new();
        scheduler.load(table(&[(0, 1), (100, 2), (200, 3)]), MillisInstant(5000));

        let cursor = scheduler.cursor().unwrap();
        assert_eq!(cursor.epoch_start, MillisInstant(5000));
        assert_eq!(cursor.run_index, 0);
        assert_eq!(scheduler.state(), SchedulerState::Playing);
    }

    #[test]
    fn gap_before_current_event_holds() {
        let mut scheduler = PlaybackScheduler::<MillisInstant, 8>::new();
        scheduler.load(table(&[(100, 1), (300, 2), (400, 3), (500, 4)]), MillisInstant(0));

        assert_eq!(scheduler.tick(MillisInstant(150)), ColorCode(1));
        // Index 1 starts at 300; 200 ms is past the first event but before it.
        assert_eq!(scheduler.tick(MillisInstant(200)), ColorCode(1));
        assert_eq!(scheduler.cursor().unwrap().run_index, 1);
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut scheduler = PlaybackScheduler::<MillisInstant, 8>::new();
        scheduler.load(table(&[(0, 1), (100, 2), (200, 3)]), MillisInstant(0));
        scheduler.tick(MillisInstant(10));
        scheduler.clear();

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert_eq!(scheduler.current_signal(), ColorCode::NONE);
    }
}
