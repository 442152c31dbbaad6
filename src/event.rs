//! Timeline events and the bounded table that holds them.

use heapless::Vec;

/// Default number of events an [`EventTable`] can hold.
pub const TIMELINE_CAPACITY: usize = 50;

/// A small integer selecting a pattern variant.
///
/// Codes `0..=13` map to patterns (see [`Pattern::from_code`](crate::Pattern::from_code));
/// every other value renders as Off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ColorCode(pub u8);

impl ColorCode {
    /// "No signal" sentinel reported by an idle scheduler. Renders as Off.
    pub const NONE: ColorCode = ColorCode(u8::MAX);

    /// Converts a raw payload component, mapping anything outside `u8` to [`ColorCode::NONE`].
    pub fn from_raw(raw: i64) -> Self {
        u8::try_from(raw).map(ColorCode).unwrap_or(ColorCode::NONE)
    }
}

impl From<u8> for ColorCode {
    fn from(code: u8) -> Self {
        ColorCode(code)
    }
}

impl From<ColorCode> for u8 {
    fn from(code: ColorCode) -> Self {
        code.0
    }
}

/// A single timed color event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Event {
    /// Offset from the start of the timeline, in milliseconds.
    pub offset_ms: u32,

    /// Pattern selector active from this offset.
    pub code: ColorCode,
}

impl Event {
    /// Creates a new event.
    #[inline]
    pub fn new(offset_ms: u32, code: ColorCode) -> Self {
        Self { offset_ms, code }
    }
}

/// An ordered, bounded list of timeline events.
///
/// Tables are normally produced by [`decode`](crate::decode), which sorts the
/// events by offset. Playback assumes offsets are non-decreasing.
///
/// # Type Parameters
/// * `N` - Maximum number of events the table can hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTable<const N: usize = TIMELINE_CAPACITY> {
    events: Vec<Event, N>,
    dropped: usize,
}

impl<const N: usize> EventTable<N> {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            dropped: 0,
        }
    }

    /// Appends an event, or counts it as dropped when the table is full.
    ///
    /// Returns `false` if the event was dropped.
    pub fn push(&mut self, event: Event) -> bool {
        match self.events.push(event) {
            Ok(()) => true,
            Err(_) => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Stably sorts events by offset, ascending.
    pub fn sort_by_offset(&mut self) {
        self.events.sort_by_key(|event| event.offset_ms);
    }

    /// Returns the events in playback order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Returns the event at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Event> {
        self.events.get(index)
    }

    /// Returns the number of events held.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the table holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events discarded because the table was full.
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    /// Returns the maximum number of events this table can hold.
    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<const N: usize> Default for EventTable<N> {
    fn default() -> Self {
        Self::new()
    }
}
