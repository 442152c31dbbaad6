//! Shared test infrastructure for poi-timeline integration tests

#![allow(dead_code)] // Items used across multiple test files; Rust analyzes per-file

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use palette::Srgb;
use poi_timeline::{
    MillisInstant, RgbLed, Slot, TimeDuration, TimeInstant, TimeSource, TimelineSource,
    TimelineStore,
};

// ============================================================================
// Mock Time Types
// ============================================================================

/// Mock duration type for testing (wraps milliseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestDuration(pub u64);

impl TimeDuration for TestDuration {
    const ZERO: Self = TestDuration(0);

    fn as_millis(&self) -> u64 {
        self.0
    }

    fn from_millis(millis: u64) -> Self {
        TestDuration(millis)
    }
}

/// Mock instant type for testing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TestInstant(pub u64);

impl TimeInstant for TestInstant {
    type Duration = TestDuration;

    fn duration_since(&self, earlier: Self) -> Self::Duration {
        TestDuration(self.0 - earlier.0)
    }
}

// ============================================================================
// Mock LED
// ============================================================================

/// Mock LED that records all color changes for testing.
///
/// Clones share the same history, so a test can keep a handle after moving
/// the LED into an engine or player.
#[derive(Clone, Default)]
pub struct MockLed {
    history: Rc<RefCell<Vec<Srgb>>>,
}

impl MockLed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_color(&self) -> Option<Srgb> {
        self.history.borrow().last().copied()
    }

    pub fn color_history(&self) -> Vec<Srgb> {
        self.history.borrow().clone()
    }

    pub fn write_count(&self) -> usize {
        self.history.borrow().len()
    }
}

impl RgbLed for MockLed {
    fn set_color(&mut self, color: Srgb) {
        self.history.borrow_mut().push(color);
    }
}

// ============================================================================
// Mock Time Source
// ============================================================================

/// Mock time source with controllable time advancement
pub struct MockTimeSource {
    current_time: Cell<MillisInstant>,
}

impl MockTimeSource {
    pub fn new() -> Self {
        Self {
            current_time: Cell::new(MillisInstant(0)),
        }
    }

    /// Advance time by the given number of milliseconds
    pub fn advance(&self, millis: u32) {
        let current = self.current_time.get();
        self.current_time.set(MillisInstant(current.0.wrapping_add(millis)));
    }

    pub fn set_time(&self, millis: u32) {
        self.current_time.set(MillisInstant(millis));
    }
}

impl TimeSource<MillisInstant> for MockTimeSource {
    fn now(&self) -> MillisInstant {
        self.current_time.get()
    }
}

// ============================================================================
// Mock Storage and Server
// ============================================================================

/// In-memory timeline store
#[derive(Default)]
pub struct MockStore {
    pub slots: HashMap<u8, String>,
}

impl MockStore {
    pub fn with(slot: u8, raw: &str) -> Self {
        let mut store = Self::default();
        store.slots.insert(slot, raw.to_string());
        store
    }

    pub fn raw(&self, slot: u8) -> Option<&str> {
        self.slots.get(&slot).map(String::as_str)
    }
}

impl TimelineStore for MockStore {
    fn load(&mut self, slot: Slot) -> Option<String> {
        self.slots.get(&slot.0).cloned()
    }

    fn save(&mut self, slot: Slot, raw: &str) {
        self.slots.insert(slot.0, raw.to_string());
    }
}

/// Scripted timeline server. Unset answers fail with `Offline`.
#[derive(Default)]
pub struct MockSource {
    pub count: Option<u8>,
    pub active: Option<u8>,
    pub timelines: HashMap<u8, String>,
    pub fetches: Vec<u8>,
}

#[derive(Debug)]
pub struct Offline;

impl MockSource {
    pub fn offline() -> Self {
        Self::default()
    }

    pub fn serving(count: u8, active: u8) -> Self {
        Self {
            count: Some(count),
            active: Some(active),
            ..Self::default()
        }
    }

    pub fn timeline(mut self, slot: u8, raw: &str) -> Self {
        self.timelines.insert(slot, raw.to_string());
        self
    }
}

impl TimelineSource for MockSource {
    type Error = Offline;

    fn timeline_count(&mut self) -> Result<u8, Offline> {
        self.count.ok_or(Offline)
    }

    fn active_slot(&mut self) -> Result<Slot, Offline> {
        self.active.map(Slot).ok_or(Offline)
    }

    fn fetch(&mut self, slot: Slot) -> Result<String, Offline> {
        self.fetches.push(slot.0);
        self.timelines.get(&slot.0).cloned().ok_or(Offline)
    }
}

// ============================================================================
// Re-export color constants from library for test convenience
// ============================================================================

#[allow(unused_imports)]
pub use poi_timeline::{BLUE, COLOR_OFF, CYAN, GREEN, MAGENTA, RED, WHITE, YELLOW};

// ============================================================================
// Test Helper Functions
// ============================================================================

/// Compare two colors with floating-point tolerance
pub fn colors_equal(a: Srgb, b: Srgb) -> bool {
    const EPSILON: f32 = 0.001;
    (a.red - b.red).abs() < EPSILON
        && (a.green - b.green).abs() < EPSILON
        && (a.blue - b.blue).abs() < EPSILON
}
