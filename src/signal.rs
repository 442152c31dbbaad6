//! Control inputs raised from interrupt context.
//!
//! Interrupt handlers call [`ControlSignals::raise`]; the control loop drains
//! the flags once per iteration with [`ControlSignals::take`]. All inputs share
//! one debounce window, measured on a wrapping 32-bit millisecond counter.
//!
//! State is guarded by a `critical_section::Mutex`, so the debounce check and
//! the flag update happen as one step even if a second interrupt nests inside
//! the first. The target must provide a `critical-section` implementation
//! (for Cortex-M, `cortex-m` with `critical-section-single-core`).

use core::cell::Cell;
use core::fmt;
use critical_section::Mutex;

/// A physical control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlInput {
    /// Push button. Reserved, only logged.
    Button,
    /// Advance to the next stored timeline slot and stop following the server.
    SlotSwitch,
    /// Follow the server again and re-fetch the active timeline.
    FetchSwitch,
}

/// Inputs accepted since the last [`ControlSignals::take`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingSignals {
    pub button: bool,
    pub slot_switch: bool,
    pub fetch_switch: bool,
}

impl PendingSignals {
    /// Returns true if no input is pending.
    pub fn is_empty(&self) -> bool {
        !(self.button || self.slot_switch || self.fetch_switch)
    }
}

/// Debounced flag set written by interrupt handlers.
///
/// `const`-constructible so it can live in a `static` shared between the
/// interrupt handlers and the control loop.
pub struct ControlSignals {
    pending: Mutex<Cell<PendingSignals>>,
    last_edge_ms: Mutex<Cell<u32>>,
    debounce_ms: u32,
}

impl ControlSignals {
    /// Creates an empty flag set with the given debounce window.
    pub const fn new(debounce_ms: u32) -> Self {
        Self {
            pending: Mutex::new(Cell::new(PendingSignals {
                button: false,
                slot_switch: false,
                fetch_switch: false,
            })),
            last_edge_ms: Mutex::new(Cell::new(0)),
            debounce_ms,
        }
    }

    /// Starts the debounce window at `now_ms`.
    ///
    /// Call once at start-up so edges caused by power-on settling are ignored.
    pub fn arm(&self, now_ms: u32) {
        critical_section::with(|cs| self.last_edge_ms.borrow(cs).set(now_ms));
    }

    /// Records an edge on `input` at `now_ms`.
    ///
    /// Returns false if the edge fell inside the debounce window of the last
    /// accepted edge and was ignored.
    pub fn raise(&self, input: ControlInput, now_ms: u32) -> bool {
        critical_section::with(|cs| {
            let last_edge = self.last_edge_ms.borrow(cs);
            if now_ms.wrapping_sub(last_edge.get()) < self.debounce_ms {
                return false;
            }
            last_edge.set(now_ms);

            let pending = self.pending.borrow(cs);
            let mut flags = pending.get();
            match input {
                ControlInput::Button => flags.button = true,
                ControlInput::SlotSwitch => flags.slot_switch = true,
                ControlInput::FetchSwitch => flags.fetch_switch = true,
            }
            pending.set(flags);
            true
        })
    }

    /// Drains and returns all pending inputs.
    pub fn take(&self) -> PendingSignals {
        critical_section::with(|cs| self.pending.borrow(cs).take())
    }
}

impl fmt::Debug for ControlSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlSignals")
            .field("debounce_ms", &self.debounce_ms)
            .finish_non_exhaustive()
    }
}
