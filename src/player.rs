//! Control-loop driver tying the timeline, scheduler and pattern engine together.
//!
//! [`Player::poll`] is called once per main-loop iteration. It drains control
//! inputs, (re)loads the timeline for the active slot when none is playing, and
//! otherwise ticks the scheduler and renders the resulting color code.

use crate::colors::COLOR_OFF;
use crate::config::PlayerConfig;
use crate::event::{ColorCode, TIMELINE_CAPACITY};
use crate::loader::{LoadError, Slot, TimelineSource, TimelineStore, load_slot};
use crate::pattern::{PatternEngine, RgbLed};
use crate::scheduler::PlaybackScheduler;
use crate::sequence::{Sequence, loading_sequence};
use crate::signal::ControlSignals;
use crate::time::{TimeInstant, TimeSource};

/// Most server timelines mirrored into the store per refresh.
pub const MAX_SYNCED_SLOTS: u8 = 10;

/// Outcome of a single [`Player::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerStatus {
    /// The loading animation is running.
    Booting,
    /// No usable timeline for the active slot. The LED is off; the next poll retries.
    NeedsData,
    /// A timeline is playing; carries the color code rendered this tick.
    Playing(ColorCode),
}

/// Drives one RGB LED from stored and fetched timelines.
///
/// # Type Parameters
/// * `'t` - Lifetime of the time source and signal references
/// * `I` - Time instant type
/// * `L` - LED implementation type
/// * `T` - Time source implementation type
/// * `S` - Timeline storage implementation type
/// * `F` - Remote timeline source implementation type
/// * `N` - Maximum number of events per timeline
pub struct Player<
    't,
    I: TimeInstant,
    L: RgbLed,
    T: TimeSource<I>,
    S: TimelineStore,
    F: TimelineSource,
    const N: usize = TIMELINE_CAPACITY,
> {
    time_source: &'t T,
    signals: &'t ControlSignals,
    store: S,
    source: F,
    scheduler: PlaybackScheduler<I, N>,
    engine: PatternEngine<I, L>,
    boot: Option<(Sequence<I::Duration, 3>, I)>,
    slot: Slot,
    slot_count: u8,
    follow_server: bool,
    server_reachable: bool,
}

impl<'t, I, L, T, S, F, const N: usize> Player<'t, I, L, T, S, F, N>
where
    I: TimeInstant,
    L: RgbLed,
    T: TimeSource<I>,
    S: TimelineStore,
    F: TimelineSource,
{
    /// Creates a player. The loading animation, if enabled, starts now.
    pub fn new(
        led: L,
        store: S,
        source: F,
        time_source: &'t T,
        signals: &'t ControlSignals,
        config: PlayerConfig,
    ) -> Self {
        let boot = if config.boot_animation {
            match loading_sequence() {
                Ok(sequence) => Some((sequence, time_source.now())),
                Err(err) => {
                    log::warn!("boot animation disabled: {}", err);
                    None
                }
            }
        } else {
            None
        };

        Self {
            time_source,
            signals,
            store,
            source,
            scheduler: PlaybackScheduler::new(),
            engine: PatternEngine::new(led, config.pattern),
            boot,
            slot: Slot(config.initial_slot),
            slot_count: config.slot_count,
            follow_server: config.follow_server,
            server_reachable: true,
        }
    }

    /// Runs one control-loop iteration.
    pub fn poll(&mut self) -> PlayerStatus {
        self.handle_signals();

        let now = self.time_source.now();

        let boot_color = self
            .boot
            .as_ref()
            .map(|(sequence, started)| sequence.color_at(now.duration_since(*started)));
        match boot_color {
            Some(Some(color)) => {
                self.engine.show(color);
                return PlayerStatus::Booting;
            }
            Some(None) => {
                self.engine.show(COLOR_OFF);
                self.boot = None;
            }
            None => {}
        }

        let now = if self.scheduler.is_loaded() {
            now
        } else {
            match self.refresh() {
                Some(loaded_at) => loaded_at,
                None => {
                    self.engine.show(COLOR_OFF);
                    return PlayerStatus::NeedsData;
                }
            }
        };

        let code = self.scheduler.tick(now);
        self.engine.render(code, now);
        PlayerStatus::Playing(code)
    }

    /// Drops the playing timeline so the next poll reloads it.
    pub fn invalidate(&mut self) {
        self.scheduler.clear();
        self.engine.reset();
    }

    fn handle_signals(&mut self) {
        let pending = self.signals.take();
        if pending.is_empty() {
            return;
        }

        if pending.button {
            log::info!("button pressed");
        }

        if pending.slot_switch {
            self.slot = self.slot.next(self.slot_count);
            self.follow_server = false;
            log::info!("switched to timeline {}", self.slot);
            self.invalidate();
        }

        if pending.fetch_switch {
            self.follow_server = true;
            log::info!("fetching latest timeline from server");
            self.invalidate();
        }
    }

    /// Brings the stored copy of the active slot up to date and starts playing it.
    ///
    /// While following the server, every server timeline (up to
    /// [`MAX_SYNCED_SLOTS`]) is mirrored into the store so the slot switch
    /// keeps working offline. Playback starts at the time the load completes.
    ///
    /// Returns the playback start, or `None` if no usable timeline could be loaded.
    fn refresh(&mut self) -> Option<I> {
        let mirrored = self.follow_server && {
            self.sync_with_server();
            self.download_all()
        };
        if !mirrored {
            self.download(self.slot);
        }

        match load_slot::<S, N>(&mut self.store, self.slot) {
            Ok(table) => {
                let loaded_at = self.time_source.now();
                self.scheduler.load(table, loaded_at);
                Some(loaded_at)
            }
            Err(LoadError::NotFound(_)) => {
                log::debug!("no timeline stored for slot {}", self.slot);
                None
            }
            Err(LoadError::Decode(_)) => None,
        }
    }

    fn sync_with_server(&mut self) {
        let count = self.source.timeline_count();
        match self.track_reachability(count) {
            Some(0) => log::debug!("server reports no timelines"),
            Some(count) => self.slot_count = count,
            None => {}
        }

        let active = self.source.active_slot();
        match self.track_reachability(active) {
            Some(slot) if slot.0 >= 1 => {
                if slot != self.slot {
                    log::info!("server selected timeline {}", slot);
                }
                self.slot = slot;
            }
            Some(slot) => log::warn!("server returned invalid timeline {}", slot),
            None => {}
        }
    }

    /// Mirrors server timelines `1..=min(slot_count, MAX_SYNCED_SLOTS)` into the store.
    ///
    /// Returns true if the active slot was among them.
    fn download_all(&mut self) -> bool {
        let last = self.slot_count.min(MAX_SYNCED_SLOTS);
        for slot in (1..=last).map(Slot) {
            self.download(slot);
        }
        self.slot.0 <= last
    }

    /// Fetches `slot` and saves it. On failure the stored copy is kept.
    fn download(&mut self, slot: Slot) {
        let fetched = self.source.fetch(slot);
        if let Some(raw) = self.track_reachability(fetched) {
            self.store.save(slot, &raw);
        }
    }

    /// Logs transitions between reachable and unreachable server, not every failure.
    fn track_reachability<V>(&mut self, result: Result<V, F::Error>) -> Option<V> {
        match result {
            Ok(value) => {
                if !self.server_reachable {
                    log::info!("server reachable again");
                    self.server_reachable = true;
                }
                Some(value)
            }
            Err(err) => {
                if self.server_reachable {
                    log::warn!("server unreachable ({:?}), using stored timelines", err);
                    self.server_reachable = false;
                } else {
                    log::trace!("server still unreachable: {:?}", err);
                }
                None
            }
        }
    }

    /// Returns the active slot.
    pub fn slot(&self) -> Slot {
        self.slot
    }

    /// Returns the number of slots the slot switch cycles through.
    pub fn slot_count(&self) -> u8 {
        self.slot_count
    }

    /// Returns true if the player asks the server for the active slot.
    pub fn follows_server(&self) -> bool {
        self.follow_server
    }

    /// Returns the playback scheduler.
    pub fn scheduler(&self) -> &PlaybackScheduler<I, N> {
        &self.scheduler
    }

    /// Returns the pattern engine.
    pub fn engine(&self) -> &PatternEngine<I, L> {
        &self.engine
    }

    /// Returns the timeline store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Returns the remote timeline source.
    pub fn source_mut(&mut self) -> &mut F {
        &mut self.source
    }
}
