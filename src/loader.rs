//! Timeline payload decoding and slot persistence.
//!
//! A timeline payload is a flat JSON object mapping millisecond offsets to
//! `[r, g, b]` triples:
//!
//! ```json
//! {"0": [0, 0, 0], "500": [7, 0, 0], "1250": [11, 0, 0]}
//! ```
//!
//! Only the first component is used: it is the [`ColorCode`] for the event.
//! The other two are a holdover from an earlier raw-RGB payload format; they
//! must still be present but are discarded. Server-authored timelines rely on
//! this layout, so it is kept as is.
//!
//! Components may be written as integers or as floats with no fractional part
//! (`7.0`); any other float is rejected.

use alloc::string::String;
use core::fmt;
use core::marker::PhantomData;

use serde::{Deserialize, Deserializer};
use serde::de::{self, IgnoredAny, MapAccess, Unexpected, Visitor};

use crate::event::{ColorCode, Event, EventTable};

/// Errors produced while decoding a timeline payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeError {
    /// The payload decoded to zero events.
    #[error("timeline payload contains no events")]
    Empty,

    /// The payload is not a JSON object of offset -> `[r, g, b]` entries.
    #[error("malformed timeline payload at line {line}, column {column}")]
    Malformed { line: usize, column: usize },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Malformed {
            line: err.line(),
            column: err.column(),
        }
    }
}

/// Errors produced while loading a stored timeline slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Nothing is stored for the slot.
    #[error("no timeline stored for slot {0}")]
    NotFound(u8),

    /// The stored payload could not be decoded. The slot has been cleared.
    #[error("stored timeline is unusable: {0}")]
    Decode(#[from] DecodeError),
}

/// Identifier of a timeline slot on the device.
///
/// Slots are numbered from 1, matching the server's timeline numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Slot(pub u8);

impl Slot {
    /// Returns the slot after this one, wrapping to slot 1 after `count`.
    pub fn next(self, count: u8) -> Slot {
        if self.0 >= count { Slot(1) } else { Slot(self.0 + 1) }
    }
}

impl From<u8> for Slot {
    fn from(number: u8) -> Self {
        Slot(number)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trait for abstracting persistent timeline storage.
///
/// Implement this over your filesystem or flash key-value store. Storage
/// errors should be handled internally; a slot that cannot be read is
/// reported as missing.
pub trait TimelineStore {
    /// Returns the raw payload stored for `slot`, or `None` if there is none.
    fn load(&mut self, slot: Slot) -> Option<String>;

    /// Stores `raw` for `slot`. An empty string clears the slot.
    fn save(&mut self, slot: Slot, raw: &str);
}

/// Trait for abstracting the remote timeline service.
///
/// Transport, authentication and token refresh are the implementor's concern.
pub trait TimelineSource {
    /// Error reported when the service cannot be reached or refuses a request.
    type Error: fmt::Debug;

    /// Returns how many timelines the service offers.
    fn timeline_count(&mut self) -> Result<u8, Self::Error>;

    /// Returns the slot the service currently marks as active.
    fn active_slot(&mut self) -> Result<Slot, Self::Error>;

    /// Fetches the raw payload for `slot`.
    fn fetch(&mut self, slot: Slot) -> Result<String, Self::Error>;
}

/// Decodes a timeline payload into an [`EventTable`].
///
/// Entries are read in document order. The first `N` are kept, later ones are
/// counted in [`EventTable::dropped`]. The kept events are then sorted by
/// offset so playback can rely on monotonic order.
///
/// # Errors
/// * `Empty` - The payload is an object with no entries
/// * `Malformed` - Invalid JSON, a non-numeric offset key, or a value that is
///   not a 3-element array of whole numbers
pub fn decode<const N: usize>(payload: &str) -> Result<EventTable<N>, DecodeError> {
    let mut deserializer = serde_json::Deserializer::from_str(payload);
    let mut table = (&mut deserializer).deserialize_map(TimelineVisitor::<N>(PhantomData))?;
    deserializer.end()?;

    if table.is_empty() {
        return Err(DecodeError::Empty);
    }

    if table.dropped() > 0 {
        log::warn!(
            "timeline exceeds capacity of {} events, dropped {}",
            N,
            table.dropped()
        );
    }

    table.sort_by_offset();
    Ok(table)
}

/// Loads and decodes the payload stored for `slot`.
///
/// A cleared (empty) slot is reported as `NotFound`.
/// If the stored payload does not decode (including an empty timeline), the
/// slot is cleared so the caller fetches a fresh copy.
pub fn load_slot<S: TimelineStore, const N: usize>(
    store: &mut S,
    slot: Slot,
) -> Result<EventTable<N>, LoadError> {
    let raw = store
        .load(slot)
        .filter(|raw| !raw.is_empty())
        .ok_or(LoadError::NotFound(slot.0))?;

    match decode::<N>(&raw) {
        Ok(table) => {
            log::info!("loaded timeline {} with {} events", slot, table.len());
            Ok(table)
        }
        Err(err) => {
            log::warn!("timeline {} unusable ({}), clearing", slot, err);
            store.save(slot, "");
            Err(err.into())
        }
    }
}

struct TimelineVisitor<const N: usize>(PhantomData<EventTable<N>>);

impl<'de, const N: usize> Visitor<'de> for TimelineVisitor<N> {
    type Value = EventTable<N>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping millisecond offsets to [r, g, b] arrays")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut table = EventTable::new();

        while let Some(key) = map.next_key::<String>()? {
            let offset_ms = key.parse::<u32>().map_err(|_| {
                <A::Error as de::Error>::invalid_value(
                    Unexpected::Str(&key),
                    &"a decimal millisecond offset",
                )
            })?;

            let code = if table.len() < N {
                let [Component(red), _green, _blue] = map.next_value::<[Component; 3]>()?;
                ColorCode::from_raw(red)
            } else {
                // Over capacity: skip the value, push only records the drop.
                map.next_value::<IgnoredAny>()?;
                ColorCode::NONE
            };
            table.push(Event::new(offset_ms, code));
        }

        Ok(table)
    }
}

/// One `[r, g, b]` component, accepted as an integer or an integral float.
struct Component(i64);

impl<'de> Deserialize<'de> for Component {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ComponentVisitor)
    }
}

struct ComponentVisitor;

impl<'de> Visitor<'de> for ComponentVisitor {
    type Value = Component;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a whole number")
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Component, E> {
        Ok(Component(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Component, E> {
        Ok(Component(i64::try_from(value).unwrap_or(i64::MAX)))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Component, E> {
        let whole = value as i64;
        if value.is_finite() && whole as f64 == value {
            Ok(Component(whole))
        } else {
            Err(E::invalid_value(Unexpected::Float(value), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_and_sorts_by_offset() {
        let table = decode::<8>(r#"{"1000":[2,0,0],"0":[0,0,0],"500":[1,9,9]}"#).unwrap();

        assert_eq!(
            table.events(),
            &[
                Event::new(0, ColorCode(0)),
                Event::new(500, ColorCode(1)),
                Event::new(1000, ColorCode(2)),
            ]
        );
    }

    #[test]
    fn empty_object_is_empty_error() {
        assert_eq!(decode::<8>("{}"), Err(DecodeError::Empty));
    }

    #[test]
    fn non_numeric_key_is_malformed() {
        let result = decode::<8>(r#"{"soon":[1,0,0]}"#);
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }

    #[test]
    fn short_value_array_is_malformed() {
        let result = decode::<8>(r#"{"0":[1,0]}"#);
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }

    #[test]
    fn trailing_garbage_is_malformed() {
        let result = decode::<8>(r#"{"0":[1,0,0]} extra"#);
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }

    #[test]
    fn integral_float_components_are_accepted() {
        let table = decode::<8>(r#"{"0":[7.0,0.0,0],"10":[-1.0,0,0]}"#).unwrap();
        assert_eq!(table.events()[0].code, ColorCode(7));
        assert_eq!(table.events()[1].code, ColorCode::NONE);

        let result = decode::<8>(r#"{"0":[7.5,0,0]}"#);
        assert!(matches!(result, Err(DecodeError::Malformed { .. })));
    }

    #[test]
    fn slot_next_wraps_to_first() {
        assert_eq!(Slot(1).next(3), Slot(2));
        assert_eq!(Slot(3).next(3), Slot(1));
        assert_eq!(Slot(5).next(3), Slot(1));
    }
}
