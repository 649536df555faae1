//! World-time triggered events
//!
//! A table of (day fraction, repeat flag) triggers mapped to opaque event
//! identifiers. The streaming core fires identifiers through a single
//! `EventSink`; what an identifier means (soundtrack cue, sky change, ...)
//! is the embedder's business.

/// Opaque identifier dispatched when a trigger fires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EventId(pub u32);

/// Receiver for fired world-time events
pub trait EventSink {
    fn dispatch(&mut self, event: EventId);
}

struct Entry {
    /// Fraction of a day (0.0..1.0) at which the event fires
    day_fraction: f64,
    /// Whether the event fires every day or only once
    repeats: bool,
    event: EventId,
    /// Day number of the last firing, None if never fired
    last_fired_day: Option<i64>,
}

/// Ordered table of world-time triggers
#[derive(Default)]
pub struct WorldTimeEvents {
    entries: Vec<Entry>,
}

impl WorldTimeEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a trigger at the given fraction of the day
    pub fn add(&mut self, day_fraction: f64, repeats: bool, event: EventId) {
        debug_assert!((0.0..1.0).contains(&day_fraction));
        self.entries.push(Entry {
            day_fraction,
            repeats,
            event,
            last_fired_day: None,
        });
    }

    /// Fire every trigger whose fraction has been reached in the current day
    ///
    /// `time_in_days` is the absolute world time; the fractional part selects
    /// the position within the day. One-shot triggers fire at most once over
    /// the table's lifetime, repeating triggers at most once per day.
    pub fn fire(&mut self, time_in_days: f64, sink: &mut dyn EventSink) {
        let day = time_in_days.floor() as i64;
        let fraction = time_in_days - time_in_days.floor();

        for entry in &mut self.entries {
            if fraction < entry.day_fraction {
                continue;
            }
            let already_fired = match entry.last_fired_day {
                None => false,
                Some(last) => !entry.repeats || last == day,
            };
            if !already_fired {
                entry.last_fired_day = Some(day);
                sink.dispatch(entry.event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
