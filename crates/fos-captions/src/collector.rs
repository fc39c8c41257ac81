//! Cue Activation Collector
//!
//! Maps every active cue of every enabled, loaded track to a caller-supplied
//! value, preserving track order and each track's active-cue order.

use fos_media::{TextTrack, TextTrackCue, TextTrackMode, TextTrackReadyState};

use crate::rendered::CueKey;

/// Insertion-ordered map from active cue to `V`.
///
/// Active sets are small (a handful of cues per frame), so lookups scan.
#[derive(Debug)]
pub struct ActiveCues<V> {
    entries: Vec<(CueKey, V)>,
}

impl<V> ActiveCues<V> {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &CueKey) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &CueKey) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn get_mut(&mut self, key: &CueKey) -> Option<&mut V> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or replace. A replaced entry keeps its position.
    pub fn insert(&mut self, key: CueKey, value: V) -> Option<V> {
        match self.get_mut(&key) {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Remove, preserving the order of the remaining entries
    pub fn remove(&mut self, key: &CueKey) -> Option<V> {
        let at = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(at).1)
    }

    pub fn keys(&self) -> impl Iterator<Item = &CueKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.entries.iter_mut().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CueKey, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Take every entry, leaving the map empty
    pub fn drain(&mut self) -> impl Iterator<Item = (CueKey, V)> + '_ {
        self.entries.drain(..)
    }
}

impl<V> Default for ActiveCues<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Collect active cues across `tracks`.
///
/// Disabled tracks, tracks that are not loaded and cues whose `active` flag is
/// stale are skipped. `f` is invoked once per collected cue, in order.
pub fn collect_cues<V, F>(tracks: &[TextTrack], mut f: F) -> ActiveCues<V>
where
    F: FnMut(&TextTrack, &TextTrackCue) -> V,
{
    let mut active = ActiveCues::new();
    for track in tracks {
        if track.mode == TextTrackMode::Disabled || track.ready_state != TextTrackReadyState::Loaded {
            continue;
        }
        for cue in track.active_cues() {
            if !cue.active {
                continue;
            }
            active.insert(CueKey::new(track, cue), f(track, cue));
        }
    }
    active
}
