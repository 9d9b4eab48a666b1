use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Transverse position of a fiber core, in microns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(f64, f64)", into = "(f64, f64)")]
pub struct Coord {
    /// Horizontal offset from the lantern axis.
    pub x: f64,
    /// Vertical offset from the lantern axis.
    pub y: f64,
}

impl Coord {
    /// Creates a coordinate from its components.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the coordinate scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }
}

impl From<(f64, f64)> for Coord {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Coord> for (f64, f64) {
    fn from(coord: Coord) -> Self {
        (coord.x, coord.y)
    }
}

/// Insertion-ordered mapping from core or mode identifier to its position.
///
/// Serializes as a JSON object whose keys follow insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoreMap {
    entries: Vec<(String, Coord)>,
}

impl CoreMap {
    /// Creates an empty core map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the position for `key`, keeping the original slot on replace.
    pub fn insert(&mut self, key: impl Into<String>, coord: Coord) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = coord,
            None => self.entries.push((key, coord)),
        }
    }

    /// Looks up the position recorded for `key`.
    pub fn get(&self, key: &str) -> Option<Coord> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, coord)| *coord)
    }

    /// Returns true when `key` has a recorded position.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Number of cores in the map.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no cores are recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over `(identifier, position)` pairs in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&str, Coord)> + '_ {
        self.entries.iter().map(|(key, coord)| (key.as_str(), *coord))
    }

    /// Iterates over identifiers in insertion order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.entries.iter().map(|(key, _)| key.as_str())
    }
}

impl<K: Into<String>> FromIterator<(K, Coord)> for CoreMap {
    fn from_iter<T: IntoIterator<Item = (K, Coord)>>(iter: T) -> Self {
        let mut map = CoreMap::new();
        for (key, coord) in iter {
            map.insert(key, coord);
        }
        map
    }
}

impl Serialize for CoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, coord) in &self.entries {
            map.serialize_entry(key, coord)?;
        }
        map.end()
    }
}
