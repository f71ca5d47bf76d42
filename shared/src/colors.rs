// shared/src/colors.rs
//
// Category -> CSS color, kept in insertion order. The server hands out palette
// colors in first-seen order and the legend lists categories in that same
// order, so a sorted map would not do.

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryColors {
    entries: Vec<(String, String)>,
}

impl CategoryColors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, category: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == category)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, category: &str) -> bool {
        self.get(category).is_some()
    }

    /// Sets the color for `category`. A known category keeps its position.
    pub fn insert(&mut self, category: String, color: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == category) {
            Some((_, v)) => *v = color,
            None => self.entries.push((category, color)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl FromIterator<(String, String)> for CategoryColors {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut colors = Self::new();
        for (k, v) in iter {
            colors.insert(k, v);
        }
        colors
    }
}

impl Serialize for CategoryColors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A JSON object value: colors are strings, anything else is skipped.
#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
    Color(String),
    Other(IgnoredAny),
}

struct ColorsVisitor;

impl<'de> Visitor<'de> for ColorsVisitor {
    type Value = CategoryColors;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object of category -> color")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<CategoryColors, A::Error> {
        let mut colors = CategoryColors::new();
        while let Some((k, v)) = access.next_entry::<String, ColorValue>()? {
            if let ColorValue::Color(color) = v {
                colors.insert(k, color);
            }
        }
        Ok(colors)
    }
}

impl<'de> Deserialize<'de> for CategoryColors {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ColorsVisitor)
    }
}
