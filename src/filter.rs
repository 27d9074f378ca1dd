//! Alert class filtering
//!
//! Events are enabled per class (`memcap`, `smb`, `co`, `cl`). The filter is
//! consulted on every alert, after session deduplication.

use std::str::FromStr;

use parking_lot::RwLock;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::types::EventClass;

/// Class-filter collaborator
pub trait ClassFilter: Send + Sync {
    fn is_enabled(&self, class: EventClass) -> bool;
}

/// Set of enabled alert classes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct EventClassSet(u8);

impl EventClassSet {
    /// No class enabled
    pub fn none() -> Self {
        Self(0)
    }

    /// Every configurable class enabled
    pub fn all() -> Self {
        EventClass::CONFIGURABLE.iter().copied().collect()
    }

    pub fn insert(&mut self, class: EventClass) {
        self.0 |= class.bit();
    }

    pub fn remove(&mut self, class: EventClass) {
        self.0 &= !class.bit();
    }

    pub fn with(mut self, class: EventClass) -> Self {
        self.insert(class);
        self
    }

    pub fn contains(&self, class: EventClass) -> bool {
        class.bit() != 0 && self.0 & class.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Enabled classes in configuration order
    pub fn iter(&self) -> impl Iterator<Item = EventClass> + '_ {
        EventClass::CONFIGURABLE
            .into_iter()
            .filter(move |c| self.contains(*c))
    }
}

impl FromIterator<EventClass> for EventClassSet {
    fn from_iter<I: IntoIterator<Item = EventClass>>(iter: I) -> Self {
        let mut set = Self::none();
        for class in iter {
            set.insert(class);
        }
        set
    }
}

impl ClassFilter for EventClassSet {
    fn is_enabled(&self, class: EventClass) -> bool {
        self.contains(class)
    }
}

impl FromStr for EventClassSet {
    type Err = Error;

    /// Accepts `all`, `none`, or a class list such as `[memcap, smb]` or
    /// `co,cl`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let inner = s
            .strip_prefix('[')
            .and_then(|s| s.strip_suffix(']'))
            .unwrap_or(s);

        match inner.trim().to_ascii_lowercase().as_str() {
            "all" => return Ok(Self::all()),
            "none" | "" => return Ok(Self::none()),
            _ => {}
        }

        inner
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|tok| !tok.is_empty())
            .map(|tok| {
                EventClass::from_keyword(tok)
                    .ok_or_else(|| Error::Config(format!("unknown event class: {}", tok)))
            })
            .collect()
    }
}

impl std::fmt::Display for EventClassSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let names: Vec<&str> = self.iter().map(|c| c.as_str()).collect();
        write!(f, "[{}]", names.join(", "))
    }
}

impl Serialize for EventClassSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClassSetRepr {
    Keyword(String),
    List(Vec<EventClass>),
}

impl<'de> Deserialize<'de> for EventClassSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match ClassSetRepr::deserialize(deserializer)? {
            ClassSetRepr::Keyword(s) => s.parse().map_err(serde::de::Error::custom),
            ClassSetRepr::List(classes) => Ok(classes.into_iter().collect()),
        }
    }
}

/// Class filter that can be swapped while workers are alerting
#[derive(Debug, Default)]
pub struct SharedClassFilter {
    enabled: RwLock<EventClassSet>,
}

impl SharedClassFilter {
    pub fn new(enabled: EventClassSet) -> Self {
        Self {
            enabled: RwLock::new(enabled),
        }
    }

    /// Replace the enabled set
    pub fn set(&self, enabled: EventClassSet) {
        *self.enabled.write() = enabled;
    }

    pub fn enable(&self, class: EventClass) {
        self.enabled.write().insert(class);
    }

    pub fn disable(&self, class: EventClass) {
        self.enabled.write().remove(class);
    }

    pub fn get(&self) -> EventClassSet {
        *self.enabled.read()
    }
}

impl ClassFilter for SharedClassFilter {
    fn is_enabled(&self, class: EventClass) -> bool {
        self.enabled.read().contains(class)
    }
}
