//! Lookup sources that resolve variable names to raw strings.
//!
//! A parse pass is driven by a [`Lookup`]: the process environment in
//! production, a [`MapLookup`] in tests or when values come from a
//! deployment manifest, and [`Layered`] when one source should shadow
//! another.

use std::collections::HashMap;

/// Fetches a raw string by variable name.
///
/// Returning `None` means the name is absent from the source; an empty
/// string is a present value and is handed to conversion like any other.
pub trait Lookup {
    /// Retrieves the raw value stored under `name`, if any.
    fn get(&self, name: &str) -> Option<String>;
}

/// The live process environment.
///
/// # Example
///
/// ```rust,ignore
/// let mut set = VarSet::new("app");
/// let port = set.int("PORT", "listen port");
/// set.parse_from(&OsEnv)?;
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEnv;

impl Lookup for OsEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// An immutable in-memory mapping.
///
/// Backs test fixtures and manifest-extracted name→value pairs.
#[derive(Clone, Debug, Default)]
pub struct MapLookup {
    entries: HashMap<String, String>,
}

impl MapLookup {
    /// Creates a lookup over the given mapping.
    #[must_use]
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapLookup {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Lookup for MapLookup {
    fn get(&self, name: &str) -> Option<String> {
        self.entries.get(name).cloned()
    }
}

impl Lookup for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        self.get_key_value(name).map(|(_, v)| v.clone())
    }
}

/// A primary source with a fallback.
///
/// The fallback is consulted only when the primary reports not-found. A
/// present-but-empty value in the primary wins over the fallback, since
/// empty-but-present differs from not-found.
#[derive(Clone, Debug)]
pub struct Layered<P, F> {
    primary: P,
    fallback: F,
}

impl<P: Lookup, F: Lookup> Layered<P, F> {
    /// Layers `primary` over `fallback`.
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: Lookup, F: Lookup> Lookup for Layered<P, F> {
    fn get(&self, name: &str) -> Option<String> {
        self.primary
            .get(name)
            .or_else(|| self.fallback.get(name))
    }
}

impl<L: Lookup + ?Sized> Lookup for &L {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}

impl<L: Lookup + ?Sized> Lookup for Box<L> {
    fn get(&self, name: &str) -> Option<String> {
        (**self).get(name)
    }
}
