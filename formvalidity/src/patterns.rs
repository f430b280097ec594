//! Pattern registry.
//!
//! Built-in patterns are compiled once per process. Custom patterns coming
//! from `pattern` attributes are anchored to a full match, compiled on first
//! use and cached by their anchored source, failures included, so a given
//! source is compiled at most once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use dashmap::DashMap;
use log::{debug, warn};
use regex::{Regex, RegexBuilder};

use crate::error::PatternError;

/// Names of the built-in patterns.
pub const BUILTIN_NAMES: [&str; 5] = ["required", "number", "email", "url", "tel"];

fn builtin_source(name: &str) -> Option<(&'static str, bool)> {
    // (source, case-insensitive). Compiled ASCII-only, except `required`
    // whose `\S` accepts any non-whitespace character.
    match name {
        "required" => Some((r"\S", false)),
        "number" => Some((r"^-?[0-9]*(\.[0-9]+)?$", false)),
        "email" => Some((r"^([a-z0-9_.\-+]+)@([\da-z.\-]+)\.([a-z.]{2,6})$", true)),
        "url" => Some((r"^(https?://)?[\da-z.\-]+\.[a-z.]{2,6}[#&+_?/\w .\-=]*$", true)),
        "tel" => Some((
            r"^((\+\d{1,3}(-| )?\(?\d\)?(-| )?\d{1,5})|(\(?\d{2,6}\)?))(-| )?(\d{3,4})(-| )?(\d{4})(( x| ext)\d{1,5}){0,1}$",
            false,
        )),
        _ => None,
    }
}

static BUILTINS: LazyLock<HashMap<&'static str, Arc<Regex>>> = LazyLock::new(|| {
    BUILTIN_NAMES
        .iter()
        .filter_map(|&name| builtin_source(name).map(|source| (name, source)))
        .map(|(name, (source, insensitive))| {
            let regex = RegexBuilder::new(source)
                .case_insensitive(insensitive)
                .unicode(name == "required")
                .build()
                .expect("built-in pattern must compile");
            (name, Arc::new(regex))
        })
        .collect()
});

static SHARED: LazyLock<Arc<PatternRegistry>> = LazyLock::new(|| Arc::new(PatternRegistry::new()));

/// Anchor a user pattern so it must match the whole value.
pub fn anchored(source: &str) -> String {
    format!("^(?:{source})$")
}

/// Compiled pattern cache.
#[derive(Debug, Default)]
pub struct PatternRegistry {
    custom: DashMap<String, Result<Arc<Regex>, PatternError>>,
    compilations: AtomicUsize,
}

impl PatternRegistry {
    /// Create an empty registry. Most callers want [`PatternRegistry::shared`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry.
    pub fn shared() -> Arc<Self> {
        Arc::clone(&SHARED)
    }

    /// A built-in pattern (`required`, `number`, `email`, `url`, `tel`).
    pub fn builtin(name: &str) -> Option<Arc<Regex>> {
        BUILTINS.get(name).cloned()
    }

    /// Compile (or fetch from cache) a custom pattern source.
    pub fn custom(&self, source: &str) -> Result<Arc<Regex>, PatternError> {
        let key = anchored(source);

        if let Some(hit) = self.custom.get(&key) {
            return hit.value().clone();
        }

        // The entry guard holds the shard lock while compiling, so racing
        // callers wait and then read the same result.
        self.custom
            .entry(key.clone())
            .or_insert_with(|| {
                self.compilations.fetch_add(1, Ordering::Relaxed);
                match Regex::new(&key) {
                    Ok(regex) => {
                        debug!("compiled pattern {key}");
                        Ok(Arc::new(regex))
                    }
                    Err(err) => {
                        warn!("ignoring pattern {key}: {err}");
                        Err(PatternError {
                            pattern: key.clone(),
                            message: err.to_string(),
                        })
                    }
                }
            })
            .value()
            .clone()
    }

    /// Built-in pattern by name, otherwise the compiled custom source.
    /// `None` when the source does not compile.
    pub fn resolve(&self, type_or_source: &str) -> Option<Arc<Regex>> {
        Self::builtin(type_or_source).or_else(|| self.custom(type_or_source).ok())
    }

    /// Number of custom compilations performed so far.
    pub fn compilations(&self) -> usize {
        self.compilations.load(Ordering::Relaxed)
    }

    /// Number of cached custom sources (valid or not).
    pub fn len(&self) -> usize {
        self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.custom.is_empty()
    }
}
