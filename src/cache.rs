//! Thread-local compilation cache for anchor regexes.
//!
//! Rule sets are rebuilt from config on every run and in every test, so the
//! same handful of patterns gets compiled over and over. Cache is capped at
//! 256 entries; when full it is cleared and rebuilt on demand.

use regex::Regex;
use std::cell::RefCell;
use std::collections::HashMap;

const MAX_CACHE_ENTRIES: usize = 256;

thread_local! {
    static REGEX_CACHE: RefCell<HashMap<String, Regex>> = RefCell::new(HashMap::new());
}

/// Get a compiled regex from cache, or compile and cache it.
///
/// Compilation errors are not cached.
pub fn get_or_compile(pattern: &str) -> Result<Regex, regex::Error> {
    REGEX_CACHE.with(|cache| {
        let mut cache = cache.borrow_mut();

        if let Some(re) = cache.get(pattern) {
            return Ok(re.clone());
        }

        if cache.len() >= MAX_CACHE_ENTRIES {
            cache.clear();
        }

        let compiled = Regex::new(pattern)?;
        cache.insert(pattern.to_string(), compiled.clone());
        Ok(compiled)
    })
}

/// Clear the cache (mainly for testing).
pub fn clear_cache() {
    REGEX_CACHE.with(|cache| cache.borrow_mut().clear());
}

/// Number of cached patterns on this thread.
pub fn cache_size() -> usize {
    REGEX_CACHE.with(|cache| cache.borrow().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_reuses_compiled_pattern() {
        clear_cache();
        let a = get_or_compile(r"useState\(false\)").unwrap();
        let b = get_or_compile(r"useState\(false\)").unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(cache_size(), 1);
    }

    #[test]
    fn test_cache_does_not_store_errors() {
        clear_cache();
        assert!(get_or_compile(r"function buildUrl(").is_err());
        assert_eq!(cache_size(), 0);
    }
}
