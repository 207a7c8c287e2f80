//! Codec registry.
//!
//! Maps codec names to descriptors. A process normally builds one
//! [`Registry`] at startup and installs it as the global instance, which
//! is read-only (and therefore freely shared across threads) from then
//! on.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use crate::codec::Codec;
use crate::error::{Error, Result};

/// A name → codec descriptor map.
#[derive(Debug, Default)]
pub struct Registry {
    codecs: HashMap<String, Arc<Codec>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a codec under its own name. Re-registering a name
    /// replaces the previous descriptor.
    pub fn register(&mut self, codec: Codec) {
        let name = codec.name().to_owned();
        if self.codecs.insert(name.clone(), Arc::new(codec)).is_some() {
            debug!(codec = %name, "replaced codec registration");
        } else {
            debug!(codec = %name, "registered codec");
        }
    }

    /// Look up a codec by name.
    pub fn get(&self, name: &str) -> Result<Arc<Codec>> {
        self.codecs
            .get(name)
            .cloned()
            .ok_or_else(|| Error::unable_to_load(name))
    }

    /// Check whether a codec name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.codecs.contains_key(name)
    }

    /// Iterate over registered codec names (unordered).
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    /// Number of registered codecs.
    pub fn len(&self) -> usize {
        self.codecs.len()
    }

    /// Check whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.codecs.is_empty()
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Install `registry` as the process-wide instance.
///
/// Returns `false` (keeping the existing instance) when a registry was
/// already installed.
pub fn install(registry: Registry) -> bool {
    GLOBAL.set(registry).is_ok()
}

/// The process-wide registry, if one has been installed.
pub fn global() -> Option<&'static Registry> {
    GLOBAL.get()
}

/// The process-wide registry, installing the one produced by `init` on
/// first use.
pub fn global_or_init(init: impl FnOnce() -> Registry) -> &'static Registry {
    GLOBAL.get_or_init(init)
}

/// Look up a codec in the process-wide registry.
pub fn get(name: &str) -> Result<Arc<Codec>> {
    match global() {
        Some(registry) => registry.get(name),
        None => Err(Error::unable_to_load(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{CodecImpl, CodecInfo, CodecOptions};

    struct Noop;

    impl CodecImpl for Noop {
        fn info(&self) -> CodecInfo {
            CodecInfo::default()
        }

        fn max_compressed_size(&self, uncompressed_len: usize) -> usize {
            uncompressed_len
        }

        fn compress_buffer(
            &self,
            dst: &mut [u8],
            src: &[u8],
            _options: Option<&CodecOptions>,
        ) -> Result<usize> {
            if dst.len() < src.len() {
                return Err(Error::buffer_too_small(src.len(), dst.len()));
            }
            dst[..src.len()].copy_from_slice(src);
            Ok(src.len())
        }

        fn decompress_buffer(
            &self,
            dst: &mut [u8],
            src: &[u8],
            options: Option<&CodecOptions>,
        ) -> Result<usize> {
            self.compress_buffer(dst, src, options)
        }
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        registry.register(Codec::new("noop", Box::new(Noop)));
        assert!(registry.contains("noop"));
        assert_eq!(registry.len(), 1);

        let codec = registry.get("noop").unwrap();
        assert_eq!(codec.name(), "noop");
    }

    #[test]
    fn test_unknown_name_is_unable_to_load() {
        let registry = Registry::new();
        let err = registry.get("zstd").unwrap_err();
        assert!(matches!(err, Error::UnableToLoad { .. }));
        assert_eq!(err.category(), "unable_to_load");
    }

    #[test]
    fn test_reregistration_replaces() {
        let mut registry = Registry::new();
        registry.register(Codec::new("noop", Box::new(Noop)));
        registry.register(Codec::new("noop", Box::new(Noop)));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_names_lists_registrations() {
        let mut registry = Registry::new();
        registry.register(Codec::new("a", Box::new(Noop)));
        registry.register(Codec::new("b", Box::new(Noop)));

        let mut names: Vec<_> = registry.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["a", "b"]);
    }

    // Single test for the process-global instance; OnceLock state is
    // shared across the whole test binary.
    #[test]
    fn test_global_install_once() {
        let mut registry = Registry::new();
        registry.register(Codec::new("noop", Box::new(Noop)));

        let installed = global_or_init(|| registry);
        assert!(installed.contains("noop"));
        assert!(get("noop").is_ok());
        assert!(matches!(get("missing"), Err(Error::UnableToLoad { .. })));

        // A second install is refused.
        assert!(!install(Registry::new()));
        assert!(get("noop").is_ok());
    }
}
