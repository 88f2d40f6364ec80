use std::collections::BTreeMap;

use anyhow::{anyhow, Result};

use super::backend::FaceDetectorBackend;
use super::backends::StubBackend;

type BackendFactory = fn() -> Box<dyn FaceDetectorBackend>;

/// Registry of face detector backends, keyed by name.
///
/// Backends that need an SDK or model file register a factory here; the
/// binaries select one with `--detector`. The first registered backend is
/// the default.
pub struct BackendRegistry {
    factories: BTreeMap<String, BackendFactory>,
    default_name: Option<String>,
}

impl BackendRegistry {
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
            default_name: None,
        }
    }

    /// Registry with the built-in backends registered.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register("stub", || Box::new(StubBackend::new()));
        registry
    }

    /// Register a backend factory. The first registration becomes the default.
    pub fn register(&mut self, name: &str, factory: BackendFactory) {
        if self.default_name.is_none() {
            self.default_name = Some(name.to_string());
        }
        self.factories.insert(name.to_string(), factory);
    }

    /// Instantiate a backend by name.
    pub fn create(&self, name: &str) -> Result<Box<dyn FaceDetectorBackend>> {
        let factory = self.factories.get(name).ok_or_else(|| {
            anyhow!(
                "detector '{}' not registered (available: {})",
                name,
                self.list().join(", ")
            )
        })?;
        Ok(factory())
    }

    /// Instantiate the default backend.
    pub fn create_default(&self) -> Result<Box<dyn FaceDetectorBackend>> {
        let name = self
            .default_name
            .as_deref()
            .ok_or_else(|| anyhow!("no detector backends registered"))?;
        self.create(name)
    }

    /// Registered backend names.
    pub fn list(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_creates_stub() {
        let registry = BackendRegistry::with_builtin();
        let backend = registry.create("stub").unwrap();
        assert_eq!(backend.name(), "stub");

        let default = registry.create_default().unwrap();
        assert_eq!(default.name(), "stub");
    }

    #[test]
    fn unknown_backend_is_an_error() {
        let registry = BackendRegistry::with_builtin();
        let err = registry.create("sdk").err().unwrap();
        assert!(err.to_string().contains("not registered"));
    }
}
