use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use crate::{file::File, hierarchy::BytesProvider, Result};

/// Provider over an in-memory map of internal name → bytes.
#[derive(Debug, Default)]
pub struct MemoryProvider {
    classes: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryProvider {
    /// Creates an empty provider.
    #[must_use]
    pub fn new() -> Self {
        MemoryProvider::default()
    }

    /// Registers (or replaces) the bytes for `name`.
    pub fn insert(&self, name: impl Into<String>, bytes: Vec<u8>) {
        with_write!(self.classes, |classes: &mut HashMap<String, Vec<u8>>| {
            classes.insert(name.into(), bytes)
        });
    }

    /// Builder-style [`MemoryProvider::insert`].
    #[must_use]
    pub fn with_class(self, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(name, bytes);
        self
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        with_read!(self.classes, |classes: &HashMap<String, Vec<u8>>| classes.len())
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BytesProvider for MemoryProvider {
    fn fetch(&self, type_name: &str) -> Result<Option<Vec<u8>>> {
        Ok(read_lock!(self.classes).get(type_name).cloned())
    }
}

/// Provider reading `<root>/<internal name>.class` files.
#[derive(Debug, Clone)]
pub struct DirectoryProvider {
    root: PathBuf,
}

impl DirectoryProvider {
    /// Creates a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirectoryProvider { root: root.into() }
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, type_name: &str) -> Option<PathBuf> {
        // reject names that would escape the root
        if type_name.is_empty()
            || type_name.starts_with('/')
            || type_name.split('/').any(|segment| segment == "..")
        {
            return None;
        }
        Some(self.root.join(format!("{type_name}.class")))
    }
}

impl BytesProvider for DirectoryProvider {
    fn fetch(&self, type_name: &str) -> Result<Option<Vec<u8>>> {
        let Some(path) = self.path_of(type_name) else {
            return Ok(None);
        };
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(File::from_file(&path)?.data().to_vec()))
    }
}

/// Provider consulting a list of providers in order; the first hit wins.
///
/// A failing provider is logged and skipped.
#[derive(Default, Clone)]
pub struct ChainProvider {
    providers: Vec<Arc<dyn BytesProvider>>,
}

impl ChainProvider {
    /// Creates an empty chain.
    #[must_use]
    pub fn new() -> Self {
        ChainProvider::default()
    }

    /// Appends a provider to the chain.
    #[must_use]
    pub fn with(mut self, provider: Arc<dyn BytesProvider>) -> Self {
        self.providers.push(provider);
        self
    }
}

impl BytesProvider for ChainProvider {
    fn fetch(&self, type_name: &str) -> Result<Option<Vec<u8>>> {
        for provider in &self.providers {
            match provider.fetch(type_name) {
                Ok(Some(bytes)) => return Ok(Some(bytes)),
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(type_name, %error, "byte provider failed, trying next");
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl BytesProvider for Failing {
        fn fetch(&self, _type_name: &str) -> Result<Option<Vec<u8>>> {
            Err(crate::Error::Error("unavailable".to_string()))
        }
    }

    #[test]
    fn memory() {
        let provider = MemoryProvider::new().with_class("net/Widget", vec![1, 2, 3]);
        assert_eq!(provider.fetch("net/Widget").unwrap(), Some(vec![1, 2, 3]));
        assert_eq!(provider.fetch("net/Gadget").unwrap(), None);
        assert_eq!(provider.len(), 1);
    }

    #[test]
    fn directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("net/minecraft")).unwrap();
        std::fs::write(dir.path().join("net/minecraft/Widget.class"), [0xCA, 0xFE]).unwrap();

        let provider = DirectoryProvider::new(dir.path());
        assert_eq!(
            provider.fetch("net/minecraft/Widget").unwrap(),
            Some(vec![0xCA, 0xFE])
        );
        assert_eq!(provider.fetch("net/minecraft/Gadget").unwrap(), None);
        assert_eq!(provider.fetch("../etc/passwd").unwrap(), None);
        assert_eq!(provider.fetch("").unwrap(), None);
    }

    #[test]
    fn chain_skips_failures() {
        let chain = ChainProvider::new()
            .with(Arc::new(Failing))
            .with(Arc::new(MemoryProvider::new().with_class("a", vec![7])));

        assert_eq!(chain.fetch("a").unwrap(), Some(vec![7]));
        assert_eq!(chain.fetch("b").unwrap(), None);
    }
}
