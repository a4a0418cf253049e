//! In-process quarantine store

use super::QuarantineStore;
use crate::error::Result;
use crate::types::QuarantineRecord;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Store that keeps records in a map keyed by path.
///
/// Round trips are exact, including extras. Used by tests and anywhere the
/// filesystem metadata must not be touched.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<PathBuf, QuarantineRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of quarantined paths
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

impl QuarantineStore for MemoryStore {
    fn get(&self, path: &Path) -> Result<Option<QuarantineRecord>> {
        debug!("Memory store get: {:?}", path);
        Ok(self.records.lock().get(path).cloned())
    }

    fn set(&self, path: &Path, record: &QuarantineRecord) -> Result<()> {
        debug!("Memory store set: {:?}", path);
        self.records.lock().insert(path.to_path_buf(), record.clone());
        Ok(())
    }

    fn clear(&self, path: &Path) -> Result<()> {
        debug!("Memory store clear: {:?}", path);
        self.records.lock().remove(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_set_get_clear() {
        let store = MemoryStore::new();
        let path = Path::new("/tmp/download.zip");
        assert!(store.get(path).unwrap().is_none());

        let record = QuarantineRecord::new().with_agent_name("curl").with_extra("Custom", "1");
        store.set(path, &record).unwrap();
        assert_eq!(store.get(path).unwrap(), Some(record));
        assert_eq!(store.len(), 1);

        store.clear(path).unwrap();
        store.clear(path).unwrap();
        assert!(store.get(path).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_replaces() {
        let store = MemoryStore::new();
        let path = Path::new("/tmp/a");

        store
            .set(path, &QuarantineRecord::new().with_agent_name("one").with_bundle_id("com.one"))
            .unwrap();
        store
            .set(path, &QuarantineRecord::new().with_agent_name("two"))
            .unwrap();

        let record = store.get(path).unwrap().unwrap();
        assert_eq!(record.agent_name(), Some("two"));
        assert_eq!(record.bundle_id(), None);
    }
}
