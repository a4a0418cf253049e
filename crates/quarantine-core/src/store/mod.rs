//! Storage seam for quarantine records
//!
//! The record lives in OS-owned file metadata. Everything else in the crate
//! reaches it only through [`QuarantineStore`], so the platform calls stay in
//! one place and tests can swap in [`MemoryStore`].

mod memory;
mod xattr_store;

pub use memory::MemoryStore;
pub use xattr_store::XattrStore;

use crate::error::Result;
use crate::types::QuarantineRecord;
use std::path::Path;

/// Key-value access to the quarantine record of a path
#[cfg_attr(test, mockall::automock)]
pub trait QuarantineStore {
    /// Read the record; `None` when the path is not quarantined
    fn get(&self, path: &Path) -> Result<Option<QuarantineRecord>>;

    /// Replace the record wholesale
    fn set(&self, path: &Path, record: &QuarantineRecord) -> Result<()>;

    /// Remove the record; succeeds when there is none
    fn clear(&self, path: &Path) -> Result<()>;
}
