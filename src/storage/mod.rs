//! Vocabulary storage for kelime.
//!
//! This module defines the data-access collaborator and provides
//! file-based and in-memory implementations.

pub mod file;
pub mod memory;
pub mod traits;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use traits::VocabularyStore;
