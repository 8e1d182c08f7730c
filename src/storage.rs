use thiserror::Error;

pub const INTRO_SHOWN_KEY: &str = "introShown";
const SHOWN_VALUE: &str = "true";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("Storage is not available")]
    Unavailable,
    #[error("Couldn't write to storage: {0}")]
    WriteFailed(String),
}

/// A single persisted string slot, e.g. one `localStorage` key.
pub trait FlagStore {
    fn read(&self) -> Result<Option<String>, StorageError>;
    fn write(&self, value: &str) -> Result<(), StorageError>;
    fn clear(&self) -> Result<(), StorageError>;
}

/// The "intro has been shown" flag.
///
/// Any failure to read is treated as "not shown yet" so the page never breaks
/// over storage; the intro simply replays on the next visit.
pub struct IntroFlag<F> {
    store: F,
}

impl<F: FlagStore> IntroFlag<F> {
    pub fn new(store: F) -> Self {
        Self { store }
    }

    pub fn is_shown(&self) -> bool {
        match self.store.read() {
            Ok(value) => value.as_deref() == Some(SHOWN_VALUE),
            Err(e) => {
                log::warn!("reading {INTRO_SHOWN_KEY} failed, showing intro: {e}");
                false
            }
        }
    }

    pub fn mark_shown(&self) {
        if let Err(e) = self.store.write(SHOWN_VALUE) {
            log::warn!("persisting {INTRO_SHOWN_KEY} failed, intro will replay: {e}");
        }
    }

    pub fn reset(&self) {
        if let Err(e) = self.store.clear() {
            log::warn!("clearing {INTRO_SHOWN_KEY} failed: {e}");
        }
    }
}

#[cfg(test)]
pub(crate) use memory::{BrokenStore, MemoryStore};


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_true_counts_as_shown() {
        assert!(IntroFlag::new(MemoryStore::with_value("true")).is_shown());
        assert!(!IntroFlag::new(MemoryStore::with_value("TRUE")).is_shown());
        assert!(!IntroFlag::new(MemoryStore::with_value("1")).is_shown());
        assert!(!IntroFlag::new(MemoryStore::with_value("")).is_shown());
        assert!(!IntroFlag::new(MemoryStore::default()).is_shown());
    }

    #[test]
    fn test_mark_and_reset() {
        let store = MemoryStore::default();
        let flag = IntroFlag::new(store.clone());
        flag.mark_shown();
        assert_eq!(store.value().as_deref(), Some("true"));
        assert!(flag.is_shown());

        flag.reset();
        assert_eq!(store.value(), None);
        assert!(!flag.is_shown());
    }

    #[test]
    fn test_broken_storage_degrades() {
        let flag = IntroFlag::new(BrokenStore);
        assert!(!flag.is_shown());
        // must not panic
        flag.mark_shown();
        flag.reset();
    }
}
