//! Durable persistence of the lifecycle snapshot.
//!
//! The whole [`LifecycleState`] is written as a single JSON document after
//! every mutation and read back once at startup. Persistence is
//! best-effort: the caller logs and swallows write failures, and anything
//! unreadable at startup (missing file, corrupt JSON) hydrates as "no
//! snapshot" rather than a fatal error.

use std::io::ErrorKind;
use std::path::PathBuf;
#[cfg(test)]
use std::sync::{Arc, Mutex};

use crate::error::EntregaError;
use crate::state_machine::LifecycleState;

/// Storage backend for the lifecycle snapshot.
///
/// Operates at the domain level so tests can swap in [`MemoryStore`]
/// without touching the manager.
pub trait StateStore: Send {
    /// Read the saved snapshot. `Ok(None)` means "nothing usable saved" —
    /// including a corrupt record, which must not kill startup.
    fn load(&self) -> Result<Option<LifecycleState>, EntregaError>;

    /// Replace the saved snapshot.
    fn save(&self, state: &LifecycleState) -> Result<(), EntregaError>;
}

/// Snapshot store backed by a single JSON file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StateStore for JsonFileStore {
    fn load(&self) -> Result<Option<LifecycleState>, EntregaError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match serde_json::from_str(&contents) {
            Ok(state) => Ok(Some(state)),
            Err(e) => {
                // Corrupt snapshot is treated as absent.
                eprintln!(
                    "entrega: ignoring unreadable state file {} ({e})",
                    self.path.display()
                );
                Ok(None)
            }
        }
    }

    fn save(&self, state: &LifecycleState) -> Result<(), EntregaError> {
        if let Some(dir) = self.path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(state)?;

        // Write-then-rename so a reader never sees a half-written snapshot.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory store for tests.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryStore {
    snapshot: Arc<Mutex<Option<LifecycleState>>>,
}

#[cfg(test)]
impl StateStore for MemoryStore {
    fn load(&self) -> Result<Option<LifecycleState>, EntregaError> {
        Ok(self.snapshot.lock().expect("store lock poisoned").clone())
    }

    fn save(&self, state: &LifecycleState) -> Result<(), EntregaError> {
        *self.snapshot.lock().expect("store lock poisoned") = Some(state.clone());
        Ok(())
    }
}
