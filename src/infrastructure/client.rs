use std::sync::{Arc, RwLock};

use crate::domain::DomainError;

/// Process-wide lazily-initialized handle for an external service client.
/// `invalidate` drops the cached client so the next access rebuilds it, for
/// credential rotation or configuration changes.
pub struct ClientCell<T> {
    slot: RwLock<Option<Arc<T>>>,
}

impl<T> ClientCell<T> {
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(None),
        }
    }

    pub fn get_or_try_init(
        &self,
        init: impl FnOnce() -> Result<T, DomainError>,
    ) -> Result<Arc<T>, DomainError> {
        {
            let slot = self
                .slot
                .read()
                .map_err(|e| DomainError::internal(e.to_string()))?;
            if let Some(client) = slot.as_ref() {
                return Ok(client.clone());
            }
        }

        let mut slot = self
            .slot
            .write()
            .map_err(|e| DomainError::internal(e.to_string()))?;
        if let Some(client) = slot.as_ref() {
            return Ok(client.clone());
        }

        let client = Arc::new(init()?);
        *slot = Some(client.clone());
        Ok(client)
    }

    pub fn invalidate(&self) {
        if let Ok(mut slot) = self.slot.write() {
            *slot = None;
        }
    }
}

impl<T> Default for ClientCell<T> {
    fn default() -> Self {
        Self::new()
    }
}
