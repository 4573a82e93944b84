use crate::SlotError;

/// A single named slot in durable key-value storage.
pub trait StateSlot: Send {
    /// Returns `Ok(None)` when nothing has been written yet.
    fn read(&self) -> Result<Option<String>, SlotError>;

    /// Overwrites the slot with `blob`.
    fn write(&mut self, blob: &str) -> Result<(), SlotError>;
}

/// In-memory slot with an optional byte quota.
#[derive(Debug, Default, Clone)]
pub struct MemorySlot {
    blob: Option<String>,
    quota: Option<usize>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
            quota: None,
        }
    }

    /// Writes larger than `quota` bytes are rejected.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            blob: None,
            quota: Some(quota),
        }
    }

    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl StateSlot for MemorySlot {
    fn read(&self) -> Result<Option<String>, SlotError> {
        Ok(self.blob.clone())
    }

    fn write(&mut self, blob: &str) -> Result<(), SlotError> {
        if let Some(quota) = self.quota {
            if blob.len() > quota {
                return Err(SlotError::QuotaExceeded {
                    size: blob.len(),
                    quota,
                });
            }
        }
        self.blob = Some(blob.to_string());
        Ok(())
    }
}
