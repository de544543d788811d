use tokio::sync::{Mutex, MutexGuard};

/// A `ref`/`out` parameter shared with the core stage
///
/// The core may run more than once (retry), so the exclusive borrow of the
/// caller's variable is parked here and re-borrowed for every run.
pub struct ByRef<'a, T: ?Sized> {
    slot: Mutex<&'a mut T>,
}

impl<'a, T: ?Sized> ByRef<'a, T> {
    pub fn new(value: &'a mut T) -> Self {
        Self {
            slot: Mutex::new(value),
        }
    }

    /// Borrow the caller's variable for one run of the core stage
    pub async fn lock(&self) -> MutexGuard<'_, &'a mut T> {
        self.slot.lock().await
    }

    pub fn into_inner(self) -> &'a mut T {
        self.slot.into_inner()
    }
}
