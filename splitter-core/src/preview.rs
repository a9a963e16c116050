//! Display handles for decoded crops.
//!
//! A front end shows crops through opaque `crop://<uuid>` handles instead of holding the
//! bitmaps itself. Handles stay resolvable until they are revoked, which the session does
//! whenever a newer run replaces the visible results.

use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex, MutexGuard},
};

use image::DynamicImage;
use log::{debug, warn};
use serde::Serialize;
use uuid::Uuid;

const HANDLE_SCHEME: &str = "crop://";

/// Opaque reference to a crop bitmap held by a [`PreviewRegistry`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DisplayHandle(String);

impl DisplayHandle {
    fn new() -> Self {
        Self(format!("{HANDLE_SCHEME}{}", Uuid::new_v4()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Thread-safe map from display handles to crop bitmaps.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    entries: Mutex<HashMap<DisplayHandle, Arc<DynamicImage>>>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DisplayHandle, Arc<DynamicImage>>> {
        // A panic while holding the lock cannot leave the map half-updated.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Store a bitmap and return a fresh handle for it.
    pub fn register(&self, image: DynamicImage) -> DisplayHandle {
        let handle = DisplayHandle::new();
        self.lock().insert(handle.clone(), Arc::new(image));
        debug!("Registered preview {handle}");
        handle
    }

    /// Bitmap behind `handle`, or `None` once it has been revoked.
    pub fn resolve(&self, handle: &DisplayHandle) -> Option<Arc<DynamicImage>> {
        self.lock().get(handle).cloned()
    }

    /// Release a handle. Returns false when it was unknown or already revoked.
    pub fn revoke(&self, handle: &DisplayHandle) -> bool {
        let removed = self.lock().remove(handle).is_some();
        if !removed {
            warn!("Preview handle {handle} was already released");
        }
        removed
    }

    /// Release every handle in `handles`, returning how many were live.
    pub fn revoke_all<'a>(&self, handles: impl IntoIterator<Item = &'a DisplayHandle>) -> usize {
        let mut entries = self.lock();
        handles
            .into_iter()
            .filter(|handle| entries.remove(*handle).is_some())
            .count()
    }

    /// Number of handles that still resolve.
    pub fn live_count(&self) -> usize {
        self.lock().len()
    }
}
