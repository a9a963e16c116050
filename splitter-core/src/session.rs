//! Ownership of the visible result set across repeated runs.
//!
//! Every split run takes a [`RunTicket`]. Only the newest ticket may publish results; a
//! stale run's assets are released instead of shown. Replacing or resetting the result set
//! revokes the display handles of the assets it held.

use std::sync::Arc;

use log::{debug, info};

use crate::{preview::PreviewRegistry, rasterize::CropAsset};

/// Identifies one split run within a [`SplitSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket(u64);

impl RunTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Holds the current crop assets for one user session.
pub struct SplitSession {
    previews: Arc<PreviewRegistry>,
    current_run: u64,
    assets: Vec<CropAsset>,
}

impl SplitSession {
    /// Session releasing handles into `previews`, which must be the registry the assets were
    /// rasterized into.
    pub fn new(previews: Arc<PreviewRegistry>) -> Self {
        Self {
            previews,
            current_run: 0,
            assets: Vec::new(),
        }
    }

    /// Start a run. Any earlier ticket becomes stale.
    pub fn begin_run(&mut self) -> RunTicket {
        self.current_run += 1;
        debug!("Starting split run {}", self.current_run);
        RunTicket(self.current_run)
    }

    pub fn is_current(&self, ticket: RunTicket) -> bool {
        ticket.0 == self.current_run
    }

    /// Publish the results of `ticket`'s run.
    ///
    /// Returns false and releases `assets` when a newer run has started or the session was
    /// reset since the ticket was issued; the visible set is untouched in that case.
    pub fn commit(&mut self, ticket: RunTicket, assets: Vec<CropAsset>) -> bool {
        if !self.is_current(ticket) {
            let released = self.previews.revoke_all(assets.iter().map(|a| &a.handle));
            debug!(
                "Discarding stale run {} (current {}), released {released} preview(s)",
                ticket.0, self.current_run
            );
            return false;
        }

        let previous = std::mem::replace(&mut self.assets, assets);
        self.previews.revoke_all(previous.iter().map(|a| &a.handle));
        info!(
            "Run {} produced {} crop(s), replacing {}",
            ticket.0,
            self.assets.len(),
            previous.len()
        );
        true
    }

    /// Release every asset and invalidate in-flight runs.
    pub fn reset(&mut self) {
        self.current_run += 1;
        let released = self.previews.revoke_all(self.assets.iter().map(|a| &a.handle));
        self.assets.clear();
        debug!("Session reset, released {released} preview(s)");
    }

    /// Assets of the last committed run, in region order.
    pub fn assets(&self) -> &[CropAsset] {
        &self.assets
    }

    pub fn previews(&self) -> &Arc<PreviewRegistry> {
        &self.previews
    }
}

impl Drop for SplitSession {
    fn drop(&mut self) {
        self.previews.revoke_all(self.assets.iter().map(|a| &a.handle));
    }
}
