//! Single-threaded handle that front ends hold instead of the controller.
//!
//! A prompt keeps the controller mutably borrowed for as long as its dialog
//! is open, and front-end callbacks may still fire in that window. Input is
//! dropped, signals stay in their channel, and show/hide is remembered and
//! applied as soon as the controller is free again.

use std::cell::{Cell, Ref, RefCell};

use tracing::debug;

use crate::backend::ConnectionManager;
use crate::controller::{NetworkingController, PanelIntent};
use crate::prompt::Prompter;
use crate::settings::SettingsStore;

pub struct SharedController<M, S, P> {
    controller: RefCell<NetworkingController<M, S, P>>,
    pending_visibility: Cell<Option<bool>>,
}

impl<M, S, P> SharedController<M, S, P>
where
    M: ConnectionManager,
    S: SettingsStore,
    P: Prompter,
{
    pub fn new(controller: NetworkingController<M, S, P>) -> Self {
        Self {
            controller: RefCell::new(controller),
            pending_visibility: Cell::new(None),
        }
    }

    /// Panel shown or hidden. Returns false when the change had to wait for
    /// an open prompt; the latest request wins.
    pub fn set_visible(&self, visible: bool) -> bool {
        self.pending_visibility.set(Some(visible));
        self.apply_visibility()
    }

    /// Returns false when the intent was dropped because a prompt is open.
    pub fn dispatch(&self, intent: PanelIntent) -> bool {
        {
            let Ok(mut controller) = self.controller.try_borrow_mut() else {
                debug!(?intent, "panel busy, dropping intent");
                return false;
            };
            controller.handle(intent);
        }
        self.apply_visibility();
        true
    }

    /// Apply deferred visibility and queued signals. Returns whether
    /// anything changed.
    pub fn pump(&self) -> bool {
        let visibility_changed = self.apply_visibility();
        let processed = match self.controller.try_borrow_mut() {
            Ok(mut controller) => controller.process_signals(),
            Err(_) => 0,
        };
        // A wrong-password prompt may have run inside process_signals.
        let late_change = self.apply_visibility();
        visibility_changed || processed > 0 || late_change
    }

    pub fn try_borrow(&self) -> Option<Ref<'_, NetworkingController<M, S, P>>> {
        self.controller.try_borrow().ok()
    }

    pub fn has_pending_visibility(&self) -> bool {
        self.pending_visibility.get().is_some()
    }

    fn apply_visibility(&self) -> bool {
        let Some(visible) = self.pending_visibility.get() else {
            return false;
        };
        let Ok(mut controller) = self.controller.try_borrow_mut() else {
            debug!(visible, "panel busy, deferring visibility change");
            return false;
        };
        self.pending_visibility.set(None);
        if visible {
            controller.activate();
        } else {
            controller.deactivate();
        }
        true
    }
}
