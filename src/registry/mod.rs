//! Window registry
//!
//! The registry is the single source of truth for "does this identifier
//! resolve to a live window". It owns every registered window (arena
//! style), supports windows that answer to a contiguous range of ids,
//! and performs the forced load/unload of windows whose resources are not
//! allocated on demand.

use std::collections::HashMap;

use log::debug;
use thiserror::Error;

use crate::message::{Action, Message};

/// Stable window identifier
pub type WindowId = u32;

/// Sentinel identifier that never resolves to a window
pub const WINDOW_ID_INVALID: WindowId = 0;

/// Pseudo identifier resolved to the configured startup window before
/// activation runs. Never registered.
pub const WINDOW_ID_STARTUP: WindowId = u32::MAX;

/// Behavior capability implemented by windows, dialogs, and overlays.
///
/// Routing depends only on the flags carried by [`WindowRecord`]; this
/// trait is how a window observes messages, actions, rendering, and
/// resource lifecycle. All methods default to "not interested".
pub trait WindowBehavior {
    /// Handle a message; return true if it was consumed
    fn on_message(&mut self, _message: &Message) -> bool {
        false
    }

    /// Handle an input action; return true if it was consumed
    fn on_action(&mut self, _action: &Action) -> bool {
        false
    }

    /// Draw this window (called only while the window is running)
    fn on_render(&mut self) {}

    /// Allocate graphics resources
    fn allocate_resources(&mut self) {}

    /// Release graphics resources
    fn free_resources(&mut self) {}
}

/// Static description of a window: identity and behavioral flags
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRecord {
    /// Primary identifier
    pub id: WindowId,

    /// Number of consecutive identifiers this window answers to (>= 1)
    pub id_range: u32,

    /// Dialogs stack modally instead of replacing the active window
    pub dialog: bool,

    /// Allocate graphics resources lazily on first activation instead of
    /// at manager initialization
    pub load_on_demand: bool,

    /// Compositing order among simultaneously visible windows
    pub render_order: u32,

    /// Visibility condition evaluated each frame for modeless overlays
    pub visibility_condition: Option<String>,
}

impl WindowRecord {
    pub fn new(id: WindowId) -> Self {
        Self {
            id,
            id_range: 1,
            dialog: false,
            load_on_demand: false,
            render_order: 0,
            visibility_condition: None,
        }
    }

    /// Answer to `count` consecutive ids starting at the primary id
    pub fn with_id_range(mut self, count: u32) -> Self {
        self.id_range = count.max(1);
        self
    }

    pub fn dialog(mut self) -> Self {
        self.dialog = true;
        self
    }

    pub fn load_on_demand(mut self) -> Self {
        self.load_on_demand = true;
        self
    }

    pub fn with_render_order(mut self, order: u32) -> Self {
        self.render_order = order;
        self
    }

    pub fn with_visibility_condition(mut self, condition: impl Into<String>) -> Self {
        self.visibility_condition = Some(condition.into());
        self
    }
}

/// A registered window: static record, runtime state, and its behavior
pub struct Window {
    record: WindowRecord,
    behavior: Box<dyn WindowBehavior>,
    running: bool,
    closing: bool,
    resources_allocated: bool,
}

impl Window {
    pub fn new(record: WindowRecord, behavior: Box<dyn WindowBehavior>) -> Self {
        Self {
            record,
            behavior,
            running: false,
            closing: false,
            resources_allocated: false,
        }
    }

    pub fn record(&self) -> &WindowRecord {
        &self.record
    }

    pub fn id(&self) -> WindowId {
        self.record.id
    }

    /// True if `id` falls inside this window's identifier range
    pub fn covers(&self, id: WindowId) -> bool {
        id >= self.record.id && (id - self.record.id) < self.record.id_range
    }

    pub fn is_dialog(&self) -> bool {
        self.record.dialog
    }

    /// True while the window is initialized and visible
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// True while the window is playing its closing transition
    pub fn is_closing(&self) -> bool {
        self.closing
    }

    pub fn set_closing(&mut self, closing: bool) {
        self.closing = closing;
    }

    pub fn resources_allocated(&self) -> bool {
        self.resources_allocated
    }

    /// Allocate graphics resources if not already allocated
    pub fn allocate(&mut self) {
        if !self.resources_allocated {
            self.behavior.allocate_resources();
            self.resources_allocated = true;
        }
    }

    /// Release graphics resources if allocated
    pub fn free(&mut self) {
        if self.resources_allocated {
            self.behavior.free_resources();
            self.resources_allocated = false;
        }
    }

    /// Deliver a message to this window's behavior
    pub fn on_message(&mut self, message: &Message) -> bool {
        self.behavior.on_message(message)
    }

    /// Deliver an action to this window's behavior
    pub fn on_action(&mut self, action: &Action) -> bool {
        self.behavior.on_action(action)
    }

    /// Draw this window
    pub fn on_render(&mut self) {
        self.behavior.on_render();
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("record", &self.record)
            .field("running", &self.running)
            .field("closing", &self.closing)
            .field("resources_allocated", &self.resources_allocated)
            .finish()
    }
}

/// Errors produced by window registration
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("window id {0} is reserved and cannot be registered")]
    ReservedId(WindowId),

    #[error("window id {0} is already registered")]
    AlreadyRegistered(WindowId),
}

struct RegisteredWindow {
    window: Window,
    custom: bool,
}

/// Identifier-keyed window arena
pub struct WindowRegistry {
    /// Registered windows keyed by primary id
    entries: HashMap<WindowId, RegisteredWindow>,

    /// Every covered id (including the primary) mapped to the primary id
    coverage: HashMap<WindowId, WindowId>,
}

impl WindowRegistry {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            coverage: HashMap::new(),
        }
    }

    /// Register a window across its full identifier range.
    ///
    /// Registration is atomic: on any failure nothing is inserted.
    pub fn add(&mut self, window: Window) -> Result<(), RegistryError> {
        self.insert(window, false)
    }

    /// As [`add`](Self::add), additionally marking the window as
    /// manager-owned for teardown
    pub fn add_custom(&mut self, window: Window) -> Result<(), RegistryError> {
        self.insert(window, true)
    }

    fn insert(&mut self, window: Window, custom: bool) -> Result<(), RegistryError> {
        let record = window.record();
        let first = record.id;
        if first == WINDOW_ID_INVALID {
            return Err(RegistryError::ReservedId(first));
        }
        // The range must not wrap into the reserved pseudo-id space
        let last = first
            .checked_add(record.id_range.saturating_sub(1))
            .filter(|&last| last < WINDOW_ID_STARTUP)
            .ok_or(RegistryError::ReservedId(first))?;

        // Check the whole range before touching the maps
        for id in first..=last {
            if self.coverage.contains_key(&id) {
                return Err(RegistryError::AlreadyRegistered(id));
            }
        }

        for id in first..=last {
            self.coverage.insert(id, first);
        }
        debug!("Registered window {} (range {})", first, record.id_range);
        self.entries.insert(first, RegisteredWindow { window, custom });
        Ok(())
    }

    /// Erase the mapping for a window and hand it back to the caller
    /// without destroying it
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let primary = self.resolve(id)?;
        let entry = self.entries.remove(&primary)?;
        let last = primary + entry.window.record().id_range.saturating_sub(1);
        for covered in primary..=last {
            self.coverage.remove(&covered);
        }
        debug!("Unregistered window {}", primary);
        Some(entry.window)
    }

    /// [`remove`](Self::remove) followed by destruction of the window
    pub fn delete(&mut self, id: WindowId) -> bool {
        self.remove(id).is_some()
    }

    /// Resolve any covered id to the window's primary id
    pub fn resolve(&self, id: WindowId) -> Option<WindowId> {
        if id == WINDOW_ID_INVALID {
            return None;
        }
        self.coverage.get(&id).copied()
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.resolve(id).is_some()
    }

    pub fn get(&self, id: WindowId) -> Option<&Window> {
        let primary = self.resolve(id)?;
        self.entries.get(&primary).map(|e| &e.window)
    }

    pub fn get_mut(&mut self, id: WindowId) -> Option<&mut Window> {
        let primary = self.resolve(id)?;
        self.entries.get_mut(&primary).map(|e| &mut e.window)
    }

    /// True if the window was registered via
    /// [`add_custom`](Self::add_custom)
    pub fn is_custom(&self, id: WindowId) -> bool {
        self.resolve(id)
            .and_then(|primary| self.entries.get(&primary))
            .map(|e| e.custom)
            .unwrap_or(false)
    }

    /// Primary ids of all registered windows
    pub fn ids(&self) -> Vec<WindowId> {
        self.entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Force resource allocation for every window not loaded on demand
    pub fn load_not_on_demand(&mut self) {
        for entry in self.entries.values_mut() {
            if !entry.window.record().load_on_demand {
                entry.window.allocate();
            }
        }
    }

    /// Release resources for every window not loaded on demand
    pub fn unload_not_on_demand(&mut self) {
        for entry in self.entries.values_mut() {
            if !entry.window.record().load_on_demand {
                entry.window.free();
            }
        }
    }

    /// Drop every registered window, returning how many were custom
    pub fn clear(&mut self) -> usize {
        let custom = self.entries.values().filter(|e| e.custom).count();
        self.entries.clear();
        self.coverage.clear();
        custom
    }
}

impl Default for WindowRegistry {
    fn default() -> Self {
        Self::new()
    }
}
