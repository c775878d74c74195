//! Window and dialog stack management
//!
//! This module implements the coordination core of the shell:
//! - Back-navigation history and the activation state machine
//! - The modal dialog stack and modeless overlay set
//! - Message routing with broadcast/targeted/modal precedence
//! - Cross-thread message delivery via the owned queue
//! - Render ordering for simultaneously visible overlays
//!
//! The manager is owned by the embedding application and lives on the
//! render/UI thread; the only piece other threads may touch is the
//! message queue handle.

use anyhow::Result;
use log::{debug, error, info, warn};

use crate::config::ShellConfig;
use crate::hooks::{NullHooks, ShellHooks, SoundEvent};
use crate::message::{Action, Message, MessageKind, MessageTarget, SENDER_NONE};
use crate::queue::{MessageQueue, QueueHandle};
use crate::registry::{
    Window, WindowId, WindowRegistry, WINDOW_ID_INVALID, WINDOW_ID_STARTUP,
};

/// The shell's window/dialog stack manager and message router
pub struct WindowManager {
    config: ShellConfig,

    /// Identifier-keyed window arena
    registry: WindowRegistry,

    /// Back-navigation order; the top entry is the active window
    history: Vec<WindowId>,

    /// Modally routed dialogs, topmost last
    modal_stack: Vec<WindowId>,

    /// Active non-modal overlays
    modeless: Vec<WindowId>,

    /// Cross-cutting non-window listeners
    message_targets: Vec<Box<dyn MessageTarget>>,

    /// Messages posted from other threads, drained once per frame
    queue: QueueHandle,

    /// Injected shell collaborators (sound, lock policy, visibility)
    hooks: Box<dyn ShellHooks>,

    initialized: bool,
}

impl WindowManager {
    /// Create a manager with no-op shell hooks
    pub fn new(config: &ShellConfig) -> Result<Self> {
        Self::with_hooks(config, Box::new(NullHooks))
    }

    /// Create a manager with the given shell hooks
    pub fn with_hooks(config: &ShellConfig, hooks: Box<dyn ShellHooks>) -> Result<Self> {
        if config.home_window == WINDOW_ID_INVALID || config.home_window == WINDOW_ID_STARTUP {
            anyhow::bail!("home_window must be a concrete window id");
        }
        Ok(Self {
            config: config.clone(),
            registry: WindowRegistry::new(),
            history: Vec::new(),
            modal_stack: Vec::new(),
            modeless: Vec::new(),
            message_targets: Vec::new(),
            queue: MessageQueue::new(),
            hooks,
            initialized: false,
        })
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a window; failures are logged and leave the registry
    /// unchanged
    pub fn add(&mut self, window: Window) {
        if let Err(e) = self.registry.add(window) {
            error!("Cannot register window: {}", e);
        }
    }

    /// Register a manager-owned window destroyed at teardown
    pub fn add_custom(&mut self, window: Window) {
        if let Err(e) = self.registry.add_custom(window) {
            error!("Cannot register custom window: {}", e);
        }
    }

    /// Register a window and track it as a modeless overlay
    pub fn add_modeless(&mut self, window: Window) {
        let id = window.id();
        match self.registry.add(window) {
            Ok(()) => self.modeless.push(id),
            Err(e) => error!("Cannot register modeless window: {}", e),
        }
    }

    /// Unregister a window and hand it back without destroying it
    pub fn remove(&mut self, id: WindowId) -> Option<Window> {
        let removed = self.registry.remove(id);
        if removed.is_none() {
            warn!("Attempted to remove window {} that was never added", id);
        }
        removed
    }

    /// Unregister and destroy a window
    pub fn delete(&mut self, id: WindowId) {
        if !self.registry.delete(id) {
            warn!("Attempted to delete window {} that was never added", id);
        }
    }

    /// Stop tracking a window as a modeless overlay (the registration
    /// itself is untouched)
    pub fn remove_modeless(&mut self, id: WindowId) {
        let key = self.registry.resolve(id).unwrap_or(id);
        self.modeless.retain(|&w| w != key);
    }

    /// Register a cross-cutting listener observing every message
    pub fn register_message_target(&mut self, target: Box<dyn MessageTarget>) {
        self.message_targets.push(target);
    }

    pub fn registry(&self) -> &WindowRegistry {
        &self.registry
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Load not-on-demand windows and mark the manager live
    pub fn initialize(&mut self) {
        info!("Initializing window manager");
        self.registry.load_not_on_demand();
        self.initialized = true;
    }

    /// Send deinit everywhere, free resources, destroy owned windows,
    /// and clear every collection
    pub fn deinitialize(&mut self) {
        info!("Deinitializing window manager");
        for id in self.registry.ids() {
            let deinit = Message::new(MessageKind::WindowDeinit, SENDER_NONE, 0)
                .with_params(WINDOW_ID_INVALID as i32, 0);
            self.deliver_lifecycle(id, &deinit, false);
        }
        self.registry.unload_not_on_demand();
        let custom = self.registry.clear();
        debug!("Destroyed {} custom windows at teardown", custom);

        self.history.clear();
        self.modal_stack.clear();
        self.modeless.clear();
        self.message_targets.clear();
        self.queue.clear();
        self.initialized = false;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    // ------------------------------------------------------------------
    // Message routing
    // ------------------------------------------------------------------

    /// Deliver a message according to routing precedence; returns true
    /// if any recipient handled it.
    ///
    /// Precedence: registered listeners always observe the message;
    /// active modeless overlays are next; a notify-all broadcast then
    /// reaches every registered window exactly once and always counts as
    /// handled; otherwise delivery goes to the modal stack (topmost
    /// first, stopping at the first consumer) with parent re-delivery,
    /// or straight to the active window when nothing is routed.
    pub fn send_message(&mut self, message: &Message) -> bool {
        let mut handled = false;

        for target in &mut self.message_targets {
            if target.on_message(message) {
                handled = true;
            }
        }

        // Windows already given this message, so a broadcast never
        // delivers twice to an entry that is also registered
        let mut delivered: Vec<WindowId> = Vec::new();

        for id in self.modeless.clone() {
            if let Some(window) = self.registry.get_mut(id) {
                if window.is_running() {
                    if window.on_message(message) {
                        handled = true;
                    }
                    delivered.push(id);
                }
            }
        }

        if message.kind == MessageKind::NotifyAll {
            for id in self.modal_stack.clone().into_iter().rev() {
                if delivered.contains(&id) {
                    continue;
                }
                if let Some(window) = self.registry.get_mut(id) {
                    window.on_message(message);
                    delivered.push(id);
                }
            }
            for id in self.registry.ids() {
                if delivered.contains(&id) {
                    continue;
                }
                if let Some(window) = self.registry.get_mut(id) {
                    window.on_message(message);
                }
            }
            return true;
        }

        if !self.modal_stack.is_empty() {
            for id in self.modal_stack.clone().into_iter().rev() {
                if let Some(window) = self.registry.get_mut(id) {
                    if window.on_message(message) {
                        handled = true;
                        break;
                    }
                }
            }
            // A dialog's parent window still receives messages addressed
            // to it, and unaddressed ones
            let active = self.active_window_id();
            if active != WINDOW_ID_INVALID
                && (message.sender_id == active
                    || message.control_id == active
                    || message.sender_id == SENDER_NONE)
            {
                if let Some(window) = self.registry.get_mut(active) {
                    if window.on_message(message) {
                        handled = true;
                    }
                }
            }
        } else {
            let active = self.active_window_id();
            if let Some(window) = self.registry.get_mut(active) {
                if window.on_message(message) {
                    handled = true;
                }
            }
        }

        handled
    }

    /// Deliver a message directly to one window, bypassing precedence
    pub fn send_message_to(&mut self, message: &Message, target_id: WindowId) -> bool {
        match self.registry.get_mut(target_id) {
            Some(window) => window.on_message(message),
            None => false,
        }
    }

    /// Deliver an input action to the topmost routed dialog that still
    /// takes input, or to the active window
    pub fn on_action(&mut self, action: &Action) -> bool {
        let target = self
            .modal_stack
            .iter()
            .rev()
            .copied()
            .find(|&id| {
                self.registry
                    .get(id)
                    .map(|w| w.is_running() && !w.is_closing())
                    .unwrap_or(false)
            })
            .or_else(|| {
                let active = self.active_window_id();
                (active != WINDOW_ID_INVALID).then_some(active)
            });

        match target {
            Some(id) => self
                .registry
                .get_mut(id)
                .map(|w| w.on_action(action))
                .unwrap_or(false),
            None => false,
        }
    }

    // ------------------------------------------------------------------
    // Cross-thread queue
    // ------------------------------------------------------------------

    /// Cloneable posting handle for worker threads and window behaviors
    pub fn queue_handle(&self) -> QueueHandle {
        self.queue.clone()
    }

    /// Schedule a message for delivery on the owning thread
    pub fn post_async(&self, message: Message) {
        self.queue.post(message);
    }

    /// Drain the queue on the owning thread, dispatching each message
    /// through [`send_message`](Self::send_message). The queue lock is
    /// never held across a dispatch, so handlers may post follow-ups.
    pub fn drain_and_dispatch(&mut self) -> usize {
        let mut dispatched = 0;
        while let Some(message) = self.queue.pop() {
            self.send_message(&message);
            dispatched += 1;
        }
        dispatched
    }

    // ------------------------------------------------------------------
    // Activation state machine
    // ------------------------------------------------------------------

    /// Activate a window, pushing it onto the navigation history
    pub fn activate_window(&mut self, id: WindowId, path: Option<&str>) {
        self.activate(id, path, false);
    }

    /// Activate a window, replacing the current history top (sideways
    /// navigation rather than drilling down)
    pub fn change_active_window(&mut self, id: WindowId, path: Option<&str>) {
        self.activate(id, path, true);
    }

    fn activate(&mut self, requested: WindowId, path: Option<&str>, swap: bool) {
        // Resolve pseudo identifiers to concrete ones
        let mut target = if requested == WINDOW_ID_STARTUP {
            self.config.resolved_startup_window()
        } else {
            requested
        };

        // Policy gate: denied activations land on the home window
        if !self.hooks.check_menu_lock(target) {
            error!(
                "Activation of window {} denied by menu lock, redirecting to home",
                target
            );
            target = self.config.home_window;
        }

        let Some(primary) = self.registry.resolve(target) else {
            error!("Window {} does not exist", target);
            return;
        };

        // Dialogs open modally; the active window and history stay as
        // they are
        let is_dialog = self
            .registry
            .get(primary)
            .map(|w| w.is_dialog())
            .unwrap_or(false);
        if is_dialog {
            self.open_dialog(primary, path);
            return;
        }

        debug!("Activating window {} (swap: {})", target, swap);

        let previous = self.history.last().copied();
        if let Some(current) = previous {
            self.hooks.play_window_sound(current, SoundEvent::Deinit);
            let deinit = Message::new(MessageKind::WindowDeinit, SENDER_NONE, 0)
                .with_params(target as i32, 0);
            self.deliver_lifecycle(current, &deinit, false);
        }

        if swap {
            self.history.pop();
        }
        self.history_push(target);

        self.hooks.play_window_sound(target, SoundEvent::Init);
        let mut init = Message::new(MessageKind::WindowInit, SENDER_NONE, 0)
            .with_params(previous.unwrap_or(WINDOW_ID_INVALID) as i32, 0);
        if let Some(path) = path {
            init = init.with_string(path);
        }
        self.deliver_lifecycle(target, &init, true);
    }

    /// Modal-open sequence for a dialog: route it topmost and initialize
    /// it in place
    fn open_dialog(&mut self, id: WindowId, path: Option<&str>) {
        debug!("Opening dialog {}", id);
        self.route_to_window(id);
        self.hooks.play_window_sound(id, SoundEvent::Init);
        let mut init = Message::new(MessageKind::WindowInit, SENDER_NONE, 0)
            .with_params(self.active_window_id() as i32, 0);
        if let Some(path) = path {
            init = init.with_string(path);
        }
        self.deliver_lifecycle(id, &init, true);
    }

    /// Navigate back: deinitialize the current window, pop the history,
    /// and recover to the home window if the new top cannot resolve
    pub fn previous_window(&mut self) {
        let Some(current) = self.history.last().copied() else {
            debug!("PreviousWindow: no window active");
            return;
        };

        // Cause parameter: the id we are returning to, if known
        let target = self
            .history
            .iter()
            .rev()
            .nth(1)
            .copied()
            .unwrap_or(WINDOW_ID_INVALID);

        self.hooks.play_window_sound(current, SoundEvent::Deinit);
        let deinit =
            Message::new(MessageKind::WindowDeinit, SENDER_NONE, 0).with_params(target as i32, 0);
        self.deliver_lifecycle(current, &deinit, false);
        self.history.pop();

        match self.history.last().copied() {
            Some(prev) if self.registry.contains(prev) => {
                self.hooks.play_window_sound(prev, SoundEvent::Init);
                let init = Message::new(MessageKind::WindowInit, SENDER_NONE, 0)
                    .with_params(current as i32, 0);
                self.deliver_lifecycle(prev, &init, true);
            }
            _ => {
                warn!("PreviousWindow: nothing to return to, falling back to home");
                self.history.clear();
                self.activate_window(self.config.home_window, None);
            }
        }
    }

    /// Deinitialize and reinitialize the active window in place
    pub fn refresh_window(&mut self) {
        let Some(current) = self.history.last().copied() else {
            return;
        };
        debug!("Refreshing window {}", current);
        let deinit =
            Message::new(MessageKind::WindowDeinit, SENDER_NONE, 0).with_params(current as i32, 0);
        self.deliver_lifecycle(current, &deinit, false);
        let init =
            Message::new(MessageKind::WindowInit, SENDER_NONE, 0).with_params(current as i32, 0);
        self.deliver_lifecycle(current, &init, true);
    }

    /// Send a lifecycle message to one window, keeping its running state
    /// and load-on-demand resources in step
    fn deliver_lifecycle(&mut self, id: WindowId, message: &Message, start: bool) {
        if let Some(window) = self.registry.get_mut(id) {
            if start {
                window.allocate();
            }
            window.on_message(message);
            window.set_running(start);
            if !start && window.record().load_on_demand {
                window.free();
            }
        }
    }

    fn history_push(&mut self, id: WindowId) {
        // Re-activating a window already in the stack pops everything
        // above it instead of pushing a duplicate
        if let Some(pos) = self.history.iter().position(|&w| w == id) {
            self.history.truncate(pos + 1);
        } else {
            self.history.push(id);
        }
    }

    // ------------------------------------------------------------------
    // Modal stack
    // ------------------------------------------------------------------

    /// Place a dialog topmost on the modal stack, removing any prior
    /// occurrence first
    pub fn route_to_window(&mut self, id: WindowId) {
        let Some(primary) = self.registry.resolve(id) else {
            warn!("Cannot route unregistered window {}", id);
            return;
        };
        self.modal_stack.retain(|&w| w != primary);
        self.modal_stack.push(primary);
    }

    /// Remove all occurrences of a window from the modal stack
    pub fn un_route(&mut self, id: WindowId) {
        let key = self.registry.resolve(id).unwrap_or(id);
        self.modal_stack.retain(|&w| w != key);
    }

    /// True if any dialog is routed; with `include_closing` false,
    /// dialogs playing their closing transition are treated as gone
    pub fn is_routed(&self, include_closing: bool) -> bool {
        if include_closing {
            !self.modal_stack.is_empty()
        } else {
            self.modal_stack.iter().any(|&id| {
                self.registry
                    .get(id)
                    .map(|w| !w.is_closing())
                    .unwrap_or(false)
            })
        }
    }

    /// Topmost routed window, or the invalid id if nothing is routed
    pub fn topmost_routed_window(&self) -> WindowId {
        self.modal_stack.last().copied().unwrap_or(WINDOW_ID_INVALID)
    }

    /// Flag a window as playing (or done with) its closing transition
    pub fn set_window_closing(&mut self, id: WindowId, closing: bool) {
        if let Some(window) = self.registry.get_mut(id) {
            window.set_closing(closing);
        }
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Identifier of the active window, or the invalid id
    pub fn active_window_id(&self) -> WindowId {
        self.history.last().copied().unwrap_or(WINDOW_ID_INVALID)
    }

    /// True if the window is active, or running (and not closing) as a
    /// routed dialog or modeless overlay
    pub fn is_window_active(&self, id: WindowId) -> bool {
        if id == WINDOW_ID_INVALID {
            return false;
        }
        if self.active_window_id() == id {
            return true;
        }
        let Some(primary) = self.registry.resolve(id) else {
            return false;
        };
        if !self.modal_stack.contains(&primary) && !self.modeless.contains(&primary) {
            return false;
        }
        self.registry
            .get(primary)
            .map(|w| w.is_running() && !w.is_closing())
            .unwrap_or(false)
    }

    /// Back-navigation history, oldest first; the last entry is active
    pub fn history(&self) -> &[WindowId] {
        &self.history
    }

    // ------------------------------------------------------------------
    // Rendering & per-frame upkeep
    // ------------------------------------------------------------------

    /// Draw the active window
    pub fn render(&mut self) {
        let active = self.active_window_id();
        if let Some(window) = self.registry.get_mut(active) {
            if window.is_running() {
                window.on_render();
            }
        }
    }

    /// Draw routed dialogs and modeless overlays in compositing order.
    ///
    /// Entries are stable-sorted ascending by render-order key, so
    /// same-priority overlays keep their stacking order. Entries not
    /// currently running are skipped.
    pub fn render_dialogs(&mut self) {
        let mut overlays: Vec<(u32, WindowId)> = Vec::new();
        for &id in self.modal_stack.iter().chain(self.modeless.iter()) {
            if let Some(window) = self.registry.get(id) {
                overlays.push((window.record().render_order, id));
            }
        }
        overlays.sort_by_key(|&(order, _)| order);

        for (_, id) in overlays {
            if let Some(window) = self.registry.get_mut(id) {
                if window.is_running() {
                    window.on_render();
                }
            }
        }
    }

    /// Evaluate visibility conditions for modeless overlays and start or
    /// stop them accordingly; called once per frame
    pub fn update_modeless_visibility(&mut self) {
        let context = self.active_window_id();
        for id in self.modeless.clone() {
            let Some(window) = self.registry.get(id) else {
                continue;
            };
            let Some(condition) = window.record().visibility_condition.clone() else {
                continue;
            };
            let running = window.is_running();
            let visible = self.hooks.evaluate_visibility(&condition, context);
            if visible && !running {
                let init = Message::new(MessageKind::WindowInit, SENDER_NONE, 0)
                    .with_params(context as i32, 0);
                self.deliver_lifecycle(id, &init, true);
            } else if !visible && running {
                let deinit = Message::new(MessageKind::WindowDeinit, SENDER_NONE, 0)
                    .with_params(WINDOW_ID_INVALID as i32, 0);
                self.deliver_lifecycle(id, &deinit, false);
            }
        }
    }
}
