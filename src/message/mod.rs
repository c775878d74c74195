//! Control messages and input actions
//!
//! This module defines the value-typed message that flows through the
//! shell: lifecycle notifications (init/deinit), broadcast notifications,
//! and control events. Messages are plain values so they can be copied
//! into the cross-thread queue and dispatched later without aliasing the
//! sender's storage.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::registry::WindowId;

/// Sender id used by messages that are not addressed from any window.
pub const SENDER_NONE: WindowId = 0;

/// Enumerated message kinds understood by the router and by windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    /// A window is becoming active; param1 carries the previously active id
    WindowInit,
    /// A window is being deactivated; param1 carries the id of the window
    /// replacing it (or the invalid id when tearing down)
    WindowDeinit,
    /// Broadcast to every registered window, active or not
    NotifyAll,
    /// A control inside a window was clicked
    Clicked,
    /// A list/container selection changed
    SelectedItem,
    /// Keyboard/controller focus moved onto a control
    SetFocus,
    /// Keyboard/controller focus left a control
    LostFocus,
    /// A window should rebuild its presentation state
    Refresh,
    /// Execute a built-in or scripted command carried in the string param
    Execute,
}

/// A control message delivered to windows, dialogs, and listeners.
///
/// Messages queued for cross-thread delivery are owned copies; recipients
/// only ever observe a shared borrow and must not retain it past the
/// dispatch call.
#[derive(Clone)]
pub struct Message {
    /// What happened
    pub kind: MessageKind,

    /// Window that sent the message, or [`SENDER_NONE`]
    pub sender_id: WindowId,

    /// Control (or destination window) the message concerns
    pub control_id: u32,

    /// First integer parameter; meaning depends on `kind`
    pub param1: i32,

    /// Second integer parameter; meaning depends on `kind`
    pub param2: i32,

    /// Optional string parameter (e.g. a navigation path)
    pub string_param: Option<String>,

    /// Optional opaque payload shared with the recipient
    pub payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl Message {
    /// Create a message with both integer parameters zeroed
    pub fn new(kind: MessageKind, sender_id: WindowId, control_id: u32) -> Self {
        Self {
            kind,
            sender_id,
            control_id,
            param1: 0,
            param2: 0,
            string_param: None,
            payload: None,
        }
    }

    /// Set the integer parameters
    pub fn with_params(mut self, param1: i32, param2: i32) -> Self {
        self.param1 = param1;
        self.param2 = param2;
        self
    }

    /// Attach a string parameter
    pub fn with_string(mut self, string_param: impl Into<String>) -> Self {
        self.string_param = Some(string_param.into());
        self
    }

    /// Attach an opaque payload
    pub fn with_payload(mut self, payload: Arc<dyn Any + Send + Sync>) -> Self {
        self.payload = Some(payload);
        self
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message")
            .field("kind", &self.kind)
            .field("sender_id", &self.sender_id)
            .field("control_id", &self.control_id)
            .field("param1", &self.param1)
            .field("param2", &self.param2)
            .field("string_param", &self.string_param)
            .field("payload", &self.payload.as_ref().map(|_| "<opaque>"))
            .finish()
    }
}

/// An input action (key, button, gesture) routed to the topmost dialog or
/// the active window
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// Stable action identifier
    pub id: u32,

    /// Analog amount for axis-style inputs (0.0 for discrete actions)
    pub amount: f32,
}

impl Action {
    pub fn new(id: u32) -> Self {
        Self { id, amount: 0.0 }
    }

    pub fn with_amount(mut self, amount: f32) -> Self {
        self.amount = amount;
        self
    }
}

/// Cross-cutting, non-window message listener.
///
/// Targets registered with the manager observe every message before any
/// window does, regardless of routing state.
pub trait MessageTarget {
    /// Handle a message; return true if it was consumed
    fn on_message(&mut self, message: &Message) -> bool;
}
