//! # Atrium Window Manager Library
//!
//! The window/dialog stack manager and message-routing core of a
//! graphical application shell: it decides which screen is active, which
//! dialogs are stacked modally on top of it, and how control messages
//! reach them: synchronously from the render thread and asynchronously
//! from worker threads.
//!
//! ## Architecture
//!
//! Atrium is built on a modular architecture:
//! - `manager`: activation state machine, history, modal routing
//! - `registry`: identifier-keyed window arena and behavior capability
//! - `message`: control messages, actions, and listener registration
//! - `queue`: cross-thread message queue drained on the owning thread
//! - `hooks`: injected shell collaborators (sound, lock policy, visibility)
//! - `config`: configuration parsing and management
//!
//! ## Usage
//!
//! ```rust,no_run
//! use atrium::{AtriumConfig, WindowManager};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = AtriumConfig::default();
//!     let mut manager = WindowManager::new(&config.shell)?;
//!     manager.initialize();
//!     manager.activate_window(config.shell.home_window, None);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod hooks;
pub mod manager;
pub mod message;
pub mod queue;
pub mod registry;

// Re-export main types for easy access
pub use config::{AtriumConfig, GeneralConfig, ShellConfig};
pub use hooks::{NullHooks, ShellHooks, SoundEvent};
pub use manager::WindowManager;
pub use message::{Action, Message, MessageKind, MessageTarget, SENDER_NONE};
pub use queue::{MessageQueue, QueueHandle};
pub use registry::{
    Window, WindowBehavior, WindowId, WindowRecord, WindowRegistry, WINDOW_ID_INVALID,
    WINDOW_ID_STARTUP,
};

// Re-export common error types
pub use anyhow::{Context, Error, Result};

/// Version information for Atrium
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
