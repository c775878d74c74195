//! External shell collaborators
//!
//! The manager calls out to the embedding application for transition
//! sounds, menu-lock policy, and visibility-condition evaluation. These
//! are injected at construction instead of reached through globals, so
//! tests and headless embedders can swap them freely.

use crate::registry::WindowId;

/// Window transition a sound cue may accompany
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEvent {
    /// The window is becoming active
    Init,
    /// The window is being deactivated
    Deinit,
}

/// Capabilities the shell provides to the window manager.
///
/// Every method has a permissive default: no sound, no lock, everything
/// visible.
pub trait ShellHooks {
    /// Play the audio cue for a window transition
    fn play_window_sound(&self, _id: WindowId, _event: SoundEvent) {}

    /// Policy gate consulted before activating a window; returning false
    /// redirects the activation to the home window
    fn check_menu_lock(&self, _id: WindowId) -> bool {
        true
    }

    /// Evaluate a visibility condition for a modeless overlay in the
    /// context of the active window
    fn evaluate_visibility(&self, _condition: &str, _context: WindowId) -> bool {
        true
    }
}

/// Hooks implementation that does nothing and allows everything
pub struct NullHooks;

impl ShellHooks for NullHooks {}
