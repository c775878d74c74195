//! Integration tests for the Atrium window manager
//!
//! These tests exercise the public API end to end: manager lifecycle,
//! navigation with dialogs layered on top, broadcast delivery, and
//! cross-thread message posting against a live manager.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Result;

use atrium::{
    Action, AtriumConfig, Message, MessageKind, MessageTarget, ShellHooks, Window, WindowBehavior,
    WindowManager, WindowRecord, SENDER_NONE, WINDOW_ID_STARTUP,
};

const HOME: u32 = 100;
const LIBRARY: u32 = 110;
const SETTINGS: u32 = 120;
const CONFIRM: u32 = 130;

/// Window that counts its lifecycle transitions
struct CountingWindow {
    inits: Arc<AtomicU32>,
    deinits: Arc<AtomicU32>,
    broadcasts: Arc<AtomicU32>,
}

impl CountingWindow {
    fn boxed(counters: &Counters) -> Box<Self> {
        Box::new(Self {
            inits: counters.inits.clone(),
            deinits: counters.deinits.clone(),
            broadcasts: counters.broadcasts.clone(),
        })
    }
}

#[derive(Clone, Default)]
struct Counters {
    inits: Arc<AtomicU32>,
    deinits: Arc<AtomicU32>,
    broadcasts: Arc<AtomicU32>,
}

impl WindowBehavior for CountingWindow {
    fn on_message(&mut self, message: &Message) -> bool {
        match message.kind {
            MessageKind::WindowInit => {
                self.inits.fetch_add(1, Ordering::SeqCst);
                true
            }
            MessageKind::WindowDeinit => {
                self.deinits.fetch_add(1, Ordering::SeqCst);
                true
            }
            MessageKind::NotifyAll => {
                self.broadcasts.fetch_add(1, Ordering::SeqCst);
                true
            }
            _ => false,
        }
    }

    fn on_action(&mut self, _action: &Action) -> bool {
        true
    }
}

fn build_shell(counters: &Counters) -> Result<WindowManager> {
    let config = AtriumConfig::default();
    let mut manager = WindowManager::new(&config.shell)?;
    manager.add(Window::new(
        WindowRecord::new(HOME),
        CountingWindow::boxed(counters),
    ));
    manager.add(Window::new(
        WindowRecord::new(LIBRARY),
        CountingWindow::boxed(counters),
    ));
    manager.add(Window::new(
        WindowRecord::new(SETTINGS),
        CountingWindow::boxed(counters),
    ));
    manager.add_custom(Window::new(
        WindowRecord::new(CONFIRM).dialog(),
        CountingWindow::boxed(counters),
    ));
    Ok(manager)
}

#[test]
fn test_full_navigation_session() -> Result<()> {
    let counters = Counters::default();
    let mut manager = build_shell(&counters)?;

    manager.initialize();
    manager.activate_window(WINDOW_ID_STARTUP, None);
    assert_eq!(manager.active_window_id(), HOME);

    manager.activate_window(LIBRARY, Some("library/recent"));
    manager.activate_window(SETTINGS, None);
    assert_eq!(manager.history(), &[HOME, LIBRARY, SETTINGS]);

    // Open a dialog on top; navigation state stays put
    manager.activate_window(CONFIRM, None);
    assert_eq!(manager.active_window_id(), SETTINGS);
    assert_eq!(manager.topmost_routed_window(), CONFIRM);
    assert!(manager.is_window_active(CONFIRM));

    // Dialog intercepts input until dismissed
    assert!(manager.on_action(&Action::new(1)));
    manager.un_route(CONFIRM);
    assert!(!manager.is_routed(true));

    // Walk all the way back
    manager.previous_window();
    assert_eq!(manager.active_window_id(), LIBRARY);
    manager.previous_window();
    assert_eq!(manager.active_window_id(), HOME);

    manager.deinitialize();
    assert!(manager.registry().is_empty());
    assert!(manager.history().is_empty());
    Ok(())
}

#[test]
fn test_broadcast_reaches_all_windows() -> Result<()> {
    let counters = Counters::default();
    let mut manager = build_shell(&counters)?;

    manager.initialize();
    manager.activate_window(HOME, None);
    manager.activate_window(CONFIRM, None);

    let handled = manager.send_message(&Message::new(MessageKind::NotifyAll, SENDER_NONE, 0));
    assert!(handled);
    // All four registered windows, each exactly once
    assert_eq!(counters.broadcasts.load(Ordering::SeqCst), 4);
    Ok(())
}

#[test]
fn test_worker_threads_post_while_shell_navigates() -> Result<()> {
    let counters = Counters::default();
    let mut manager = build_shell(&counters)?;
    manager.initialize();
    manager.activate_window(HOME, None);

    let queue = manager.queue_handle();
    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let queue = queue.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    queue.post(
                        Message::new(MessageKind::NotifyAll, SENDER_NONE, 0)
                            .with_params(worker, i),
                    );
                }
            })
        })
        .collect();

    // The owning thread keeps navigating while workers post
    manager.activate_window(LIBRARY, None);
    manager.activate_window(SETTINGS, None);

    for worker in workers {
        worker.join().unwrap();
    }

    let dispatched = manager.drain_and_dispatch();
    assert_eq!(dispatched, 200);
    assert!(manager.queue_handle().is_empty());
    // Every broadcast reached every registered window
    assert_eq!(counters.broadcasts.load(Ordering::SeqCst), 200 * 4);
    Ok(())
}

#[test]
fn test_listener_observes_queued_traffic() -> Result<()> {
    struct Listener {
        seen: Arc<AtomicU32>,
    }
    impl MessageTarget for Listener {
        fn on_message(&mut self, _message: &Message) -> bool {
            self.seen.fetch_add(1, Ordering::SeqCst);
            false
        }
    }

    let counters = Counters::default();
    let seen = Arc::new(AtomicU32::new(0));
    let mut manager = build_shell(&counters)?;
    manager.register_message_target(Box::new(Listener { seen: seen.clone() }));

    manager.post_async(Message::new(MessageKind::Execute, SENDER_NONE, 0));
    manager.post_async(Message::new(MessageKind::Refresh, SENDER_NONE, 0));
    manager.drain_and_dispatch();

    assert_eq!(seen.load(Ordering::SeqCst), 2);
    Ok(())
}

#[test]
fn test_locked_shell_falls_back_to_home() -> Result<()> {
    struct LockEverything;
    impl ShellHooks for LockEverything {
        fn check_menu_lock(&self, id: u32) -> bool {
            id == HOME
        }
    }

    let counters = Counters::default();
    let config = AtriumConfig::default();
    let mut manager = WindowManager::with_hooks(&config.shell, Box::new(LockEverything))?;
    manager.add(Window::new(
        WindowRecord::new(HOME),
        CountingWindow::boxed(&counters),
    ));
    manager.add(Window::new(
        WindowRecord::new(SETTINGS),
        CountingWindow::boxed(&counters),
    ));

    manager.activate_window(SETTINGS, None);
    assert_eq!(manager.active_window_id(), HOME);
    Ok(())
}
