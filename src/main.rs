//! # Atrium - Shell Window Manager
//!
//! Demo driver for the Atrium window/dialog stack manager. Registers a
//! small set of sample windows, runs a scripted activation sequence with
//! worker threads posting messages, and drains/renders for a fixed
//! number of frames.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use log::{debug, error, info};

use atrium::{
    Action, AtriumConfig, Message, MessageKind, Window, WindowBehavior, WindowManager,
    WindowRecord, SENDER_NONE, WINDOW_ID_STARTUP,
};

#[derive(Parser)]
#[command(name = "atrium")]
#[command(about = "Window and dialog stack manager demo for graphical application shells")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "~/.config/atrium/atrium.toml")]
    config: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Number of frames to run the demo loop for
    #[arg(short, long, default_value_t = 120)]
    frames: u32,
}

/// Sample window that logs its lifecycle
struct DemoWindow {
    name: &'static str,
}

impl WindowBehavior for DemoWindow {
    fn on_message(&mut self, message: &Message) -> bool {
        match message.kind {
            MessageKind::WindowInit => {
                info!("[{}] initialized (from window {})", self.name, message.param1);
                true
            }
            MessageKind::WindowDeinit => {
                info!("[{}] deinitialized (next window {})", self.name, message.param1);
                true
            }
            _ => {
                debug!("[{}] message: {:?}", self.name, message.kind);
                false
            }
        }
    }

    fn on_action(&mut self, action: &Action) -> bool {
        info!("[{}] action {}", self.name, action.id);
        true
    }

    fn on_render(&mut self) {
        debug!("[{}] render", self.name);
    }
}

fn demo_window(id: u32, name: &'static str) -> Window {
    Window::new(WindowRecord::new(id), Box::new(DemoWindow { name }))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    info!("🚀 Starting Atrium window manager demo");
    info!(
        "📄 Version: {} (built {} for {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_DATE"),
        env!("TARGET_TRIPLE")
    );

    // Load configuration
    let config = match AtriumConfig::load(&cli.config) {
        Ok(config) => {
            info!("✅ Configuration loaded from: {}", cli.config);
            config
        }
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            info!("📝 Using default configuration");
            AtriumConfig::default()
        }
    };

    let mut manager = WindowManager::new(&config.shell)?;

    // Register the demo window set
    let home = config.shell.home_window;
    manager.add(demo_window(home, "home"));
    manager.add(demo_window(110, "library"));
    manager.add(demo_window(120, "settings"));
    manager.add_custom(Window::new(
        WindowRecord::new(130).dialog().with_render_order(10),
        Box::new(DemoWindow { name: "confirm-dialog" }),
    ));
    manager.add_modeless(Window::new(
        WindowRecord::new(140)
            .with_render_order(5)
            .with_visibility_condition("shell.notifications"),
        Box::new(DemoWindow { name: "notification-overlay" }),
    ));

    manager.initialize();
    manager.activate_window(WINDOW_ID_STARTUP, None);

    // Worker threads post messages while the owning thread runs frames
    let queue = manager.queue_handle();
    let poster = thread::spawn(move || {
        for i in 0..10 {
            queue.post(Message::new(MessageKind::NotifyAll, SENDER_NONE, 0).with_params(i, 0));
            thread::sleep(Duration::from_millis(5));
        }
    });

    // Scripted navigation
    manager.activate_window(110, Some("library/recent"));
    manager.activate_window(120, None);
    manager.activate_window(130, None); // opens modally
    manager.on_action(&Action::new(7)); // lands on the dialog
    manager.un_route(130);
    manager.previous_window();

    let frame_time = if config.general.max_fps > 0 {
        Duration::from_secs(1) / config.general.max_fps
    } else {
        Duration::ZERO
    };

    for frame in 0..cli.frames {
        let dispatched = manager.drain_and_dispatch();
        if dispatched > 0 {
            debug!("Frame {}: dispatched {} queued messages", frame, dispatched);
        }
        manager.update_modeless_visibility();
        manager.render();
        manager.render_dialogs();
        if !frame_time.is_zero() {
            thread::sleep(frame_time);
        }
    }

    poster.join().expect("poster thread panicked");
    manager.drain_and_dispatch();

    info!("Active window at shutdown: {}", manager.active_window_id());
    manager.deinitialize();
    info!("🛑 Atrium demo finished");

    Ok(())
}
