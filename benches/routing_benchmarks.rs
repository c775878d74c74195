//! Performance benchmarks for the Atrium window manager
//!
//! These benchmarks cover the per-frame hot paths: message routing
//! (targeted and broadcast) and cross-thread queue drains.

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use atrium::{
    Message, MessageKind, ShellConfig, Window, WindowBehavior, WindowManager, WindowRecord,
    SENDER_NONE,
};

struct Inert;

impl WindowBehavior for Inert {}

fn shell_with_windows(window_count: u32) -> WindowManager {
    let config = ShellConfig::default();
    let mut manager = WindowManager::new(&config).unwrap();
    manager.add(Window::new(
        WindowRecord::new(config.home_window),
        Box::new(Inert),
    ));
    for i in 0..window_count {
        manager.add(Window::new(WindowRecord::new(200 + i), Box::new(Inert)));
    }
    manager.activate_window(config.home_window, None);
    manager
}

/// Benchmark broadcast delivery across registry sizes
fn bench_broadcast(c: &mut Criterion) {
    let mut group = c.benchmark_group("broadcast");

    for window_count in [10u32, 50, 200].iter() {
        group.bench_with_input(
            format!("notify_all_{}_windows", window_count),
            window_count,
            |b, &window_count| {
                let mut manager = shell_with_windows(window_count);
                let message = Message::new(MessageKind::NotifyAll, SENDER_NONE, 0);
                b.iter(|| black_box(manager.send_message(&message)));
            },
        );
    }

    group.finish();
}

/// Benchmark targeted delivery to the active window
fn bench_active_window_send(c: &mut Criterion) {
    c.bench_function("send_to_active_window", |b| {
        let mut manager = shell_with_windows(50);
        let message = Message::new(MessageKind::Clicked, SENDER_NONE, 3);
        b.iter(|| black_box(manager.send_message(&message)));
    });
}

/// Benchmark a full post-then-drain cycle
fn bench_queue_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_drain");

    for message_count in [16, 256].iter() {
        group.bench_with_input(
            format!("drain_{}_messages", message_count),
            message_count,
            |b, &message_count| {
                b.iter_batched(
                    || {
                        let manager = shell_with_windows(10);
                        for i in 0..message_count {
                            manager.post_async(
                                Message::new(MessageKind::Execute, SENDER_NONE, 0)
                                    .with_params(i, 0),
                            );
                        }
                        manager
                    },
                    |mut manager| black_box(manager.drain_and_dispatch()),
                    BatchSize::SmallInput,
                );
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_broadcast,
    bench_active_window_send,
    bench_queue_drain
);
criterion_main!(benches);
