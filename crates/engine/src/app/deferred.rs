use std::thread;
use std::time::Duration;

use tracing::warn;

/// Runs `action` on a short-lived background thread after `delay`.
/// Fire-and-forget: the engine never joins the thread. Actions must only
/// touch self-contained `Send` state (sound playback, not scenes) — engine
/// state is owned by the main loop thread.
pub fn run_after(delay: Duration, action: impl FnOnce() + Send + 'static) {
    let spawned = thread::Builder::new()
        .name("deferred-action".to_string())
        .spawn(move || {
            thread::sleep(delay);
            action();
        });
    if let Err(error) = spawned {
        warn!(%error, "deferred_action_spawn_failed");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Instant;

    use super::*;

    #[test]
    fn action_runs_after_the_delay() {
        let (sender, receiver) = mpsc::channel();
        let started = Instant::now();
        run_after(Duration::from_millis(20), move || {
            let _ = sender.send(());
        });

        receiver
            .recv_timeout(Duration::from_secs(2))
            .expect("deferred action should fire");
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
