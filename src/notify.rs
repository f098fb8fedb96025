// src/notify.rs
//
// Transient status messages ("toasts").
//
// A burst of notifications shows the latest text and is dismissed once, a
// fixed duration after the last call. The countdown runs as a tokio task and
// reports back through a channel so the dismissal happens on the owning
// context, never on the timer task.

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Anything that can surface a human-readable status message
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// The visible part of a toast, driven by `NotificationTimer`
pub trait ToastSurface {
    fn show_text(&mut self, text: &str);
    /// Transition from hidden to visible
    fn appear(&mut self);
    /// Transition from visible to hidden
    fn dismiss(&mut self);
}

/// Countdown expiry, delivered into the owning context's event loop
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountdownElapsed(u64);

pub struct NotificationTimer<S: ToastSurface> {
    surface: S,
    duration: Duration,
    generation: u64,
    pending: bool,
    countdown: Option<JoinHandle<()>>,
    elapsed_tx: mpsc::UnboundedSender<CountdownElapsed>,
}

impl<S: ToastSurface> NotificationTimer<S> {
    pub fn new(
        surface: S,
        duration: Duration,
        elapsed_tx: mpsc::UnboundedSender<CountdownElapsed>,
    ) -> Self {
        Self {
            surface,
            duration,
            generation: 0,
            pending: false,
            countdown: None,
            elapsed_tx,
        }
    }

    /// Show `message` and (re)start the dismissal countdown.
    /// Must be called from within a tokio runtime.
    pub fn show(&mut self, message: &str) {
        self.surface.show_text(message);
        if !self.pending {
            self.surface.appear();
        }

        if let Some(task) = self.countdown.take() {
            task.abort();
        }

        self.generation += 1;
        self.pending = true;

        let generation = self.generation;
        let duration = self.duration;
        let tx = self.elapsed_tx.clone();
        self.countdown = Some(tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            let _ = tx.send(CountdownElapsed(generation));
        }));
    }

    /// Handle an expired countdown. Stale expiries from restarted countdowns
    /// are ignored.
    pub fn on_elapsed(&mut self, elapsed: CountdownElapsed) {
        if !self.pending || elapsed.0 != self.generation {
            return;
        }
        self.pending = false;
        self.countdown = None;
        self.surface.dismiss();
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }
}

impl<S: ToastSurface> Notifier for NotificationTimer<S> {
    fn notify(&mut self, message: &str) {
        tlog!("[notify] {}", message.replace('\n', " | "));
        self.show(message);
    }
}

impl<S: ToastSurface> Drop for NotificationTimer<S> {
    fn drop(&mut self) {
        if let Some(task) = self.countdown.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
impl Notifier for Vec<String> {
    fn notify(&mut self, message: &str) {
        self.push(message.to_string());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[derive(Debug, Default, PartialEq)]
    struct RecordingSurface {
        text: String,
        appeared: usize,
        dismissed: usize,
    }

    impl ToastSurface for RecordingSurface {
        fn show_text(&mut self, text: &str) {
            self.text = text.to_string();
        }
        fn appear(&mut self) {
            self.appeared += 1;
        }
        fn dismiss(&mut self) {
            self.dismissed += 1;
        }
    }

    const DURATION: Duration = Duration::from_millis(2000);

    fn timer() -> (
        NotificationTimer<RecordingSurface>,
        mpsc::UnboundedReceiver<CountdownElapsed>,
    ) {
        let (tx, rx) = mpsc::unbounded_channel();
        (NotificationTimer::new(RecordingSurface::default(), DURATION, tx), rx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_single_notification_appears_then_dismisses() {
        let (mut timer, mut rx) = timer();
        let start = Instant::now();

        timer.notify("Port not open");
        assert_eq!(timer.surface().text, "Port not open");
        assert_eq!(timer.surface().appeared, 1);
        assert_eq!(timer.surface().dismissed, 0);

        let elapsed = rx.recv().await.unwrap();
        let waited = Instant::now() - start;
        assert!(waited >= DURATION && waited < DURATION + Duration::from_millis(5));
        timer.on_elapsed(elapsed);
        assert_eq!(timer.surface().dismissed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_debounced_from_last_call() {
        let (mut timer, mut rx) = timer();

        timer.notify("first");
        tokio::time::sleep(Duration::from_millis(200)).await;
        let second_at = Instant::now();
        timer.notify("second");

        assert_eq!(timer.surface().appeared, 1, "no second appearance");
        assert_eq!(timer.surface().text, "second");

        let elapsed = rx.recv().await.unwrap();
        // Measured from the second call, not the first
        let waited = Instant::now() - second_at;
        assert!(waited >= DURATION && waited < DURATION + Duration::from_millis(5));
        timer.on_elapsed(elapsed);

        assert_eq!(timer.surface().dismissed, 1);
        tokio::time::sleep(DURATION * 2).await;
        assert!(rx.try_recv().is_err(), "first countdown was cancelled");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_expiry_is_ignored() {
        let (mut timer, mut rx) = timer();

        timer.notify("one");
        let stale = rx.recv().await.unwrap();
        timer.notify("two");
        timer.on_elapsed(stale);
        assert_eq!(timer.surface().dismissed, 0);

        let current = rx.recv().await.unwrap();
        timer.on_elapsed(current);
        assert_eq!(timer.surface().dismissed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_notify_after_dismissal_appears_again() {
        let (mut timer, mut rx) = timer();

        timer.notify("one");
        let elapsed = rx.recv().await.unwrap();
        timer.on_elapsed(elapsed);
        timer.on_elapsed(elapsed);
        assert_eq!(timer.surface().dismissed, 1, "double expiry dismisses once");

        timer.notify("two");
        assert_eq!(timer.surface().appeared, 2);
    }
}
