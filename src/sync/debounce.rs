//! Debounced search input
//!
//! Each call to [`SearchDebouncer::on_input`] restarts the quiet period; the
//! callback only runs once input has been idle for the whole delay, with the
//! latest text.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;

type Callback = Arc<dyn Fn(String) + Send + Sync>;

/// Coalesces rapid text input into one delayed callback
pub struct SearchDebouncer {
    delay: Duration,
    callback: Callback,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl SearchDebouncer {
    pub fn new(delay: Duration, callback: impl Fn(String) + Send + Sync + 'static) -> Self {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    /// Schedule the callback for `text`, replacing any pending invocation
    ///
    /// Must be called from within a tokio runtime.
    pub fn on_input(&self, text: impl Into<String>) {
        let text = text.into();
        let delay = self.delay;
        let callback = Arc::clone(&self.callback);

        let Ok(mut pending) = self.pending.lock() else {
            tracing::error!("Search debouncer lock poisoned, dropping input");
            return;
        };
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        tracing::debug!("Search input scheduled in {:?}", delay);
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            callback(text);
        }));
    }

    /// Drop any pending invocation
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(handle) = pending.take() {
                handle.abort();
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .map(|p| p.as_ref().is_some_and(|h| !h.is_finished()))
            .unwrap_or(false)
    }
}

impl Drop for SearchDebouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for SearchDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchDebouncer")
            .field("delay", &self.delay)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{Instant, sleep};

    fn recorder() -> (Arc<Mutex<Vec<(String, Duration)>>>, Instant) {
        (Arc::new(Mutex::new(Vec::new())), Instant::now())
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_input_fires_once_with_last_text() {
        let (calls, start) = recorder();
        let sink = Arc::clone(&calls);
        let debouncer = SearchDebouncer::new(Duration::from_millis(500), move |text| {
            sink.lock().unwrap().push((text, start.elapsed()));
        });

        debouncer.on_input("a");
        sleep(Duration::from_millis(100)).await;
        debouncer.on_input("ab");
        sleep(Duration::from_millis(100)).await;
        debouncer.on_input("abc");

        sleep(Duration::from_millis(499)).await;
        assert!(calls.lock().unwrap().is_empty());

        sleep(Duration::from_millis(2)).await;
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "abc");
        assert_eq!(calls[0].1, Duration::from_millis(700));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_drops_pending_call() {
        let (calls, start) = recorder();
        let sink = Arc::clone(&calls);
        let debouncer = SearchDebouncer::new(Duration::from_millis(500), move |text| {
            sink.lock().unwrap().push((text, start.elapsed()));
        });

        debouncer.on_input("web");
        assert!(debouncer.is_pending());
        debouncer.cancel();
        assert!(!debouncer.is_pending());

        sleep(Duration::from_secs(2)).await;
        assert!(calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels() {
        let (calls, start) = recorder();
        let sink = Arc::clone(&calls);
        {
            let debouncer = SearchDebouncer::new(Duration::from_millis(500), move |text| {
                sink.lock().unwrap().push((text, start.elapsed()));
            });
            debouncer.on_input("web");
        }
        sleep(Duration::from_secs(2)).await;
        assert!(calls.lock().unwrap().is_empty());
    }
}
