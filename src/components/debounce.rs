use std::{future::Future, time::Duration};
use tokio::{spawn, task::JoinHandle, time::sleep};

/// A cancellable scheduled callback.
///
/// At most one callback is pending per instance. Scheduling a new one aborts the
/// pending one, so in a burst of calls only the last runs, `delay` after it was
/// scheduled. Once the delay has passed the callback is spawned as its own task
/// and is no longer affected by `cancel` or by later schedules.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer {
            delay,
            pending: None,
        }
    }

    /// Runs `action` after the quiet period unless rescheduled or cancelled first
    pub fn schedule<F>(&mut self, action: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(spawn(async move {
            sleep(delay).await;
            spawn(action);
        }));
    }

    /// Drops the pending callback, if it hasn't fired yet
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| !p.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    #[tokio::test(start_paused = true)]
    async fn only_last_call_in_burst_runs() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let fired = Arc::new(Mutex::new(Vec::new()));

        for i in 0..4 {
            let fired = fired.clone();
            debouncer.schedule(async move { fired.lock().unwrap().push(i) });
            sleep(Duration::from_millis(100)).await;
        }

        assert!(fired.lock().unwrap().is_empty());

        sleep(Duration::from_millis(250)).await;

        assert_eq!(*fired.lock().unwrap(), vec![3]);
        assert!(!debouncer.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_run() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        debouncer.schedule(async move {
            c.fetch_add(1, Ordering::SeqCst);
        });
        assert!(debouncer.is_pending());

        debouncer.cancel();
        sleep(Duration::from_secs(1)).await;

        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn fired_action_survives_cancel() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let count = Arc::new(AtomicUsize::new(0));

        let c = count.clone();
        debouncer.schedule(async move {
            sleep(Duration::from_secs(2)).await;
            c.fetch_add(1, Ordering::SeqCst);
        });

        sleep(Duration::from_millis(400)).await;
        debouncer.cancel();
        sleep(Duration::from_secs(3)).await;

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
