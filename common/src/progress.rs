use std::{
    ops::Deref,
    sync::{
        atomic::{AtomicBool, AtomicU32, Ordering},
        Arc,
    },
};

use parking_lot::{Condvar, Mutex};

/// Shared monitor for a slicing run. Worker threads bump the completed
/// count, the owner can request cancellation, and observers can block until
/// something changes.
#[derive(Clone)]
pub struct Progress {
    inner: Arc<ProgressInner>,
}

pub struct ProgressInner {
    completed: AtomicU32,
    total: u32,
    cancelled: AtomicBool,

    notify: Condvar,
    last_completed: Mutex<u32>,
}

impl Progress {
    pub fn new(total: u32) -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                completed: AtomicU32::new(0),
                total,
                cancelled: AtomicBool::new(false),

                notify: Condvar::new(),
                last_completed: Mutex::new(0),
            }),
        }
    }
}

impl Deref for Progress {
    type Target = ProgressInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl ProgressInner {
    /// Waits until more layers complete, the run finishes, or the run is
    /// cancelled, returning the current count of completed layers.
    pub fn wait(&self) -> u32 {
        let mut last_completed = self.last_completed.lock();

        let current = self.completed.load(Ordering::Relaxed);
        if self.is_cancelled() || current >= self.total {
            return current;
        }

        self.notify.wait(&mut last_completed);

        let current = self.completed.load(Ordering::Relaxed);
        if *last_completed < current {
            *last_completed = current;
        }

        current
    }

    /// Marks `count` more layers as complete and wakes any waiters.
    pub fn add_complete(&self, count: u32) {
        // Updating under the lock keeps waiters from missing the wakeup.
        let _guard = self.last_completed.lock();
        self.completed.fetch_add(count, Ordering::Relaxed);
        self.notify.notify_all();
    }

    /// Returns the count of completed layers.
    pub fn completed(&self) -> u32 {
        self.completed.load(Ordering::Relaxed)
    }

    /// Returns the count of layers in the run.
    pub fn total(&self) -> u32 {
        self.total
    }

    pub fn finished(&self) -> bool {
        self.completed() >= self.total
    }

    /// Requests cooperative cancellation. Workers observe the flag between
    /// layers; waiters are woken immediately.
    pub fn cancel(&self) {
        let _guard = self.last_completed.lock();
        self.cancelled.store(true, Ordering::Relaxed);
        self.notify.notify_all();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn counts_to_completion() {
        let progress = Progress::new(4);
        assert_eq!(progress.completed(), 0);
        assert!(!progress.finished());

        progress.add_complete(3);
        assert_eq!(progress.completed(), 3);
        assert!(!progress.finished());

        progress.add_complete(1);
        assert!(progress.finished());
    }

    #[test]
    fn wait_returns_once_finished() {
        let progress = Progress::new(2);
        progress.add_complete(2);
        assert_eq!(progress.wait(), 2);
    }

    #[test]
    fn cancel_unblocks_waiters() {
        let progress = Progress::new(10);
        progress.cancel();
        assert!(progress.is_cancelled());
        assert_eq!(progress.wait(), 0);
    }

    #[test]
    fn wait_tracks_a_worker_thread() {
        let progress = Progress::new(3);
        let worker = {
            let progress = progress.clone();
            thread::spawn(move || {
                for _ in 0..3 {
                    progress.add_complete(1);
                }
            })
        };

        let mut completed = 0;
        while completed < progress.total() {
            completed = progress.wait();
        }

        worker.join().unwrap();
        assert_eq!(progress.completed(), 3);
    }
}
