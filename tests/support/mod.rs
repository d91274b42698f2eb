#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use papermind::{ChangeObserver, SessionChange};

/// Observer that records every change in arrival order.
#[derive(Default)]
pub struct RecordingObserver {
    changes: Mutex<Vec<SessionChange>>,
}

impl RecordingObserver {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn changes(&self) -> Vec<SessionChange> {
        lock_unpoisoned(&self.changes).clone()
    }

    pub fn fragment_texts(&self) -> Vec<String> {
        self.changes()
            .into_iter()
            .filter_map(|change| match change {
                SessionChange::Fragment { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl ChangeObserver for RecordingObserver {
    fn session_changed(&self, change: SessionChange) {
        lock_unpoisoned(&self.changes).push(change);
    }
}

pub fn wait_until(timeout: Duration, mut predicate: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if predicate() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }

    predicate()
}

pub fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
