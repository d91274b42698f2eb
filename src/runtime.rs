use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};

use chat_provider::{
    CancelSignal, ConversationError, ConversationProvider, ExchangeId, Fragment, Turn,
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::{ChatSession, Exchange, SessionError, Submission, TurnView};
use crate::transcript::FragmentOutcome;

/// Transcript change reported to the host after each mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionChange {
    /// Fragment text folded into the answer of `exchange`.
    Fragment { exchange: ExchangeId, text: String },
    Finished { exchange: ExchangeId },
    Failed { exchange: ExchangeId, error: String },
    Cancelled { exchange: ExchangeId },
}

/// Host callback invoked outside the session lock.
pub trait ChangeObserver: Send + Sync + 'static {
    fn session_changed(&self, change: SessionChange);
}

/// Observer that ignores every change.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ChangeObserver for NoopObserver {
    fn session_changed(&self, _change: SessionChange) {}
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("failed to spawn exchange worker: {0}")]
    Spawn(#[source] io::Error),
}

struct ActiveExchange {
    id: ExchangeId,
    cancel: CancelSignal,
    join_handle: Option<JoinHandle<()>>,
}

/// Drives a [`ChatSession`] against a provider, one worker thread per exchange.
pub struct ChatController {
    session: Arc<Mutex<ChatSession>>,
    provider: Arc<dyn ConversationProvider>,
    observer: Arc<dyn ChangeObserver>,
    active: Mutex<Option<ActiveExchange>>,
}

impl ChatController {
    pub fn new(
        session: ChatSession,
        provider: Arc<dyn ConversationProvider>,
        observer: Arc<dyn ChangeObserver>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session: Arc::new(Mutex::new(session)),
            provider,
            observer,
            active: Mutex::new(None),
        })
    }

    /// Shared handle to the session state.
    pub fn session(&self) -> Arc<Mutex<ChatSession>> {
        Arc::clone(&self.session)
    }

    pub fn turns(&self) -> Vec<Turn> {
        self.lock_session().turns().to_vec()
    }

    pub fn display_turns(&self) -> Vec<TurnView> {
        self.lock_session().display_turns()
    }

    pub fn is_busy(&self) -> bool {
        self.lock_session().is_busy()
    }

    /// Submits `question` and starts streaming its answer.
    ///
    /// Returns `Ok(None)` when an exchange is already in flight.
    pub fn submit(self: &Arc<Self>, question: &str) -> Result<Option<ExchangeId>, ControllerError> {
        let mut active = self.lock_active();

        let submission = self.lock_session().submit(question)?;
        let exchange = match submission {
            Submission::Dispatched(exchange) => exchange,
            Submission::Ignored => return Ok(None),
        };
        let id = exchange.id;

        if let Some(mut previous) = active.take() {
            join_worker(&mut previous);
        }

        let cancel: CancelSignal = Arc::new(AtomicBool::new(false));
        match self.spawn_worker(exchange, Arc::clone(&cancel)) {
            Ok(join_handle) => {
                *active = Some(ActiveExchange {
                    id,
                    cancel,
                    join_handle: Some(join_handle),
                });
                Ok(Some(id))
            }
            Err(error) => {
                let failure = ConversationError::transport(format!("worker not started: {error}"));
                self.settle(id, Err(failure));
                Err(ControllerError::Spawn(error))
            }
        }
    }

    /// Blocks until the in-flight exchange, if any, has settled.
    pub fn wait_idle(&self) {
        let handle = self
            .lock_active()
            .as_mut()
            .and_then(|active| active.join_handle.take());

        if let Some(handle) = handle {
            if handle.thread().id() != thread::current().id() {
                let _ = handle.join();
            }
        }
    }

    /// Tears the session down, cancels the in-flight exchange and waits for
    /// its worker.
    pub fn shutdown(&self) {
        let in_flight = self.lock_session().teardown();

        if let Some(active) = self.lock_active().as_ref() {
            if in_flight == Some(active.id) {
                active.cancel.store(true, Ordering::SeqCst);
                self.observer
                    .session_changed(SessionChange::Cancelled { exchange: active.id });
            }
        }

        self.wait_idle();
    }

    fn spawn_worker(
        self: &Arc<Self>,
        exchange: Exchange,
        cancel: CancelSignal,
    ) -> io::Result<JoinHandle<()>> {
        let controller = Arc::clone(self);
        thread::Builder::new()
            .name(format!("papermind-exchange-{}", exchange.id))
            .spawn(move || controller.run_worker(exchange, cancel))
    }

    fn run_worker(self: Arc<Self>, exchange: Exchange, cancel: CancelSignal) {
        let id = exchange.id;
        let provider = Arc::clone(&self.provider);
        let mut on_fragment = |fragment: Fragment| self.apply_fragment(id, &fragment);

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            provider.start_conversation(exchange.payload, Arc::clone(&cancel), &mut on_fragment)
        }));

        let result = match outcome {
            Ok(result) => result,
            Err(_) => Err(ConversationError::transport("conversation provider panicked")),
        };

        self.settle(id, result);
    }

    fn apply_fragment(&self, id: ExchangeId, fragment: &Fragment) {
        let text = fragment.text();
        let outcome = self.lock_session().apply_fragment(id, fragment);
        if outcome != FragmentOutcome::Dropped {
            self.observer
                .session_changed(SessionChange::Fragment { exchange: id, text });
        }
    }

    fn settle(&self, id: ExchangeId, result: Result<(), ConversationError>) {
        let change = {
            let mut session = self.lock_session();
            match result {
                Ok(()) => session
                    .finish(id)
                    .then_some(SessionChange::Finished { exchange: id }),
                Err(ConversationError::Cancelled) => session
                    .abandon(id)
                    .then_some(SessionChange::Cancelled { exchange: id }),
                Err(error) => session.fail(id, &error).then(|| SessionChange::Failed {
                    exchange: id,
                    error: error.to_string(),
                }),
            }
        };

        match change {
            Some(change) => self.observer.session_changed(change),
            None => debug!(exchange = id, "settlement for stale exchange ignored"),
        }
    }

    fn lock_session(&self) -> MutexGuard<'_, ChatSession> {
        lock_unpoisoned(&self.session)
    }

    fn lock_active(&self) -> MutexGuard<'_, Option<ActiveExchange>> {
        lock_unpoisoned(&self.active)
    }
}

fn join_worker(active: &mut ActiveExchange) {
    if let Some(handle) = active.join_handle.take() {
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            warn!(exchange = active.id, "exchange worker panicked outside provider call");
        }
    }
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
