//! Line-oriented chat loop over a [`ChatController`].

use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, MutexGuard};

use papermind::{
    ChangeObserver, ChatController, ControllerError, Role, SessionChange, SessionError, TurnView,
};
use tracing::warn;

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};

pub const PROMPT: &str = "> ";
const ANSWER_RULE: &str = "----";

/// Echoes streamed fragments to `out` as they arrive.
pub struct StreamPrinter<W> {
    out: Arc<Mutex<W>>,
}

impl<W> StreamPrinter<W> {
    pub fn new(out: Arc<Mutex<W>>) -> Self {
        Self { out }
    }
}

impl<W: Write + Send + 'static> ChangeObserver for StreamPrinter<W> {
    fn session_changed(&self, change: SessionChange) {
        let mut out = lock_unpoisoned(&self.out);
        let written = match change {
            SessionChange::Fragment { text, .. } => write!(out, "{text}"),
            SessionChange::Finished { .. } => writeln!(out),
            SessionChange::Failed { error, .. } => writeln!(out, "\n[error] {error}"),
            SessionChange::Cancelled { .. } => writeln!(out, "\n[cancelled]"),
        };
        if let Err(error) = written.and_then(|()| out.flush()) {
            warn!(error = %error, "failed to echo session change");
        }
    }
}

/// Runs the chat loop until `/quit` or end of input, then shuts the
/// controller down.
pub fn run_repl<R, W>(
    controller: &Arc<ChatController>,
    input: R,
    out: &Arc<Mutex<W>>,
) -> io::Result<()>
where
    R: BufRead,
    W: Write + Send + 'static,
{
    let result = repl_loop(controller, input, out);
    controller.shutdown();
    result
}

fn repl_loop<R, W>(
    controller: &Arc<ChatController>,
    input: R,
    out: &Arc<Mutex<W>>,
) -> io::Result<()>
where
    R: BufRead,
    W: Write + Send + 'static,
{
    print_views(&mut *lock_unpoisoned(out), &controller.display_turns())?;

    let mut lines = input.lines();
    loop {
        {
            let mut out = lock_unpoisoned(out);
            write!(out, "{PROMPT}")?;
            out.flush()?;
        }

        let Some(line) = lines.next() else {
            writeln!(lock_unpoisoned(out))?;
            return Ok(());
        };
        let line = line?;

        match parse_slash_command(&line) {
            Some(SlashCommand::Quit) => return Ok(()),
            Some(SlashCommand::Help) => writeln!(lock_unpoisoned(out), "{HELP_TEXT}")?,
            Some(SlashCommand::History) => {
                print_views(&mut *lock_unpoisoned(out), &controller.display_turns())?;
            }
            Some(SlashCommand::Unknown(command)) => writeln!(
                lock_unpoisoned(out),
                "Unknown command {command}. Type /help for the list."
            )?,
            None => ask(controller, &line, out)?,
        }
    }
}

fn ask<W: Write + Send + 'static>(
    controller: &Arc<ChatController>,
    question: &str,
    out: &Arc<Mutex<W>>,
) -> io::Result<()> {
    let before = controller.turns().len();
    match controller.submit(question) {
        Ok(Some(_)) => {
            controller.wait_idle();
            // Skip the user turn that opened this exchange.
            let settled: Vec<TurnView> = controller
                .display_turns()
                .into_iter()
                .skip(before + 1)
                .collect();
            let mut out = lock_unpoisoned(out);
            writeln!(out, "{ANSWER_RULE}")?;
            print_views(&mut *out, &settled)
        }
        Ok(None) => writeln!(
            lock_unpoisoned(out),
            "Still answering the previous question."
        ),
        Err(ControllerError::Session(SessionError::EmptyQuestion)) => Ok(()),
        Err(error) => writeln!(lock_unpoisoned(out), "{error}"),
    }
}

pub fn print_views(out: &mut dyn Write, views: &[TurnView]) -> io::Result<()> {
    for view in views {
        match view.role {
            Role::User => writeln!(out, "you: {}", view.text())?,
            Role::Bot => writeln!(out, "bot: {}", view.text())?,
        }
    }
    out.flush()
}

fn lock_unpoisoned<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
