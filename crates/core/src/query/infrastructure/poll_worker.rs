use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::query::job_poller::{JobPoller, PollState};

/// Instructions from the view that owns a [`PollWorker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollCommand {
    /// The view is visible again; a due fetch runs immediately.
    Foreground,
    /// The view is hidden; no fetch runs until it returns to the foreground.
    Background,
    /// Fetch now, regardless of the schedule.
    Refetch,
    Stop,
}

enum Wake {
    Command(PollCommand),
    Due,
    Closed,
}

/// Runs a [`JobPoller`] on a dedicated thread.
///
/// Every state change is published on [`PollWorker::updates`]. Polling ends
/// when the poller reports no further delay and stays stopped until a
/// [`PollCommand::Refetch`]. The thread exits on [`PollCommand::Stop`], when
/// the worker is dropped, or when the update receiver is gone.
pub struct PollWorker {
    commands: Sender<PollCommand>,
    updates: Receiver<PollState>,
    handle: Option<JoinHandle<()>>,
}

impl PollWorker {
    pub fn spawn(poller: JobPoller) -> Self {
        let (command_tx, command_rx) = crossbeam_channel::unbounded();
        let (update_tx, update_rx) = crossbeam_channel::unbounded();
        let handle = thread::spawn(move || run_loop(poller, command_rx, update_tx));
        Self {
            commands: command_tx,
            updates: update_rx,
            handle: Some(handle),
        }
    }

    pub fn updates(&self) -> &Receiver<PollState> {
        &self.updates
    }

    pub fn set_visible(&self, visible: bool) {
        let command = if visible {
            PollCommand::Foreground
        } else {
            PollCommand::Background
        };
        let _ = self.commands.send(command);
    }

    pub fn refetch(&self) {
        let _ = self.commands.send(PollCommand::Refetch);
    }

    /// Stops polling and waits for the worker thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.commands.send(PollCommand::Stop);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("poll worker thread panicked");
            }
        }
    }
}

impl Drop for PollWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_loop(mut poller: JobPoller, commands: Receiver<PollCommand>, updates: Sender<PollState>) {
    if updates.send(poller.state().clone()).is_err() {
        return;
    }
    if poller.job_id().is_none() {
        // Idle: nothing to fetch, wait for the owner to go away.
        while let Ok(command) = commands.recv() {
            if command == PollCommand::Stop {
                break;
            }
        }
        return;
    }

    let mut visible = true;
    let mut deadline = Some(Instant::now());

    loop {
        let wake = if !visible {
            wait(&commands, None)
        } else {
            match deadline {
                Some(at) => wait(&commands, Some(at.saturating_duration_since(Instant::now()))),
                None => wait(&commands, None),
            }
        };

        let fetch_now = match wake {
            Wake::Closed | Wake::Command(PollCommand::Stop) => break,
            Wake::Due => true,
            Wake::Command(PollCommand::Background) => {
                visible = false;
                false
            }
            Wake::Command(PollCommand::Foreground) => {
                visible = true;
                deadline.is_some_and(|at| at <= Instant::now())
            }
            Wake::Command(PollCommand::Refetch) => true,
        };
        if !fetch_now {
            continue;
        }

        deadline = poller.poll_once().map(|delay| Instant::now() + delay);
        if updates.send(poller.state().clone()).is_err() {
            log::debug!("results view closed, polling stopped");
            break;
        }
    }
}

fn wait(commands: &Receiver<PollCommand>, timeout: Option<Duration>) -> Wake {
    match timeout {
        Some(timeout) => match commands.recv_timeout(timeout) {
            Ok(command) => Wake::Command(command),
            Err(RecvTimeoutError::Timeout) => Wake::Due,
            Err(RecvTimeoutError::Disconnected) => Wake::Closed,
        },
        None => match commands.recv() {
            Ok(command) => Wake::Command(command),
            Err(_) => Wake::Closed,
        },
    }
}
