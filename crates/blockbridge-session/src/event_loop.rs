//! Per-session event loop: a Tokio task that runs session work in order.
//!
//! Packet handlers run on whatever transport task received the packet, but
//! some work has to happen later or strictly one-at-a-time per session
//! (e.g. the delayed probe after a simple form). That work is queued here.
//!
//! The loop is an actor: an [`EventLoopHandle`] sends `LoopCommand`s over
//! a bounded channel and the actor runs each task to completion before the
//! next. Delayed tasks sleep on their own timer task and then queue
//! themselves like any other task, so they also run on the loop.
//!
//! ```text
//!   handle.execute(task) ──────────────────────────┐
//!   handle.schedule(task, 500ms) ─→ timer ─(500ms)─┤
//!                                                  ▼
//!                                         EventLoopActor::run
//! ```
//!
//! Shutting the loop down aborts every pending timer, so nothing scheduled
//! for a closed session ever runs.

use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;

use crate::{SessionError, SessionId};

/// A unit of work queued on the loop.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Commands sent to the event loop actor.
enum LoopCommand {
    Execute(Task),
    Schedule { task: Task, delay: Duration },
    Shutdown { reply: oneshot::Sender<()> },
}

// ---------------------------------------------------------------------------
// EventLoopHandle
// ---------------------------------------------------------------------------

/// Handle to a running session event loop. Cheap to clone.
#[derive(Clone)]
pub struct EventLoopHandle {
    session_id: SessionId,
    sender: mpsc::Sender<LoopCommand>,
}

impl EventLoopHandle {
    /// Queues `task` to run on the loop as soon as possible.
    ///
    /// Never blocks. Fails if the loop is gone or its queue is full.
    pub fn execute<F>(&self, task: F) -> Result<(), SessionError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.submit(LoopCommand::Execute(Box::new(task)))
    }

    /// Queues `task` to run on the loop after `delay`.
    ///
    /// After shutdown this does nothing. A full queue drops the task with a
    /// warning.
    pub fn schedule<F>(&self, delay: Duration, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let command = LoopCommand::Schedule {
            task: Box::new(task),
            delay,
        };
        match self.submit(command) {
            Ok(()) => {}
            Err(SessionError::EventLoopClosed(_)) => {
                tracing::trace!(session_id = %self.session_id, "schedule after shutdown ignored");
            }
            Err(err) => {
                tracing::warn!(session_id = %self.session_id, %err, "scheduled task dropped");
            }
        }
    }

    /// Stops the loop and waits for it to finish. Pending scheduled tasks
    /// are cancelled. Calling this on a stopped loop is a no-op.
    pub async fn shutdown(&self) {
        let (reply_tx, reply_rx) = oneshot::channel();
        if self
            .sender
            .send(LoopCommand::Shutdown { reply: reply_tx })
            .await
            .is_ok()
        {
            let _ = reply_rx.await;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn submit(&self, command: LoopCommand) -> Result<(), SessionError> {
        self.sender.try_send(command).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => {
                SessionError::EventLoopFull(self.session_id.to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                SessionError::EventLoopClosed(self.session_id.to_string())
            }
        })
    }
}

// ---------------------------------------------------------------------------
// EventLoopActor
// ---------------------------------------------------------------------------

struct EventLoopActor {
    session_id: SessionId,
    receiver: mpsc::Receiver<LoopCommand>,
    /// Used by timers to requeue their task; weak so that dropping every
    /// handle still ends the loop.
    requeue: mpsc::WeakSender<LoopCommand>,
    timers: JoinSet<()>,
}

impl EventLoopActor {
    async fn run(mut self) {
        tracing::debug!(session_id = %self.session_id, "event loop started");

        loop {
            tokio::select! {
                command = self.receiver.recv() => {
                    let Some(command) = command else { break };
                    match command {
                        LoopCommand::Execute(task) => self.run_task(task),
                        LoopCommand::Schedule { task, delay } => self.start_timer(task, delay),
                        LoopCommand::Shutdown { reply } => {
                            self.receiver.close();
                            self.timers.abort_all();
                            let _ = reply.send(());
                            break;
                        }
                    }
                }
                // Reap finished timers so the set doesn't grow.
                Some(_) = self.timers.join_next(), if !self.timers.is_empty() => {}
            }
        }

        self.timers.abort_all();
        tracing::debug!(session_id = %self.session_id, "event loop stopped");
    }

    fn run_task(&self, task: Task) {
        if panic::catch_unwind(AssertUnwindSafe(task)).is_err() {
            tracing::error!(session_id = %self.session_id, "event loop task panicked");
        }
    }

    fn start_timer(&mut self, task: Task, delay: Duration) {
        let requeue = self.requeue.clone();
        self.timers.spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(sender) = requeue.upgrade() {
                let _ = sender.send(LoopCommand::Execute(task)).await;
            }
        });
    }
}

/// Spawns an event loop for `session_id` and returns its handle.
///
/// `buffer` bounds the number of queued commands. Must be called from
/// within a Tokio runtime.
pub fn spawn_event_loop(session_id: SessionId, buffer: usize) -> EventLoopHandle {
    let (tx, rx) = mpsc::channel(buffer.max(1));

    let actor = EventLoopActor {
        session_id,
        receiver: rx,
        requeue: tx.downgrade(),
        timers: JoinSet::new(),
    };
    tokio::spawn(actor.run());

    EventLoopHandle {
        session_id,
        sender: tx,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio::time::Instant;

    use super::*;

    fn spawn() -> EventLoopHandle {
        spawn_event_loop(SessionId::from_raw(1), 16)
    }

    #[tokio::test]
    async fn test_execute_runs_in_order() {
        let handle = spawn();
        let (tx, mut rx) = mpsc::unbounded_channel();
        for i in 0..3 {
            let tx = tx.clone();
            handle.execute(move || tx.send(i).unwrap()).unwrap();
        }
        for expected in 0..3 {
            assert_eq!(rx.recv().await, Some(expected));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_schedule_waits_for_delay() {
        let handle = spawn();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let start = Instant::now();
        handle.schedule(Duration::from_millis(500), move || tx.send(()).unwrap());

        rx.recv().await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_cancels_timers() {
        let handle = spawn();
        let ran = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ran);
        handle.schedule(Duration::from_millis(500), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        handle.shutdown().await;
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(ran.load(Ordering::SeqCst), 0);
        assert!(handle.is_closed());
    }

    #[tokio::test]
    async fn test_after_shutdown() {
        let handle = spawn();
        handle.shutdown().await;

        // Scheduling is silently ignored, executing reports the closed loop.
        handle.schedule(Duration::from_millis(1), || {});
        assert!(matches!(
            handle.execute(|| {}),
            Err(SessionError::EventLoopClosed(_))
        ));
        // A second shutdown returns immediately.
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicking_task_keeps_loop_alive() {
        let handle = spawn();
        handle.execute(|| panic!("boom")).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();
        handle.execute(move || tx.send(()).unwrap()).unwrap();
        assert_eq!(rx.recv().await, Some(()));
    }
}
