use std::collections::HashMap;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use drill_core::model::{Item, KeypadKey};
use drill_core::session::{DrillError, DrillEvent, DrillSession, Effect, Phase, Resolution, TimerToken};

use crate::error::SessionError;

use super::view::DrillView;

const COMMAND_BUFFER: usize = 32;

/// Requests accepted by a running drill.
#[derive(Debug)]
pub enum DrillCommand {
    Input(String),
    Key(KeypadKey),
    Restart(oneshot::Sender<Result<(), DrillError>>),
    Exit,
}

/// Caller side of a running drill: send commands, watch snapshots.
#[derive(Debug)]
pub struct DrillHandle {
    commands: mpsc::Sender<DrillCommand>,
    view: watch::Receiver<DrillView>,
    task: JoinHandle<()>,
}

impl DrillHandle {
    /// Deliver a new value of the answer input.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` once the drill has exited.
    pub async fn input(&self, value: impl Into<String>) -> Result<(), SessionError> {
        self.send(DrillCommand::Input(value.into())).await
    }

    /// Inject a keypad key into the answer input.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` once the drill has exited.
    pub async fn key(&self, key: KeypadKey) -> Result<(), SessionError> {
        self.send(DrillCommand::Key(key)).await
    }

    /// Repeat a completed drill with a fresh order.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Drill` if the drill is not complete yet, or
    /// `SessionError::Closed` once it has exited.
    pub async fn restart(&self) -> Result<(), SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(DrillCommand::Restart(reply)).await?;
        rx.await.map_err(|_| SessionError::Closed)??;
        Ok(())
    }

    /// Latest snapshot.
    #[must_use]
    pub fn view(&self) -> DrillView {
        self.view.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<DrillView> {
        self.view.clone()
    }

    /// Wait until a snapshot satisfies `predicate`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Closed` if the drill exits first.
    pub async fn wait_for(
        &self,
        predicate: impl FnMut(&DrillView) -> bool,
    ) -> Result<DrillView, SessionError> {
        let mut rx = self.view.clone();
        let view = rx.wait_for(predicate).await.map_err(|_| SessionError::Closed)?;
        Ok(view.clone())
    }

    /// Tear the drill down and wait for its task to finish.
    pub async fn exit(self) {
        let _ = self.commands.send(DrillCommand::Exit).await;
        if let Err(err) = self.task.await {
            tracing::error!(error = %err, "drill task failed");
        }
    }

    async fn send(&self, command: DrillCommand) -> Result<(), SessionError> {
        self.commands
            .send(command)
            .await
            .map_err(|_| SessionError::Closed)
    }
}

/// Owns one `DrillSession` and turns its effects into tokio timers.
pub(crate) struct DrillRuntime {
    session: DrillSession,
    commands: mpsc::Receiver<DrillCommand>,
    timer_tx: mpsc::UnboundedSender<TimerToken>,
    timer_rx: mpsc::UnboundedReceiver<TimerToken>,
    timers: HashMap<TimerToken, JoinHandle<()>>,
    view_tx: watch::Sender<DrillView>,
}

impl DrillRuntime {
    /// Start `items` on `session` and run it on a new task.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn spawn(session: DrillSession, items: Vec<Item>) -> DrillHandle {
        let (command_tx, commands) = mpsc::channel(COMMAND_BUFFER);
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (view_tx, view) = watch::channel(DrillView::idle());

        let mut runtime = Self {
            session,
            commands,
            timer_tx,
            timer_rx,
            timers: HashMap::new(),
            view_tx,
        };

        tracing::info!(items = items.len(), modes = ?runtime.session.modes(), "starting drill");
        let effects = runtime.session.start(items);
        runtime.apply(effects);
        runtime.publish();

        let task = tokio::spawn(runtime.run());
        DrillHandle {
            commands: command_tx,
            view,
            task,
        }
    }

    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(DrillCommand::Exit) | None => break,
                    Some(command) => self.on_command(command),
                },
                Some(token) = self.timer_rx.recv() => self.on_timer(token),
            }
        }
        self.shutdown();
    }

    fn on_command(&mut self, command: DrillCommand) {
        match command {
            DrillCommand::Input(value) => self.dispatch(DrillEvent::Input(value)),
            DrillCommand::Key(key) => self.dispatch(DrillEvent::Key(key)),
            DrillCommand::Restart(reply) => {
                let result = self.session.restart().map(|effects| {
                    tracing::info!(items = self.session.original_sequence().len(), "restarting drill");
                    self.apply(effects);
                    self.publish();
                });
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "restart rejected");
                }
                let _ = reply.send(result);
            }
            DrillCommand::Exit => {}
        }
    }

    fn on_timer(&mut self, token: TimerToken) {
        if self.timers.remove(&token).is_none() {
            tracing::debug!(%token, "dropping cancelled timer");
            return;
        }
        self.dispatch(DrillEvent::TimerFired(token));
    }

    fn dispatch(&mut self, event: DrillEvent) {
        let was_complete = self.session.is_complete();
        match self.session.handle(event) {
            Ok(effects) => self.apply(effects),
            Err(err) => {
                tracing::warn!(error = %err, "event rejected");
                return;
            }
        }

        match self.session.last_resolution() {
            Some(Resolution::Correct { first_try }) => {
                tracing::debug!(first_try, pass = self.session.pass(), "answer accepted");
            }
            Some(Resolution::Incorrect { first_try }) => {
                tracing::debug!(first_try, "answer rejected");
            }
            None => {}
        }

        if !was_complete && self.session.phase() == Phase::Complete {
            if let Some(summary) = self.session.summary() {
                tracing::info!(
                    total = summary.total_items(),
                    first_try_correct = summary.first_try_correct(),
                    missed = summary.missed(),
                    passes = summary.passes(),
                    "drill complete"
                );
            }
        }
        self.publish();
    }

    fn apply(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Schedule { token, delay } => {
                    let tx = self.timer_tx.clone();
                    let handle = tokio::spawn(async move {
                        tokio::time::sleep(delay).await;
                        let _ = tx.send(token);
                    });
                    if let Some(previous) = self.timers.insert(token, handle) {
                        previous.abort();
                    }
                }
                Effect::Cancel(token) => {
                    if let Some(handle) = self.timers.remove(&token) {
                        handle.abort();
                    }
                }
            }
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(DrillView::capture(&self.session));
    }

    fn shutdown(&mut self) {
        let effects = self.session.teardown();
        self.apply(effects);
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
        tracing::info!("drill stopped");
    }
}
