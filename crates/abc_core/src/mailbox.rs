//! Bounded mailbox between the engine and the external agent/UI layer.
//!
//! Writers hold a cloneable [`MailboxHandle`] and never touch engine state.
//! The engine owns the [`Mailbox`] and drains the channel at the start of
//! each tick, so the shared memory has exactly one writer.

use abc_data::SharedMemory;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MailboxMessage {
    Action(String),
    Deduction(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MailboxError {
    #[error("mailbox is full")]
    Full,
    #[error("mailbox is closed")]
    Closed,
}

impl<T> From<mpsc::error::TrySendError<T>> for MailboxError {
    fn from(err: mpsc::error::TrySendError<T>) -> Self {
        match err {
            mpsc::error::TrySendError::Full(_) => MailboxError::Full,
            mpsc::error::TrySendError::Closed(_) => MailboxError::Closed,
        }
    }
}

/// Write-only side of the mailbox.
#[derive(Debug, Clone)]
pub struct MailboxHandle {
    tx: mpsc::Sender<MailboxMessage>,
}

impl MailboxHandle {
    /// Queues a free-text action instruction. The engine never interprets it.
    pub fn post_action(&self, text: impl Into<String>) -> Result<(), MailboxError> {
        self.tx.try_send(MailboxMessage::Action(text.into()))?;
        Ok(())
    }

    /// Replaces the user deduction text on the next drain.
    pub fn post_deduction(&self, text: impl Into<String>) -> Result<(), MailboxError> {
        self.tx.try_send(MailboxMessage::Deduction(text.into()))?;
        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Engine-owned side of the mailbox.
#[derive(Debug)]
pub struct Mailbox {
    memory: SharedMemory,
    tx: mpsc::Sender<MailboxMessage>,
    rx: mpsc::Receiver<MailboxMessage>,
    log_capacity: usize,
    action_capacity: usize,
}

impl Mailbox {
    #[must_use]
    pub fn new(channel_capacity: usize, log_capacity: usize, action_capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(channel_capacity.max(1));
        Self {
            memory: SharedMemory::default(),
            tx,
            rx,
            log_capacity: log_capacity.max(1),
            action_capacity: action_capacity.max(1),
        }
    }

    #[must_use]
    pub fn handle(&self) -> MailboxHandle {
        MailboxHandle {
            tx: self.tx.clone(),
        }
    }

    /// Moves every queued message into shared memory.
    ///
    /// Returns the action texts received, in arrival order.
    pub fn drain(&mut self) -> Vec<String> {
        let mut actions = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            match msg {
                MailboxMessage::Action(text) => {
                    if self.memory.pending_actions.len() >= self.action_capacity {
                        self.memory.pending_actions.pop_front();
                        tracing::warn!("Pending action queue full, dropping oldest");
                    }
                    self.memory.pending_actions.push_back(text.clone());
                    actions.push(text);
                }
                MailboxMessage::Deduction(text) => self.memory.user_deduction = text,
            }
        }
        actions
    }

    /// Appends an evolution log line, evicting the oldest beyond capacity.
    pub fn push_log(&mut self, line: String) {
        while self.memory.evolution_log.len() >= self.log_capacity {
            self.memory.evolution_log.pop_front();
        }
        self.memory.evolution_log.push_back(line);
    }

    pub fn drain_log(&mut self) -> Vec<String> {
        self.memory.evolution_log.drain(..).collect()
    }

    pub fn take_pending_actions(&mut self) -> Vec<String> {
        self.memory.pending_actions.drain(..).collect()
    }

    /// Clears the log and pending actions. The user deduction survives.
    pub fn reset(&mut self) {
        self.memory.evolution_log.clear();
        self.memory.pending_actions.clear();
    }

    #[must_use]
    pub fn memory(&self) -> &SharedMemory {
        &self.memory
    }
}
