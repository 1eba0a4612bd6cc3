use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use abc_core::config::{AgentConfig, SimulationParameters};
use abc_core::mailbox::MailboxHandle;
use abc_core::stats::MetricsSnapshot;
use abc_data::{AgentState, AgentStatus, Persona, PERSONAS};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};

use crate::client::CompletionClient;
use crate::prompt::build_prompt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportOutcome {
    Completed,
    Failed,
    TimedOut,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentReport {
    pub agent_id: u8,
    pub tick: u64,
    pub outcome: ReportOutcome,
    pub text: String,
}

struct AgentRequest {
    agent_id: u8,
    tick: u64,
    prompt: String,
    generation: u64,
}

type SharedStates = Arc<Mutex<BTreeMap<u8, AgentState>>>;
type SharedReports = Arc<Mutex<VecDeque<AgentReport>>>;

/// The eight personas and the worker that runs their requests.
///
/// Requests are executed one at a time on a background task, each bounded
/// by the configured timeout. An agent holds at most one request, so the
/// queue never exceeds the eight personas. Completed
/// verdicts are posted to the engine mailbox as pending actions. Must be
/// constructed inside a tokio runtime.
pub struct AgentCouncil {
    states: SharedStates,
    reports: SharedReports,
    tx: mpsc::UnboundedSender<AgentRequest>,
    cancel_tx: watch::Sender<u64>,
}

struct Worker {
    client: Arc<dyn CompletionClient>,
    mailbox: Option<MailboxHandle>,
    timeout: Duration,
    max_reports: usize,
    states: SharedStates,
    reports: SharedReports,
}

impl Worker {
    async fn run(
        self,
        mut rx: mpsc::UnboundedReceiver<AgentRequest>,
        mut cancel_rx: watch::Receiver<u64>,
    ) {
        while let Some(req) = rx.recv().await {
            if req.generation < *cancel_rx.borrow_and_update() {
                self.finish(&req, ReportOutcome::Cancelled, "Request cancelled before start.".into());
                continue;
            }

            let outcome = tokio::select! {
                res = tokio::time::timeout(self.timeout, self.client.complete(&req.prompt)) => Some(res),
                _ = cancel_rx.changed() => None,
            };

            match outcome {
                Some(Ok(Ok(text))) => {
                    if let Some(mailbox) = &self.mailbox {
                        let action = format!("IA{}: {}", req.agent_id, text);
                        if let Err(e) = mailbox.post_action(action) {
                            tracing::warn!(agent = req.agent_id, error = %e, "Agent verdict dropped");
                        }
                    }
                    self.finish(&req, ReportOutcome::Completed, text);
                }
                Some(Ok(Err(e))) => {
                    tracing::warn!(agent = req.agent_id, error = %e, "Agent request failed");
                    self.finish(&req, ReportOutcome::Failed, e.to_string());
                }
                Some(Err(_)) => {
                    tracing::warn!(agent = req.agent_id, timeout = ?self.timeout, "Agent request timed out");
                    self.finish(&req, ReportOutcome::TimedOut, "Request timed out.".into());
                }
                None => {
                    tracing::info!(agent = req.agent_id, "Agent request cancelled");
                    self.finish(&req, ReportOutcome::Cancelled, "Request cancelled.".into());
                }
            }
        }
    }

    fn finish(&self, req: &AgentRequest, outcome: ReportOutcome, text: String) {
        if let Ok(mut states) = self.states.lock() {
            if let Some(state) = states.get_mut(&req.agent_id) {
                state.running = false;
                match outcome {
                    ReportOutcome::Completed => {
                        state.status = AgentStatus::Idle;
                        state.confidence = 0.8 + rand::thread_rng().gen::<f64>() * 0.2;
                        state.last_response = Some(text.clone());
                    }
                    ReportOutcome::Failed | ReportOutcome::TimedOut => {
                        state.status = AgentStatus::Error;
                    }
                    ReportOutcome::Cancelled => state.status = AgentStatus::Idle,
                }
            }
        }

        if let Ok(mut reports) = self.reports.lock() {
            if reports.len() >= self.max_reports {
                reports.pop_front();
            }
            reports.push_back(AgentReport {
                agent_id: req.agent_id,
                tick: req.tick,
                outcome,
                text,
            });
        }
    }
}

impl AgentCouncil {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        mailbox: Option<MailboxHandle>,
        config: &AgentConfig,
    ) -> Self {
        let states: SharedStates = Arc::new(Mutex::new(
            PERSONAS.iter().map(|p| (p.id, AgentState::new(p.id))).collect(),
        ));
        let reports: SharedReports = Arc::new(Mutex::new(VecDeque::new()));
        let (tx, rx) = mpsc::unbounded_channel();
        let (cancel_tx, cancel_rx) = watch::channel(0u64);

        let worker = Worker {
            client,
            mailbox,
            timeout: Duration::from_millis(config.timeout_ms.max(1)),
            max_reports: config.max_reports.max(1),
            states: Arc::clone(&states),
            reports: Arc::clone(&reports),
        };
        tokio::spawn(worker.run(rx, cancel_rx));

        Self {
            states,
            reports,
            tx,
            cancel_tx,
        }
    }

    /// Queues an analysis by one persona. The agent shows as scanning until
    /// its report lands. Returns `false` without queueing when the agent is
    /// still working on an earlier request.
    pub fn request(
        &self,
        agent_id: u8,
        tick: u64,
        params: &SimulationParameters,
        metrics: &MetricsSnapshot,
    ) -> anyhow::Result<bool> {
        let persona = Persona::by_id(agent_id)
            .ok_or_else(|| anyhow::anyhow!("Unknown agent IA{agent_id}"))?;

        {
            let mut states = self
                .states
                .lock()
                .map_err(|_| anyhow::anyhow!("Agent state lock poisoned"))?;
            let Some(state) = states.get_mut(&agent_id) else {
                anyhow::bail!("Unknown agent IA{agent_id}");
            };
            if state.running {
                tracing::debug!(agent = agent_id, tick, "Agent busy, request skipped");
                return Ok(false);
            }
            state.running = true;
            state.status = AgentStatus::Scanning;
        }

        let request = AgentRequest {
            agent_id,
            tick,
            prompt: build_prompt(&persona, params, metrics),
            generation: *self.cancel_tx.borrow(),
        };
        if self.tx.send(request).is_err() {
            if let Ok(mut states) = self.states.lock() {
                if let Some(state) = states.get_mut(&agent_id) {
                    state.running = false;
                    state.status = AgentStatus::Error;
                }
            }
            anyhow::bail!("Agent worker has stopped");
        }
        Ok(true)
    }

    /// Asks every idle persona for an analysis. Returns how many were queued.
    pub fn request_all(
        &self,
        tick: u64,
        params: &SimulationParameters,
        metrics: &MetricsSnapshot,
    ) -> anyhow::Result<usize> {
        let mut queued = 0;
        for persona in &PERSONAS {
            if self.request(persona.id, tick, params, metrics)? {
                queued += 1;
            }
        }
        Ok(queued)
    }

    /// Aborts the in-flight request and every request queued so far.
    pub fn cancel_all(&self) {
        self.cancel_tx.send_modify(|generation| *generation += 1);
    }

    pub fn consume_reports(&self) -> Vec<AgentReport> {
        if let Ok(mut reports) = self.reports.lock() {
            reports.drain(..).collect()
        } else {
            Vec::new()
        }
    }

    #[must_use]
    pub fn states(&self) -> Vec<AgentState> {
        self.states
            .lock()
            .map(|states| states.values().cloned().collect())
            .unwrap_or_default()
    }

    #[must_use]
    pub fn state(&self, agent_id: u8) -> Option<AgentState> {
        self.states.lock().ok()?.get(&agent_id).cloned()
    }

    /// Mean confidence across all personas.
    #[must_use]
    pub fn consensus(&self) -> f64 {
        let states = self.states();
        if states.is_empty() {
            return 0.0;
        }
        states.iter().map(|s| s.confidence).sum::<f64>() / states.len() as f64
    }
}
