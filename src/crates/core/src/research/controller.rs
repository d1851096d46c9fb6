//! Research session controller
//!
//! Owns at most one streaming connection. All frame handling runs on the
//! caller's task, one message at a time, so readers of the published
//! snapshot only ever see whole-frame updates.

use super::event_log::EventLog;
use super::frame::{self, Frame};
use super::report::{ReportBuffer, ReportSnapshot};
use super::stage::{StageId, StageTracker, StageTransition};
use super::types::{SessionSnapshot, SessionState};
use crate::export::{self, ExportDocument};
use crate::infrastructure::stream::{StreamConnection, StreamConnector};
use crate::util::errors::{ResearchError, ResearchResult, TransportError};
use log::{debug, error, info, trace, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

pub const LOG_INIT: &str = ">> INITIALIZING_CORE_LINK...";
pub const LOG_COMPLETED: &str = ">> LINK_CLOSED: SCAN_COMPLETE";
pub const LOG_CANCELLED: &str = ">> LINK_ABORTED: OPERATOR_CANCEL";
pub const LOG_EXPORTED: &str = ">> PDF_ENGINE: EXPORT_SUCCESSFUL";

pub struct StreamSessionController<C: StreamConnector> {
    connector: C,
    topic: String,
    state: SessionState,
    /// Present exactly while `state == Running`
    connection: Option<Box<dyn StreamConnection>>,
    stages: StageTracker,
    report: ReportBuffer,
    log: EventLog,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl<C: StreamConnector> StreamSessionController<C> {
    pub fn new(connector: C) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            connector,
            topic: String::new(),
            state: SessionState::Idle,
            connection: None,
            stages: StageTracker::new(),
            report: ReportBuffer::new(),
            log: EventLog::new(),
            snapshot_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn active_stage(&self) -> Option<StageId> {
        self.stages.active()
    }

    pub fn report(&self) -> ReportSnapshot {
        self.report.snapshot()
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn has_open_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            topic: self.topic.clone(),
            state: self.state,
            active_stage: self.stages.active(),
            report: self.report.snapshot(),
            log: self.log.view(),
        }
    }

    /// Start a new session, retiring any previous connection first.
    ///
    /// A blank topic is rejected before anything changes.
    pub async fn start(&mut self, topic: &str) -> ResearchResult<()> {
        self.start_until(topic, &CancellationToken::new()).await
    }

    /// `start`, giving up on the connection attempt once `cancel` fires.
    /// A cancelled attempt leaves the session `Idle` and is not an error.
    pub async fn start_until(&mut self, topic: &str, cancel: &CancellationToken) -> ResearchResult<()> {
        let topic = topic.trim();
        if topic.is_empty() {
            warn!("Research start rejected: topic is blank");
            return Err(ResearchError::invalid_input("topic cannot be empty"));
        }

        if self.release_connection() {
            info!("Superseding running session: previous_topic={}", self.topic);
        }
        self.state = SessionState::Idle;
        self.stages.reset();
        self.report.reset();
        self.log.reset();
        self.topic = topic.to_string();
        self.log.append(LOG_INIT);
        self.publish();

        let connected = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = self.connector.connect(topic) => Some(result),
        };
        match connected {
            None => {
                self.log.append(LOG_CANCELLED);
                info!("Research start cancelled while connecting: topic={}", topic);
                self.publish();
                Ok(())
            }
            Some(Ok(connection)) => {
                self.connection = Some(connection);
                self.state = SessionState::Running;
                info!("Research session started: topic={}", topic);
                self.publish();
                Ok(())
            }
            Some(Err(e)) => {
                self.fail(e.clone());
                Err(e.into())
            }
        }
    }

    /// React to one raw inbound message. Ignored unless the session is running.
    pub fn handle_message(&mut self, raw: &str) {
        if self.state != SessionState::Running {
            debug!(
                "Ignoring message outside running session: state={:?}",
                self.state
            );
            return;
        }

        match frame::decode(raw) {
            Frame::Sentinel => {
                self.complete();
                return;
            }
            Frame::Data(data) => {
                if data.is_empty() {
                    trace!("Empty frame ignored: topic={}", self.topic);
                }
                for reason in &data.rejected {
                    warn!("Frame field skipped: reason={}, data={}", reason, raw);
                    self.log.append(format!(">> LINK_DECODE_FAILURE: {}", reason));
                }
                if let Some(stage) = data.stage {
                    self.apply_stage(&stage);
                }
                if let Some(text) = data.report {
                    let len = text.len();
                    let revision = self.report.update(text);
                    debug!("Report updated: revision={}, len={}", revision, len);
                }
            }
            Frame::Malformed { raw, reason } => {
                warn!("Malformed frame skipped: reason={}, data={}", reason, raw);
                self.log.append(format!(">> LINK_DECODE_FAILURE: {}", reason));
            }
        }
        self.publish();
    }

    /// Connection-level failure: fatal, no retry.
    pub fn handle_transport_error(&mut self, err: TransportError) {
        if self.state != SessionState::Running {
            debug!(
                "Ignoring transport error outside running session: state={:?}, error={}",
                self.state, err
            );
            return;
        }
        self.fail(err);
    }

    /// Operator abort. Returns whether a running session was cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        self.release_connection();
        self.state = SessionState::Idle;
        self.log.append(LOG_CANCELLED);
        info!("Research session cancelled: topic={}", self.topic);
        self.publish();
        true
    }

    /// Await and process exactly one inbound message.
    ///
    /// Returns whether the session is still running afterwards.
    pub async fn pump_once(&mut self) -> bool {
        if self.state != SessionState::Running {
            return false;
        }
        let Some(connection) = self.connection.as_mut() else {
            return false;
        };
        let inbound = connection.next_message().await;
        self.dispatch(inbound);
        self.state == SessionState::Running
    }

    /// Process messages until the session leaves `Running`. Cancelling the
    /// token is treated as `cancel()`.
    pub async fn drive(&mut self, cancel: &CancellationToken) -> SessionState {
        while self.state == SessionState::Running {
            let Some(connection) = self.connection.as_mut() else {
                break;
            };
            let inbound = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                inbound = connection.next_message() => Some(inbound),
            };
            match inbound {
                Some(inbound) => self.dispatch(inbound),
                None => {
                    self.cancel();
                }
            }
        }
        self.state
    }

    /// Export the report as it stands right now. Frames arriving afterwards
    /// do not affect the returned document.
    pub fn export_document(&mut self) -> ResearchResult<ExportDocument> {
        let report = self.report.snapshot();
        if report.is_empty() {
            return Err(ResearchError::export("no report has been received yet"));
        }

        let document = export::export(&self.topic, &report.text);
        info!(
            "Report exported: file_stem={}, pages={}, revision={}",
            document.file_stem,
            document.pages.len(),
            report.revision
        );
        self.log.append(LOG_EXPORTED);
        self.publish();
        Ok(document)
    }

    /// Explicit teardown; releases any open connection.
    pub fn shutdown(mut self) {
        if self.release_connection() {
            debug!("Connection released on shutdown: topic={}", self.topic);
        }
    }

    fn dispatch(&mut self, inbound: Option<Result<String, TransportError>>) {
        match inbound {
            Some(Ok(raw)) => self.handle_message(&raw),
            Some(Err(e)) => self.handle_transport_error(e),
            None => self.handle_transport_error(TransportError::ClosedBeforeCompletion),
        }
    }

    fn apply_stage(&mut self, raw_id: &str) {
        match self.stages.observe(raw_id) {
            StageTransition::Entered(stage) => {
                debug!("Stage resolved: stage={}", stage);
                self.log.append(format!(
                    ">> AGENT_{}: TASK_RESOLVED",
                    stage.as_wire().to_uppercase()
                ));
            }
            StageTransition::Unrecognized(raw) => {
                warn!("Unrecognized stage ignored: stage={}", raw);
                self.log.append(format!(
                    ">> AGENT_{}: UNRECOGNIZED_STAGE",
                    raw.to_uppercase()
                ));
            }
        }
    }

    fn complete(&mut self) {
        self.release_connection();
        self.state = SessionState::Completed;
        self.log.append(LOG_COMPLETED);
        info!(
            "Research session completed: topic={}, report_revision={}",
            self.topic,
            self.report.revision()
        );
        self.publish();
    }

    fn fail(&mut self, err: TransportError) {
        self.release_connection();
        self.state = SessionState::Errored;
        self.log.append(format!(">> LINK_FAILURE: {}", err));
        error!("Research session failed: topic={}, error={}", self.topic, err);
        self.publish();
    }

    fn release_connection(&mut self) -> bool {
        match self.connection.take() {
            Some(mut connection) => {
                connection.close();
                true
            }
            None => false,
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }
}

impl<C: StreamConnector> Drop for StreamSessionController<C> {
    fn drop(&mut self) {
        self.release_connection();
    }
}
