//! Continuous inventory driver
//!
//! The reader streams one report frame per tag after an inventory has been
//! started, and a frame with the "inventory ended" status after each round.
//! [`InventorySession`] runs the start, poll, stop cycle on top of a
//! [`Link`] and keeps [`Session`] in step with what the reader was told.
//!
//! Polling never writes to the reader. "Inventory ended", "no more data" and
//! a quiet poll window are ordinary outcomes reported as [`Poll::Empty`];
//! only a real failure comes back as an error.

use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use cfrust_core::{Command, ErrorCode, InventoryState, ProtocolFamily, Session};
use cfrust_types::{InventoryRequest, TagReport};

use crate::error::{Error, Result};
use crate::link::Link;

/// Why a poll produced no tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// Reader finished an inventory round
    InventoryEnded,
    /// Reader has nothing buffered
    NoMoreData,
    /// Nothing arrived within the poll timeout
    Timeout,
}

/// Outcome of one poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    Tag(TagReport),
    Empty(EmptyReason),
}

impl Poll {
    pub fn into_tag(self) -> Option<TagReport> {
        match self {
            Self::Tag(tag) => Some(tag),
            Self::Empty(_) => None,
        }
    }
}

/// Inventory state plus the report that came with the start acknowledgement
#[derive(Debug, Default)]
pub struct InventorySession {
    session: Session,
    pending: Option<TagReport>,
}

impl InventorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InventoryState {
        self.session.state()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Start inventory; `request.count == 0` scans until stopped
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] if an inventory is already running. Any
    /// transaction failure leaves the session idle.
    pub async fn start(
        &mut self,
        link: &mut Link,
        family: ProtocolFamily,
        request: InventoryRequest,
        timeout: Duration,
    ) -> Result<()> {
        self.session.ensure_idle().map_err(state_error)?;

        let descriptor = Command::InventoryContinue.descriptor(family)?;
        let ack = link.execute(descriptor, &request.encode(), timeout).await?;

        self.session.begin(request.count).map_err(state_error)?;
        info!(%family, rounds = request.count, "Inventory started");

        // Some firmware answers the start command with the first report
        if !ack.is_empty() {
            match self.decode(&ack) {
                Ok(tag) => self.pending = Some(tag),
                Err(e) => warn!(error = %e, "Ignoring malformed report in start acknowledgement"),
            }
        }

        Ok(())
    }

    /// Wait up to `timeout` for the next streamed report
    ///
    /// # Errors
    ///
    /// [`Error::InvalidState`] when no inventory is running; nothing is read
    /// in that case. A transport failure (lost connection, failed read)
    /// returns the session to idle, since the reader can no longer be
    /// assumed to be scanning. Framing and device errors leave the state as
    /// it was.
    pub async fn poll(&mut self, link: &mut Link, family: ProtocolFamily, timeout: Duration) -> Result<Poll> {
        self.session.ensure_active().map_err(state_error)?;

        if let Some(tag) = self.pending.take() {
            return Ok(Poll::Tag(tag));
        }

        let descriptor = Command::InventoryContinue.descriptor(family)?;
        match link.receive(descriptor, timeout).await {
            Ok(payload) => self.decode(&payload).map(Poll::Tag),
            Err(Error::Device(ErrorCode::CmdInventoryStop)) => {
                let state = self.session.inventory_ended();
                debug!(?state, "Inventory round ended");
                Ok(Poll::Empty(EmptyReason::InventoryEnded))
            }
            Err(Error::Device(ErrorCode::CmdNoMoreData)) => Ok(Poll::Empty(EmptyReason::NoMoreData)),
            Err(e) if e.is_timeout() => Ok(Poll::Empty(EmptyReason::Timeout)),
            Err(e @ Error::Transport(_)) => {
                self.pending = None;
                let previous = self.session.finish();
                warn!(error = %e, ?previous, "Transport failed during inventory, session reset");
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// Stop inventory; the session is idle afterwards whatever the reader says
    ///
    /// # Errors
    ///
    /// [`Error::StopUnacknowledged`] if the reader did not confirm the stop.
    /// It is a warning: the session has already gone idle.
    pub async fn stop(&mut self, link: &mut Link, family: ProtocolFamily, timeout: Duration) -> Result<()> {
        if !self.session.is_active() {
            return Ok(());
        }

        let result = match Command::InventoryStop.descriptor(family) {
            Ok(descriptor) => link.execute(descriptor, &[], timeout).await.map(|_| ()),
            Err(e) => Err(e.into()),
        };

        self.pending = None;
        let previous = self.session.finish();
        info!(?previous, "Inventory stopped");

        match result {
            Ok(()) | Err(Error::Device(ErrorCode::CmdInventoryStop)) => Ok(()),
            Err(e) => {
                warn!(error = %e, "Reader did not acknowledge inventory stop");
                Err(Error::StopUnacknowledged(e.code()))
            }
        }
    }

    fn decode(&self, payload: &[u8]) -> Result<TagReport> {
        let mut tag = TagReport::decode(payload, 0, Utc::now())?;
        let (sequence, seen_at) = self.session.record_tag();
        tag.sequence = sequence;
        tag.seen_at = seen_at;
        Ok(tag)
    }
}

/// Session state refusals surface as [`Error::InvalidState`]
fn state_error(e: cfrust_core::Error) -> Error {
    match e {
        cfrust_core::Error::InvalidSessionState(message) => Error::InvalidState(message),
        other => Error::Core(other),
    }
}
