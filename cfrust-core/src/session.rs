//! Inventory session bookkeeping
//!
//! A session tracks what the host believes the reader is doing:
//! - Inventory state (idle, scanning, draining buffered reports)
//! - Tag sequence counter (host-assigned, wraps at `u16::MAX`)
//! - Time the last tag was reported
//!
//! No I/O happens here; the driver in the `cfrust` crate performs the
//! transactions and moves the state along.

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::error::{Error, Result};

/// Inventory state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InventoryState {
    /// No inventory running
    #[default]
    Idle,

    /// Reader is scanning and streaming reports
    Scanning,

    /// Requested rounds are done; buffered reports may still arrive
    Draining,
}

impl InventoryState {
    /// Reports may be polled in this state
    pub fn is_active(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// Session tracker
///
/// Cheap to clone; clones share the same state.
#[derive(Debug, Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

#[derive(Debug)]
struct SessionInner {
    sequence: AtomicU16,
    tracking: RwLock<Tracking>,
}

#[derive(Debug, Default)]
struct Tracking {
    state: InventoryState,
    /// Rounds requested at start; 0 runs until stopped
    rounds: u8,
    started_at: Option<DateTime<Utc>>,
    last_seen: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SessionInner {
                sequence: AtomicU16::new(0),
                tracking: RwLock::new(Tracking::default()),
            }),
        }
    }

    pub fn state(&self) -> InventoryState {
        self.inner.tracking.read().state
    }

    pub fn is_active(&self) -> bool {
        self.state().is_active()
    }

    /// Rounds requested by the running inventory
    pub fn rounds(&self) -> u8 {
        self.inner.tracking.read().rounds
    }

    /// A bounded inventory ends by itself after its rounds
    pub fn is_bounded(&self) -> bool {
        self.rounds() > 0
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.inner.tracking.read().started_at
    }

    pub fn last_seen(&self) -> Option<DateTime<Utc>> {
        self.inner.tracking.read().last_seen
    }

    /// Ensure a new inventory may be started
    pub fn ensure_idle(&self) -> Result<()> {
        let state = self.state();
        if state != InventoryState::Idle {
            return Err(Error::InvalidSessionState(format!(
                "Cannot start inventory from state: {:?}",
                state
            )));
        }
        Ok(())
    }

    /// Ensure reports may be polled
    pub fn ensure_active(&self) -> Result<()> {
        let state = self.state();
        if !state.is_active() {
            return Err(Error::InvalidSessionState(format!(
                "Cannot poll from state: {:?}",
                state
            )));
        }
        Ok(())
    }

    /// Enter `Scanning` after the reader accepted the start command
    pub fn begin(&self, rounds: u8) -> Result<()> {
        let mut tracking = self.inner.tracking.write();

        if tracking.state != InventoryState::Idle {
            return Err(Error::InvalidSessionState(format!(
                "Cannot start inventory from state: {:?}",
                tracking.state
            )));
        }

        self.inner.sequence.store(0, Ordering::Release);
        *tracking = Tracking {
            state: InventoryState::Scanning,
            rounds,
            started_at: Some(Utc::now()),
            last_seen: None,
        };

        Ok(())
    }

    /// Account for one reported tag
    ///
    /// Returns the tag's sequence number and the time it was seen.
    pub fn record_tag(&self) -> (u16, DateTime<Utc>) {
        let now = Utc::now();
        self.inner.tracking.write().last_seen = Some(now);
        (self.next_sequence(), now)
    }

    /// The reader reported the end of an inventory round
    ///
    /// Bounded inventories move to `Draining`; unbounded ones keep scanning.
    pub fn inventory_ended(&self) -> InventoryState {
        let mut tracking = self.inner.tracking.write();

        if tracking.state == InventoryState::Scanning && tracking.rounds > 0 {
            tracking.state = InventoryState::Draining;
        }

        tracking.state
    }

    /// Return to `Idle`, whatever the reader said
    ///
    /// Returns the state the session was in.
    pub fn finish(&self) -> InventoryState {
        let mut tracking = self.inner.tracking.write();
        let previous = tracking.state;
        tracking.state = InventoryState::Idle;
        previous
    }

    /// Next tag sequence number; wraps after `u16::MAX`
    pub fn next_sequence(&self) -> u16 {
        self.inner.sequence.fetch_add(1, Ordering::AcqRel)
    }

    #[cfg(test)]
    pub fn set_sequence(&self, value: u16) {
        self.inner.sequence.store(value, Ordering::Release);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_new() {
        let session = Session::new();
        assert_eq!(session.state(), InventoryState::Idle);
        assert!(!session.is_active());
        assert!(session.last_seen().is_none());
        assert!(session.ensure_active().is_err());
        assert!(session.ensure_idle().is_ok());
    }

    #[test]
    fn test_begin() {
        let session = Session::new();
        session.begin(0).unwrap();

        assert_eq!(session.state(), InventoryState::Scanning);
        assert!(!session.is_bounded());
        assert!(session.started_at().is_some());
        assert!(session.ensure_active().is_ok());
    }

    #[test]
    fn test_begin_twice_rejected() {
        let session = Session::new();
        session.begin(1).unwrap();

        assert!(matches!(session.begin(1), Err(Error::InvalidSessionState(_))));
        assert!(session.ensure_idle().is_err());
    }

    #[test]
    fn test_unbounded_keeps_scanning() {
        let session = Session::new();
        session.begin(0).unwrap();

        assert_eq!(session.inventory_ended(), InventoryState::Scanning);
        assert_eq!(session.inventory_ended(), InventoryState::Scanning);
    }

    #[test]
    fn test_bounded_drains() {
        let session = Session::new();
        session.begin(3).unwrap();

        assert_eq!(session.inventory_ended(), InventoryState::Draining);
        assert!(session.ensure_active().is_ok());
        assert_eq!(session.inventory_ended(), InventoryState::Draining);
    }

    #[test]
    fn test_finish_always_idles() {
        let session = Session::new();
        assert_eq!(session.finish(), InventoryState::Idle);

        session.begin(2).unwrap();
        session.inventory_ended();
        assert_eq!(session.finish(), InventoryState::Draining);
        assert_eq!(session.state(), InventoryState::Idle);

        // A finished session can be started again
        session.begin(0).unwrap();
    }

    #[test]
    fn test_record_tag() {
        let session = Session::new();
        session.begin(0).unwrap();

        let (first, seen) = session.record_tag();
        let (second, _) = session.record_tag();

        assert_eq!(first, 0);
        assert_eq!(second, 1);
        assert!(session.last_seen().unwrap() >= seen);
    }

    #[test]
    fn test_sequence_restarts_per_inventory() {
        let session = Session::new();
        session.begin(0).unwrap();
        session.record_tag();
        session.record_tag();
        session.finish();

        session.begin(0).unwrap();
        assert_eq!(session.record_tag().0, 0);
    }

    #[test]
    fn test_sequence_wrap() {
        let session = Session::new();
        session.set_sequence(u16::MAX - 1);

        assert_eq!(session.next_sequence(), 65534);
        assert_eq!(session.next_sequence(), 65535);
        assert_eq!(session.next_sequence(), 0);
    }

    #[test]
    fn test_session_clone() {
        let session1 = Session::new();
        let session2 = session1.clone();

        session1.begin(0).unwrap();
        assert_eq!(session2.state(), InventoryState::Scanning);

        session2.finish();
        assert!(!session1.is_active());
    }
}
