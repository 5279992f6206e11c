use crate::{BearerId, FlowKey, Imsi, Rnti};
use dashmap::DashMap;
use gtpu::Teid;
use slog::{Logger, warn};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no tunnel registered for flow ({rnti},{bid})")]
    FlowNotFound { rnti: Rnti, bid: BearerId },
    #[error("no flow registered for TEID {0}")]
    TeidNotFound(Teid),
    #[error("IMSI {0} is not attached to this station")]
    SubscriberNotFound(Imsi),
}

/// Per-station identifier translation tables: radio bearer <-> S1-U tunnel,
/// plus the subscriber attach map.  Owned by one gateway instance; the
/// control path upserts, the pipelines look up.
///
/// The two bearer tables are exact mutual inverses at all times.
/// Re-registering a flow under a new TEID (or a TEID under a new flow)
/// removes the entry the superseded mapping left behind on the other side.
#[derive(Clone)]
pub struct SessionManager {
    bearer_teids: Arc<DashMap<FlowKey, Teid>>,
    teid_bearers: Arc<DashMap<Teid, FlowKey>>,
    attachments: Arc<DashMap<Imsi, Rnti>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self {
            bearer_teids: Arc::new(DashMap::new()),
            teid_bearers: Arc::new(DashMap::new()),
            attachments: Arc::new(DashMap::new()),
        }
    }

    /// A subscriber attached under the given RNTI.  Re-attach overwrites the
    /// previous RNTI; records are never deleted here (detach is a
    /// control-plane procedure that does not reach this layer).
    pub fn record_attach(&self, imsi: Imsi, rnti: Rnti) {
        self.attachments.insert(imsi, rnti);
    }

    /// Bind a radio bearer to its S1-U tunnel endpoint, in both directions.
    pub fn register_bearer(&self, rnti: Rnti, bid: BearerId, teid: Teid, logger: &Logger) {
        if !self.attachments.iter().any(|entry| *entry.value() == rnti) {
            // Control events arrived out of order; the bearer still gets
            // registered, matching the upsert contract.
            warn!(
                logger,
                "Bearer setup for RNTI {rnti} with no attached subscriber"
            );
        }
        let flow = FlowKey { rnti, bid };
        if let Some(old_teid) = self.bearer_teids.insert(flow, teid) {
            if old_teid != teid {
                self.teid_bearers.remove(&old_teid);
            }
        }
        if let Some(old_flow) = self.teid_bearers.insert(teid, flow) {
            if old_flow != flow {
                self.bearer_teids.remove(&old_flow);
            }
        }
    }

    pub fn teid_for_flow(&self, rnti: Rnti, bid: BearerId) -> Result<Teid, SessionError> {
        self.bearer_teids
            .get(&FlowKey { rnti, bid })
            .map(|entry| *entry.value())
            .ok_or(SessionError::FlowNotFound { rnti, bid })
    }

    pub fn flow_for_teid(&self, teid: Teid) -> Result<FlowKey, SessionError> {
        self.teid_bearers
            .get(&teid)
            .map(|entry| *entry.value())
            .ok_or(SessionError::TeidNotFound(teid))
    }

    pub fn rnti_for_imsi(&self, imsi: Imsi) -> Result<Rnti, SessionError> {
        self.attachments
            .get(&imsi)
            .map(|entry| *entry.value())
            .ok_or(SessionError::SubscriberNotFound(imsi))
    }
}
