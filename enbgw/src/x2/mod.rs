use anyhow::{Result, anyhow};
use async_channel::{Receiver, Sender};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use thiserror::Error;

/// Global station (eNB) identity.
pub type StationId = u32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum X2Error {
    #[error("X2 interface {0}-{1} is already registered")]
    DuplicateInterface(StationId, StationId),
    #[error("no X2 interface registered for {0}-{1}")]
    InterfaceNotFound(StationId, StationId),
}

/// Unordered pair of station identities.  Construction sorts the two ids, so
/// (a,b) and (b,a) build the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationPair(StationId, StationId);

impl StationPair {
    pub fn new(a: StationId, b: StationId) -> Self {
        if a <= b { Self(a, b) } else { Self(b, a) }
    }
}

impl std::fmt::Display for StationPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

/// One endpoint of a bound X2 handler pair.  The two handlers of a pair are
/// wired to each other at construction and stay bound for the life of the
/// registry entry; each is attached to its own station's inter-station
/// socket by the topology constructor.
#[derive(Clone, Debug)]
pub struct X2Handler {
    local: StationId,
    peer: StationId,
    to_peer: Sender<Vec<u8>>,
    from_peer: Receiver<Vec<u8>>,
}

impl X2Handler {
    pub fn local(&self) -> StationId {
        self.local
    }

    pub fn peer(&self) -> StationId {
        self.peer
    }

    /// Deliver a PDU to the peer station's handler.
    pub async fn send(&self, pdu: Vec<u8>) -> Result<()> {
        self.to_peer
            .send(pdu)
            .await
            .map_err(|_| anyhow!("X2 peer handler for station {} is gone", self.peer))
    }

    /// Receive the next PDU sent by the peer station's handler.
    pub async fn recv(&self) -> Result<Vec<u8>> {
        Ok(self.from_peer.recv().await?)
    }
}

/// Registry of point-to-point X2 interfaces, one per unordered pair of
/// stations.  Owned by whoever constructs the topology; entries live as long
/// as the registry (no teardown - stations are not removed mid-run).
#[derive(Clone)]
pub struct X2Registry {
    pairs: Arc<DashMap<StationPair, (X2Handler, X2Handler)>>,
}

impl X2Registry {
    pub fn new() -> Self {
        Self {
            pairs: Arc::new(DashMap::new()),
        }
    }

    /// Create the X2 interface between two stations and return the two bound
    /// handlers, the first belonging to `a`.  Registering the same pair
    /// twice (in either order) is a wiring error.
    pub fn add_interface(
        &self,
        a: StationId,
        b: StationId,
    ) -> Result<(X2Handler, X2Handler), X2Error> {
        let key = StationPair::new(a, b);
        match self.pairs.entry(key) {
            Entry::Occupied(_) => Err(X2Error::DuplicateInterface(a, b)),
            Entry::Vacant(vacant) => {
                let (a_to_b, from_a) = async_channel::unbounded();
                let (b_to_a, from_b) = async_channel::unbounded();
                let handler_a = X2Handler {
                    local: a,
                    peer: b,
                    to_peer: a_to_b,
                    from_peer: from_b,
                };
                let handler_b = X2Handler {
                    local: b,
                    peer: a,
                    to_peer: b_to_a,
                    from_peer: from_a,
                };
                vacant.insert((handler_a.clone(), handler_b.clone()));
                Ok((handler_a, handler_b))
            }
        }
    }

    /// Fetch the registered handlers for a pair, the first belonging to `a`.
    pub fn lookup(
        &self,
        a: StationId,
        b: StationId,
    ) -> Result<(X2Handler, X2Handler), X2Error> {
        let pair = self
            .pairs
            .get(&StationPair::new(a, b))
            .ok_or(X2Error::InterfaceNotFound(a, b))?;
        let (first, second) = pair.value().clone();
        if first.local == a {
            Ok((first, second))
        } else {
            Ok((second, first))
        }
    }
}
