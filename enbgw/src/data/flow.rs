/// Long-lived subscriber identity, stable across re-attachment.
pub type Imsi = u64;

/// Radio Network Temporary Identifier: the station-local subscriber id,
/// valid for the duration of one attachment.
pub type Rnti = u16;

/// E-RAB bearer identity within one RNTI.
pub type BearerId = u8;

/// Identifies one radio bearer within this station.  Ordering compares RNTI
/// first, then bearer id; it exists only to give tables a deterministic
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowKey {
    pub rnti: Rnti,
    pub bid: BearerId,
}

impl std::fmt::Display for FlowKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.rnti, self.bid)
    }
}

/// Bearer parameters relayed to the radio stack when requesting radio bearer
/// establishment.  Opaque to this layer - no QoS enforcement here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BearerQos {
    pub qci: u8,
    pub arp_priority: u8,
}
