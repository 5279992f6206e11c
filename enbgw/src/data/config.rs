use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone)]
pub struct Config {
    // The S1-U IP address.  GTP-U is bound on UDP port 2152 on this address.
    pub ip_addr: IpAddr,

    // Human readable eNB name used in logging
    pub name: Option<String>,

    // Global eNB identity, also the station identity for X2 pairing.
    pub enb_id: u32,

    // Address of the serving gateway's GTP-U endpoint.  All uplink traffic
    // is tunneled to port 2152 on this address.
    pub sgw_addr: IpAddr,

    // Local endpoint where bearer frames from the radio stack arrive.
    pub radio_bind: SocketAddr,

    // Endpoint of the radio stack, where downlink bearer frames are sent.
    pub radio_peer: SocketAddr,
}
