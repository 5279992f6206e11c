use super::MAX_DATAGRAM;
use super::bearer_frame::BearerFrame;
use crate::SessionManager;
use anyhow::Result;
use async_std::net::UdpSocket;
use async_std::task::{self, JoinHandle};
use atomic_counter::{AtomicCounter, RelaxedCounter};
use gtpu::{GtpuHeader, MessageType};
use slog::{Logger, info};
use std::net::SocketAddr;
use std::sync::Arc;

pub mod downlink_counter_indices {
    pub const DL_RX_PKTS: usize = 0;
    pub const DL_RX_BYTES: usize = 1;
    pub const DL_DROP_MALFORMED: usize = 2;
    pub const DL_DROP_MESSAGE_TYPE: usize = 3;
    pub const DL_DROP_UNKNOWN_TEID: usize = 4;
    pub const DL_NUM_COUNTERS: usize = 5;
}
use downlink_counter_indices::*;

pub struct DownlinkCounters([RelaxedCounter; DL_NUM_COUNTERS]);

impl Default for DownlinkCounters {
    fn default() -> Self {
        Self(std::array::from_fn(|_| RelaxedCounter::new(0)))
    }
}

impl std::ops::Index<usize> for DownlinkCounters {
    type Output = RelaxedCounter;
    fn index(&self, index: usize) -> &RelaxedCounter {
        &self.0[index]
    }
}

/// Core -> radio direction: GTP-U datagrams in, bearer frames out.
pub struct DownlinkPipeline {
    gtpu_socket: Arc<UdpSocket>,
    radio_socket: Arc<UdpSocket>,
    radio_peer: SocketAddr,
    sessions: SessionManager,
    counters: Arc<DownlinkCounters>,
}

impl DownlinkPipeline {
    pub fn new(
        gtpu_socket: Arc<UdpSocket>,
        radio_socket: Arc<UdpSocket>,
        radio_peer: SocketAddr,
        sessions: SessionManager,
        counters: Arc<DownlinkCounters>,
    ) -> Self {
        Self {
            gtpu_socket,
            radio_socket,
            radio_peer,
            sessions,
            counters,
        }
    }

    pub fn run(self, logger: Logger) -> JoinHandle<()> {
        task::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM];
            loop {
                if let Err(e) = self.handle_next_downlink_packet(&mut buf).await {
                    info!(logger, "Exiting downlink pipeline with error {e}");
                    break;
                }
            }
        })
    }

    async fn handle_next_downlink_packet(&self, buf: &mut [u8; MAX_DATAGRAM]) -> Result<()> {
        let (bytes_read, _peer) = self.gtpu_socket.recv_from(buf).await?;
        self.counters[DL_RX_PKTS].inc();
        self.counters[DL_RX_BYTES].add(bytes_read);

        let header = match GtpuHeader::decode(&buf[..bytes_read]) {
            Ok(header) => header,
            Err(_) => {
                self.counters[DL_DROP_MALFORMED].inc();
                return Ok(());
            }
        };

        // Only G-PDUs carry user traffic; echo and end-marker handling is
        // the path manager's job, which this gateway does not run.
        if header.message_type != MessageType::GPdu {
            self.counters[DL_DROP_MESSAGE_TYPE].inc();
            return Ok(());
        }

        // Unknown TEID: the tunnel was never set up here, or outlived its
        // registration.  Drop with no partial forward.
        let Ok(flow) = self.sessions.flow_for_teid(header.teid) else {
            self.counters[DL_DROP_UNKNOWN_TEID].inc();
            return Ok(());
        };

        let frame = BearerFrame::encode(flow, &header.payload);
        self.radio_socket.send_to(&frame, self.radio_peer).await?;

        Ok(())
    }
}
