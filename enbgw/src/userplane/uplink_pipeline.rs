use super::MAX_DATAGRAM;
use super::bearer_frame::BearerFrame;
use crate::SessionManager;
use anyhow::Result;
use async_std::net::UdpSocket;
use async_std::task::{self, JoinHandle};
use atomic_counter::{AtomicCounter, RelaxedCounter};
use gtpu::GtpuHeader;
use slog::{Logger, error, info};
use std::net::SocketAddr;
use std::sync::Arc;

pub mod uplink_counter_indices {
    pub const UL_RX_PKTS: usize = 0;
    pub const UL_RX_BYTES: usize = 1;
    pub const UL_DROP_NO_FLOW_KEY: usize = 2;
    pub const UL_DROP_UNKNOWN_FLOW: usize = 3;
    pub const UL_NUM_COUNTERS: usize = 4;
}
use uplink_counter_indices::*;

pub struct UplinkCounters([RelaxedCounter; UL_NUM_COUNTERS]);

impl Default for UplinkCounters {
    fn default() -> Self {
        Self(std::array::from_fn(|_| RelaxedCounter::new(0)))
    }
}

impl std::ops::Index<usize> for UplinkCounters {
    type Output = RelaxedCounter;
    fn index(&self, index: usize) -> &RelaxedCounter {
        &self.0[index]
    }
}

/// Radio -> core direction: bearer frames in, GTP-U datagrams out.
pub struct UplinkPipeline {
    radio_socket: Arc<UdpSocket>,
    gtpu_socket: Arc<UdpSocket>,
    sgw_addr: SocketAddr,
    sessions: SessionManager,
    counters: Arc<UplinkCounters>,
}

impl UplinkPipeline {
    pub fn new(
        radio_socket: Arc<UdpSocket>,
        gtpu_socket: Arc<UdpSocket>,
        sgw_addr: SocketAddr,
        sessions: SessionManager,
        counters: Arc<UplinkCounters>,
    ) -> Self {
        Self {
            radio_socket,
            gtpu_socket,
            sgw_addr,
            sessions,
            counters,
        }
    }

    pub fn run(self, logger: Logger) -> JoinHandle<()> {
        task::spawn(async move {
            let mut buf = [0u8; MAX_DATAGRAM];
            loop {
                if let Err(e) = self.handle_next_uplink_frame(&mut buf, &logger).await {
                    info!(logger, "Exiting uplink pipeline with error {e}");
                    break;
                }
            }
        })
    }

    async fn handle_next_uplink_frame(
        &self,
        buf: &mut [u8; MAX_DATAGRAM],
        logger: &Logger,
    ) -> Result<()> {
        let (bytes_read, _peer) = self.radio_socket.recv_from(buf).await?;
        self.counters[UL_RX_PKTS].inc();
        self.counters[UL_RX_BYTES].add(bytes_read);

        // The radio stack prefixes every packet with its flow key.  A frame
        // without one is an upstream defect, surfaced louder than the
        // data-driven drops below.
        let frame = match BearerFrame::decode(&buf[..bytes_read]) {
            Ok(frame) => frame,
            Err(e) => {
                self.counters[UL_DROP_NO_FLOW_KEY].inc();
                error!(logger, "Radio stack contract violation: {e}");
                return Ok(());
            }
        };

        // Data can race ahead of the control plane's bookkeeping.  Drop the
        // packet, not the pipeline.
        let Ok(teid) = self
            .sessions
            .teid_for_flow(frame.flow.rnti, frame.flow.bid)
        else {
            self.counters[UL_DROP_UNKNOWN_FLOW].inc();
            return Ok(());
        };

        let datagram = GtpuHeader::gpdu(teid, frame.payload).encode();
        self.gtpu_socket.send_to(&datagram, self.sgw_addr).await?;

        Ok(())
    }
}
