use super::downlink_pipeline::DownlinkCounters;
use super::uplink_pipeline::UplinkCounters;
use super::{DownlinkPipeline, UplinkPipeline};
use crate::{Config, SessionManager};
use anyhow::{Context, Result};
use async_std::net::UdpSocket;
use async_std::task::JoinHandle;
use atomic_counter::AtomicCounter;
use gtpu::GTPU_PORT;
use slog::{Logger, info, warn};
use socket2::{Domain, Protocol, Socket, Type};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

/// Owns the two user-plane sockets and the pipeline tasks that service
/// them.  One instance per station; built at gateway start, torn down with
/// it.
pub struct PacketProcessor {
    tasks: Vec<JoinHandle<()>>,
}

impl PacketProcessor {
    pub async fn new(
        config: &Config,
        sessions: SessionManager,
        logger: &Logger,
    ) -> Result<Self> {
        // Create the packet sources/sinks.  Both pipelines share both
        // sockets: uplink receives on the radio side and sends on the GTP-U
        // side, downlink the other way around.
        let gtpu_socket: UdpSocket = create_gtpu_socket(config.ip_addr, logger)?.into();
        let gtpu_socket = Arc::new(gtpu_socket);
        let radio_socket = UdpSocket::bind(config.radio_bind)
            .await
            .context(format!("Failed to bind {}", config.radio_bind))?;
        info!(logger, "Serving bearer frames on {}", config.radio_bind);
        let radio_socket = Arc::new(radio_socket);

        let sgw_addr = SocketAddr::new(config.sgw_addr, GTPU_PORT);

        // Start the uplink pipeline (radio -> S1-U).
        let uplink_counters = Arc::new(UplinkCounters::default());
        let uplink_pipeline = UplinkPipeline::new(
            radio_socket.clone(),
            gtpu_socket.clone(),
            sgw_addr,
            sessions.clone(),
            uplink_counters.clone(),
        );
        let uplink_task = uplink_pipeline.run(logger.clone());

        // Start the downlink pipeline (S1-U -> radio).
        let downlink_counters = Arc::new(DownlinkCounters::default());
        let downlink_pipeline = DownlinkPipeline::new(
            gtpu_socket,
            radio_socket,
            config.radio_peer,
            sessions,
            downlink_counters.clone(),
        );
        let downlink_task = downlink_pipeline.run(logger.clone());

        let stats_task = async_std::task::spawn(dump_stats(
            logger.clone(),
            downlink_counters,
            uplink_counters,
        ));

        Ok(PacketProcessor {
            tasks: vec![uplink_task, downlink_task, stats_task],
        })
    }

    pub async fn shutdown(self) {
        for task in self.tasks {
            task.cancel().await;
        }
    }
}

fn create_gtpu_socket(local_ip: IpAddr, logger: &Logger) -> Result<std::net::UdpSocket> {
    let transport_address = SocketAddr::new(local_ip, GTPU_PORT);
    let domain = match local_ip {
        IpAddr::V4(_) => Domain::IPV4,
        IpAddr::V6(_) => Domain::IPV6,
    };

    // On the core network side (S1-U reference point), we open a GTP UDP socket.
    let gtpu_socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
    gtpu_socket.set_reuse_port(true)?;
    gtpu_socket
        .bind(&transport_address.into())
        .context(format!("Failed to bind {}", transport_address))?;
    info!(logger, "Serving GTP-U on {transport_address}");
    Ok(gtpu_socket.into())
}

use super::downlink_pipeline::downlink_counter_indices::*;
use super::uplink_pipeline::uplink_counter_indices::*;

async fn dump_stats(logger: Logger, dl: Arc<DownlinkCounters>, ul: Arc<UplinkCounters>) {
    let mut last_dl = [0usize; DL_NUM_COUNTERS];
    let mut last_ul = [0usize; UL_NUM_COUNTERS];
    const FIRST_DL_WARN_IDX: usize = DL_DROP_MALFORMED;
    const FIRST_UL_WARN_IDX: usize = UL_DROP_NO_FLOW_KEY;

    loop {
        async_std::task::sleep(std::time::Duration::new(5, 0)).await;

        if dl[DL_RX_PKTS].get() != last_dl[DL_RX_PKTS]
            || ul[UL_RX_PKTS].get() != last_ul[UL_RX_PKTS]
        {
            last_dl[DL_RX_PKTS] = dl[DL_RX_PKTS].get();
            last_dl[DL_RX_BYTES] = dl[DL_RX_BYTES].get();
            last_ul[UL_RX_PKTS] = ul[UL_RX_PKTS].get();
            last_ul[UL_RX_BYTES] = ul[UL_RX_BYTES].get();

            info!(
                &logger,
                "DL pkts={} bytes={} UL pkts={} bytes={} ",
                last_dl[DL_RX_PKTS],
                last_dl[DL_RX_BYTES],
                last_ul[UL_RX_PKTS],
                last_ul[UL_RX_BYTES]
            );
        }

        let mut dl_warn_needed = false;
        for idx in FIRST_DL_WARN_IDX..DL_NUM_COUNTERS {
            if last_dl[idx] != dl[idx].get() {
                dl_warn_needed = true;
            }
            last_dl[idx] = dl[idx].get();
        }
        let mut ul_warn_needed = false;
        for idx in FIRST_UL_WARN_IDX..UL_NUM_COUNTERS {
            if last_ul[idx] != ul[idx].get() {
                ul_warn_needed = true;
            }
            last_ul[idx] = ul[idx].get();
        }

        if dl_warn_needed {
            warn!(
                &logger,
                "DL DROPS malformed={} msg_type={} bad_teid={}",
                last_dl[DL_DROP_MALFORMED],
                last_dl[DL_DROP_MESSAGE_TYPE],
                last_dl[DL_DROP_UNKNOWN_TEID]
            );
        }

        if ul_warn_needed {
            warn!(
                &logger,
                "UL DROPS no_flow_key={} unknown_flow={}",
                last_ul[UL_DROP_NO_FLOW_KEY],
                last_ul[UL_DROP_UNKNOWN_FLOW]
            );
        }
    }
}
