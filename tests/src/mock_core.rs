use anyhow::Result;
use async_net::{IpAddr, SocketAddr, UdpSocket};
use async_std::future;
use gtpu::{GTPU_PORT, GtpuHeader, Teid};
use slog::{Logger, info};
use std::time::Duration;

/// Stand-in for the serving gateway's GTP-U endpoint on the S1-U reference
/// point.
pub struct MockCoreNetwork {
    gtpu_socket: UdpSocket,
    logger: Logger,
}

impl MockCoreNetwork {
    pub async fn new(local_ip: IpAddr, logger: &Logger) -> Result<Self> {
        let transport_address = SocketAddr::new(local_ip, GTPU_PORT);
        info!(logger, "Mock SGW serving GTP-U on {transport_address}");
        let gtpu_socket = UdpSocket::bind(transport_address).await?;
        Ok(MockCoreNetwork {
            gtpu_socket,
            logger: logger.clone(),
        })
    }

    /// Tunnel a downlink payload to the gateway as a G-PDU.
    pub async fn send_gpdu(&self, gateway_ip: &IpAddr, teid: Teid, payload: &[u8]) -> Result<()> {
        let datagram = GtpuHeader::gpdu(teid, payload.to_vec()).encode();
        info!(self.logger, "Send G-PDU with TEID {teid}, {} payload bytes", payload.len());
        self.gtpu_socket
            .send_to(&datagram, SocketAddr::new(*gateway_ip, GTPU_PORT))
            .await?;
        Ok(())
    }

    /// Send arbitrary bytes at the gateway's GTP-U port.
    pub async fn send_raw(&self, gateway_ip: &IpAddr, bytes: &[u8]) -> Result<()> {
        self.gtpu_socket
            .send_to(bytes, SocketAddr::new(*gateway_ip, GTPU_PORT))
            .await?;
        Ok(())
    }

    pub async fn recv_gpdu(&self) -> Result<(Teid, Vec<u8>)> {
        let mut buf = vec![0u8; 2000];
        let future_result = self.gtpu_socket.recv_from(&mut buf);
        let (bytes_received, _source) =
            future::timeout(Duration::from_secs(1), future_result).await??;
        let header = GtpuHeader::decode(&buf[..bytes_received])?;
        info!(self.logger, "Received G-PDU with TEID {}", header.teid);
        Ok((header.teid, header.payload.to_vec()))
    }
}
