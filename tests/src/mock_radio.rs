use anyhow::{Result, anyhow, bail};
use async_channel::{Receiver, Sender};
use async_net::{SocketAddr, UdpSocket};
use async_std::future;
use async_trait::async_trait;
use enbgw::{BearerFrame, FlowKey, RadioBearerSetupRequest, RadioControlSap};
use slog::{Logger, info};
use std::sync::Arc;
use std::time::Duration;

/// Stand-in for the radio stack: the far end of the gateway's radio-facing
/// endpoint, plus the radio-side control SAP.
pub struct MockRadio {
    socket: UdpSocket,
    gateway_addr: SocketAddr,
    sap: Arc<RecordingRadioSap>,
    setup_requests: Receiver<RadioBearerSetupRequest>,
    logger: Logger,
}

struct RecordingRadioSap(Sender<RadioBearerSetupRequest>);

#[async_trait]
impl RadioControlSap for RecordingRadioSap {
    async fn radio_bearer_setup_request(&self, request: RadioBearerSetupRequest) -> Result<()> {
        self.0
            .send(request)
            .await
            .map_err(|_| anyhow!("Test finished before the setup request was observed"))
    }
}

impl MockRadio {
    pub async fn new(bind: SocketAddr, gateway_addr: SocketAddr, logger: &Logger) -> Result<Self> {
        let socket = UdpSocket::bind(bind).await?;
        info!(logger, "Mock radio stack on {bind}");
        let (sender, receiver) = async_channel::unbounded();
        Ok(MockRadio {
            socket,
            gateway_addr,
            sap: Arc::new(RecordingRadioSap(sender)),
            setup_requests: receiver,
            logger: logger.clone(),
        })
    }

    /// The control SAP the gateway calls back into, for passing to
    /// `EnbGateway::start`.
    pub fn sap(&self) -> Arc<dyn RadioControlSap> {
        self.sap.clone()
    }

    /// Send an uplink packet into the gateway, tagged with its flow key the
    /// way the radio stack would tag it.
    pub async fn send_uplink(&self, rnti: u16, bid: u8, payload: &[u8]) -> Result<()> {
        let frame = BearerFrame::encode(FlowKey { rnti, bid }, payload);
        info!(
            self.logger,
            "Send uplink frame ({rnti},{bid}) with {} payload bytes",
            payload.len()
        );
        self.socket.send_to(&frame, self.gateway_addr).await?;
        Ok(())
    }

    pub async fn recv_downlink(&self) -> Result<BearerFrame> {
        let mut buf = vec![0u8; 2000];
        let future_result = self.socket.recv_from(&mut buf);
        let (bytes_received, _source) =
            future::timeout(Duration::from_secs(1), future_result).await??;
        let frame = BearerFrame::decode(&buf[..bytes_received])?;
        info!(self.logger, "Received downlink frame {}", frame.flow);
        Ok(frame)
    }

    /// Assert that the gateway forwards nothing to the radio side within the
    /// grace period.
    pub async fn expect_no_downlink(&self) -> Result<()> {
        let mut buf = vec![0u8; 2000];
        match future::timeout(Duration::from_millis(500), self.socket.recv_from(&mut buf)).await {
            Err(_timeout) => Ok(()),
            Ok(received) => {
                let (bytes_received, _source) = received?;
                bail!("Unexpected downlink frame of {bytes_received} bytes")
            }
        }
    }

    pub async fn next_bearer_setup_request(&self) -> Result<RadioBearerSetupRequest> {
        Ok(future::timeout(Duration::from_secs(1), self.setup_requests.recv()).await??)
    }
}
