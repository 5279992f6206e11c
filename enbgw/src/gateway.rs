use crate::userplane::PacketProcessor;
use crate::{BearerId, BearerQos, Config, Imsi, Rnti, SessionManager};
use anyhow::Result;
use async_std::sync::Mutex;
use async_trait::async_trait;
use gtpu::Teid;
use slog::{Logger, info};
use std::net::IpAddr;
use std::sync::Arc;

/// Parameters handed to the radio stack when a bearer's tunnel endpoint
/// becomes resolvable and the matching radio bearer should be established.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RadioBearerSetupRequest {
    pub rnti: Rnti,
    pub teid: Teid,
    pub qos: BearerQos,
}

/// Radio-side service access point, implemented by the RRC/radio
/// collaborator and called by the gateway.
#[async_trait]
pub trait RadioControlSap: Send + Sync + 'static {
    async fn radio_bearer_setup_request(&self, request: RadioBearerSetupRequest) -> Result<()>;
}

/// One station's user-plane tunneling gateway: owns the per-station session
/// tables and the forwarding pipelines between the radio-facing endpoint and
/// the S1-U GTP-U endpoint.
#[derive(Clone)]
pub struct EnbGateway {
    config: Config,
    sessions: SessionManager,
    radio_sap: Arc<dyn RadioControlSap>,
    packet_processor: Arc<Mutex<Option<PacketProcessor>>>,
    logger: Logger,
}

impl EnbGateway {
    pub async fn start(
        config: Config,
        radio_sap: Arc<dyn RadioControlSap>,
        logger: Logger,
    ) -> Result<Self> {
        let sessions = SessionManager::new();
        let packet_processor = PacketProcessor::new(&config, sessions.clone(), &logger).await?;
        if let Some(name) = &config.name {
            info!(logger, "Started eNB gateway {name} (eNB id {})", config.enb_id);
        }
        Ok(Self {
            config,
            sessions,
            radio_sap,
            packet_processor: Arc::new(Mutex::new(Some(packet_processor))),
            logger,
        })
    }

    /// Attach notification: a subscriber is now associated with this station
    /// under the given RNTI.
    pub fn initial_ue_message(&self, imsi: Imsi, rnti: Rnti) {
        self.sessions.record_attach(imsi, rnti);
    }

    /// S1 bearer setup notification: bind a radio bearer to the S1-U tunnel
    /// endpoint the control plane allocated for it.
    pub fn s1_bearer_setup(&self, rnti: Rnti, bid: BearerId, teid: Teid) {
        self.sessions.register_bearer(rnti, bid, teid, &self.logger);
    }

    /// A tunnel is ready for a subscriber's new bearer: ask the radio stack
    /// to establish the matching radio bearer.  Fails if the subscriber
    /// never attached here.
    pub async fn erab_setup_request(
        &self,
        teid: Teid,
        imsi: Imsi,
        qos: BearerQos,
    ) -> Result<()> {
        let rnti = self.sessions.rnti_for_imsi(imsi)?;
        self.radio_sap
            .radio_bearer_setup_request(RadioBearerSetupRequest { rnti, teid, qos })
            .await
    }

    pub fn ip_addr(&self) -> &IpAddr {
        &self.config.ip_addr
    }

    pub async fn graceful_shutdown(self) {
        info!(&self.logger, "Shutting down");
        if let Some(packet_processor) = self.packet_processor.lock().await.take() {
            packet_processor.shutdown().await;
        }
    }
}
