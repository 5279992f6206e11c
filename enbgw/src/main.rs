//! main - starts a single-station user-plane tunneling gateway

use anyhow::Result;
use async_std::channel::Sender;
use async_std::prelude::*;
use async_trait::async_trait;
use clap::Parser;
use enbgw::{
    Config, EnbGateway, RadioBearerSetupRequest, RadioControlSap, X2Registry,
    load_topology_file,
};
use signal_hook::consts::signal::*;
use signal_hook_async_std::Signals;
use slog::{Drain, Logger, info, o};
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Local IP address of the gateway.  UDP port 2152 (GTP-U, for S1-U) is
    /// bound on this address.  Defaults to the eth0 address.
    #[arg(long, default_value_t = local_ip_address::local_ip().unwrap())]
    local_ip: IpAddr,

    /// Global eNB identity of this station, used for X2 pairing.
    #[arg(long, default_value_t = 1)]
    enb_id: u32,

    /// IP address of the serving gateway's GTP-U endpoint.  All uplink
    /// traffic is tunneled to port 2152 on this address.
    #[arg(long)]
    sgw_ip: IpAddr,

    /// Local endpoint where bearer frames from the radio stack arrive.
    #[arg(long, default_value = "127.0.0.1:47555")]
    radio_bind: SocketAddr,

    /// Endpoint of the radio stack, where downlink bearer frames are sent.
    #[arg(long, default_value = "127.0.0.1:47556")]
    radio_peer: SocketAddr,

    /// Name of a TOML file listing X2 neighbor links to register at startup.
    #[arg(long)]
    x2_topology: Option<String>,
}

// Stand-in for the RRC/radio collaborator when the gateway runs on its own.
struct LoggingRadioSap(Logger);

#[async_trait]
impl RadioControlSap for LoggingRadioSap {
    async fn radio_bearer_setup_request(&self, request: RadioBearerSetupRequest) -> Result<()> {
        info!(
            self.0,
            "Radio bearer setup requested for RNTI {} TEID {}", request.rnti, request.teid
        );
        Ok(())
    }
}

#[async_std::main]
async fn main() -> Result<()> {
    exit_on_panic();
    let logger = init_logging();

    let args = Args::parse();

    let x2 = X2Registry::new();
    if let Some(filename) = &args.x2_topology {
        for link in load_topology_file(filename, &logger)? {
            let (handler_a, handler_b) = x2.add_interface(link.a, link.b)?;
            info!(
                logger,
                "Registered X2 interface {}-{}",
                handler_a.local(),
                handler_b.local()
            );
        }
    }

    let gw = EnbGateway::start(
        Config {
            ip_addr: args.local_ip,
            name: Some("EnbGw".to_string()),
            enb_id: args.enb_id,
            sgw_addr: args.sgw_ip,
            radio_bind: args.radio_bind,
            radio_peer: args.radio_peer,
        },
        Arc::new(LoggingRadioSap(logger.new(o!("sap" => "radio")))),
        logger,
    )
    .await?;

    wait_for_signal().await?;
    gw.graceful_shutdown().await;

    Ok(())
}

fn init_logging() -> Logger {
    // Use info level logging by default
    if std::env::var("RUST_LOG").is_err() {
        unsafe { std::env::set_var("RUST_LOG", "info") }
    }
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();
    let drain = slog_envlogger::new(drain);
    slog::Logger::root(drain, o!())
}

fn exit_on_panic() {
    let orig_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        orig_hook(panic_info);
        std::process::exit(1);
    }));
}

async fn wait_for_signal() -> Result<i32> {
    let signals = Signals::new([SIGHUP, SIGTERM, SIGINT, SIGQUIT])?;
    let handle = signals.handle();
    let (sig_sender, sig_receiver) = async_std::channel::unbounded();
    let signals_task = async_std::task::spawn(handle_signals(signals, sig_sender));
    let signal = sig_receiver.recv().await;
    handle.close();
    signals_task.await;
    Ok(signal?)
}

async fn handle_signals(signals: Signals, sig_sender: Sender<i32>) {
    let mut signals = signals.fuse();
    while let Some(signal) = signals.next().await {
        match signal {
            SIGHUP => {
                // Reload configuration
                // Reopen the log file
            }
            SIGTERM | SIGINT | SIGQUIT => {
                // Shutdown the system;
                let _ = sig_sender.send(signal).await;
            }
            _ => unreachable!(),
        }
    }
}
