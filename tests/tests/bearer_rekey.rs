use enbgw::FlowKey;
use enbgw_tests::framework::*;
use gtpu::Teid;

#[async_std::test]
async fn bearer_rekey() -> anyhow::Result<()> {
    let (radio, core, gw, _logger) = init(4).await?;

    gw.initial_ue_message(42, 7);
    gw.s1_bearer_setup(7, 3, Teid(1000));

    radio.send_uplink(7, 3, b"before").await?;
    let (teid, _payload) = core.recv_gpdu().await?;
    assert_eq!(teid, Teid(1000));

    // The control plane re-keys the bearer to a new tunnel.
    gw.s1_bearer_setup(7, 3, Teid(2000));

    // The superseded tunnel id no longer delivers.
    core.send_gpdu(gw.ip_addr(), Teid(1000), b"stale").await?;
    radio.expect_no_downlink().await?;

    // Both directions now run over the new tunnel.
    core.send_gpdu(gw.ip_addr(), Teid(2000), b"fresh").await?;
    let frame = radio.recv_downlink().await?;
    assert_eq!(frame.flow, FlowKey { rnti: 7, bid: 3 });
    assert_eq!(frame.payload, b"fresh");

    radio.send_uplink(7, 3, b"after").await?;
    let (teid, payload) = core.recv_gpdu().await?;
    assert_eq!(teid, Teid(2000));
    assert_eq!(payload, b"after");

    Ok(())
}
