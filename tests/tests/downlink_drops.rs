use enbgw::FlowKey;
use enbgw_tests::framework::*;
use gtpu::Teid;

#[async_std::test]
async fn downlink_drops() -> anyhow::Result<()> {
    let (radio, core, gw, _logger) = init(3).await?;

    // A truncated GTP-U header must be dropped, not forwarded.
    core.send_raw(gw.ip_addr(), &[0x30, 0xff, 0x00]).await?;

    // So must a well-formed G-PDU for a tunnel nobody registered.
    core.send_gpdu(gw.ip_addr(), Teid(9999), b"stray").await?;
    radio.expect_no_downlink().await?;

    // The pipeline survives both and keeps forwarding valid traffic.
    gw.initial_ue_message(42, 7);
    gw.s1_bearer_setup(7, 3, Teid(1000));
    core.send_gpdu(gw.ip_addr(), Teid(1000), b"after the storm").await?;
    let frame = radio.recv_downlink().await?;
    assert_eq!(frame.flow, FlowKey { rnti: 7, bid: 3 });
    assert_eq!(frame.payload, b"after the storm");

    Ok(())
}
