use enbgw::FlowKey;
use enbgw_tests::framework::*;
use gtpu::Teid;

#[async_std::test]
async fn downlink() -> anyhow::Result<()> {
    let (radio, core, gw, _logger) = init(2).await?;

    gw.initial_ue_message(42, 7);
    gw.s1_bearer_setup(7, 3, Teid(1000));

    // A G-PDU from the SGW must come out the radio side tagged with the
    // bearer's flow key.
    core.send_gpdu(gw.ip_addr(), Teid(1000), b"world").await?;
    let frame = radio.recv_downlink().await?;
    assert_eq!(frame.flow, FlowKey { rnti: 7, bid: 3 });
    assert_eq!(frame.payload, b"world");

    Ok(())
}
