use enbgw_tests::framework::*;
use gtpu::Teid;

#[async_std::test]
async fn uplink() -> anyhow::Result<()> {
    let (radio, core, gw, _logger) = init(1).await?;

    // Control plane notifies attach, then bearer setup.
    gw.initial_ue_message(42, 7);
    gw.s1_bearer_setup(7, 3, Teid(1000));

    // A tagged radio packet must reach the SGW encapsulated under the
    // bearer's tunnel id.
    radio.send_uplink(7, 3, b"hello").await?;
    let (teid, payload) = core.recv_gpdu().await?;
    assert_eq!(teid, Teid(1000));
    assert_eq!(payload, b"hello");

    // A second bearer of the same UE tunnels independently.
    gw.s1_bearer_setup(7, 4, Teid(1001));
    let big_payload: Vec<u8> = (0..600).map(|_| rand::random()).collect();
    radio.send_uplink(7, 4, &big_payload).await?;
    let (teid, payload) = core.recv_gpdu().await?;
    assert_eq!(teid, Teid(1001));
    assert_eq!(payload, big_payload);

    Ok(())
}
