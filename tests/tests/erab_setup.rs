use enbgw::BearerQos;
use enbgw_tests::framework::*;
use gtpu::Teid;

#[async_std::test]
async fn erab_setup() -> anyhow::Result<()> {
    let (radio, _core, gw, _logger) = init(5).await?;

    gw.initial_ue_message(42, 7);

    // The core allocated a tunnel for the subscriber's new bearer; the
    // radio side must be asked to establish the matching radio bearer.
    let qos = BearerQos {
        qci: 9,
        arp_priority: 1,
    };
    gw.erab_setup_request(Teid(1000), 42, qos).await?;
    let request = radio.next_bearer_setup_request().await?;
    assert_eq!(request.rnti, 7);
    assert_eq!(request.teid, Teid(1000));
    assert_eq!(request.qos, qos);

    // For a subscriber that never attached here, the whole call fails.
    assert!(gw.erab_setup_request(Teid(1001), 99, qos).await.is_err());

    Ok(())
}
