use enbgw::{X2Error, X2Registry};

#[async_std::test]
async fn x2_pairing() -> anyhow::Result<()> {
    let registry = X2Registry::new();
    let (handler_a, handler_b) = registry.add_interface(1, 2)?;
    assert_eq!(handler_a.local(), 1);
    assert_eq!(handler_a.peer(), 2);

    // (2,1) is the same unordered pair as (1,2): wiring it again is a
    // topology bug, and looking it up finds the existing registration.
    assert_eq!(
        registry.add_interface(2, 1).unwrap_err(),
        X2Error::DuplicateInterface(2, 1)
    );
    let (from_2, from_1) = registry.lookup(2, 1)?;
    assert_eq!(from_2.local(), 2);
    assert_eq!(from_1.local(), 1);

    assert_eq!(
        registry.lookup(1, 3).unwrap_err(),
        X2Error::InterfaceNotFound(1, 3)
    );

    // The two handlers of a pair are bound to each other, and lookup
    // returns live endpoints of the same link.
    handler_a.send(b"handover request".to_vec()).await?;
    assert_eq!(from_2.recv().await?, b"handover request");
    handler_b.send(b"handover ack".to_vec()).await?;
    assert_eq!(handler_a.recv().await?, b"handover ack");

    Ok(())
}
