use wiser_hub::{HubConfig, RelayState};

/// Run with: cargo test --test integration -- --ignored
/// Requires a hub on the LAN:
///   WISER_HUB_HOST=192.168.1.20 WISER_HUB_SECRET=... cargo test --test integration -- --ignored
///
/// Read-only; nothing here changes hub state.
#[tokio::test]
#[ignore]
async fn refresh_live_hub() {
    let config = HubConfig::from_env().expect("WISER_HUB_HOST and WISER_HUB_SECRET must be set");
    let mut hub = config.builder().build().expect("client should build");

    let domain = hub.refresh().await.expect("refresh failed");
    assert!(domain.system.is_some(), "hub should report a System section");

    let rooms = hub.rooms().await.expect("rooms failed");
    assert!(!rooms.is_empty(), "hub should have at least one room");
    let room_id = rooms[0].id;
    hub.room(room_id).await.expect("first room should be found by id");
}

#[tokio::test]
#[ignore]
async fn live_hub_identity() {
    let config = HubConfig::from_env().expect("WISER_HUB_HOST and WISER_HUB_SECRET must be set");
    let mut hub = config.builder().build().unwrap();

    let name = hub.hub_name().await.unwrap();
    assert!(name.is_some(), "hub should report a hostname or model");
    println!("hub: {name:?}, mac: {:?}", hub.mac_address().await.unwrap());
}

#[tokio::test]
#[ignore]
async fn live_relays_and_devices() {
    let config = HubConfig::from_env().expect("WISER_HUB_HOST and WISER_HUB_SECRET must be set");
    let mut hub = config.builder().build().unwrap();

    let heating = hub.heating_relay_status().await.unwrap();
    assert!(matches!(heating, RelayState::On | RelayState::Off));

    let stat_ids: Vec<u32> = hub
        .rooms()
        .await
        .unwrap()
        .iter()
        .filter_map(|r| r.room_stat_id)
        .collect();
    for id in stat_ids {
        let room = hub.device_room(id).await.expect("room stat should map to a room");
        println!("room stat {id} -> {}", room.room_name);
    }
}

#[tokio::test]
#[ignore]
async fn wrong_secret_is_rejected() {
    let config = HubConfig::from_env().expect("WISER_HUB_HOST must be set");
    let mut hub = wiser_hub::WiserHub::builder(&config.host, "not-the-secret")
        .build()
        .unwrap();
    let err = hub.refresh().await.unwrap_err();
    assert!(
        matches!(err, wiser_hub::Error::Authentication { .. }),
        "expected Authentication, got {err:?}"
    );
}
