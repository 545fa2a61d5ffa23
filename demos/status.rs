use std::env;

use wiser_hub::{HubConfig, RoomMode};

/// Prints a one-shot summary of the hub. Reads WISER_HUB_HOST and
/// WISER_HUB_SECRET; pass `--boost <room id>` to boost a room for 30 minutes.
#[tokio::main]
async fn main() -> wiser_hub::Result<()> {
    tracing_subscriber::fmt::init();

    let config = HubConfig::from_env()?;
    let mut hub = config.builder().build()?;

    let args: Vec<String> = env::args().collect();
    if let Some(pos) = args.iter().position(|a| a == "--boost") {
        let room_id: u32 = args
            .get(pos + 1)
            .and_then(|id| id.parse().ok())
            .expect("usage: status [--boost <room id>]");
        hub.set_room_mode(room_id, RoomMode::Boost, Default::default())
            .await?;
        println!("Boosted room {room_id}");
    }

    let name = hub.hub_name().await?.unwrap_or_else(|| "unknown".into());
    println!("Hub: {name} ({})", config.host);

    for room in hub.rooms().await? {
        let setpoint = room
            .current_setpoint()
            .map(|t| if t.is_off() { "off".to_string() } else { t.to_string() })
            .unwrap_or_else(|| "-".into());
        println!(
            "[{}] {} | mode: {} | setpoint: {setpoint}",
            room.id,
            room.name,
            room.mode.as_deref().unwrap_or("?"),
        );
    }

    println!("Heating relay: {}", hub.heating_relay_status().await?);
    if let Some(hot_water) = hub.hot_water_relay_status().await? {
        println!("Hot water relay: {hot_water}");
    }
    for plug in hub.smart_plugs().await? {
        println!(
            "Plug {} [{}]: {}",
            plug.name,
            plug.id,
            plug.output_state.as_deref().unwrap_or("offline"),
        );
    }

    Ok(())
}
