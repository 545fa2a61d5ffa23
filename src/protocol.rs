use serde_json::{Value, json};

use crate::types::{HotWaterMode, SmartPlugMode, SmartPlugState, Temperature};

pub const DOMAIN_PATH: &str = "domain/";
pub const NETWORK_PATH: &str = "network/";
pub const SCHEDULES_PATH: &str = "schedules/";
pub const SYSTEM_PATH: &str = "System";
pub const SYSTEM_OVERRIDE_PATH: &str = "System/RequestOverride";

/// Hot water has no real setpoint; the hub wants one anyway to mean on/off.
pub const HOT_WATER_ON_SETPOINT: i32 = 1100;
pub const HOT_WATER_OFF_SETPOINT: i32 = -200;

const ORIGINATOR_APP: &str = "App";

pub fn base_url(host: &str) -> String {
    format!("http://{host}/data/v2/")
}

pub fn room_path(room_id: u32) -> String {
    format!("domain/Room/{room_id}")
}

pub fn hot_water_path(hot_water_id: u32) -> String {
    format!("HotWater/{hot_water_id}/")
}

pub fn heating_schedule_path(schedule_id: u32) -> String {
    format!("schedules/Heating/{schedule_id}")
}

pub fn smart_plug_path(plug_id: u32) -> String {
    format!("domain/SmartPlug/{plug_id}")
}

pub fn manual_override_data(temp: Temperature) -> Value {
    json!({
        "RequestOverride": {
            "Type": "Manual",
            "SetPoint": temp.to_hub_units()
        }
    })
}

pub fn room_auto_data() -> Value {
    json!({ "Mode": "Auto" })
}

pub fn room_manual_data(temp: Temperature) -> Value {
    json!({
        "Mode": "Manual",
        "RequestOverride": {
            "Type": "Manual",
            "SetPoint": temp.to_hub_units()
        }
    })
}

pub fn boost_data(temp: Temperature, minutes: u32) -> Value {
    json!({
        "RequestOverride": {
            "Type": "Manual",
            "DurationMinutes": minutes,
            "SetPoint": temp.to_hub_units(),
            "Originator": ORIGINATOR_APP
        }
    })
}

pub fn cancel_boost_data() -> Value {
    json!({
        "RequestOverride": {
            "Type": "None",
            "DurationMinutes": 0,
            "SetPoint": 0,
            "Originator": ORIGINATOR_APP
        }
    })
}

pub fn hot_water_data(mode: HotWaterMode) -> Value {
    match mode {
        HotWaterMode::On => json!({
            "RequestOverride": { "Type": "Manual", "SetPoint": HOT_WATER_ON_SETPOINT }
        }),
        HotWaterMode::Off => json!({
            "RequestOverride": { "Type": "Manual", "SetPoint": HOT_WATER_OFF_SETPOINT }
        }),
        HotWaterMode::Auto => json!({
            "RequestOverride": { "Type": "None", "Mode": "Auto" }
        }),
    }
}

/// `None` means home: the override is cleared.
pub fn home_away_data(away_temp: Option<Temperature>) -> Value {
    match away_temp {
        Some(temp) => json!({ "type": 2, "setPoint": temp.to_hub_units() }),
        None => json!({ "type": 0, "setPoint": 0 }),
    }
}

pub fn system_switch_data(switch: &str, value: Value) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(switch.to_string(), value);
    Value::Object(map)
}

pub fn smart_plug_state_data(state: SmartPlugState) -> Value {
    json!({ "RequestOutput": state.as_hub_str() })
}

pub fn smart_plug_mode_data(mode: SmartPlugMode) -> Value {
    json!({ "Mode": mode.as_hub_str() })
}

/// The network document can carry control characters and non-ASCII bytes
/// in SSIDs that break JSON parsing.
pub fn strip_non_ascii(body: &[u8]) -> Vec<u8> {
    body.iter()
        .copied()
        .filter(|b| (0x20..=0x7f).contains(b))
        .collect()
}
