use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{Error, Result};

/// Temperature stored as Celsius internally.
/// The hub speaks in tenths of a degree; `-200` means "off".
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Temperature(f64);

impl Temperature {
    pub const MIN: Temperature = Temperature(5.0);
    pub const MAX: Temperature = Temperature(30.0);
    pub const OFF: Temperature = Temperature(-20.0);

    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    pub fn from_hub_units(units: i32) -> Self {
        Self(f64::from(units) / 10.0)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    /// Tenths of a degree, rounded to the nearest unit.
    pub fn to_hub_units(&self) -> i32 {
        (self.0 * 10.0).round() as i32
    }

    pub fn is_off(&self) -> bool {
        self.to_hub_units() == Self::OFF.to_hub_units()
    }

    /// Off, or within `MIN..=MAX`.
    pub fn is_valid(&self) -> bool {
        self.is_off() || self.is_in_range()
    }

    pub fn is_in_range(&self) -> bool {
        (Self::MIN.0..=Self::MAX.0).contains(&self.0)
    }

    pub(crate) fn validated(self, what: &str) -> Result<Self> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(Error::Validation(format!(
                "{what} must be between {} and {} or {} (off), got {self}",
                Self::MIN,
                Self::MAX,
                Self::OFF
            )))
        }
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomMode {
    Auto,
    Boost,
    Manual,
    Off,
}

impl RoomMode {
    pub fn as_hub_str(&self) -> &'static str {
        match self {
            RoomMode::Auto => "Auto",
            RoomMode::Boost => "Boost",
            RoomMode::Manual => "Manual",
            RoomMode::Off => "Off",
        }
    }
}

impl FromStr for RoomMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(RoomMode::Auto),
            "boost" => Ok(RoomMode::Boost),
            "manual" => Ok(RoomMode::Manual),
            "off" => Ok(RoomMode::Off),
            _ => Err(Error::Validation(format!(
                "room mode must be auto, boost, manual or off, got '{s}'"
            ))),
        }
    }
}

/// Parameters for [`RoomMode::Boost`]; ignored by every other mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boost {
    pub temperature: Temperature,
    pub minutes: u32,
}

impl Default for Boost {
    fn default() -> Self {
        Self {
            temperature: Temperature::from_celsius(20.0),
            minutes: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotWaterMode {
    On,
    Off,
    Auto,
}

impl HotWaterMode {
    pub fn as_hub_str(&self) -> &'static str {
        match self {
            HotWaterMode::On => "on",
            HotWaterMode::Off => "off",
            HotWaterMode::Auto => "auto",
        }
    }
}

impl FromStr for HotWaterMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(HotWaterMode::On),
            "off" => Ok(HotWaterMode::Off),
            "auto" => Ok(HotWaterMode::Auto),
            _ => Err(Error::Validation(format!(
                "hot water mode must be on, off or auto, got '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeAwayMode {
    Home,
    Away,
}

impl HomeAwayMode {
    pub fn as_hub_str(&self) -> &'static str {
        match self {
            HomeAwayMode::Home => "HOME",
            HomeAwayMode::Away => "AWAY",
        }
    }
}

impl FromStr for HomeAwayMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // The hub's own spelling only.
        match s {
            "HOME" => Ok(HomeAwayMode::Home),
            "AWAY" => Ok(HomeAwayMode::Away),
            _ => Err(Error::Validation(format!(
                "home/away mode must be HOME or AWAY, got '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartPlugState {
    On,
    Off,
}

impl SmartPlugState {
    pub fn as_hub_str(&self) -> &'static str {
        match self {
            SmartPlugState::On => "On",
            SmartPlugState::Off => "Off",
        }
    }
}

impl FromStr for SmartPlugState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "on" => Ok(SmartPlugState::On),
            "off" => Ok(SmartPlugState::Off),
            _ => Err(Error::Validation(format!(
                "smart plug state must be On or Off, got '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmartPlugMode {
    Auto,
    Manual,
}

impl SmartPlugMode {
    pub fn as_hub_str(&self) -> &'static str {
        match self {
            SmartPlugMode::Auto => "Auto",
            SmartPlugMode::Manual => "Manual",
        }
    }
}

impl FromStr for SmartPlugMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SmartPlugMode::Auto),
            "manual" => Ok(SmartPlugMode::Manual),
            _ => Err(Error::Validation(format!(
                "smart plug mode must be Auto or Manual, got '{s}'"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayState {
    On,
    #[default]
    Off,
}

impl RelayState {
    pub fn from_hub_str(s: &str) -> Self {
        if s == "On" {
            RelayState::On
        } else {
            RelayState::Off
        }
    }
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayState::On => f.write_str("On"),
            RelayState::Off => f.write_str("Off"),
        }
    }
}

/// The hub's primary document (`GET domain/`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Domain {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<System>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<Vec<Room>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<Vec<Device>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_stat: Option<Vec<RoomStat>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hot_water: Option<Vec<HotWater>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heating_channel: Option<Vec<HeatingChannel>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_plug: Option<Vec<SmartPlug>>,
    /// Heating schedules, copied in from the schedules document on refresh.
    #[serde(default)]
    pub schedule: Vec<Schedule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct System {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl System {
    pub fn get(&self, switch: &str) -> Option<&Value> {
        self.fields.get(switch)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Room {
    #[serde(rename = "id")]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_set_point: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_set_point: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room_stat_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smart_valve_ids: Option<Vec<u32>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Room {
    pub fn current_setpoint(&self) -> Option<Temperature> {
        self.current_set_point.map(Temperature::from_hub_units)
    }

    pub fn scheduled_setpoint(&self) -> Option<Temperature> {
        self.scheduled_set_point.map(Temperature::from_hub_units)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Device {
    #[serde(rename = "id")]
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_identifier: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoomStat {
    pub id: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HotWater {
    #[serde(rename = "id")]
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub water_heating_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HeatingChannel {
    #[serde(rename = "id")]
    pub id: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heating_relay_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SmartPlug {
    #[serde(rename = "id")]
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_state: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A heating schedule. Day entries are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET schedules/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScheduleData {
    #[serde(default)]
    pub heating: Vec<Schedule>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET network/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Network {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub station: Option<Station>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Station {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mdns_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Entities the hub lists by numeric id.
pub(crate) trait HubEntity {
    const NAME: &'static str;
    const PLURAL: &'static str;

    fn id(&self) -> u32;
}

macro_rules! hub_entity {
    ($ty:ty, $name:literal, $plural:literal) => {
        impl HubEntity for $ty {
            const NAME: &'static str = $name;
            const PLURAL: &'static str = $plural;

            fn id(&self) -> u32 {
                self.id
            }
        }
    };
}

hub_entity!(Room, "room", "rooms");
hub_entity!(Device, "device", "devices");
hub_entity!(RoomStat, "room stat", "room stats");
hub_entity!(SmartPlug, "smart plug", "smart plugs");
