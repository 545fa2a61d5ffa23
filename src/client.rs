use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::logger::{MessageLogMode, MessageLogger};
use crate::protocol::{
    DOMAIN_PATH, NETWORK_PATH, SCHEDULES_PATH, SYSTEM_OVERRIDE_PATH, SYSTEM_PATH, base_url,
    boost_data, cancel_boost_data, heating_schedule_path, home_away_data, hot_water_data,
    hot_water_path, manual_override_data, room_auto_data, room_manual_data, room_path,
    smart_plug_mode_data, smart_plug_path, smart_plug_state_data, strip_non_ascii,
    system_switch_data,
};
use crate::state::{DeviceRoom, HubState};
use crate::transport::{Transport, TransportConfig};
use crate::types::*;
use crate::{Error, Result};

pub struct WiserHubBuilder {
    host: String,
    secret: String,
    transport: TransportConfig,
    log_mode: Option<MessageLogMode>,
    log_path: Option<PathBuf>,
}

impl WiserHubBuilder {
    pub fn new(host: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            secret: secret.into(),
            transport: TransportConfig::default(),
            log_mode: None,
            log_path: None,
        }
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.transport.connect_timeout = timeout;
        self
    }

    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.transport.read_timeout = timeout;
        self
    }

    /// Extra attempts for GETs answered with HTTP 500/502/503/504. Zero
    /// disables retrying.
    pub fn retries(mut self, retries: u32) -> Self {
        self.transport.retries = retries;
        self
    }

    /// Replaces timeouts and retry count in one go.
    pub fn transport(mut self, config: TransportConfig) -> Self {
        self.transport = config;
        self
    }

    /// Append PATCH traffic and refreshed domain documents to an NDJSON file.
    pub fn message_log(mut self, mode: MessageLogMode, path: impl Into<PathBuf>) -> Self {
        self.log_mode = Some(mode);
        self.log_path = Some(path.into());
        self
    }

    pub fn build(self) -> Result<WiserHub> {
        let transport = Transport::new(base_url(&self.host), &self.secret, &self.transport)?;

        let logger = match (self.log_mode, self.log_path) {
            (Some(mode), Some(path)) => Some(MessageLogger::new(mode, &path)?),
            _ => None,
        };

        info!(
            version = env!("CARGO_PKG_VERSION"),
            base_url = transport.base_url(),
            "Wiser hub client initialised"
        );

        Ok(WiserHub {
            transport,
            state: HubState::default(),
            logger,
        })
    }
}

/// A session with one hub: connection settings plus the cached hub documents.
///
/// Reads populate the cache on first use. Schedules and network data are
/// fetched once and kept until [`WiserHub::clear_cache`]; the domain document
/// is fetched on every [`WiserHub::refresh`] and dropped after every
/// successful write, so the next read sees the hub's new state.
pub struct WiserHub {
    transport: Transport,
    state: HubState,
    logger: Option<MessageLogger>,
}

impl WiserHub {
    pub fn builder(host: impl Into<String>, secret: impl Into<String>) -> WiserHubBuilder {
        WiserHubBuilder::new(host, secret)
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    // -- Cache --

    /// Fetches schedules and network data if not cached, then always the
    /// domain document. Up to three round trips.
    pub async fn refresh(&mut self) -> Result<&Domain> {
        info!("updating Wiser hub data");

        if self.state.schedules.is_none() {
            let schedules: ScheduleData = self.get_json(SCHEDULES_PATH).await?;
            self.state.schedules = Some(schedules);
        }

        if self.state.network.is_none() {
            let body = self.transport.get(NETWORK_PATH).await?;
            let network: Network = decode(NETWORK_PATH, &strip_non_ascii(&body))?;
            self.state.network = Some(network);
        }

        let raw: Value = self.get_json(DOMAIN_PATH).await?;
        if let Some(ref mut logger) = self.logger {
            logger.log_refresh(&raw);
        }
        let domain: Option<Domain> = serde_json::from_value(raw).map_err(|e| Error::Decode {
            path: DOMAIN_PATH.to_string(),
            source: e,
        })?;
        self.state.apply_domain(domain);

        self.state.domain.as_ref().ok_or(Error::DataUnavailable)
    }

    /// Returns the cached domain document, refreshing once if there is none.
    pub async fn ensure_loaded(&mut self) -> Result<&Domain> {
        if self.state.domain.is_none() {
            self.refresh().await?;
        }
        self.state.domain.as_ref().ok_or(Error::DataUnavailable)
    }

    /// The cached domain document, without touching the network.
    pub fn cached_domain(&self) -> Option<&Domain> {
        self.state.domain.as_ref()
    }

    /// Drops the domain document; schedules and network data stay cached.
    pub fn invalidate(&mut self) {
        self.state.invalidate_domain();
    }

    pub fn clear_cache(&mut self) {
        self.state.clear();
    }

    // -- Accessors --

    pub async fn domain(&mut self) -> Result<&Domain> {
        self.ensure_loaded().await
    }

    /// mDNS hostname, or the hub device's model when the network document
    /// has none.
    pub async fn hub_name(&mut self) -> Result<Option<String>> {
        self.ensure_loaded().await?;
        let hostname = self
            .state
            .network
            .as_ref()
            .and_then(|n| n.station.as_ref())
            .and_then(|s| s.mdns_hostname.clone());
        if hostname.is_some() {
            return Ok(hostname);
        }
        Ok(self
            .state
            .domain
            .as_ref()
            .and_then(|d| d.device.as_ref())
            .and_then(|devices| devices.iter().find(|d| d.id == 0))
            .and_then(|d| d.model_identifier.clone()))
    }

    pub async fn mac_address(&mut self) -> Result<Option<&str>> {
        self.ensure_loaded().await?;
        Ok(self
            .state
            .network
            .as_ref()
            .and_then(|n| n.station.as_ref())
            .and_then(|s| s.mac_address.as_deref()))
    }

    pub async fn system(&mut self) -> Result<Option<&System>> {
        Ok(self.ensure_loaded().await?.system.as_ref())
    }

    /// Empty when the hub reports no rooms at all; see [`WiserHub::room`].
    pub async fn rooms(&mut self) -> Result<&[Room]> {
        Ok(self.ensure_loaded().await?.room.as_deref().unwrap_or_default())
    }

    pub async fn room(&mut self, room_id: u32) -> Result<&Room> {
        lookup(&self.ensure_loaded().await?.room, room_id)
    }

    pub async fn devices(&mut self) -> Result<&[Device]> {
        Ok(self.ensure_loaded().await?.device.as_deref().unwrap_or_default())
    }

    pub async fn device(&mut self, device_id: u32) -> Result<&Device> {
        lookup(&self.ensure_loaded().await?.device, device_id)
    }

    pub async fn room_stat(&mut self, device_id: u32) -> Result<&RoomStat> {
        lookup(&self.ensure_loaded().await?.room_stat, device_id)
    }

    /// Room of a room stat or smart valve. The index is only rebuilt here
    /// when it is empty.
    pub async fn device_room(&mut self, device_id: u32) -> Result<&DeviceRoom> {
        self.ensure_loaded().await?;
        debug!(device_id, devices = self.state.device_rooms.len(), "device room lookup");
        if self.state.device_rooms.is_empty() {
            self.refresh().await?;
        }
        self.state
            .device_rooms
            .get(device_id)
            .ok_or_else(|| Error::not_found("device", device_id))
    }

    pub async fn hot_water(&mut self) -> Result<&[HotWater]> {
        Ok(self.ensure_loaded().await?.hot_water.as_deref().unwrap_or_default())
    }

    /// `None` when the system has no hot water.
    pub async fn hot_water_relay_status(&mut self) -> Result<Option<RelayState>> {
        let domain = self.ensure_loaded().await?;
        Ok(domain
            .hot_water
            .as_ref()
            .and_then(|h| h.first())
            .map(|h| {
                h.water_heating_state
                    .as_deref()
                    .map(RelayState::from_hub_str)
                    .unwrap_or_default()
            }))
    }

    pub async fn heating_channels(&mut self) -> Result<&[HeatingChannel]> {
        Ok(self
            .ensure_loaded()
            .await?
            .heating_channel
            .as_deref()
            .unwrap_or_default())
    }

    /// On if any heating channel reports its relay on.
    pub async fn heating_relay_status(&mut self) -> Result<RelayState> {
        let domain = self.ensure_loaded().await?;
        let on = domain
            .heating_channel
            .iter()
            .flatten()
            .any(|c| c.heating_relay_state.as_deref() == Some("On"));
        Ok(if on { RelayState::On } else { RelayState::Off })
    }

    pub async fn room_schedule(&mut self, room_id: u32) -> Result<&Schedule> {
        let domain = self.ensure_loaded().await?;
        let schedule_id = lookup(&domain.room, room_id)?
            .schedule_id
            .ok_or_else(|| Error::not_found("schedule for room", room_id))?;
        domain
            .schedule
            .iter()
            .find(|s| s.id == schedule_id)
            .ok_or_else(|| Error::not_found("schedule", schedule_id))
    }

    pub async fn smart_plugs(&mut self) -> Result<&[SmartPlug]> {
        Ok(self.ensure_loaded().await?.smart_plug.as_deref().unwrap_or_default())
    }

    pub async fn smart_plug(&mut self, plug_id: u32) -> Result<&SmartPlug> {
        lookup(&self.ensure_loaded().await?.smart_plug, plug_id)
    }

    /// Output state of a plug. A plug without one is offline and reported
    /// as not found.
    pub async fn smart_plug_state(&mut self, plug_id: u32) -> Result<&str> {
        let plug = lookup(&self.ensure_loaded().await?.smart_plug, plug_id)?;
        plug.output_state.as_deref().ok_or_else(|| {
            warn!(plug_id, "smart plug has no output state, is it offline?");
            Error::not_found("state of smart plug", plug_id)
        })
    }

    pub async fn smart_plug_mode(&mut self, plug_id: u32) -> Result<Option<&str>> {
        let plug = lookup(&self.ensure_loaded().await?.smart_plug, plug_id)?;
        Ok(plug.mode.as_deref())
    }

    // -- Command methods --

    /// Manual override at `temp`, which must be in range or off.
    pub async fn set_room_temperature(&mut self, room_id: u32, temp: Temperature) -> Result<()> {
        info!(room_id, %temp, "setting room temperature");
        let temp = temp.validated("room temperature")?;
        self.patch(&room_path(room_id), &manual_override_data(temp))
            .await
    }

    /// Every mode except boost first cancels any running boost; if that
    /// cancel fails the mode change is not sent.
    pub async fn set_room_mode(&mut self, room_id: u32, mode: RoomMode, boost: Boost) -> Result<()> {
        debug!(room_id, mode = mode.as_hub_str(), "setting room mode");

        let data = match mode {
            RoomMode::Auto => room_auto_data(),
            RoomMode::Boost => {
                if !boost.temperature.is_in_range() {
                    return Err(Error::Validation(format!(
                        "boost temperature must be between {} and {}, got {}",
                        Temperature::MIN,
                        Temperature::MAX,
                        boost.temperature
                    )));
                }
                debug!(
                    room_id,
                    temp = %boost.temperature,
                    minutes = boost.minutes,
                    "boosting room"
                );
                boost_data(boost.temperature, boost.minutes)
            }
            RoomMode::Manual => {
                let scheduled = self
                    .room(room_id)
                    .await?
                    .scheduled_setpoint()
                    .unwrap_or(Temperature::MIN);
                let temp = if scheduled < Temperature::MIN {
                    Temperature::MIN
                } else {
                    scheduled
                };
                room_manual_data(temp)
            }
            RoomMode::Off => room_manual_data(Temperature::OFF),
        };

        let path = room_path(room_id);
        if mode != RoomMode::Boost {
            self.patch(&path, &cancel_boost_data())
                .await
                .inspect_err(|e| error!(room_id, "cancelling boost failed: {e}"))?;
        }
        self.patch(&path, &data).await
    }

    /// Away needs a temperature (in range or off); home clears the override.
    pub async fn set_home_away_mode(
        &mut self,
        mode: HomeAwayMode,
        temperature: Option<Temperature>,
    ) -> Result<()> {
        info!(mode = mode.as_hub_str(), ?temperature, "setting home/away mode");
        let away_temp = match mode {
            HomeAwayMode::Away => {
                let temp = temperature.ok_or_else(|| {
                    Error::Validation("away mode requires a temperature".to_string())
                })?;
                Some(temp.validated("away temperature")?)
            }
            HomeAwayMode::Home => None,
        };
        self.patch(SYSTEM_OVERRIDE_PATH, &home_away_data(away_temp))
            .await
    }

    pub async fn set_hot_water_mode(&mut self, mode: HotWaterMode) -> Result<()> {
        let hot_water_id = self
            .ensure_loaded()
            .await?
            .hot_water
            .as_ref()
            .and_then(|h| h.first())
            .map(|h| h.id)
            .ok_or(Error::NoneFound("hot water"))?;
        debug!(hot_water_id, mode = mode.as_hub_str(), "setting hot water mode");
        self.patch(&hot_water_path(hot_water_id), &hot_water_data(mode))
            .await
    }

    /// Sets one of the switches found in the `System` section of the domain
    /// document, e.g. `ValveProtectionEnabled`.
    pub async fn set_system_switch(&mut self, switch: &str, value: impl Into<Value>) -> Result<()> {
        self.patch(SYSTEM_PATH, &system_switch_data(switch, value.into()))
            .await
    }

    /// Replaces the heating schedule assigned to `room_id`.
    pub async fn set_room_schedule(
        &mut self,
        room_id: u32,
        schedule: &impl Serialize,
    ) -> Result<()> {
        let data = serde_json::to_value(schedule)
            .map_err(|e| Error::Validation(format!("schedule is not valid JSON: {e}")))?;
        let schedule_id = self.room_schedule_id(room_id).await?;
        self.patch_schedule(schedule_id, &data).await
    }

    /// The room must have a schedule before the file is read.
    pub async fn set_room_schedule_from_file(
        &mut self,
        room_id: u32,
        path: impl AsRef<Path>,
    ) -> Result<()> {
        let schedule_id = self.room_schedule_id(room_id).await?;
        let schedule = load_schedule_file(path)?;
        self.patch_schedule(schedule_id, &schedule).await
    }

    /// Copies the whole schedule of one room onto another.
    pub async fn copy_room_schedule(&mut self, from_room: u32, to_room: u32) -> Result<()> {
        let schedule = self.room_schedule(from_room).await?.clone();
        debug!(from_room, to_room, schedule_id = schedule.id, "copying schedule");
        self.set_room_schedule(to_room, &schedule).await
    }

    pub async fn set_smart_plug_state(&mut self, plug_id: u32, state: SmartPlugState) -> Result<()> {
        self.patch(&smart_plug_path(plug_id), &smart_plug_state_data(state))
            .await
            .map_err(|e| plug_not_found(e, plug_id))
    }

    pub async fn set_smart_plug_mode(&mut self, plug_id: u32, mode: SmartPlugMode) -> Result<()> {
        self.patch(&smart_plug_path(plug_id), &smart_plug_mode_data(mode))
            .await
            .map_err(|e| plug_not_found(e, plug_id))
    }

    // -- Helpers --

    async fn room_schedule_id(&mut self, room_id: u32) -> Result<u32> {
        self.room(room_id)
            .await?
            .schedule_id
            .ok_or_else(|| Error::not_found("schedule for room", room_id))
    }

    async fn patch_schedule(&mut self, schedule_id: u32, data: &Value) -> Result<()> {
        self.patch(&heating_schedule_path(schedule_id), data).await?;
        self.state.schedules = None;
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let body = self.transport.get(path).await?;
        decode(path, &body)
    }

    /// Anything but 200 is a failure, including other 2xx codes.
    async fn patch(&mut self, path: &str, data: &Value) -> Result<()> {
        debug!(path, payload = %data, "sending patch");
        if let Some(ref mut logger) = self.logger {
            logger.log_request("PATCH", path, Some(data));
        }

        let result = self.transport.patch(path, data).await;
        let status = match &result {
            Ok((status, _)) => Some(status.as_u16()),
            Err(e) => e.status(),
        };
        debug!(path, ?status, "patch response");
        if let (Some(logger), Some(status)) = (self.logger.as_mut(), status) {
            logger.log_response(path, status);
        }

        let (status, body) = result?;
        if status != StatusCode::OK {
            return Err(Error::Protocol {
                path: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        self.state.invalidate_domain();
        Ok(())
    }
}

/// Reads a schedule document from disk. The path in errors is absolute.
pub fn load_schedule_file(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let resolved = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    if !path.exists() {
        return Err(Error::File {
            path: resolved,
            source: "file not found".into(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|e| Error::File {
        path: resolved.clone(),
        source: Box::new(e),
    })?;
    serde_json::from_str(&contents).map_err(|e| Error::File {
        path: resolved,
        source: Box::new(e),
    })
}

fn decode<T: DeserializeOwned>(path: &str, body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| Error::Decode {
        path: path.to_string(),
        source: e,
    })
}

fn lookup<T: HubEntity>(list: &Option<Vec<T>>, id: u32) -> Result<&T> {
    let Some(items) = list else {
        warn!(entity = T::NAME, id, "lookup but the hub reported none");
        return Err(Error::NoneFound(T::PLURAL));
    };
    items
        .iter()
        .find(|item| item.id() == id)
        .ok_or_else(|| Error::not_found(T::NAME, id))
}

fn plug_not_found(err: Error, plug_id: u32) -> Error {
    match err {
        Error::Request { status: 404, .. } => Error::not_found("smart plug", plug_id),
        other => other,
    }
}
