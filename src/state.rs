use std::collections::HashMap;

use tracing::{debug, warn};

use crate::types::{Domain, Network, Room, ScheduleData};

/// The room a room stat or smart valve belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRoom {
    pub room_id: u32,
    pub room_name: String,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct DeviceRoomIndex {
    entries: HashMap<u32, DeviceRoom>,
}

impl DeviceRoomIndex {
    /// Builds the index from scratch. Also returns the ids of rooms that have
    /// neither a room stat nor any smart valve.
    pub fn build(rooms: &[Room]) -> (Self, Vec<u32>) {
        let mut entries = HashMap::new();
        let mut empty_rooms = Vec::new();

        for room in rooms {
            let entry = DeviceRoom {
                room_id: room.id,
                room_name: room.name.clone(),
            };
            if let Some(stat_id) = room.room_stat_id {
                entries.insert(stat_id, entry.clone());
            }
            if let Some(valves) = &room.smart_valve_ids {
                for valve_id in valves {
                    entries.insert(*valve_id, entry.clone());
                }
            }
            if room.room_stat_id.is_none() && room.smart_valve_ids.is_none() {
                empty_rooms.push(room.id);
            }
        }

        (Self { entries }, empty_rooms)
    }

    pub fn get(&self, device_id: u32) -> Option<&DeviceRoom> {
        self.entries.get(&device_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cached hub documents. Only the refresh path writes here.
#[derive(Debug, Default)]
pub(crate) struct HubState {
    pub domain: Option<Domain>,
    pub network: Option<Network>,
    pub schedules: Option<ScheduleData>,
    pub device_rooms: DeviceRoomIndex,
}

impl HubState {
    /// Installs a freshly fetched domain document: heating schedules are
    /// copied in and the device index is rebuilt from its rooms.
    pub fn apply_domain(&mut self, domain: Option<Domain>) {
        let Some(mut domain) = domain else {
            warn!("hub returned no domain data");
            self.domain = None;
            return;
        };

        domain.schedule = self
            .schedules
            .as_ref()
            .map(|s| s.heating.clone())
            .unwrap_or_default();

        match &domain.room {
            Some(rooms) => {
                let (index, empty_rooms) = DeviceRoomIndex::build(rooms);
                for room in rooms.iter().filter(|r| empty_rooms.contains(&r.id)) {
                    warn!(
                        room_id = room.id,
                        room = %room.name,
                        "room doesn't contain any smart valves or thermostats"
                    );
                }
                debug!(devices = index.len(), "rebuilt device to room index");
                self.device_rooms = index;
            }
            None => {
                warn!("hub data contains no rooms");
                self.device_rooms = DeviceRoomIndex::default();
            }
        }

        self.domain = Some(domain);
    }

    pub fn invalidate_domain(&mut self) {
        self.domain = None;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
