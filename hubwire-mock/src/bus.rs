use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use hubwire_api::models::{
    Caps, CmdDeviceAdd, CmdDeviceInterview, CmdDeviceSet, CmdSceneTrigger, Device, DeviceType,
};
use hubwire_api::{EventId, HubEvent, Payload};
use rand::Rng;
use tokio::sync::broadcast;

use crate::errors::HubError;
use crate::registry::Registry;
use crate::simulate;

pub const SCENE_ALL_ON: u32 = 1;
pub const SCENE_ALL_OFF: u32 = 2;

const SEED_DEVICES: [(DeviceType, Caps, &str); 3] = [
    (DeviceType::Plug, Caps::ONOFF.union(Caps::POWER), "desk"),
    (DeviceType::Bulb, Caps::ONOFF.union(Caps::LEVEL), "lamp"),
    (DeviceType::TempSensor, Caps::TEMPERATURE, "t1"),
];

/// Applies commands to the registry and publishes every command and
/// notification as a `HubEvent`.
///
/// A command envelope is always sent before the notifications it causes.
/// Publishing happens under the registry lock so subscribers see the events
/// of one command contiguously.
pub struct HubBus {
    registry: Mutex<Registry>,
    sender: broadcast::Sender<HubEvent>,
    started: Instant,
}

impl HubBus {
    pub fn new(capacity: usize, channel_size: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(channel_size.max(1));
        Self {
            registry: Mutex::new(Registry::new(capacity)),
            sender,
            started: Instant::now(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HubEvent> {
        self.sender.subscribe()
    }

    /// Microseconds since the bus started.
    pub fn now_us(&self) -> u64 {
        self.started.elapsed().as_micros() as u64
    }

    pub fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.registry.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, event_id: EventId, payload: Payload) {
        let event = HubEvent::new(event_id, self.now_us(), payload);
        // No subscribers is not an error.
        let receivers = self.sender.send(event).unwrap_or(0);
        tracing::debug!(event_id = %event_id, receivers, "Published event");
    }

    pub fn list(&self) -> Vec<Device> {
        self.registry().iter().map(|record| record.to_message()).collect()
    }

    pub fn get(&self, device_id: u32) -> Result<Device, HubError> {
        self.registry()
            .get(device_id)
            .map(|record| record.to_message())
            .ok_or(HubError::DeviceNotFound(device_id))
    }

    pub fn add(&self, cmd: CmdDeviceAdd) -> Result<Device, HubError> {
        let device_type = match cmd.device_type {
            Some(device_type) if device_type.is_known() && device_type != DeviceType::Unspecified => {
                device_type
            }
            _ => return Err(HubError::InvalidDeviceType),
        };
        let name = cmd.name.clone().unwrap_or_default();
        if name.is_empty() {
            return Err(HubError::MissingName);
        }
        let caps = cmd.caps.unwrap_or_default();

        let mut registry = self.registry();
        self.publish(EventId::CmdDeviceAdd, Payload::CmdDeviceAdd(cmd));

        let device = registry.add(device_type, caps, &name)?.to_message();
        tracing::info!(id = ?device.id, name = %name, "Device added");

        self.publish(EventId::EvtDeviceAdded, Payload::Device(device.clone()));
        Ok(device)
    }

    pub fn set(&self, device_id: u32, cmd: CmdDeviceSet) -> Result<(), HubError> {
        let on = cmd.requested_on();
        let level = cmd.requested_level();
        if on.is_none() && level.is_none() {
            return Err(HubError::EmptySet);
        }

        let mut registry = self.registry();
        self.publish(
            EventId::CmdDeviceSet,
            Payload::CmdDeviceSet(CmdDeviceSet {
                device_id: Some(device_id),
                ..cmd
            }),
        );
        self.apply_set(&mut registry, device_id, on, level)
    }

    fn apply_set(
        &self,
        registry: &mut Registry,
        device_id: u32,
        on: Option<bool>,
        level: Option<u32>,
    ) -> Result<(), HubError> {
        let record = registry
            .get_mut(device_id)
            .ok_or(HubError::DeviceNotFound(device_id))?;

        if record.apply(on, level) {
            let state = record.state(self.now_us());
            self.publish(EventId::EvtDeviceState, Payload::DeviceState(state));
        }
        Ok(())
    }

    pub fn interview(&self, device_id: u32) -> Result<Device, HubError> {
        let mut registry = self.registry();
        self.publish(
            EventId::CmdDeviceInterview,
            Payload::CmdDeviceInterview(CmdDeviceInterview::new(device_id)),
        );

        let record = registry
            .get_mut(device_id)
            .ok_or(HubError::DeviceNotFound(device_id))?;
        record.caps.insert(record.device_type.typical_caps());
        let device = record.to_message();

        self.publish(EventId::EvtDeviceInterviewed, Payload::Device(device.clone()));
        Ok(device)
    }

    pub fn trigger_scene(&self, scene_id: u32) -> Result<(), HubError> {
        let mut registry = self.registry();
        self.publish(
            EventId::CmdSceneTrigger,
            Payload::CmdSceneTrigger(CmdSceneTrigger::new(scene_id)),
        );

        let on = match scene_id {
            SCENE_ALL_ON => true,
            SCENE_ALL_OFF => false,
            other => return Err(HubError::SceneNotFound(other)),
        };

        let targets: Vec<u32> = registry
            .iter()
            .filter(|record| record.caps.contains(Caps::ONOFF))
            .map(|record| record.id)
            .collect();
        for device_id in targets {
            self.apply_set(&mut registry, device_id, Some(on), None)?;
        }

        tracing::info!(scene_id, on, "Scene triggered");
        Ok(())
    }

    /// Adds and interviews a fixed set of demo devices.
    pub fn seed(&self) -> Result<Vec<Device>, HubError> {
        SEED_DEVICES
            .iter()
            .map(|(device_type, caps, name)| {
                let device = self.add(CmdDeviceAdd::new(*device_type, *caps, *name))?;
                self.interview(device.id.unwrap_or_default())
            })
            .collect()
    }

    /// Runs one simulator step over every device. Returns the number of
    /// reports published.
    pub fn simulate_tick<R: Rng>(&self, rng: &mut R) -> usize {
        let mut registry = self.registry();
        let ts_us = self.now_us();

        let reports: Vec<_> = registry
            .iter_mut()
            .filter_map(|record| simulate::step_device(rng, record, ts_us))
            .collect();
        let published = reports.len();

        for report in reports {
            self.publish(EventId::EvtDeviceReport, Payload::DeviceReport(report));
        }
        published
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tokio::sync::broadcast::error::TryRecvError;

    fn drain(rx: &mut broadcast::Receiver<HubEvent>) -> Vec<EventId> {
        let mut ids = Vec::new();
        loop {
            match rx.try_recv() {
                Ok(event) => ids.push(event.event_id.unwrap_or_default()),
                Err(TryRecvError::Empty) => return ids,
                Err(other) => panic!("unexpected receive error: {:?}", other),
            }
        }
    }

    #[test]
    fn test_add_publishes_command_then_notification() {
        let bus = HubBus::new(4, 16);
        let mut rx = bus.subscribe();

        let device = bus
            .add(CmdDeviceAdd::new(DeviceType::Plug, Caps::ONOFF, "desk"))
            .unwrap();
        assert_eq!(device.id, Some(1));
        assert_eq!(device.temperature_c, Some(22.0));
        assert_eq!(
            drain(&mut rx),
            vec![EventId::CmdDeviceAdd, EventId::EvtDeviceAdded]
        );
    }

    #[test]
    fn test_add_validation() {
        let bus = HubBus::new(4, 16);
        let mut rx = bus.subscribe();

        let unspecified = CmdDeviceAdd::new(DeviceType::Unspecified, Caps::ONOFF, "x");
        assert!(matches!(bus.add(unspecified), Err(HubError::InvalidDeviceType)));

        let nameless = CmdDeviceAdd::new(DeviceType::Plug, Caps::ONOFF, "");
        assert!(matches!(bus.add(nameless), Err(HubError::MissingName)));

        // Rejected before reaching the bus.
        assert!(drain(&mut rx).is_empty());
    }

    #[test]
    fn test_set_publishes_state_only_on_change() {
        let bus = HubBus::new(4, 16);
        bus.add(CmdDeviceAdd::new(DeviceType::Bulb, Caps::ONOFF | Caps::LEVEL, "lamp"))
            .unwrap();
        let mut rx = bus.subscribe();

        bus.set(1, CmdDeviceSet::new(1).with_on(true).with_level(60)).unwrap();
        assert_eq!(drain(&mut rx), vec![EventId::CmdDeviceSet, EventId::EvtDeviceState]);

        bus.set(1, CmdDeviceSet::new(1).with_on(true)).unwrap();
        assert_eq!(drain(&mut rx), vec![EventId::CmdDeviceSet]);

        let device = bus.get(1).unwrap();
        assert_eq!(device.on, Some(true));
        assert_eq!(device.level, Some(60));
    }

    #[test]
    fn test_set_errors() {
        let bus = HubBus::new(4, 16);
        assert!(matches!(bus.set(1, CmdDeviceSet::new(1)), Err(HubError::EmptySet)));
        assert!(matches!(
            bus.set(9, CmdDeviceSet::new(9).with_on(true)),
            Err(HubError::DeviceNotFound(9))
        ));
    }

    #[test]
    fn test_interview_adds_typical_caps() {
        let bus = HubBus::new(4, 16);
        bus.add(CmdDeviceAdd::new(DeviceType::TempSensor, Caps::empty(), "t1"))
            .unwrap();
        let mut rx = bus.subscribe();

        let device = bus.interview(1).unwrap();
        assert_eq!(device.caps, Some(Caps::TEMPERATURE));
        assert_eq!(
            drain(&mut rx),
            vec![EventId::CmdDeviceInterview, EventId::EvtDeviceInterviewed]
        );
        assert!(matches!(bus.interview(2), Err(HubError::DeviceNotFound(2))));
    }

    #[test]
    fn test_scenes() {
        let bus = HubBus::new(4, 32);
        bus.seed().unwrap();
        let mut rx = bus.subscribe();

        bus.trigger_scene(SCENE_ALL_ON).unwrap();
        // desk and lamp switch on, the sensor has no on/off
        assert_eq!(
            drain(&mut rx),
            vec![
                EventId::CmdSceneTrigger,
                EventId::EvtDeviceState,
                EventId::EvtDeviceState
            ]
        );
        assert!(bus.list().iter().filter(|d| d.caps.unwrap().contains(Caps::ONOFF)).all(|d| d.on == Some(true)));

        bus.trigger_scene(SCENE_ALL_OFF).unwrap();
        assert!(bus.list().iter().all(|d| d.on == Some(false)));

        assert!(matches!(bus.trigger_scene(7), Err(HubError::SceneNotFound(7))));
    }

    #[test]
    fn test_seed_devices() {
        let bus = HubBus::new(8, 32);
        let seeded = bus.seed().unwrap();
        let names: Vec<_> = seeded.iter().filter_map(|d| d.name.clone()).collect();
        assert_eq!(names, vec!["desk", "lamp", "t1"]);
        assert_eq!(seeded[0].caps, Some(Caps::ONOFF | Caps::POWER));
        assert_eq!(bus.list().len(), 3);
    }

    #[test]
    fn test_simulate_tick_reports() {
        let bus = HubBus::new(8, 64);
        bus.seed().unwrap();
        bus.set(1, CmdDeviceSet::new(1).with_on(true)).unwrap();
        let mut rx = bus.subscribe();

        let mut rng = StdRng::seed_from_u64(42);
        // desk draws power, t1 reports temperature, lamp has no sensors
        assert_eq!(bus.simulate_tick(&mut rng), 2);
        assert_eq!(
            drain(&mut rx),
            vec![EventId::EvtDeviceReport, EventId::EvtDeviceReport]
        );
    }

    #[test]
    fn test_registry_full() {
        let bus = HubBus::new(1, 16);
        bus.add(CmdDeviceAdd::new(DeviceType::Plug, Caps::ONOFF, "a")).unwrap();
        let mut rx = bus.subscribe();
        assert!(matches!(
            bus.add(CmdDeviceAdd::new(DeviceType::Plug, Caps::ONOFF, "b")),
            Err(HubError::RegistryFull)
        ));
        // The command still went out.
        assert_eq!(drain(&mut rx), vec![EventId::CmdDeviceAdd]);
    }
}
