use hubwire_api::models::{Caps, Device, DeviceState, DeviceType};

use crate::errors::HubError;

/// Longest device name kept, in bytes.
pub const MAX_NAME_LEN: usize = 31;

pub const DEFAULT_TEMPERATURE_C: f32 = 22.0;

#[derive(Debug, Clone, PartialEq)]
pub struct DeviceRecord {
    pub id: u32,
    pub device_type: DeviceType,
    pub caps: Caps,
    pub name: String,
    pub on: bool,
    pub level: u32,
    pub power_w: f32,
    pub temperature_c: f32,
}

impl DeviceRecord {
    pub fn to_message(&self) -> Device {
        Device {
            id: Some(self.id),
            device_type: Some(self.device_type),
            caps: Some(self.caps),
            name: Some(self.name.clone()),
            on: Some(self.on),
            level: Some(self.level),
            power_w: Some(self.power_w),
            temperature_c: Some(self.temperature_c),
        }
    }

    pub fn state(&self, ts_us: u64) -> DeviceState {
        DeviceState {
            ts_us: Some(ts_us),
            device_id: Some(self.id),
            on: Some(self.on),
            level: Some(self.level),
        }
    }

    /// Applies an on/off and level change. Returns whether the visible state
    /// changed.
    pub fn apply(&mut self, on: Option<bool>, level: Option<u32>) -> bool {
        let mut changed = false;

        if let Some(on) = on {
            if self.on != on {
                self.on = on;
                changed = true;
            }
            if !self.on && self.caps.contains(Caps::POWER) {
                self.power_w = 0.0;
            }
        }

        if let Some(level) = level.filter(|_| self.caps.contains(Caps::LEVEL)) {
            let level = level.min(100);
            if self.level != level {
                self.level = level;
                changed = true;
            }
        }

        changed
    }
}

/// Fixed-capacity device table with sequential ids.
#[derive(Debug)]
pub struct Registry {
    devices: Vec<DeviceRecord>,
    next_id: u32,
    capacity: usize,
}

impl Registry {
    pub fn new(capacity: usize) -> Self {
        Self {
            devices: Vec::with_capacity(capacity),
            next_id: 1,
            capacity,
        }
    }

    pub fn add(
        &mut self,
        device_type: DeviceType,
        caps: Caps,
        name: &str,
    ) -> Result<&DeviceRecord, HubError> {
        if self.devices.len() >= self.capacity {
            return Err(HubError::RegistryFull);
        }

        let record = DeviceRecord {
            id: self.next_id,
            device_type,
            caps,
            name: truncate_name(name).to_string(),
            on: false,
            level: 0,
            power_w: 0.0,
            temperature_c: DEFAULT_TEMPERATURE_C,
        };
        self.next_id += 1;
        self.devices.push(record);

        let index = self.devices.len() - 1;
        Ok(&self.devices[index])
    }

    pub fn get(&self, id: u32) -> Option<&DeviceRecord> {
        self.devices.iter().find(|device| device.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut DeviceRecord> {
        self.devices.iter_mut().find(|device| device.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.devices.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut DeviceRecord> {
        self.devices.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

fn truncate_name(name: &str) -> &str {
    let mut end = name.len().min(MAX_NAME_LEN);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids_and_defaults() {
        let mut registry = Registry::new(4);
        let first = registry.add(DeviceType::Plug, Caps::ONOFF, "desk").unwrap().clone();
        let second = registry.add(DeviceType::Bulb, Caps::empty(), "lamp").unwrap().clone();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert!(!first.on);
        assert_eq!(first.level, 0);
        assert_eq!(first.power_w, 0.0);
        assert_eq!(first.temperature_c, DEFAULT_TEMPERATURE_C);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get(2).map(|d| d.name.as_str()), Some("lamp"));
        assert!(registry.get(3).is_none());
    }

    #[test]
    fn test_capacity() {
        let mut registry = Registry::new(1);
        registry.add(DeviceType::Plug, Caps::ONOFF, "a").unwrap();
        assert!(matches!(
            registry.add(DeviceType::Plug, Caps::ONOFF, "b"),
            Err(HubError::RegistryFull)
        ));
    }

    #[test]
    fn test_name_truncation() {
        let mut registry = Registry::new(2);
        let long = "x".repeat(40);
        assert_eq!(registry.add(DeviceType::Plug, Caps::ONOFF, &long).unwrap().name.len(), 31);

        // 30 ASCII bytes then a two-byte character straddling the limit
        let name = format!("{}é", "y".repeat(30));
        let record = registry.add(DeviceType::Plug, Caps::ONOFF, &name).unwrap();
        assert_eq!(record.name, "y".repeat(30));
    }

    #[test]
    fn test_apply_on_off_zeroes_power() {
        let mut registry = Registry::new(1);
        registry.add(DeviceType::Plug, Caps::ONOFF | Caps::POWER, "desk").unwrap();
        let record = registry.get_mut(1).unwrap();

        assert!(record.apply(Some(true), None));
        record.power_w = 40.0;
        assert!(!record.apply(Some(true), None));
        assert_eq!(record.power_w, 40.0);

        assert!(record.apply(Some(false), None));
        assert_eq!(record.power_w, 0.0);
    }

    #[test]
    fn test_apply_level_requires_cap_and_clamps() {
        let mut registry = Registry::new(2);
        registry.add(DeviceType::Plug, Caps::ONOFF, "plug").unwrap();
        registry.add(DeviceType::Bulb, Caps::ONOFF | Caps::LEVEL, "bulb").unwrap();

        let plug = registry.get_mut(1).unwrap();
        assert!(!plug.apply(None, Some(50)));
        assert_eq!(plug.level, 0);

        let bulb = registry.get_mut(2).unwrap();
        assert!(bulb.apply(None, Some(250)));
        assert_eq!(bulb.level, 100);
        assert!(!bulb.apply(None, Some(100)));
    }
}
