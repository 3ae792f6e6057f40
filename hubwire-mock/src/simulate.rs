use std::sync::Arc;
use std::time::Duration;

use hubwire_api::models::{Caps, DeviceReport, DeviceType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::task::JoinHandle;
use tokio::time;

use crate::bus::HubBus;
use crate::registry::DeviceRecord;

const POWER_STEP_W: f32 = 5.0;
const TEMPERATURE_STEP_C: f32 = 0.2;
const TEMPERATURE_MIN_C: f32 = 15.0;
const TEMPERATURE_MAX_C: f32 = 30.0;

/// Moves `current` by a uniform step in `[-step, step)` and clamps the result.
pub fn rand_walk<R: Rng>(rng: &mut R, current: f32, step: f32, min: f32, max: f32) -> f32 {
    let delta = (rng.random::<f32>() * 2.0 - 1.0) * step;
    (current + delta).clamp(min, max)
}

/// Nominal draw and ceiling in watts.
fn power_profile(device_type: DeviceType) -> (f32, f32) {
    match device_type {
        DeviceType::Plug => (25.0, 120.0),
        _ => (8.0, 35.0),
    }
}

/// Advances one device by one tick and returns the report to publish, if
/// anything moved.
pub fn step_device<R: Rng>(
    rng: &mut R,
    device: &mut DeviceRecord,
    ts_us: u64,
) -> Option<DeviceReport> {
    let mut report = DeviceReport {
        ts_us: Some(ts_us),
        device_id: Some(device.id),
        has_power: Some(false),
        power_w: Some(0.0),
        has_temperature: Some(false),
        temperature_c: Some(0.0),
    };
    let mut dirty = false;

    if device.caps.contains(Caps::POWER) {
        if device.on {
            let target = if device.caps.contains(Caps::LEVEL) {
                0.5 + device.level as f32 / 100.0
            } else {
                1.0
            };
            let (base, max) = power_profile(device.device_type);
            let desired = base * target;

            let walked = rand_walk(rng, device.power_w, POWER_STEP_W, 0.0, max);
            device.power_w = 0.8 * walked + 0.2 * desired;

            report.has_power = Some(true);
            report.power_w = Some(device.power_w);
            dirty = true;
        } else if device.power_w != 0.0 {
            device.power_w = 0.0;
            report.has_power = Some(true);
            dirty = true;
        }
    }

    if device.caps.contains(Caps::TEMPERATURE) {
        device.temperature_c = rand_walk(
            rng,
            device.temperature_c,
            TEMPERATURE_STEP_C,
            TEMPERATURE_MIN_C,
            TEMPERATURE_MAX_C,
        );
        report.has_temperature = Some(true);
        report.temperature_c = Some(device.temperature_c);
        dirty = true;
    }

    dirty.then_some(report)
}

pub fn spawn_simulator(bus: Arc<HubBus>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut rng = StdRng::from_os_rng();
        let mut interval = time::interval(period);

        tracing::info!("Simulator running every {:?}", period);

        loop {
            interval.tick().await;
            let published = bus.simulate_tick(&mut rng);
            tracing::trace!("Simulator tick published {} reports", published);
        }
    })
}
