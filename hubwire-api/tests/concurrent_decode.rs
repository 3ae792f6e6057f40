use std::thread;

use hubwire_api::models::{Caps, Device, DeviceReport, DeviceType};
use hubwire_api::{EventId, HubEvent, Message, Payload, decode_frame};

const THREADS: usize = 8;
const ROUNDS: usize = 500;

fn fixture() -> Vec<u8> {
    HubEvent::new(
        EventId::EvtDeviceAdded,
        1_712_345_678_901_234,
        Payload::Device(Device {
            id: Some(12),
            device_type: Some(DeviceType::Bulb),
            caps: Some(Caps::ONOFF | Caps::LEVEL),
            name: Some("hallway".into()),
            on: Some(true),
            level: Some(80),
            power_w: Some(14.5),
            temperature_c: Some(22.0),
        }),
    )
    .encode_to_vec()
}

#[test]
fn test_concurrent_decodes_agree() {
    let frame = fixture();
    let expected = decode_frame(&frame).unwrap();

    thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let frame = &frame;
                scope.spawn(move || {
                    (0..ROUNDS)
                        .map(|_| decode_frame(frame).unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for event in handle.join().unwrap() {
                assert_eq!(event, expected);
            }
        }
    });
}

#[test]
fn test_concurrent_decodes_on_distinct_buffers() {
    let report = HubEvent::new(
        EventId::EvtDeviceReport,
        99,
        Payload::DeviceReport(DeviceReport {
            ts_us: Some(99),
            device_id: Some(3),
            has_power: Some(true),
            power_w: Some(31.0),
            ..Default::default()
        }),
    )
    .encode_to_vec();
    let device = fixture();

    let (left, right) = thread::scope(|scope| {
        let left = scope.spawn(|| {
            (0..ROUNDS)
                .map(|_| decode_frame(&report).unwrap())
                .collect::<Vec<_>>()
        });
        let right = scope.spawn(|| {
            (0..ROUNDS)
                .map(|_| decode_frame(&device).unwrap())
                .collect::<Vec<_>>()
        });
        (left.join().unwrap(), right.join().unwrap())
    });

    assert!(left.iter().all(|event| event.event_id == Some(EventId::EvtDeviceReport)));
    assert!(right.iter().all(|event| event.event_id == Some(EventId::EvtDeviceAdded)));
    assert_eq!(left[0], decode_frame(&report).unwrap());
    assert_eq!(right[ROUNDS - 1], decode_frame(&device).unwrap());
}
