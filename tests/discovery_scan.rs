mod common;

use std::net::IpAddr;

use abs_scpi::discovery::{copy_bounded, scan_multicast, scan_serial};
use abs_scpi::driver::AddressedLine;
use abs_scpi::{ErrorCode, EthernetDevice, SerialDevice};
use common::{FakeBus, FakeGroup};

fn ip(text: &str) -> IpAddr {
    text.parse().unwrap()
}

#[test]
fn test_serial_scan_lists_units_in_address_order() {
    let bus = FakeBus::new().with_unit(4, "AB0004").with_unit(1, "AB0001");

    let found = scan_serial(&bus, 0, 5).unwrap();
    assert_eq!(
        found,
        vec![
            SerialDevice {
                id: 1,
                serial: "AB0001".to_string()
            },
            SerialDevice {
                id: 4,
                serial: "AB0004".to_string()
            },
        ]
    );
    assert_eq!(bus.probed(), vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn test_serial_scan_single_address_and_empty_bus() {
    let bus = FakeBus::new().with_unit(255, "AB0255");
    let found = scan_serial(&bus, 255, 255).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, 255);

    let empty = FakeBus::new();
    assert!(scan_serial(&empty, 10, 20).unwrap().is_empty());
    assert_eq!(empty.probed().len(), 11);
}

#[test]
fn test_serial_scan_rejects_reversed_range() {
    let bus = FakeBus::new();
    assert_eq!(scan_serial(&bus, 9, 3), Err(ErrorCode::InvalidArgument));
    assert!(bus.probed().is_empty());
}

#[test]
fn test_serial_scan_aborts_on_hard_errors() {
    let bus = FakeBus::new()
        .with_unit(0, "AB0000")
        .with_raw_reply(2, Err(ErrorCode::ReadFailed))
        .with_unit(3, "AB0003");
    assert_eq!(scan_serial(&bus, 0, 5), Err(ErrorCode::ReadFailed));
    assert_eq!(bus.probed(), vec![0, 1, 2]);

    let garbled = FakeBus::new().with_raw_reply(1, Ok("ABS-8\r\n".to_string()));
    assert_eq!(scan_serial(&garbled, 0, 3), Err(ErrorCode::InvalidResponse));

    let dead = FakeBus::new().with_write_error(ErrorCode::SendFailed);
    assert_eq!(scan_serial(&dead, 0, 3), Err(ErrorCode::SendFailed));
}

#[test]
fn test_multicast_scan_keeps_arrival_order() {
    let group = FakeGroup::new()
        .member("192.168.1.91", "AB0091")
        .member("192.168.1.12", "AB0012");

    let found = scan_multicast(&group).unwrap();
    assert_eq!(
        found,
        vec![
            EthernetDevice {
                ip: ip("192.168.1.91"),
                serial: "AB0091".to_string()
            },
            EthernetDevice {
                ip: ip("192.168.1.12"),
                serial: "AB0012".to_string()
            },
        ]
    );
    assert_eq!(group.writes(), vec!["*IDN?\r\n"]);
}

#[test]
fn test_multicast_scan_stops_at_first_silence() {
    let group = FakeGroup::new()
        .member("10.0.0.5", "AB0005")
        .raw(Err(ErrorCode::ReadTimedOut))
        .member("10.0.0.6", "AB0006");

    let found = scan_multicast(&group).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(group.remaining(), 1, "late replies are left unread");

    let silent = FakeGroup::new();
    assert!(scan_multicast(&silent).unwrap().is_empty());
}

#[test]
fn test_multicast_scan_errors() {
    let failing = FakeGroup::new()
        .member("10.0.0.5", "AB0005")
        .raw(Err(ErrorCode::ReadFailed));
    assert_eq!(scan_multicast(&failing), Err(ErrorCode::ReadFailed));

    let garbled = FakeGroup::new().raw(Ok(AddressedLine {
        line: "hello\n".to_string(),
        source: ip("10.0.0.7"),
    }));
    assert_eq!(scan_multicast(&garbled), Err(ErrorCode::InvalidResponse));
}

#[test]
fn test_copy_bounded_truncates_found_devices() {
    let bus = FakeBus::new()
        .with_unit(1, "AB0001")
        .with_unit(2, "AB0002")
        .with_unit(3, "AB0003");
    let found = scan_serial(&bus, 1, 3).unwrap();

    let mut out = vec![
        SerialDevice {
            id: 0,
            serial: String::new()
        };
        2
    ];
    assert_eq!(copy_bounded(&found, &mut out), Err(ErrorCode::BufferTooSmall));
    assert_eq!(out[1].id, 2);
}
