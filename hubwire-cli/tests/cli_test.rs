use std::time::Duration;

use clap::Parser;
use hubwire_api::models::{Caps, DeviceType};
use hubwire_cli::settings::Settings;
use hubwire_cli::{Cli, Command};

#[test]
fn test_parse_add() {
    let cli = Cli::try_parse_from([
        "hubctl",
        "--host",
        "10.0.0.2:8080",
        "add",
        "--type",
        "bulb",
        "--name",
        "hall",
        "--caps",
        "onoff,level",
    ])
    .unwrap();

    assert_eq!(cli.host.as_deref(), Some("10.0.0.2:8080"));
    match cli.command {
        Command::Add {
            device_type,
            name,
            caps,
        } => {
            assert_eq!(device_type, DeviceType::Bulb);
            assert_eq!(name, "hall");
            assert_eq!(caps, Caps::ONOFF | Caps::LEVEL);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_parse_add_rejects_unknown_type() {
    assert!(Cli::try_parse_from(["hubctl", "add", "--type", "toaster", "--name", "x"]).is_err());
    assert!(
        Cli::try_parse_from(["hubctl", "add", "--type", "plug", "--name", "x", "--caps", "laser"])
            .is_err()
    );
}

#[test]
fn test_parse_set_level_range() {
    let cli = Cli::try_parse_from(["hubctl", "set", "--id", "3", "--level", "100"]).unwrap();
    assert!(matches!(
        cli.command,
        Command::Set {
            id: 3,
            on: None,
            level: Some(100)
        }
    ));

    assert!(Cli::try_parse_from(["hubctl", "set", "--id", "3", "--level", "101"]).is_err());
    assert!(Cli::try_parse_from(["hubctl", "set", "--id", "3", "--on", "maybe"]).is_err());
}

#[test]
fn test_events_options() {
    let settings = Settings::new(None).unwrap();

    let cli = Cli::try_parse_from(["hubctl", "events", "--decode", "--duration", "0"]).unwrap();
    let Command::Events(args) = cli.command else {
        panic!("expected events");
    };
    let options = args.options("192.168.1.20", &settings);
    assert_eq!(options.url, "ws://192.168.1.20/v1/events/ws");
    assert_eq!(options.duration, None);
    assert!(options.decode);
    assert!(!options.quiet);

    let cli = Cli::try_parse_from(["hubctl", "events", "--url", "ws://hub/ws"]).unwrap();
    let Command::Events(args) = cli.command else {
        panic!("expected events");
    };
    let options = args.options("ignored", &settings);
    assert_eq!(options.url, "ws://hub/ws");
    assert_eq!(
        options.duration,
        Some(Duration::from_millis(settings.hub.duration_ms))
    );
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from(["hubctl", "list", "--host", "hub:9000"]).unwrap();
    assert_eq!(cli.host.as_deref(), Some("hub:9000"));
    assert!(matches!(cli.command, Command::List));
}
