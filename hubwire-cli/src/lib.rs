use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use hubwire_api::models::{Caps, CmdDeviceAdd, CmdDeviceSet, DeviceType};

use crate::client::HubClient;
use crate::events::{MonitorOptions, events_url, monitor, seed_base_url};
use crate::settings::Settings;

pub mod client;
pub mod events;
pub mod render;
pub mod settings;

#[derive(Debug, Parser)]
#[command(name = "hubctl", version, about = "Control a hub and watch its event stream")]
pub struct Cli {
    /// Settings file overriding the built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Hub address, `ip[:port]`
    #[arg(long, global = true)]
    pub host: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the hub health line
    Health,
    /// List all devices
    List,
    /// Show one device
    Get {
        #[arg(long)]
        id: u32,
    },
    /// Register a device
    Add {
        #[arg(long = "type")]
        device_type: DeviceType,
        #[arg(long)]
        name: String,
        /// Comma separated: onoff,level,power,temperature
        #[arg(long, default_value = "")]
        caps: Caps,
    },
    /// Switch a device or change its level
    Set {
        #[arg(long)]
        id: u32,
        #[arg(long)]
        on: Option<bool>,
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=100))]
        level: Option<u32>,
    },
    /// Discover a device's capabilities
    Interview {
        #[arg(long)]
        id: u32,
    },
    /// Trigger a built-in scene (1 all on, 2 all off)
    SceneTrigger {
        #[arg(long)]
        id: u32,
    },
    /// Add the demo devices
    Seed,
    /// Watch the binary event stream
    Events(EventsArgs),
}

#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Full WebSocket URL; derived from the host when omitted
    #[arg(long)]
    pub url: Option<String>,

    /// Listen time in milliseconds, 0 for until the hub closes
    #[arg(long)]
    pub duration: Option<u64>,

    /// Text frame to send after connecting
    #[arg(long)]
    pub send: Option<String>,

    /// Seed demo devices after connecting
    #[arg(long)]
    pub seed: bool,

    /// Print the first bytes of each frame in hex
    #[arg(long)]
    pub head: bool,

    /// Decode each frame and print it as JSON
    #[arg(long)]
    pub decode: bool,

    /// Only print the open and summary lines
    #[arg(long)]
    pub quiet: bool,
}

impl EventsArgs {
    pub fn options(&self, host: &str, settings: &Settings) -> MonitorOptions {
        let duration_ms = self.duration.unwrap_or(settings.hub.duration_ms);
        MonitorOptions {
            url: self
                .url
                .clone()
                .unwrap_or_else(|| events_url(host, &settings.hub.events_path)),
            duration: (duration_ms > 0).then(|| Duration::from_millis(duration_ms)),
            send: self.send.clone(),
            head: self.head,
            decode: self.decode,
            quiet: self.quiet,
        }
    }
}

pub async fn run<W: Write>(cli: Cli, settings: &Settings, out: &mut W) -> Result<()> {
    let host = cli.host.as_deref().unwrap_or(&settings.hub.host);
    let client = HubClient::new(host, settings.hub.timeout())?;

    match cli.command {
        Command::Health => {
            write!(out, "{}", client.health().await?)?;
        }
        Command::List => {
            writeln!(out, "{}", render::pretty(&client.list().await?)?)?;
        }
        Command::Get { id } => {
            writeln!(out, "{}", render::pretty(&client.get(id).await?)?)?;
        }
        Command::Add {
            device_type,
            name,
            caps,
        } => {
            let device = client
                .add(&CmdDeviceAdd::new(device_type, caps, name))
                .await?;
            writeln!(out, "{}", render::pretty(&device)?)?;
        }
        Command::Set { id, on, level } => {
            let mut cmd = CmdDeviceSet::new(id);
            if let Some(on) = on {
                cmd = cmd.with_on(on);
            }
            if let Some(level) = level {
                cmd = cmd.with_level(level);
            }
            if on.is_none() && level.is_none() {
                bail!("set needs --on and/or --level");
            }
            writeln!(out, "{}", render::pretty(&client.set(id, &cmd).await?)?)?;
        }
        Command::Interview { id } => {
            writeln!(out, "{}", render::pretty(&client.interview(id).await?)?)?;
        }
        Command::SceneTrigger { id } => {
            writeln!(out, "{}", render::pretty(&client.trigger_scene(id).await?)?)?;
        }
        Command::Seed => {
            write!(out, "{}", client.seed().await?)?;
        }
        Command::Events(args) => {
            let options = args.options(host, settings);
            let seed_with = if args.seed {
                let base = seed_base_url(&options.url, &settings.hub.events_path);
                Some(HubClient::new(&base, settings.hub.timeout())?)
            } else {
                None
            };
            monitor(&options, seed_with.as_ref(), out).await?;
        }
    }

    Ok(())
}
