//! ups-control
//!
//! Command-line control of a Megatec-style USB UPS.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use common::setup_logging;
use control::Ups;
use control::config::{self, ControlConfig};
use control::usb::{self, UsbSession};
use protocol::{Operation, Reply, UpsRating, UpsStatus};
use serde_json::json;
use tracing::{debug, info};

#[derive(Parser, Debug)]
#[command(name = "ups-control")]
#[command(author, version, about = "Control a USB-attached UPS")]
#[command(long_about = "
Query and control a UPS that speaks the Megatec string-descriptor protocol
over USB.

EXAMPLES:
    # Show the UPS model
    ups-control name

    # Show settled status readings
    ups-control status

    # Run a 5 minute self-test on a specific device
    ups-control --device 0665:5161 test-minutes 5

    # List USB devices
    ups-control --list-devices

CONFIGURATION:
    The configuration is looked up in the following order:
    1. Path specified with --config
    2. ~/.config/ups-control/config.toml
    3. /etc/ups-control/config.toml
    4. Built-in defaults
")]
struct Args {
    /// Path to configuration file
    #[arg(short, long, value_name = "PATH")]
    config: Option<std::path::PathBuf>,

    /// Save default configuration to default location and exit
    #[arg(long)]
    save_config: bool,

    /// List USB devices and exit
    #[arg(long)]
    list_devices: bool,

    /// UPS to open, overriding the configuration (VID:PID, hex)
    #[arg(short, long, value_name = "VID:PID")]
    device: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// Show the UPS model name
    Name,
    /// Show status readings
    Status {
        /// Single request, without waiting for the reading to settle
        #[arg(long)]
        no_ack: bool,
        /// Print the decoded reply instead of parsed readings
        #[arg(long)]
        raw: bool,
    },
    /// Show the nominal rating
    Rating {
        /// Print the decoded reply instead of parsed values
        #[arg(long)]
        raw: bool,
    },
    /// Run the 10 second self-test
    Test,
    /// Run a self-test until the battery is low
    TestUntilLow,
    /// Run a self-test for 1-99 minutes
    TestMinutes {
        #[arg(value_name = "MINUTES")]
        minutes: u32,
    },
    /// Toggle the beeper
    Beep,
    /// Schedule a UPS shutdown
    Shutdown,
    /// Abort a running self-test
    AbortTest,
}

impl Command {
    fn operation(self) -> Operation {
        match self {
            Command::Name => Operation::Name,
            Command::Status { no_ack: false, .. } => Operation::Status,
            Command::Status { no_ack: true, .. } => Operation::StatusNoAck,
            Command::Rating { .. } => Operation::Rating,
            Command::Test => Operation::Test,
            Command::TestUntilLow => Operation::TestUntilBatteryLow,
            Command::TestMinutes { minutes } => Operation::TestForMinutes(minutes),
            Command::Beep => Operation::ToggleBeep,
            Command::Shutdown => Operation::Shutdown,
            Command::AbortTest => Operation::AbortTest,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.save_config {
        let config = ControlConfig::default();
        let path = ControlConfig::default_path();
        config.save(&path).context("Failed to save configuration")?;
        println!("Configuration saved to: {}", path.display());
        return Ok(());
    }

    let config = if let Some(ref path) = args.config {
        ControlConfig::load(Some(path.clone())).context("Failed to load configuration")?
    } else {
        ControlConfig::load_or_default()
    };

    let log_level = args.log_level.as_deref().unwrap_or(&config.logging.level);
    setup_logging(log_level).context("Failed to setup logging")?;
    debug!("ups-control v{}", env!("CARGO_PKG_VERSION"));

    let (vendor_id, product_id) = match args.device.as_deref() {
        Some(device) => config::parse_device_id(device)?,
        None => (config.vendor_id()?, config.product_id()?),
    };

    if args.list_devices {
        return list_devices_mode(vendor_id, product_id, args.json);
    }

    let Some(command) = args.command else {
        Args::command().print_help()?;
        return Ok(());
    };

    let session = UsbSession::open(vendor_id, product_id)
        .with_context(|| format!("Failed to open UPS {:04x}:{:04x}", vendor_id, product_id))?
        .with_timeout(config.timeout());
    let mut ups = Ups::new(session);

    let result = run_command(&mut ups, command, args.json);

    info!("Closing UPS {:04x}:{:04x}", vendor_id, product_id);
    ups.close();

    result
}

/// Execute one command and print its result
fn run_command(ups: &mut Ups<UsbSession>, command: Command, as_json: bool) -> Result<()> {
    let operation = command.operation();
    let reply = ups
        .execute(operation)
        .with_context(|| format!("Failed to {}", operation))?;

    let parse = match command {
        Command::Status { raw: false, .. } => Parsed::Status,
        Command::Rating { raw: false } => Parsed::Rating,
        _ => Parsed::Raw,
    };

    match (parse, &reply) {
        (Parsed::Status, Reply::Text(text)) => {
            let status: UpsStatus = text.parse().context("Unexpected status format")?;
            print_status(&status, as_json)?;
        }
        (Parsed::Rating, Reply::Text(text)) => {
            let rating: UpsRating = text.parse().context("Unexpected rating format")?;
            print_rating(&rating, as_json)?;
        }
        _ => print_reply(operation, &reply, as_json)?,
    }

    Ok(())
}

#[derive(Clone, Copy)]
enum Parsed {
    Raw,
    Status,
    Rating,
}

fn print_reply(operation: Operation, reply: &Reply, as_json: bool) -> Result<()> {
    if as_json {
        let value = json!({
            "operation": operation.to_string(),
            "acknowledged": reply.is_acknowledged(),
            "text": reply.text(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", reply);
    }
    Ok(())
}

fn print_status(status: &UpsStatus, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(status)?);
        return Ok(());
    }

    println!("Input Voltage:       {:.1} V", status.input_voltage);
    println!("Input Fault Voltage: {:.1} V", status.input_fault_voltage);
    println!("Output Voltage:      {:.1} V", status.output_voltage);
    println!("Output Current:      {:.0}%", status.output_current_percent);
    println!("Input Frequency:     {:.1} Hz", status.input_frequency);
    println!("Battery Voltage:     {:.2} V", status.battery_voltage);
    println!("Temperature:         {:.1} °C", status.temperature);

    if let Some(flags) = status.flags {
        let set: Vec<&str> = [
            (flags.utility_fail, "utility fail"),
            (flags.battery_low, "battery low"),
            (flags.bypass_active, "bypass/boost active"),
            (flags.ups_failed, "UPS failed"),
            (flags.standby, "standby"),
            (flags.test_in_progress, "test in progress"),
            (flags.shutdown_active, "shutdown active"),
            (flags.beeper_on, "beeper on"),
        ]
        .into_iter()
        .filter_map(|(on, label)| on.then_some(label))
        .collect();

        if set.is_empty() {
            println!("Flags:               none");
        } else {
            println!("Flags:               {}", set.join(", "));
        }
    }

    Ok(())
}

fn print_rating(rating: &UpsRating, as_json: bool) -> Result<()> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(rating)?);
        return Ok(());
    }

    println!("Rated Voltage:   {:.1} V", rating.voltage);
    println!("Rated Current:   {:.0} A", rating.current);
    println!("Battery Voltage: {:.2} V", rating.battery_voltage);
    println!("Frequency:       {:.1} Hz", rating.frequency);
    Ok(())
}

/// List USB devices and exit, marking the configured UPS
fn list_devices_mode(vendor_id: u16, product_id: u16, as_json: bool) -> Result<()> {
    info!("Listing USB devices...");
    let devices = usb::list_devices().context("Failed to enumerate USB devices")?;

    if as_json {
        let entries: Vec<_> = devices
            .iter()
            .map(|device| {
                json!({
                    "device": device,
                    "selected": device.matches(vendor_id, product_id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if devices.is_empty() {
        println!("No USB devices found.");
    } else {
        println!("Found {} USB device(s):\n", devices.len());
        for device in devices {
            let marker = if device.matches(vendor_id, product_id) {
                "  (selected)"
            } else {
                ""
            };
            println!("  {}{}", device, marker);
        }
    }

    Ok(())
}
