use anyhow::Result;
use clap::{Parser, ValueEnum};
use jsens::config::{PreferencesStore, CONFIG_FILE_NAME};
use jsens::core::{AppContext, UpdateManager};
use jsens::platform::platform_capabilities;
use jsens::sources::{NetworkCounters, NetworkSource, SysinfoCounters};
use jsens::types::{CalendarSample, CalendarSourceConfig, ThroughputSample};
use log::{info, warn};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// Start-at-login switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Toggle {
    On,
    Off,
}

/// jsens - Jalali date and network throughput overlay
#[derive(Parser, Debug)]
#[command(name = "jsens")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Preferences file (defaults to the platform config directory)
    #[arg(short = 'c', long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Network interface to monitor (saved to preferences)
    #[arg(short = 'i', long = "interface", value_name = "NAME")]
    interface: Option<String>,

    /// Network polling interval in milliseconds (saved to preferences)
    #[arg(long = "interval", value_name = "MS")]
    interval: Option<u64>,

    /// IANA time zone for the calendar instead of the local zone
    #[arg(long = "timezone", value_name = "TZ")]
    timezone: Option<String>,

    /// List network interfaces and exit
    #[arg(short = 'l', long = "list-interfaces")]
    list_interfaces: bool,

    /// Print one reading and exit
    #[arg(long = "once")]
    once: bool,

    /// With --once, print the reading as JSON
    #[arg(long = "json", requires = "once")]
    json: bool,

    /// Register or remove start at login, then exit
    #[arg(long = "autostart", value_name = "STATE")]
    autostart: Option<Toggle>,

    /// Debug verbosity level (0=quiet, 1=info, 2=debug, 3=trace)
    #[arg(short = 'd', long = "debug", value_name = "LEVEL", default_value = "0")]
    debug: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // Allow RUST_LOG to override CLI setting
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    info!("Starting jsens v{}", env!("CARGO_PKG_VERSION"));

    if cli.list_interfaces {
        list_interfaces();
        return Ok(());
    }

    let store = match cli.config.clone() {
        Some(path) => PreferencesStore::new(path),
        None => PreferencesStore::at_default_location().unwrap_or_else(|e| {
            warn!("{:#}, using {} in the working directory", e, CONFIG_FILE_NAME);
            PreferencesStore::new(CONFIG_FILE_NAME)
        }),
    };

    let mut ctx = AppContext::new(
        store,
        NetworkSource::with_system_counters(),
        platform_capabilities(),
    );

    if let Some(state) = cli.autostart {
        ctx.set_startup_registration(state == Toggle::On)?;
        println!(
            "Start at login: {}",
            if ctx.is_startup_registered() { "on" } else { "off" }
        );
        return Ok(());
    }

    if let Some(timezone) = cli.timezone {
        ctx.calendar_mut().set_config(CalendarSourceConfig {
            timezone: Some(timezone),
            ..CalendarSourceConfig::default()
        });
    }
    if let Some(interface) = cli.interface {
        ctx.set_interface(Some(interface));
    }
    if let Some(interval) = cli.interval {
        ctx.set_polling_interval(interval);
    }

    if let Err(e) = ctx.keep_on_top() {
        warn!("Could not keep the overlay on top: {:#}", e);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    if cli.once {
        runtime.block_on(print_once(&mut ctx, cli.json))?;
    } else {
        runtime.block_on(run_overlay(&mut ctx));
    }

    ctx.shutdown();
    Ok(())
}

/// Print the interface table used by `--list-interfaces`
fn list_interfaces() {
    let mut counters = SysinfoCounters::new();
    let interfaces = match counters.interfaces() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            eprintln!("{}", e);
            return;
        }
    };
    let default = jsens::sources::select_default_interface(&interfaces);

    println!("Network interfaces ({}):", interfaces.len());
    for interface in &interfaces {
        let mut flags = vec![if interface.is_up { "up" } else { "down" }];
        if interface.is_loopback {
            flags.push("loopback");
        }
        if interface.is_virtual {
            flags.push("virtual");
        }
        let marker = if default.as_deref() == Some(interface.name.as_str()) {
            "*"
        } else {
            " "
        };
        println!("{} {:<24} {}", marker, interface.name, flags.join(", "));
    }
}

fn print_lines(lines: &[String]) {
    for line in lines {
        println!("{}", line);
    }
    println!();
}

/// Machine-readable form of one overlay reading
#[derive(Debug, Serialize)]
struct Reading<'a> {
    calendar: Option<&'a CalendarSample>,
    interface: Option<&'a str>,
    network: ThroughputSample,
}

/// Take a baseline, wait one interval, and print a single reading
async fn print_once(ctx: &mut AppContext, json: bool) -> Result<()> {
    let mut manager = UpdateManager::new();
    let interval = Duration::from_millis(ctx.preferences().update_interval_ms);
    manager
        .run(ctx, |_| {}, tokio::time::sleep(interval + Duration::from_millis(50)))
        .await;

    if json {
        let reading = Reading {
            calendar: ctx.calendar().last_sample(),
            interface: ctx.network().get_config().interface.as_deref(),
            network: ctx.network().last_sample(),
        };
        println!("{}", serde_json::to_string_pretty(&reading)?);
    } else {
        print_lines(&ctx.overlay_lines());
    }
    Ok(())
}

/// Redraw the overlay text whenever it changes, until Ctrl-C
async fn run_overlay(ctx: &mut AppContext) {
    let mut manager = UpdateManager::new();
    let mut last_lines: Vec<String> = Vec::new();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    manager
        .run(
            ctx,
            |ctx| {
                let lines = ctx.overlay_lines();
                if lines != last_lines {
                    print_lines(&lines);
                    last_lines = lines;
                }
            },
            shutdown,
        )
        .await;
}
