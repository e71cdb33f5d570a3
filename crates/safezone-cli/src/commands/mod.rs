pub mod completions;
pub mod config;
pub mod contact;
pub mod listen;
pub mod trigger;

use std::sync::Arc;

use clap::Args;
use safezone_core::platform::{CallEscalator, FixedLocation, LogNotifier, SystemDialer};
use safezone_core::{
    Collaborators, Config, Coordinate, CoreError, EmergencyController, Event, LocationError, Notifier,
    SqliteContactStore,
};

use crate::console::{ConsoleAlertChannel, ConsoleDialer, ConsoleNotifier};

pub type CliResult<T = ()> = Result<T, CoreError>;

/// Position and dialing options shared by `trigger` and `listen`.
#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// Latitude to report in the alert
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,
    /// Longitude to report in the alert
    #[arg(long, allow_negative_numbers = true)]
    pub lon: f64,
    /// Print the call instead of opening the dialer
    #[arg(long)]
    pub dry_run: bool,
    /// Send notices to the log instead of stderr
    #[arg(long)]
    pub quiet: bool,
}

impl HostArgs {
    fn coordinate(&self) -> Result<Coordinate, LocationError> {
        if !(-90.0..=90.0).contains(&self.lat) || !(-180.0..=180.0).contains(&self.lon) {
            return Err(LocationError::Unavailable(format!(
                "invalid coordinate: {}, {}",
                self.lat, self.lon
            )));
        }
        Ok(Coordinate::new(self.lat, self.lon))
    }
}

pub fn runtime() -> std::io::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
}

/// Controller wired to the on-disk contact store and console stand-ins.
pub fn build_controller(
    config: Config,
    host: Option<&HostArgs>,
) -> CliResult<EmergencyController> {
    let coordinate = match host {
        Some(args) => args.coordinate()?,
        None => Coordinate::new(0.0, 0.0),
    };
    let dialer: Arc<dyn CallEscalator> = match host {
        Some(args) if !args.dry_run => Arc::new(SystemDialer),
        _ => Arc::new(ConsoleDialer),
    };
    let notifier: Arc<dyn Notifier> = match host {
        Some(args) if args.quiet => Arc::new(LogNotifier),
        _ => Arc::new(ConsoleNotifier),
    };
    let services = Collaborators {
        location: Arc::new(FixedLocation::new(coordinate)),
        alerts: Arc::new(ConsoleAlertChannel),
        dialer,
        contacts: Arc::new(SqliteContactStore::open()?),
        notifier,
    };
    Ok(EmergencyController::new(config, services))
}

pub fn print_event(event: &Event) -> CliResult {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
