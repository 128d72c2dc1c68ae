use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod doctor;
pub mod list_ports;
pub mod probe;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the bridge: discover both sides, then relay until interrupted.
    Run(RunArgs),
    /// List serial devices and mark supported UART adapters.
    ListPorts(ListPortsArgs),
    /// Probe printer host candidates and report which one answers.
    Probe(ProbeArgs),
    /// Run local environment health checks.
    Doctor(DoctorArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args),
        Command::ListPorts(args) => list_ports::run(args, format),
        Command::Probe(args) => probe::run(args, format),
        Command::Doctor(args) => doctor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// URL scheme for the printer host.
    #[arg(long, value_name = "SCHEME", env = "KLIPPER_PROTOCOL")]
    pub scheme: Option<String>,
    /// Printer host name.
    #[arg(long, env = "KLIPPER_HOST")]
    pub host: Option<String>,
    /// Explicit printer port, probed before the well-known ones.
    #[arg(long, env = "KLIPPER_PORT")]
    pub port: Option<u16>,
    /// Explicit serial device path; skips adapter discovery.
    #[arg(long, value_name = "PATH", env = "ESP32_SERIAL")]
    pub device: Option<String>,
    /// Serial baud rate.
    #[arg(long, default_value_t = moonbridge_serial::DEFAULT_BAUD)]
    pub baud: u32,
    /// Delay between reconnect attempts (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub backoff: String,
}

#[derive(Args, Debug, Default)]
pub struct ListPortsArgs {}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// URL scheme for the printer host.
    #[arg(long, value_name = "SCHEME", env = "KLIPPER_PROTOCOL")]
    pub scheme: Option<String>,
    /// Printer host name.
    #[arg(long, env = "KLIPPER_HOST")]
    pub host: Option<String>,
    /// Explicit printer port, probed before the well-known ones.
    #[arg(long, env = "KLIPPER_PORT")]
    pub port: Option<u16>,
}

#[derive(Args, Debug, Default)]
pub struct DoctorArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
