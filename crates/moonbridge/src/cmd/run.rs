use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use moonbridge_host::HostOverrides;
use moonbridge_session::{supervisor, StdRuntime, ThreadPacing};

use crate::cmd::RunArgs;
use crate::exit::{CliError, CliResult, INTERNAL, SUCCESS, USAGE};

pub fn run(args: RunArgs) -> CliResult<i32> {
    let backoff = parse_duration(&args.backoff)?;
    let overrides = HostOverrides {
        scheme: args.scheme,
        host: args.host,
        port: args.port,
    };

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut runtime = StdRuntime::new(overrides, args.device, args.baud);
    supervisor::run(&mut runtime, &mut ThreadPacing, &running, backoff);

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "backoff must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid backoff value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "backoff must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported backoff unit: {unit}"),
        )),
    }
}
