use moonbridge_serial::SerialError;

use crate::cmd::ListPortsArgs;
use crate::exit::{serial_error, CliResult, SUCCESS};
use crate::output::{print_ports, OutputFormat};

pub fn run(_args: ListPortsArgs, format: OutputFormat) -> CliResult<i32> {
    let ports = serialport::available_ports()
        .map_err(|err| serial_error("listing ports", SerialError::Enumerate(err)))?;

    print_ports(&ports, format);
    Ok(SUCCESS)
}
