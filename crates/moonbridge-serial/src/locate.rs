use std::path::Path;

use serialport::{SerialPortInfo, SerialPortType};
use tracing::{debug, info};

use crate::endpoint::SerialEndpoint;
use crate::error::{Result, SerialError};

/// USB (vendor, product) pairs of the UART bridges on supported boards:
/// Silicon Labs CP210x and WCH CH340.
pub const SUPPORTED_ADAPTERS: &[(u16, u16)] = &[(0x10C4, 0xEA60), (0x1A86, 0x7523)];

/// True when the USB ids belong to a supported UART adapter.
pub fn is_supported_adapter(vid: u16, pid: u16) -> bool {
    SUPPORTED_ADAPTERS.contains(&(vid, pid))
}

/// Resolve the one serial device the bridge should use.
///
/// An explicit path wins and is only checked for existence, never filtered.
/// Otherwise the system's ports are enumerated and narrowed to supported
/// adapters; the result must be unambiguous. The locator never guesses
/// among multiple candidates.
pub fn locate_device(explicit: Option<&str>, baud: u32) -> Result<SerialEndpoint> {
    if let Some(path) = explicit {
        if !Path::new(path).exists() {
            return Err(SerialError::NotFound {
                path: path.to_string(),
            });
        }
        info!(device = %path, "using configured serial device");
        return Ok(SerialEndpoint::with_baud(path, baud));
    }

    let ports = serialport::available_ports().map_err(SerialError::Enumerate)?;
    let name = select_port(&ports)?;
    info!(device = %name, "located serial device");
    Ok(SerialEndpoint::with_baud(name, baud))
}

/// Pick the single allow-listed port from an enumeration, or fail.
pub fn select_port(ports: &[SerialPortInfo]) -> Result<String> {
    let mut matched: Vec<&SerialPortInfo> = Vec::new();
    for port in ports {
        if let SerialPortType::UsbPort(usb) = &port.port_type {
            if is_supported_adapter(usb.vid, usb.pid) {
                let usb_id = format!("{:04x}:{:04x}", usb.vid, usb.pid);
                debug!(device = %port.port_name, %usb_id, "supported adapter");
                matched.push(port);
            }
        }
    }

    match matched.as_slice() {
        [only] => Ok(only.port_name.clone()),
        [] => Err(SerialError::NoAdapter),
        many => Err(SerialError::Ambiguous {
            candidates: many.iter().map(|p| p.port_name.clone()).collect(),
        }),
    }
}
