use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use moonbridge_serial::is_supported_adapter;
use serde::Serialize;
use serialport::{SerialPortInfo, SerialPortType};

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Debug, Serialize)]
struct PortRow {
    device: String,
    kind: &'static str,
    usb_id: Option<String>,
    product: Option<String>,
    supported: bool,
}

#[derive(Serialize)]
struct PortListOutput<'a> {
    schema_id: &'a str,
    ports: &'a [PortRow],
}

pub fn print_ports(ports: &[SerialPortInfo], format: OutputFormat) {
    let rows: Vec<PortRow> = ports.iter().map(port_row).collect();

    match format {
        OutputFormat::Json => {
            let out = PortListOutput {
                schema_id: "https://schemas.3leaps.dev/moonbridge/cli/v1/port-list.schema.json",
                ports: &rows,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["DEVICE", "TYPE", "USB ID", "PRODUCT", "SUPPORTED"]);
            for row in &rows {
                table.add_row(vec![
                    row.device.clone(),
                    row.kind.to_string(),
                    row.usb_id.clone().unwrap_or_default(),
                    row.product.clone().unwrap_or_default(),
                    if row.supported { "yes" } else { "" }.to_string(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!(
                    "{} type={} usb_id={} product={} supported={}",
                    row.device,
                    row.kind,
                    row.usb_id.as_deref().unwrap_or("-"),
                    row.product.as_deref().unwrap_or("-"),
                    if row.supported { "yes" } else { "no" }
                );
            }
        }
        OutputFormat::Raw => {
            for row in &rows {
                println!("{}", row.device);
            }
        }
    }
}

fn port_row(info: &SerialPortInfo) -> PortRow {
    match &info.port_type {
        SerialPortType::UsbPort(usb) => PortRow {
            device: info.port_name.clone(),
            kind: "usb",
            usb_id: Some(format!("{:04x}:{:04x}", usb.vid, usb.pid)),
            product: usb.product.clone(),
            supported: is_supported_adapter(usb.vid, usb.pid),
        },
        SerialPortType::PciPort => PortRow {
            device: info.port_name.clone(),
            kind: "pci",
            usb_id: None,
            product: None,
            supported: false,
        },
        SerialPortType::BluetoothPort => PortRow {
            device: info.port_name.clone(),
            kind: "bluetooth",
            usb_id: None,
            product: None,
            supported: false,
        },
        SerialPortType::Unknown => PortRow {
            device: info.port_name.clone(),
            kind: "unknown",
            usb_id: None,
            product: None,
            supported: false,
        },
    }
}
