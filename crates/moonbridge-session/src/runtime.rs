use std::sync::atomic::AtomicBool;

use moonbridge_host::client::UreqExchange;
use moonbridge_host::locate::{locate_host, HostOverrides};
use moonbridge_host::target::HostTarget;
use moonbridge_serial::endpoint::SerialEndpoint;
use moonbridge_serial::locate::locate_device;

use crate::bridge::Bridge;
use crate::error::Result;
use crate::supervisor::BridgeRuntime;

/// Production runtime: real serial ports, real HTTP, one shared agent.
pub struct StdRuntime {
    overrides: HostOverrides,
    device: Option<String>,
    baud: u32,
    client: UreqExchange,
}

impl StdRuntime {
    pub fn new(overrides: HostOverrides, device: Option<String>, baud: u32) -> Self {
        Self {
            overrides,
            device,
            baud,
            client: UreqExchange::new(),
        }
    }
}

impl BridgeRuntime for StdRuntime {
    fn locate_host(&mut self) -> Result<HostTarget> {
        Ok(locate_host(&self.client, &self.overrides)?)
    }

    fn locate_device(&mut self) -> Result<SerialEndpoint> {
        Ok(locate_device(self.device.as_deref(), self.baud)?)
    }

    fn run_session(
        &mut self,
        target: HostTarget,
        endpoint: SerialEndpoint,
        running: &AtomicBool,
    ) -> Result<()> {
        let (reader, writer) = endpoint.open_split()?;
        let mut bridge = Bridge::new(reader, writer, self.client.clone(), target);
        bridge.run(running)
    }
}
