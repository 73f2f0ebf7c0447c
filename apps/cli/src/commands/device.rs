use std::io::Write;

use remass_common::RemassResult;
use remass_remote::{device, RemoteSession};

use crate::cli::DeviceCommand;

pub fn run<S, W>(cmd: DeviceCommand, session: &S, dry_run: bool, out: &mut W) -> RemassResult<()>
where
    S: RemoteSession + ?Sized,
    W: Write,
{
    let action = match &cmd {
        DeviceCommand::Info => None,
        DeviceCommand::RestartUi => Some("restart the UI".to_string()),
        DeviceCommand::Reboot => Some("reboot".to_string()),
        DeviceCommand::Hostname { name } => Some(format!("set hostname to '{}'", name)),
        DeviceCommand::Timezone { timezone } => Some(format!("set timezone to '{}'", timezone)),
    };
    if let (true, Some(action)) = (dry_run, &action) {
        writeln!(out, "would {}", action)?;
        return Ok(());
    }

    match cmd {
        DeviceCommand::Info => {
            let info = device::device_info(session)?;
            writeln!(out, "Model:       {}", info.model)?;
            writeln!(out, "Firmware:    {}", info.firmware)?;
            writeln!(out, "Hostname:    {}", info.hostname)?;
            writeln!(out, "Free space:  {}", info.free_space)?;
            writeln!(out, "Uptime:      {}", info.uptime)?;
            writeln!(
                out,
                "Battery:     {}% ({}, {:.1}°C)",
                info.battery.capacity_percent, info.battery.health, info.battery.temperature_celsius
            )?;
        }
        DeviceCommand::RestartUi => device::restart_ui(session)?,
        DeviceCommand::Reboot => device::reboot(session)?,
        DeviceCommand::Hostname { name } => device::set_hostname(session, &name)?,
        DeviceCommand::Timezone { timezone } => device::set_timezone(session, &timezone)?,
    }
    Ok(())
}
