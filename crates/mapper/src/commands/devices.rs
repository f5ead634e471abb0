//! Device command handlers.

use tabled::Tabled;

use mapper_api::types::{
    BulkResult, ConnectionTest, Device, DeviceCredentials, DeviceProtocol, DeviceStatus,
    ImportSummary,
};
use mapper_core::{Route, Studio};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts, ProtocolArg};
use crate::error::CliError;
use crate::output;

use super::{util, yang_models};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Vendor")]
    vendor: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Protocol")]
    protocol: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl DeviceRow {
    fn new(d: &Device, color: bool) -> Self {
        Self {
            id: d.id.clone(),
            name: d.name.clone(),
            address: format!("{}:{}", d.ip_address, d.port),
            vendor: d.vendor.clone(),
            dtype: d.device_type.clone(),
            protocol: d.protocol.to_string(),
            status: output::paint(&d.connection_status.to_string(), color),
        }
    }
}

fn detail(d: &Device) -> String {
    let mut lines = vec![
        format!("ID:           {}", d.id),
        format!("Name:         {}", d.name),
        format!("Hostname:     {}", d.hostname),
        format!("Address:      {}:{}", d.ip_address, d.port),
        format!("Vendor:       {}", d.vendor),
        format!("Type:         {}", d.device_type),
        format!("Protocol:     {}", d.protocol),
        format!("Status:       {}", d.connection_status),
        format!("Login:        {}", d.credentials.username),
        format!("Active:       {}", d.is_active),
        format!("Updated:      {}", output::timestamp(&d.updated_at)),
    ];
    if !d.capabilities.is_empty() {
        lines.push(format!("Capabilities: {}", d.capabilities.len()));
    }
    if !d.yang_models.is_empty() {
        let names: Vec<&str> = d.yang_models.iter().map(|m| m.name.as_str()).collect();
        lines.push(format!("YANG models:  {}", names.join(", ")));
    }
    lines.join("\n")
}

fn test_detail(t: &ConnectionTest) -> String {
    let mut lines = vec![
        format!("Success: {}", t.success),
        format!("Message: {}", t.message),
    ];
    if let Some(ref caps) = t.capabilities {
        lines.push(format!("Capabilities: {}", caps.len()));
    }
    if let Some(ref models) = t.yang_models {
        lines.push(format!("YANG models:  {}", models.join(", ")));
    }
    lines.join("\n")
}

fn bulk_detail(r: &BulkResult) -> String {
    let mut lines = vec![format!("Succeeded: {}", r.success.len())];
    lines.extend(r.success.iter().map(|id| format!("  {id}")));
    lines.push(format!("Failed:    {}", r.failed.len()));
    lines.extend(r.failed.iter().map(|id| format!("  {id}")));
    lines.join("\n")
}

pub(super) fn import_detail(s: &ImportSummary) -> String {
    let mut lines = vec![
        format!("Imported: {}", s.imported),
        format!("Failed:   {}", s.failed),
    ];
    lines.extend(s.errors.iter().map(|e| format!("  {e}")));
    lines.join("\n")
}

fn protocol(arg: ProtocolArg) -> DeviceProtocol {
    match arg {
        ProtocolArg::Netconf => DeviceProtocol::Netconf,
        ProtocolArg::Cli => DeviceProtocol::Cli,
        ProtocolArg::Restconf => DeviceProtocol::Restconf,
    }
}

fn show_devices(devices: &[Device], global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    output::show_list(global, devices, |d| DeviceRow::new(d, color), |d| d.id.clone())
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(studio: &Studio, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    util::enter(studio, Route::Devices).await?;
    let client = studio.client();

    match args.command {
        DevicesCommand::List(list) => {
            let state = studio.fetch_devices(&util::list_query(&list)).await?;
            show_devices(&state.items, global)
        }

        DevicesCommand::Get { device } => {
            let d = client.get_device(&device).await?;
            studio.slices().devices.select(Some(d.clone()));
            output::show(global, &d, detail, |d| d.id.clone())
        }

        DevicesCommand::Create(body) => {
            let payload = util::read_json_file(&body.from_file)?;
            let d = client.create_device(&payload).await?;
            output::notice(global, &format!("Device '{}' created", d.name));
            output::show(global, &d, detail, |d| d.id.clone())
        }

        DevicesCommand::Update { device, body } => {
            let payload = util::read_json_file(&body.from_file)?;
            let d = client.update_device(&device, &payload).await?;
            output::show(global, &d, detail, |d| d.id.clone())
        }

        DevicesCommand::Delete { device } => {
            if !util::confirm(&format!("Delete device {device}?"), global.yes)? {
                return Ok(());
            }
            client.delete_device(&device).await?;
            output::notice(global, "Device deleted");
            Ok(())
        }

        DevicesCommand::Test { device } => {
            let result = client.test_device_connection(&device).await?;
            output::show(global, &result, test_detail, |t| t.success.to_string())
        }

        DevicesCommand::Connect { device } => {
            client.connect_device(&device).await?;
            output::notice(global, "Device connection initiated");
            Ok(())
        }

        DevicesCommand::Disconnect { device } => {
            client.disconnect_device(&device).await?;
            output::notice(global, "Device disconnected");
            Ok(())
        }

        DevicesCommand::Status { device } => {
            let status = client.device_status(&device).await?;
            let color = output::should_color(&global.color);
            output::show(
                global,
                &status,
                |s: &DeviceStatus| {
                    format!(
                        "Status:       {}\nLast checked: {}",
                        output::paint(&s.status.to_string(), color),
                        output::timestamp(&s.last_checked)
                    )
                },
                |s| s.status.to_string(),
            )
        }

        DevicesCommand::BulkConnect { devices } => {
            let result = client.bulk_connect_devices(&devices).await?;
            output::show(global, &result, bulk_detail, |r| r.success.join("\n"))
        }

        DevicesCommand::BulkDisconnect { devices } => {
            let result = client.bulk_disconnect_devices(&devices).await?;
            output::show(global, &result, bulk_detail, |r| r.success.join("\n"))
        }

        DevicesCommand::Capabilities { device } => {
            let caps = client.device_capabilities(&device).await?;
            output::show(global, &caps, |c| c.join("\n"), |c| c.join("\n"))
        }

        DevicesCommand::Models { device, fetch } => {
            let models = if fetch {
                client.fetch_device_yang_models(&device).await?
            } else {
                client.device_yang_models(&device).await?
            };
            yang_models::show_models(&models, global)
        }

        DevicesCommand::SetCredentials { device, username } => {
            let password = util::prompt_password("Device password: ")?;
            let credentials = DeviceCredentials {
                username,
                password: Some(password),
                ..DeviceCredentials::default()
            };
            client.update_device_credentials(&device, &credentials).await?;
            output::notice(global, "Device credentials updated");
            Ok(())
        }

        DevicesCommand::Vendor { vendor } => {
            let devices = client.devices_by_vendor(&vendor).await?;
            show_devices(&devices, global)
        }

        DevicesCommand::Protocol { protocol: arg } => {
            let devices = client.devices_by_protocol(protocol(arg)).await?;
            show_devices(&devices, global)
        }

        DevicesCommand::Connected => {
            let devices = client.connected_devices().await?;
            show_devices(&devices, global)
        }

        DevicesCommand::Export { devices, out } => {
            let ids = (!devices.is_empty()).then_some(devices.as_slice());
            let bytes = client.export_devices(ids).await?;
            output::write_download(&out, &bytes, global)
        }

        DevicesCommand::Import { file } => {
            let bar = output::upload_progress(&file, global.quiet);
            let progress = bar.clone();
            let summary = client
                .import_devices(&file, move |pct| progress.set_position(u64::from(pct)))
                .await;
            bar.finish_and_clear();
            output::show(global, &summary?, import_detail, |s| s.imported.to_string())
        }
    }
}
