// Device inventory endpoints

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::segment;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{
    BulkResult, ConnectionTest, Device, DeviceCredentials, DeviceIds, DeviceProtocol,
    DeviceStatus, ImportSummary, ListQuery, Page, YangModel,
};

impl ApiClient {
    // ── CRUD ─────────────────────────────────────────────────────────

    /// `GET /devices?page=&limit=&search=`
    pub async fn list_devices(&self, query: &ListQuery) -> ApiResult<Page<Device>> {
        self.get_with_query("devices", query).await
    }

    /// `GET /devices/{id}`
    pub async fn get_device(&self, id: &str) -> ApiResult<Device> {
        self.get(&format!("devices/{}", segment(id))).await
    }

    /// `POST /devices`
    pub async fn create_device<B>(&self, device: &B) -> ApiResult<Device>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post("devices", device).await
    }

    /// Update with a partial body; unspecified fields are left alone server-side.
    ///
    /// `PUT /devices/{id}`
    pub async fn update_device<B>(&self, id: &str, patch: &B) -> ApiResult<Device>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(&format!("devices/{}", segment(id)), patch).await
    }

    /// `DELETE /devices/{id}`
    pub async fn delete_device(&self, id: &str) -> ApiResult<()> {
        debug!(id, "deleting device");
        self.delete_unit(&format!("devices/{}", segment(id))).await
    }

    // ── Connectivity ─────────────────────────────────────────────────

    /// `POST /devices/{id}/test-connection`
    pub async fn test_device_connection(&self, id: &str) -> ApiResult<ConnectionTest> {
        self.post_empty(&format!("devices/{}/test-connection", segment(id)))
            .await
    }

    /// `POST /devices/{id}/connect`
    pub async fn connect_device(&self, id: &str) -> ApiResult<()> {
        self.post_unit::<()>(&format!("devices/{}/connect", segment(id)), None)
            .await
    }

    /// `POST /devices/{id}/disconnect`
    pub async fn disconnect_device(&self, id: &str) -> ApiResult<()> {
        self.post_unit::<()>(&format!("devices/{}/disconnect", segment(id)), None)
            .await
    }

    /// `GET /devices/{id}/status`
    pub async fn device_status(&self, id: &str) -> ApiResult<DeviceStatus> {
        self.get(&format!("devices/{}/status", segment(id))).await
    }

    /// `POST /devices/bulk-connect` with `{"deviceIds": [...]}`
    pub async fn bulk_connect_devices(&self, device_ids: &[String]) -> ApiResult<BulkResult> {
        debug!(count = device_ids.len(), "bulk connect");
        self.post("devices/bulk-connect", &DeviceIds { device_ids })
            .await
    }

    /// `POST /devices/bulk-disconnect` with `{"deviceIds": [...]}`
    pub async fn bulk_disconnect_devices(&self, device_ids: &[String]) -> ApiResult<BulkResult> {
        debug!(count = device_ids.len(), "bulk disconnect");
        self.post("devices/bulk-disconnect", &DeviceIds { device_ids })
            .await
    }

    // ── Capabilities and models ──────────────────────────────────────

    /// `GET /devices/{id}/capabilities`
    pub async fn device_capabilities(&self, id: &str) -> ApiResult<Vec<String>> {
        self.get(&format!("devices/{}/capabilities", segment(id)))
            .await
    }

    /// `GET /devices/{id}/yang-models`
    pub async fn device_yang_models(&self, id: &str) -> ApiResult<Vec<YangModel>> {
        self.get(&format!("devices/{}/yang-models", segment(id)))
            .await
    }

    /// Ask the backend to pull the device's advertised YANG models.
    ///
    /// `POST /devices/{id}/fetch-yang-models`
    pub async fn fetch_device_yang_models(&self, id: &str) -> ApiResult<Vec<YangModel>> {
        self.post_empty(&format!("devices/{}/fetch-yang-models", segment(id)))
            .await
    }

    /// `PUT /devices/{id}/credentials`
    pub async fn update_device_credentials(
        &self,
        id: &str,
        credentials: &DeviceCredentials,
    ) -> ApiResult<()> {
        self.put_unit(
            &format!("devices/{}/credentials", segment(id)),
            Some(credentials),
        )
        .await
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// `GET /devices/vendor/{vendor}`
    pub async fn devices_by_vendor(&self, vendor: &str) -> ApiResult<Vec<Device>> {
        self.get(&format!("devices/vendor/{}", segment(vendor))).await
    }

    /// `GET /devices/protocol/{protocol}`
    pub async fn devices_by_protocol(&self, protocol: DeviceProtocol) -> ApiResult<Vec<Device>> {
        self.get(&format!("devices/protocol/{protocol}")).await
    }

    /// `GET /devices/connected`
    pub async fn connected_devices(&self) -> ApiResult<Vec<Device>> {
        self.get("devices/connected").await
    }

    // ── Import / export ──────────────────────────────────────────────

    /// Export device configurations. `None` exports everything.
    ///
    /// `POST /devices/export`, raw bytes back.
    pub async fn export_devices(&self, device_ids: Option<&[String]>) -> ApiResult<Bytes> {
        let body = match device_ids {
            Some(ids) => json!({ "deviceIds": ids }),
            None => json!({}),
        };
        self.post_bytes("devices/export", &body).await
    }

    /// `POST /devices/import` (multipart upload)
    pub async fn import_devices<F>(&self, file: &Path, on_progress: F) -> ApiResult<ImportSummary>
    where
        F: FnMut(u8) + Send + Sync + 'static,
    {
        debug!(file = %file.display(), "importing devices");
        self.upload("devices/import", file, on_progress).await
    }
}
