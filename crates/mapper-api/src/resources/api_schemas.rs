// API schema endpoints

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::segment;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{
    ApiSchema, CloneRequest, ListQuery, Page, SchemaExportFormat, SchemaVersion, ValidationReport,
};

impl ApiClient {
    /// `GET /api-schemas?page=&limit=&search=`
    pub async fn list_api_schemas(&self, query: &ListQuery) -> ApiResult<Page<ApiSchema>> {
        self.get_with_query("api-schemas", query).await
    }

    /// `GET /api-schemas/{id}`
    pub async fn get_api_schema(&self, id: &str) -> ApiResult<ApiSchema> {
        self.get(&format!("api-schemas/{}", segment(id))).await
    }

    /// `POST /api-schemas`
    pub async fn create_api_schema<B>(&self, schema: &B) -> ApiResult<ApiSchema>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post("api-schemas", schema).await
    }

    /// `PUT /api-schemas/{id}`
    pub async fn update_api_schema<B>(&self, id: &str, patch: &B) -> ApiResult<ApiSchema>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(&format!("api-schemas/{}", segment(id)), patch).await
    }

    /// `DELETE /api-schemas/{id}`
    pub async fn delete_api_schema(&self, id: &str) -> ApiResult<()> {
        debug!(id, "deleting API schema");
        self.delete_unit(&format!("api-schemas/{}", segment(id)))
            .await
    }

    /// `POST /api-schemas/{id}/validate`
    pub async fn validate_api_schema(&self, id: &str) -> ApiResult<ValidationReport> {
        self.post_empty(&format!("api-schemas/{}/validate", segment(id)))
            .await
    }

    // ── Publishing ───────────────────────────────────────────────────

    /// `POST /api-schemas/{id}/publish`
    pub async fn publish_api_schema(&self, id: &str) -> ApiResult<ApiSchema> {
        debug!(id, "publishing API schema");
        self.post_empty(&format!("api-schemas/{}/publish", segment(id)))
            .await
    }

    /// `POST /api-schemas/{id}/unpublish`
    pub async fn unpublish_api_schema(&self, id: &str) -> ApiResult<ApiSchema> {
        debug!(id, "unpublishing API schema");
        self.post_empty(&format!("api-schemas/{}/unpublish", segment(id)))
            .await
    }

    /// `GET /api-schemas/{id}/versions`
    pub async fn api_schema_versions(&self, id: &str) -> ApiResult<Vec<SchemaVersion>> {
        self.get(&format!("api-schemas/{}/versions", segment(id)))
            .await
    }

    /// Generated OpenAPI document, as JSON.
    ///
    /// `GET /api-schemas/{id}/openapi`
    pub async fn api_schema_openapi(&self, id: &str) -> ApiResult<Value> {
        self.get(&format!("api-schemas/{}/openapi", segment(id)))
            .await
    }

    // ── Copy / transfer ──────────────────────────────────────────────

    /// `POST /api-schemas/{id}/clone` with `{"name": "..."}`
    pub async fn clone_api_schema(&self, id: &str, name: &str) -> ApiResult<ApiSchema> {
        self.post(
            &format!("api-schemas/{}/clone", segment(id)),
            &CloneRequest { name },
        )
        .await
    }

    /// `GET /api-schemas/{id}/export/{json|yaml|openapi}`
    pub async fn export_api_schema(&self, id: &str, format: SchemaExportFormat) -> ApiResult<Bytes> {
        self.get_bytes(&format!("api-schemas/{}/export/{format}", segment(id)))
            .await
    }

    /// `POST /api-schemas/import` (multipart upload)
    pub async fn import_api_schema<F>(&self, file: &Path, on_progress: F) -> ApiResult<ApiSchema>
    where
        F: FnMut(u8) + Send + Sync + 'static,
    {
        self.upload("api-schemas/import", file, on_progress).await
    }
}
