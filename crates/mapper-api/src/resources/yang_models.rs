// YANG model endpoints
//
// Parsing, validation, comparison and documentation all run on the backend.
// Tree and JSON-schema views are returned as raw JSON since their shape is
// generated per model.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::segment;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{
    CompareRequest, DocumentationFormat, ListQuery, ModelComparison, ModelHistory, Page,
    ParseReport, ParseRequest, YangExportFormat, YangImportReport, YangModel, YangSearch,
};

impl ApiClient {
    // ── CRUD ─────────────────────────────────────────────────────────

    /// `GET /yang-models?page=&limit=&search=`
    pub async fn list_yang_models(&self, query: &ListQuery) -> ApiResult<Page<YangModel>> {
        self.get_with_query("yang-models", query).await
    }

    /// `GET /yang-models/{id}`
    pub async fn get_yang_model(&self, id: &str) -> ApiResult<YangModel> {
        self.get(&format!("yang-models/{}", segment(id))).await
    }

    /// `POST /yang-models`
    pub async fn create_yang_model<B>(&self, model: &B) -> ApiResult<YangModel>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post("yang-models", model).await
    }

    /// `PUT /yang-models/{id}`
    pub async fn update_yang_model<B>(&self, id: &str, patch: &B) -> ApiResult<YangModel>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(&format!("yang-models/{}", segment(id)), patch).await
    }

    /// `DELETE /yang-models/{id}`
    pub async fn delete_yang_model(&self, id: &str) -> ApiResult<()> {
        debug!(id, "deleting YANG model");
        self.delete_unit(&format!("yang-models/{}", segment(id)))
            .await
    }

    // ── Upload and analysis ──────────────────────────────────────────

    /// Upload a single `.yang` file.
    ///
    /// `POST /yang-models/upload` (multipart field `file`)
    pub async fn upload_yang_model<F>(&self, file: &Path, on_progress: F) -> ApiResult<YangModel>
    where
        F: FnMut(u8) + Send + Sync + 'static,
    {
        self.upload("yang-models/upload", file, on_progress).await
    }

    /// Import several files at once; per-file failures come back in the report.
    ///
    /// `POST /yang-models/import` (multipart fields `files[0]`, `files[1]`, ...)
    pub async fn import_yang_models(&self, files: &[PathBuf]) -> ApiResult<YangImportReport> {
        debug!(count = files.len(), "importing YANG models");
        self.upload_files("yang-models/import", files).await
    }

    /// Parse raw YANG text without storing it.
    ///
    /// `POST /yang-models/parse` with `{"content": "..."}`
    pub async fn parse_yang(&self, content: &str) -> ApiResult<ParseReport> {
        self.post("yang-models/parse", &ParseRequest { content })
            .await
    }

    /// `POST /yang-models/{id}/validate`
    pub async fn validate_yang_model(&self, id: &str) -> ApiResult<ParseReport> {
        self.post_empty(&format!("yang-models/{}/validate", segment(id)))
            .await
    }

    /// `POST /yang-models/compare` with `{"model1": ..., "model2": ...}`
    pub async fn compare_yang_models(&self, model1: &str, model2: &str) -> ApiResult<ModelComparison> {
        self.post("yang-models/compare", &CompareRequest { model1, model2 })
            .await
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// `GET /yang-models/{id}/dependencies`
    pub async fn yang_model_dependencies(&self, id: &str) -> ApiResult<Vec<YangModel>> {
        self.get(&format!("yang-models/{}/dependencies", segment(id)))
            .await
    }

    /// Namespaces are URIs, so the segment is always percent-encoded.
    ///
    /// `GET /yang-models/namespace/{namespace}`
    pub async fn yang_models_by_namespace(&self, namespace: &str) -> ApiResult<Vec<YangModel>> {
        self.get(&format!("yang-models/namespace/{}", segment(namespace)))
            .await
    }

    /// `GET /yang-models/device/{deviceId}`
    pub async fn yang_models_by_device(&self, device_id: &str) -> ApiResult<Vec<YangModel>> {
        self.get(&format!("yang-models/device/{}", segment(device_id)))
            .await
    }

    /// `GET /yang-models/search?query=&namespace=&vendor=&version=&deviceId=`
    pub async fn search_yang_models(&self, search: &YangSearch) -> ApiResult<Vec<YangModel>> {
        self.get_with_query("yang-models/search", search).await
    }

    /// `GET /yang-models/{id}/tree`
    pub async fn yang_model_tree(&self, id: &str) -> ApiResult<Value> {
        self.get(&format!("yang-models/{}/tree", segment(id))).await
    }

    /// `GET /yang-models/{id}/schema`
    pub async fn yang_model_schema(&self, id: &str) -> ApiResult<Value> {
        self.get(&format!("yang-models/{}/schema", segment(id)))
            .await
    }

    /// `GET /yang-models/{id}/history`
    pub async fn yang_model_history(&self, id: &str) -> ApiResult<ModelHistory> {
        self.get(&format!("yang-models/{}/history", segment(id)))
            .await
    }

    // ── Downloads ────────────────────────────────────────────────────

    /// `GET /yang-models/{id}/documentation/{html|pdf|markdown}`
    pub async fn yang_model_documentation(
        &self,
        id: &str,
        format: DocumentationFormat,
    ) -> ApiResult<Bytes> {
        self.get_bytes(&format!(
            "yang-models/{}/documentation/{format}",
            segment(id)
        ))
        .await
    }

    /// `GET /yang-models/{id}/export/{yang|json|xml}`
    pub async fn export_yang_model(&self, id: &str, format: YangExportFormat) -> ApiResult<Bytes> {
        self.get_bytes(&format!("yang-models/{}/export/{format}", segment(id)))
            .await
    }
}
