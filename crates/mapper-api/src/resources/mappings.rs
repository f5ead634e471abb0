// Mapping endpoints
//
// Rules and transformations are nested collections under a mapping and
// are edited individually rather than by replacing the whole mapping.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::segment;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{
    GenerateRequest, ListQuery, Mapping, MappingExportFormat, MappingRule, MappingTestRequest,
    MappingTestResult, Page, Transformation, ValidationReport,
};

impl ApiClient {
    // ── CRUD ─────────────────────────────────────────────────────────

    /// `GET /mappings?page=&limit=&search=`
    pub async fn list_mappings(&self, query: &ListQuery) -> ApiResult<Page<Mapping>> {
        self.get_with_query("mappings", query).await
    }

    /// `GET /mappings/{id}`
    pub async fn get_mapping(&self, id: &str) -> ApiResult<Mapping> {
        self.get(&format!("mappings/{}", segment(id))).await
    }

    /// `POST /mappings`
    pub async fn create_mapping<B>(&self, mapping: &B) -> ApiResult<Mapping>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post("mappings", mapping).await
    }

    /// `PUT /mappings/{id}`
    pub async fn update_mapping<B>(&self, id: &str, patch: &B) -> ApiResult<Mapping>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(&format!("mappings/{}", segment(id)), patch).await
    }

    /// `DELETE /mappings/{id}`
    pub async fn delete_mapping(&self, id: &str) -> ApiResult<()> {
        debug!(id, "deleting mapping");
        self.delete_unit(&format!("mappings/{}", segment(id))).await
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Run the mapping against sample input.
    ///
    /// `POST /mappings/{id}/test` with `{"testData": ...}`
    pub async fn test_mapping(&self, id: &str, test_data: &Value) -> ApiResult<MappingTestResult> {
        self.post(
            &format!("mappings/{}/test", segment(id)),
            &MappingTestRequest { test_data },
        )
        .await
    }

    /// `POST /mappings/{id}/validate`
    pub async fn validate_mapping(&self, id: &str) -> ApiResult<ValidationReport> {
        self.post_empty(&format!("mappings/{}/validate", segment(id)))
            .await
    }

    /// Let the backend propose a mapping between a YANG model and an API schema.
    ///
    /// `POST /mappings/generate` with `{"sourceSchemaId": ..., "targetSchemaId": ...}`
    pub async fn generate_mapping(
        &self,
        source_schema_id: &str,
        target_schema_id: &str,
    ) -> ApiResult<Mapping> {
        debug!(source_schema_id, target_schema_id, "generating mapping");
        self.post(
            "mappings/generate",
            &GenerateRequest {
                source_schema_id,
                target_schema_id,
            },
        )
        .await
    }

    // ── Rules ────────────────────────────────────────────────────────

    /// `GET /mappings/{id}/rules`
    pub async fn mapping_rules(&self, mapping_id: &str) -> ApiResult<Vec<MappingRule>> {
        self.get(&format!("mappings/{}/rules", segment(mapping_id)))
            .await
    }

    /// `POST /mappings/{id}/rules`
    pub async fn add_mapping_rule<B>(&self, mapping_id: &str, rule: &B) -> ApiResult<MappingRule>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post(&format!("mappings/{}/rules", segment(mapping_id)), rule)
            .await
    }

    /// `PUT /mappings/{id}/rules/{ruleId}`
    pub async fn update_mapping_rule<B>(
        &self,
        mapping_id: &str,
        rule_id: &str,
        patch: &B,
    ) -> ApiResult<MappingRule>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(
            &format!("mappings/{}/rules/{}", segment(mapping_id), segment(rule_id)),
            patch,
        )
        .await
    }

    /// `DELETE /mappings/{id}/rules/{ruleId}`
    pub async fn delete_mapping_rule(&self, mapping_id: &str, rule_id: &str) -> ApiResult<()> {
        self.delete_unit(&format!(
            "mappings/{}/rules/{}",
            segment(mapping_id),
            segment(rule_id)
        ))
        .await
    }

    // ── Transformations ──────────────────────────────────────────────

    /// `GET /mappings/{id}/transformations`
    pub async fn mapping_transformations(&self, mapping_id: &str) -> ApiResult<Vec<Transformation>> {
        self.get(&format!("mappings/{}/transformations", segment(mapping_id)))
            .await
    }

    /// `POST /mappings/{id}/transformations`
    pub async fn add_transformation<B>(
        &self,
        mapping_id: &str,
        transformation: &B,
    ) -> ApiResult<Transformation>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post(
            &format!("mappings/{}/transformations", segment(mapping_id)),
            transformation,
        )
        .await
    }

    /// `PUT /mappings/{id}/transformations/{transformationId}`
    pub async fn update_transformation<B>(
        &self,
        mapping_id: &str,
        transformation_id: &str,
        patch: &B,
    ) -> ApiResult<Transformation>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(
            &format!(
                "mappings/{}/transformations/{}",
                segment(mapping_id),
                segment(transformation_id)
            ),
            patch,
        )
        .await
    }

    /// `DELETE /mappings/{id}/transformations/{transformationId}`
    pub async fn delete_transformation(
        &self,
        mapping_id: &str,
        transformation_id: &str,
    ) -> ApiResult<()> {
        self.delete_unit(&format!(
            "mappings/{}/transformations/{}",
            segment(mapping_id),
            segment(transformation_id)
        ))
        .await
    }

    // ── Import / export ──────────────────────────────────────────────

    /// `GET /mappings/{id}/export/{json|yaml}`
    pub async fn export_mapping(&self, id: &str, format: MappingExportFormat) -> ApiResult<Bytes> {
        self.get_bytes(&format!("mappings/{}/export/{format}", segment(id)))
            .await
    }

    /// `POST /mappings/import` (multipart upload)
    pub async fn import_mapping<F>(&self, file: &Path, on_progress: F) -> ApiResult<Mapping>
    where
        F: FnMut(u8) + Send + Sync + 'static,
    {
        self.upload("mappings/import", file, on_progress).await
    }
}
