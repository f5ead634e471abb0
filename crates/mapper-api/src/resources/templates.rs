// Configuration template endpoints

use std::collections::BTreeMap;
use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::segment;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{
    CloneRequest, ListQuery, Page, RenderRequest, RenderResult, Template, TemplateTestCase,
    TemplateVariable, TestRun, ValidationReport, VariablesRequest,
};

impl ApiClient {
    // ── CRUD ─────────────────────────────────────────────────────────

    /// `GET /templates?page=&limit=&search=`
    pub async fn list_templates(&self, query: &ListQuery) -> ApiResult<Page<Template>> {
        self.get_with_query("templates", query).await
    }

    /// `GET /templates/{id}`
    pub async fn get_template(&self, id: &str) -> ApiResult<Template> {
        self.get(&format!("templates/{}", segment(id))).await
    }

    /// `POST /templates`
    pub async fn create_template<B>(&self, template: &B) -> ApiResult<Template>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post("templates", template).await
    }

    /// `PUT /templates/{id}`
    pub async fn update_template<B>(&self, id: &str, patch: &B) -> ApiResult<Template>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(&format!("templates/{}", segment(id)), patch).await
    }

    /// `DELETE /templates/{id}`
    pub async fn delete_template(&self, id: &str) -> ApiResult<()> {
        debug!(id, "deleting template");
        self.delete_unit(&format!("templates/{}", segment(id))).await
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// `POST /templates/{id}/render` with `{"variables": {...}}`
    pub async fn render_template(
        &self,
        id: &str,
        variables: &BTreeMap<String, Value>,
    ) -> ApiResult<RenderResult> {
        self.post(
            &format!("templates/{}/render", segment(id)),
            &RenderRequest { variables },
        )
        .await
    }

    /// `POST /templates/{id}/validate`
    pub async fn validate_template(&self, id: &str) -> ApiResult<ValidationReport> {
        self.post_empty(&format!("templates/{}/validate", segment(id)))
            .await
    }

    /// `POST /templates/{id}/test/{testCaseId}`
    pub async fn run_template_test(&self, id: &str, test_case_id: &str) -> ApiResult<RenderResult> {
        self.post_empty(&format!(
            "templates/{}/test/{}",
            segment(id),
            segment(test_case_id)
        ))
        .await
    }

    /// `POST /templates/{id}/test-all`
    pub async fn run_all_template_tests(&self, id: &str) -> ApiResult<Vec<TestRun>> {
        self.post_empty(&format!("templates/{}/test-all", segment(id)))
            .await
    }

    // ── Lookups ──────────────────────────────────────────────────────

    /// `GET /templates/vendor/{vendor}`
    pub async fn templates_by_vendor(&self, vendor: &str) -> ApiResult<Vec<Template>> {
        self.get(&format!("templates/vendor/{}", segment(vendor)))
            .await
    }

    /// `GET /templates/device/{deviceType}`
    pub async fn templates_by_device_type(&self, device_type: &str) -> ApiResult<Vec<Template>> {
        self.get(&format!("templates/device/{}", segment(device_type)))
            .await
    }

    // ── Variables ────────────────────────────────────────────────────

    /// `GET /templates/{id}/variables`
    pub async fn template_variables(&self, id: &str) -> ApiResult<Vec<TemplateVariable>> {
        self.get(&format!("templates/{}/variables", segment(id)))
            .await
    }

    /// Replace the variable list. Returns the updated template.
    ///
    /// `PUT /templates/{id}/variables` with `{"variables": [...]}`
    pub async fn update_template_variables(
        &self,
        id: &str,
        variables: &[TemplateVariable],
    ) -> ApiResult<Template> {
        self.put(
            &format!("templates/{}/variables", segment(id)),
            &VariablesRequest { variables },
        )
        .await
    }

    // ── Test cases ───────────────────────────────────────────────────

    /// `POST /templates/{id}/test-cases`
    pub async fn add_template_test_case<B>(&self, id: &str, test_case: &B) -> ApiResult<TemplateTestCase>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post(&format!("templates/{}/test-cases", segment(id)), test_case)
            .await
    }

    /// `PUT /templates/{id}/test-cases/{testCaseId}`
    pub async fn update_template_test_case<B>(
        &self,
        id: &str,
        test_case_id: &str,
        patch: &B,
    ) -> ApiResult<TemplateTestCase>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(
            &format!(
                "templates/{}/test-cases/{}",
                segment(id),
                segment(test_case_id)
            ),
            patch,
        )
        .await
    }

    /// `DELETE /templates/{id}/test-cases/{testCaseId}`
    pub async fn delete_template_test_case(&self, id: &str, test_case_id: &str) -> ApiResult<()> {
        self.delete_unit(&format!(
            "templates/{}/test-cases/{}",
            segment(id),
            segment(test_case_id)
        ))
        .await
    }

    // ── Copy / transfer ──────────────────────────────────────────────

    /// `POST /templates/{id}/clone` with `{"name": "..."}`
    pub async fn clone_template(&self, id: &str, name: &str) -> ApiResult<Template> {
        self.post(
            &format!("templates/{}/clone", segment(id)),
            &CloneRequest { name },
        )
        .await
    }

    /// `GET /templates/{id}/export`
    pub async fn export_template(&self, id: &str) -> ApiResult<Bytes> {
        self.get_bytes(&format!("templates/{}/export", segment(id)))
            .await
    }

    /// `POST /templates/import` (multipart upload)
    pub async fn import_template<F>(&self, file: &Path, on_progress: F) -> ApiResult<Template>
    where
        F: FnMut(u8) + Send + Sync + 'static,
    {
        self.upload("templates/import", file, on_progress).await
    }
}
