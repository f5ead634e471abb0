// Service provisioning endpoints
//
// Lifecycle calls (deploy, undeploy, restart, rollback) return as soon as
// the backend accepts the request. Progress is observed through status,
// logs and the deployment history.

use std::path::Path;

use bytes::Bytes;
use serde::Serialize;
use tracing::{debug, info};

use super::segment;
use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::types::{
    CloneRequest, DeploymentPreview, DeploymentRecord, DeploymentResult, ListQuery, LogEntry,
    LogQuery, MetricsQuery, Page, RollbackRequest, Service, ServiceConfiguration, ServiceMetrics,
    ServiceStatus, ValidationReport,
};

impl ApiClient {
    // ── CRUD ─────────────────────────────────────────────────────────

    /// `GET /services?page=&limit=&search=`
    pub async fn list_services(&self, query: &ListQuery) -> ApiResult<Page<Service>> {
        self.get_with_query("services", query).await
    }

    /// `GET /services/{id}`
    pub async fn get_service(&self, id: &str) -> ApiResult<Service> {
        self.get(&format!("services/{}", segment(id))).await
    }

    /// `POST /services`
    pub async fn create_service<B>(&self, service: &B) -> ApiResult<Service>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.post("services", service).await
    }

    /// `PUT /services/{id}`
    pub async fn update_service<B>(&self, id: &str, patch: &B) -> ApiResult<Service>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.put(&format!("services/{}", segment(id)), patch).await
    }

    /// `DELETE /services/{id}`
    pub async fn delete_service(&self, id: &str) -> ApiResult<()> {
        debug!(id, "deleting service");
        self.delete_unit(&format!("services/{}", segment(id))).await
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// `POST /services/{id}/deploy`
    pub async fn deploy_service(&self, id: &str) -> ApiResult<DeploymentResult> {
        info!(id, "deploying service");
        self.post_empty(&format!("services/{}/deploy", segment(id)))
            .await
    }

    /// `POST /services/{id}/undeploy`
    pub async fn undeploy_service(&self, id: &str) -> ApiResult<DeploymentResult> {
        info!(id, "undeploying service");
        self.post_empty(&format!("services/{}/undeploy", segment(id)))
            .await
    }

    /// `POST /services/{id}/restart`
    pub async fn restart_service(&self, id: &str) -> ApiResult<DeploymentResult> {
        info!(id, "restarting service");
        self.post_empty(&format!("services/{}/restart", segment(id)))
            .await
    }

    /// Roll back to an earlier deployment.
    ///
    /// `POST /services/{id}/rollback` with `{"deploymentId": "..."}`
    pub async fn rollback_service(&self, id: &str, deployment_id: &str) -> ApiResult<DeploymentResult> {
        info!(id, deployment_id, "rolling back service");
        self.post(
            &format!("services/{}/rollback", segment(id)),
            &RollbackRequest { deployment_id },
        )
        .await
    }

    /// Dry run: the commands a deployment would push, per device.
    ///
    /// `POST /services/{id}/preview-deployment`
    pub async fn preview_service_deployment(&self, id: &str) -> ApiResult<DeploymentPreview> {
        self.post_empty(&format!("services/{}/preview-deployment", segment(id)))
            .await
    }

    /// `GET /services/{id}/deployments`
    pub async fn service_deployments(&self, id: &str) -> ApiResult<Vec<DeploymentRecord>> {
        self.get(&format!("services/{}/deployments", segment(id)))
            .await
    }

    // ── Observability ────────────────────────────────────────────────

    /// `GET /services/{id}/status`
    pub async fn service_status(&self, id: &str) -> ApiResult<ServiceStatus> {
        self.get(&format!("services/{}/status", segment(id))).await
    }

    /// `GET /services/{id}/metrics[?timeRange=]`
    pub async fn service_metrics(&self, id: &str, time_range: Option<&str>) -> ApiResult<ServiceMetrics> {
        self.get_with_query(
            &format!("services/{}/metrics", segment(id)),
            &MetricsQuery { time_range },
        )
        .await
    }

    /// `GET /services/{id}/logs?limit=&level=`
    pub async fn service_logs(&self, id: &str, query: &LogQuery) -> ApiResult<Vec<LogEntry>> {
        self.get_with_query(&format!("services/{}/logs", segment(id)), query)
            .await
    }

    /// `POST /services/validate-configuration`
    pub async fn validate_service_configuration(
        &self,
        configuration: &ServiceConfiguration,
    ) -> ApiResult<ValidationReport> {
        self.post("services/validate-configuration", configuration)
            .await
    }

    // ── Copy / transfer ──────────────────────────────────────────────

    /// `POST /services/{id}/clone` with `{"name": "..."}`
    pub async fn clone_service(&self, id: &str, name: &str) -> ApiResult<Service> {
        self.post(
            &format!("services/{}/clone", segment(id)),
            &CloneRequest { name },
        )
        .await
    }

    /// `GET /services/{id}/export`
    pub async fn export_service(&self, id: &str) -> ApiResult<Bytes> {
        self.get_bytes(&format!("services/{}/export", segment(id)))
            .await
    }

    /// `POST /services/import` (multipart upload)
    pub async fn import_service<F>(&self, file: &Path, on_progress: F) -> ApiResult<Service>
    where
        F: FnMut(u8) + Send + Sync + 'static,
    {
        self.upload("services/import", file, on_progress).await
    }
}
