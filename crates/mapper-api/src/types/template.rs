use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::mapping::Mapping;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TemplateType {
    Jinja2,
    Velocity,
    Freemarker,
    Mustache,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateTestCase {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub input_data: BTreeMap<String, Value>,
    pub expected_output: String,
    pub is_active: bool,
}

/// A vendor configuration template rendered from mapped data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub vendor: String,
    pub device_type: String,
    pub template_type: TemplateType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub variables: Vec<TemplateVariable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapping: Option<Box<Mapping>>,
    #[serde(default)]
    pub test_cases: Vec<TemplateTestCase>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderResult {
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// One entry of `POST /templates/{id}/test-all`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestRun {
    pub test_case_id: String,
    pub result: RenderResult,
}

#[derive(Serialize)]
pub(crate) struct RenderRequest<'a> {
    pub variables: &'a BTreeMap<String, Value>,
}

#[derive(Serialize)]
pub(crate) struct VariablesRequest<'a> {
    pub variables: &'a [TemplateVariable],
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_runs_decode_nested_results() {
        let runs: Vec<TestRun> = serde_json::from_value(json!([
            { "testCaseId": "tc1", "result": { "success": true, "output": "hostname r1" } },
            { "testCaseId": "tc2", "result": { "success": false, "errors": ["undefined: mtu"] } }
        ]))
        .unwrap();

        assert!(runs[0].result.success);
        assert_eq!(runs[0].result.output, "hostname r1");
        assert_eq!(runs[1].result.errors, ["undefined: mtu"]);
        assert!(runs[1].result.output.is_empty());
    }

    #[test]
    fn variable_type_maps_to_kind() {
        let var: TemplateVariable =
            serde_json::from_value(json!({ "name": "mtu", "type": "integer", "required": true }))
                .unwrap();
        assert_eq!(var.kind, "integer");
        assert!(var.default_value.is_none());
    }
}
