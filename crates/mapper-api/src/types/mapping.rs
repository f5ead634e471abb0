use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use super::api_schema::ApiSchema;
use super::yang::YangModel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MappingRule {
    pub id: String,
    pub source_path: String,
    pub target_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default)]
    pub priority: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TransformationType {
    FieldMapping,
    ValueTransformation,
    Conditional,
    Aggregation,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transformation {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TransformationType,
    pub expression: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ValidationType {
    Required,
    Format,
    Range,
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ValidationType,
    pub expression: String,
    pub error_message: String,
    pub is_active: bool,
}

/// Links a YANG model (source) to an API schema (target).
///
/// List endpoints may return mappings without the embedded schemas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mapping {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_schema: Option<Box<YangModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_schema: Option<Box<ApiSchema>>,
    #[serde(default)]
    pub mapping_rules: Vec<MappingRule>,
    #[serde(default)]
    pub transformations: Vec<Transformation>,
    #[serde(default)]
    pub validation_rules: Vec<ValidationRule>,
    pub is_active: bool,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of running a mapping against sample data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingTestResult {
    pub success: bool,
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MappingTestRequest<'a> {
    pub test_data: &'a Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateRequest<'a> {
    pub source_schema_id: &'a str,
    pub target_schema_id: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum MappingExportFormat {
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn summary_mapping_decodes_without_schemas() {
        let mapping: Mapping = serde_json::from_value(json!({
            "id": "m1",
            "name": "interfaces",
            "mappingRules": [{
                "id": "r1",
                "sourcePath": "/if:interfaces/interface/name",
                "targetPath": "$.interfaces[*].name",
                "priority": 1,
                "isActive": true
            }],
            "transformations": [{
                "id": "t1",
                "name": "upper",
                "type": "value_transformation",
                "expression": "upper(value)"
            }],
            "isActive": true,
            "createdBy": "u1",
            "createdAt": "2026-02-01T00:00:00Z",
            "updatedAt": "2026-02-01T00:00:00Z"
        }))
        .unwrap();

        assert!(mapping.source_schema.is_none());
        assert_eq!(mapping.mapping_rules[0].priority, 1);
        assert_eq!(
            mapping.transformations[0].kind,
            TransformationType::ValueTransformation
        );
        assert!(mapping.transformations[0].parameters.is_empty());
    }
}
