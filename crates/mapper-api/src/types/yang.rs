use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

// ── Models ───────────────────────────────────────────────────────────

/// A YANG data model stored in the design studio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YangModel {
    pub id: String,
    pub name: String,
    pub namespace: String,
    pub version: String,
    pub revision: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub modules: Vec<YangModule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub is_imported: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YangModule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub namespace: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub containers: Vec<YangContainer>,
    #[serde(default)]
    pub leafs: Vec<YangLeaf>,
    #[serde(default)]
    pub lists: Vec<YangList>,
    #[serde(default)]
    pub choices: Vec<YangChoice>,
    #[serde(default)]
    pub rpcs: Vec<YangRpc>,
    #[serde(default)]
    pub notifications: Vec<YangNotification>,
}

// ── Schema tree ──────────────────────────────────────────────────────

/// One node of a module's schema tree.
///
/// The wire form carries no discriminator, so variants are told apart by
/// their required fields: lists have `keys`, choices have `cases`, leaves
/// have `type`. Anything else with `children` is a container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YangNode {
    List(YangList),
    Choice(YangChoice),
    Leaf(YangLeaf),
    Container(YangContainer),
}

impl YangNode {
    pub fn name(&self) -> &str {
        match self {
            Self::List(n) => &n.name,
            Self::Choice(n) => &n.name,
            Self::Leaf(n) => &n.name,
            Self::Container(n) => &n.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YangContainer {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<bool>,
    #[serde(default)]
    pub children: Vec<YangNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YangLeaf {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: YangType,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YangList {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub path: String,
    pub keys: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<bool>,
    #[serde(default)]
    pub children: Vec<YangNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YangChoice {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<bool>,
    pub cases: Vec<YangCase>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YangCase {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<YangNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YangRpc {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<Vec<YangNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Vec<YangNode>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YangNotification {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub children: Vec<YangNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YangType {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restrictions: Option<Vec<YangRestriction>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<YangEnumValue>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YangRestriction {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YangEnumValue {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ── Operation payloads ───────────────────────────────────────────────

/// Outcome of parsing raw YANG text or validating a stored model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseReport {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub modules: Vec<YangModule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelComparison {
    #[serde(default)]
    pub differences: Vec<Value>,
    #[serde(default)]
    pub additions: Vec<Value>,
    #[serde(default)]
    pub deletions: Vec<Value>,
    #[serde(default)]
    pub modifications: Vec<Value>,
}

impl ModelComparison {
    pub fn is_identical(&self) -> bool {
        self.differences.is_empty()
            && self.additions.is_empty()
            && self.deletions.is_empty()
            && self.modifications.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedImport {
    pub filename: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YangImportReport {
    #[serde(default)]
    pub imported: Vec<YangModel>,
    #[serde(default)]
    pub failed: Vec<FailedImport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelVersion {
    pub version: String,
    pub revision: String,
    #[serde(default)]
    pub changes: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelHistory {
    #[serde(default)]
    pub versions: Vec<ModelVersion>,
}

/// Query for `GET /yang-models/search`. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YangSearch {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
}

impl YangSearch {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Self::default()
        }
    }
}

#[derive(Serialize)]
pub(crate) struct ParseRequest<'a> {
    pub content: &'a str,
}

#[derive(Serialize)]
pub(crate) struct CompareRequest<'a> {
    pub model1: &'a str,
    pub model2: &'a str,
}

// ── Formats ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum DocumentationFormat {
    Html,
    Pdf,
    Markdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum YangExportFormat {
    Yang,
    Json,
    Xml,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn schema_tree_variants_are_discriminated_by_shape() {
        let children: Vec<YangNode> = serde_json::from_value(json!([
            {
                "name": "interface",
                "path": "/interfaces/interface",
                "keys": ["name"],
                "children": [
                    { "name": "mtu", "path": "/interfaces/interface/mtu", "type": { "name": "uint16" } }
                ]
            },
            {
                "name": "address-family",
                "path": "/interfaces/af",
                "cases": [{ "name": "ipv4" }]
            },
            { "name": "state", "path": "/interfaces/state", "children": [] }
        ]))
        .unwrap();

        assert!(matches!(&children[0], YangNode::List(l) if l.keys == ["name"]));
        if let YangNode::List(list) = &children[0] {
            assert!(matches!(&list.children[0], YangNode::Leaf(leaf) if leaf.kind.name == "uint16"));
        }
        assert!(matches!(&children[1], YangNode::Choice(c) if c.cases.len() == 1));
        assert!(matches!(&children[2], YangNode::Container(_)));
        assert_eq!(children[2].name(), "state");
    }

    #[test]
    fn search_omits_unset_filters() {
        let search = YangSearch {
            vendor: Some("juniper".into()),
            ..YangSearch::new("bgp")
        };
        let value = serde_json::to_value(&search).unwrap();
        assert_eq!(value, json!({ "query": "bgp", "vendor": "juniper" }));
    }

    #[test]
    fn export_formats_render_as_path_segments() {
        assert_eq!(YangExportFormat::Xml.to_string(), "xml");
        assert_eq!(
            "markdown".parse::<DocumentationFormat>().unwrap(),
            DocumentationFormat::Markdown
        );
    }
}
