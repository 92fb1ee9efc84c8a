//! JSON Utilities for CloudFormation Export Outputs
//!
//! This module provides:
//! - Per-resource output records (`OutputInfo`) built from the service definition
//! - Rendering of those records into CloudFormation `Outputs` entries with exports
//! - A non-destructive merge of rendered entries into the service's own outputs
//!
//! Every exported resource yields two entries: its ARN and its description.
//! Export names follow `<prefix>:<stack>:<logicalName>:<kind>:<field>`.
use crate::naming_utils::{LAMBDA_FUNCTION_POSTFIX, function_full_name, state_machine_full_name};
use crate::sls_resources::{Outputs, ResourceRegistry};
use crate::validation_utils::{ExportError, RequirementError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Full name and description of one exported resource
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutputInfo {
    pub full_name: String,
    pub description: String,
}

/// Output records of every exported resource, keyed by logical name in selection order
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceOutputs {
    pub functions: IndexMap<String, OutputInfo>,
    pub state_machines: IndexMap<String, OutputInfo>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Function,
    StateMachine,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Function => "function",
            ResourceKind::StateMachine => "stateMachine",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which attribute of a resource an export publishes
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum ExportField {
    Arn,
    Description,
}

impl ExportField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportField::Arn => "arn",
            ExportField::Description => "description",
        }
    }
}

impl fmt::Display for ExportField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of an output entry
///
/// `GetAtt` is left for CloudFormation to resolve; this crate never
/// interprets it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(untagged)]
pub enum OutputValue {
    GetAtt {
        #[serde(rename = "Fn::GetAtt")]
        get_att: [String; 2],
    },
    Literal(String),
}

impl OutputValue {
    /// `{"Fn::GetAtt": [resource, "Arn"]}`
    pub fn arn_of(resource: &str) -> Self {
        OutputValue::GetAtt {
            get_att: [resource.to_string(), "Arn".to_string()],
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ExportName {
    pub name: String,
}

/// One CloudFormation output with an export
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct ExportEntry {
    pub description: String,
    pub value: OutputValue,
    pub export: ExportName,
}

/// Builds the export name `<prefix>:<stack_name>:<logical_name>:<kind>:<field>`.
pub fn export_key(
    prefix: &str,
    stack_name: &str,
    logical_name: &str,
    kind: ResourceKind,
    field: ExportField,
) -> String {
    format!("{prefix}:{stack_name}:{logical_name}:{kind}:{field}")
}

/// Builds output records for the selected functions
///
/// # Arguments
/// * `registry` - Resources declared by the service
/// * `function_names` - Logical names that already passed validation
///
/// # Returns
/// `IndexMap` of logical name to `OutputInfo`; a name repeated in the
/// selection keeps its first position
pub fn build_function_outputs<R: ResourceRegistry + ?Sized>(
    registry: &R,
    function_names: &[String],
) -> Result<IndexMap<String, OutputInfo>, ExportError> {
    let mut functions = IndexMap::new();

    for name in function_names {
        let function = registry
            .get_function(name)
            .ok_or_else(|| RequirementError::FunctionNotFound(name.clone()))?;

        let info = OutputInfo {
            full_name: function_full_name(name, LAMBDA_FUNCTION_POSTFIX)?,
            description: function.description.clone().unwrap_or_default(),
        };
        debug!(logical_name = %name, full_name = %info.full_name, "prepared function output");
        functions.insert(name.clone(), info);
    }

    Ok(functions)
}

/// Builds output records for the selected state machines
pub fn build_state_machine_outputs<R: ResourceRegistry + ?Sized>(
    registry: &R,
    state_machine_names: &[String],
) -> Result<IndexMap<String, OutputInfo>, ExportError> {
    let mut state_machines = IndexMap::new();

    for name in state_machine_names {
        let state_machine = registry
            .get_state_machine(name)
            .ok_or_else(|| RequirementError::StateMachineNotFound(name.clone()))?;

        let info = OutputInfo {
            full_name: state_machine_full_name(
                name,
                state_machine.name.as_deref().unwrap_or_default(),
                "",
            ),
            description: state_machine
                .definition
                .comment
                .clone()
                .unwrap_or_default(),
        };
        debug!(logical_name = %name, full_name = %info.full_name, "prepared state machine output");
        state_machines.insert(name.clone(), info);
    }

    Ok(state_machines)
}

/// Renders output records into CloudFormation output entries
///
/// Emits `<fullName>ExportArn` and `<fullName>ExportDescription` for each
/// record, in the records' order.
pub fn render_exports(
    prefix: &str,
    stack_name: &str,
    resource_outputs: &IndexMap<String, OutputInfo>,
    kind: ResourceKind,
) -> IndexMap<String, ExportEntry> {
    let mut entries = IndexMap::new();

    for (name, OutputInfo { full_name, description }) in resource_outputs {
        entries.insert(
            format!("{full_name}ExportArn"),
            ExportEntry {
                description: format!("Arn of {stack_name}-{name}"),
                value: OutputValue::arn_of(full_name),
                export: ExportName {
                    name: export_key(prefix, stack_name, name, kind, ExportField::Arn),
                },
            },
        );

        entries.insert(
            format!("{full_name}ExportDescription"),
            ExportEntry {
                description: format!("Description of {stack_name}-{name}"),
                value: OutputValue::Literal(description.clone()),
                export: ExportName {
                    name: export_key(prefix, stack_name, name, kind, ExportField::Description),
                },
            },
        );
    }

    entries
}

/// Merges rendered entries into existing outputs
///
/// Existing keys are kept in place; a rendered entry with the same key
/// replaces the existing value.
pub fn merge_outputs(
    mut existing: Outputs,
    rendered: &IndexMap<String, ExportEntry>,
) -> Result<Outputs, serde_json::Error> {
    for (key, entry) in rendered {
        existing.insert(key.clone(), serde_json::to_value(entry)?);
    }
    Ok(existing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sls_resources::{ServiceDefinition, fixtures};
    use serde_json::json;

    fn names(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    fn foo_outputs() -> IndexMap<String, OutputInfo> {
        let mut outputs = IndexMap::new();
        outputs.insert(
            "foo".to_string(),
            OutputInfo {
                full_name: "FooLambdaFunction".to_string(),
                description: "Does foo".to_string(),
            },
        );
        outputs
    }

    #[test]
    fn test_export_key() {
        assert_eq!(
            export_key("aser", "svc-dev", "foo", ResourceKind::Function, ExportField::Arn),
            "aser:svc-dev:foo:function:arn"
        );
        assert_eq!(
            export_key("", "", "bar", ResourceKind::StateMachine, ExportField::Description),
            "::bar:stateMachine:description"
        );
    }

    #[test]
    fn test_build_function_outputs() {
        let service = fixtures::service();
        let outputs = build_function_outputs(&service, &names(&["createOrder"])).unwrap();

        assert_eq!(
            outputs["createOrder"],
            OutputInfo {
                full_name: "CreateOrderLambdaFunction".to_string(),
                description: "Creates an order".to_string(),
            }
        );
    }

    #[test]
    fn test_build_outputs_without_selection() {
        let service = fixtures::service();
        assert!(build_function_outputs(&service, &[]).unwrap().is_empty());
        assert!(build_state_machine_outputs(&service, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_build_function_outputs_unknown_name() {
        let service = ServiceDefinition::from_yaml_str("service: orders").unwrap();
        let result = build_function_outputs(&service, &names(&["ghost"]));
        assert!(matches!(
            result,
            Err(ExportError::Requirement(RequirementError::FunctionNotFound(name))) if name == "ghost"
        ));
    }

    #[test]
    fn test_build_function_outputs_empty_name() {
        let yaml = r#"
service: orders
functions:
  "":
    handler: src/blank.handler
    description: Has no name
"#;
        let service = ServiceDefinition::from_yaml_str(yaml).unwrap();
        let selection = names(&["", "createOrder"]);

        assert!(crate::validate_function_exports(&service, &selection[..1]).is_empty());
        let result = build_function_outputs(&service, &selection);
        assert!(matches!(result, Err(ExportError::InvalidInput(_))));
    }

    #[test]
    fn test_build_state_machine_outputs() {
        let service = fixtures::service();
        let outputs =
            build_state_machine_outputs(&service, &names(&["refund-flow", "fulfilment"])).unwrap();

        let keys: Vec<&str> = outputs.keys().map(String::as_str).collect();
        assert_eq!(keys, ["refund-flow", "fulfilment"]);
        assert_eq!(outputs["refund-flow"].full_name, "OrderDashrefundDashflow");
        assert_eq!(outputs["refund-flow"].description, "Refunds an order");
        assert_eq!(outputs["fulfilment"].full_name, "FulfilmentStateMachine");
        assert_eq!(outputs["fulfilment"].description, "Fulfils an order");
    }

    #[test]
    fn test_repeated_name_keeps_one_entry() {
        let service = fixtures::service();
        let outputs =
            build_function_outputs(&service, &names(&["createOrder", "createOrder"])).unwrap();
        assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn test_render_function_exports() {
        let entries = render_exports("aser", "svc-dev", &foo_outputs(), ResourceKind::Function);

        let keys: Vec<&str> = entries.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            ["FooLambdaFunctionExportArn", "FooLambdaFunctionExportDescription"]
        );

        let arn = &entries["FooLambdaFunctionExportArn"];
        assert_eq!(arn.description, "Arn of svc-dev-foo");
        assert_eq!(arn.value, OutputValue::arn_of("FooLambdaFunction"));
        assert_eq!(arn.export.name, "aser:svc-dev:foo:function:arn");

        let description = &entries["FooLambdaFunctionExportDescription"];
        assert_eq!(description.description, "Description of svc-dev-foo");
        assert_eq!(description.value, OutputValue::Literal("Does foo".to_string()));
        assert_eq!(description.export.name, "aser:svc-dev:foo:function:description");
    }

    #[test]
    fn test_render_uses_prefix_and_kind() {
        let entries = render_exports("acme", "svc-prod", &foo_outputs(), ResourceKind::StateMachine);
        assert_eq!(
            entries["FooLambdaFunctionExportArn"].export.name,
            "acme:svc-prod:foo:stateMachine:arn"
        );
    }

    #[test]
    fn test_render_empty_outputs() {
        let entries = render_exports("aser", "svc-dev", &IndexMap::new(), ResourceKind::Function);
        assert!(entries.is_empty());
    }

    #[test]
    fn test_export_entry_json_shape() {
        let entries = render_exports("aser", "svc-dev", &foo_outputs(), ResourceKind::Function);
        let value = serde_json::to_value(&entries).unwrap();

        assert_eq!(
            value,
            json!({
                "FooLambdaFunctionExportArn": {
                    "Description": "Arn of svc-dev-foo",
                    "Value": { "Fn::GetAtt": ["FooLambdaFunction", "Arn"] },
                    "Export": { "Name": "aser:svc-dev:foo:function:arn" }
                },
                "FooLambdaFunctionExportDescription": {
                    "Description": "Description of svc-dev-foo",
                    "Value": "Does foo",
                    "Export": { "Name": "aser:svc-dev:foo:function:description" }
                }
            })
        );
    }

    #[test]
    fn test_merge_outputs_preserves_and_overwrites() {
        let mut existing = Outputs::new();
        existing.insert("ServiceEndpoint".to_string(), json!({ "Value": "https://example.com" }));
        existing.insert("FooLambdaFunctionExportArn".to_string(), json!({ "Value": "stale" }));

        let rendered = render_exports("aser", "svc-dev", &foo_outputs(), ResourceKind::Function);
        let merged = merge_outputs(existing, &rendered).unwrap();

        let keys: Vec<&str> = merged.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
                "ServiceEndpoint",
                "FooLambdaFunctionExportArn",
                "FooLambdaFunctionExportDescription",
            ]
        );
        assert_eq!(merged["ServiceEndpoint"], json!({ "Value": "https://example.com" }));
        assert_eq!(
            merged["FooLambdaFunctionExportArn"]["Value"],
            json!({ "Fn::GetAtt": ["FooLambdaFunction", "Arn"] })
        );
    }
}
