//! Serverless Resource Type Definitions
//!
//! This module provides strongly-typed representations of the parts of a
//! `serverless.yml` service definition that the export pipeline reads:
//! Lambda functions, Step Functions state machines, the `custom.exportResources`
//! block, and any `resources.Outputs` already declared by the service.
//!
//! The pipeline never reads these types directly. It goes through
//! [`ResourceRegistry`], which [`ServiceDefinition`] implements, so hosts can
//! plug in their own resource lookup.
//!
//! All types are serializable and deserializable via Serde.
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value as YamlValue};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Prefix placed in front of every export name when none is configured.
pub const DEFAULT_EXPORT_PREFIX: &str = "aser";

/// Stage used when neither the provider block nor the caller sets one.
pub const DEFAULT_STAGE: &str = "dev";

/// Template `Outputs` mapping, keyed by output logical id.
///
/// Values are kept as raw JSON because the service may declare outputs using
/// any intrinsic function. Short-form tags are expanded while loading.
pub type Outputs = IndexMap<String, serde_json::Value>;

/// Read-only lookup of the resources declared by a service.
pub trait ResourceRegistry {
    /// Returns the function declared under `functions.<logical_name>`.
    fn get_function(&self, logical_name: &str) -> Option<&FunctionDefinition>;

    /// Returns the state machine declared under `stepFunctions.stateMachines.<logical_name>`.
    fn get_state_machine(&self, logical_name: &str) -> Option<&StateMachine>;

    fn service_name(&self) -> &str;

    fn stage(&self) -> &str;
}

/// Name of the deployed stack: `<service>-<stage>`.
pub fn stack_name<R: ResourceRegistry + ?Sized>(registry: &R) -> String {
    format!("{}-{}", registry.service_name(), registry.stage())
}

/// Errors raised while loading a service definition from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read service definition at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid service definition")]
    Yaml(#[from] serde_yaml::Error),
}

/// Serverless Lambda function
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct FunctionDefinition {
    pub handler: Option<String>,
    pub image: Option<serde_yaml::Value>,
    pub description: Option<String>,
}

/// Step Functions state machine
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct StateMachine {
    /// Custom physical name; when set it also drives the template resource name.
    pub name: Option<String>,
    #[serde(default)]
    pub definition: StateMachineDefinition,
}

/// Amazon States Language definition of a state machine
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct StateMachineDefinition {
    /// Free-text comment, exported as the state machine's description.
    pub comment: Option<String>,
    pub start_at: Option<String>,
    #[serde(default)]
    pub states: IndexMap<String, serde_yaml::Value>,
}

/// The `custom.exportResources` block.
///
/// Unknown keys are rejected, mirroring the schema the host registers for it.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExportResourcesConfig {
    pub functions: Option<Vec<String>>,
    pub state_machines: Option<Vec<String>>,
    pub prefix: Option<String>,
}

impl ExportResourcesConfig {
    /// Configured prefix, or [`DEFAULT_EXPORT_PREFIX`] when unset or empty.
    pub fn prefix(&self) -> &str {
        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => prefix,
            _ => DEFAULT_EXPORT_PREFIX,
        }
    }

    pub fn function_names(&self) -> &[String] {
        self.functions.as_deref().unwrap_or_default()
    }

    pub fn state_machine_names(&self) -> &[String] {
        self.state_machines.as_deref().unwrap_or_default()
    }
}

/// `service:` accepts either a bare name or an object with a `name` key.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum ServiceName {
    Name(String),
    Object { name: String },
}

impl ServiceName {
    pub fn as_str(&self) -> &str {
        match self {
            ServiceName::Name(name) | ServiceName::Object { name } => name,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Provider {
    pub name: Option<String>,
    pub stage: Option<String>,
    pub region: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StepFunctions {
    #[serde(default)]
    pub state_machines: IndexMap<String, StateMachine>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Custom {
    pub export_resources: Option<ExportResourcesConfig>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Resources {
    #[serde(rename = "Outputs", default, deserialize_with = "deserialize_outputs")]
    pub outputs: Outputs,
}

/// Rewrites CloudFormation short-form tags into their long form.
///
/// `!Ref x` becomes `{Ref: x}`, `!GetAtt A.B` becomes `{Fn::GetAtt: [A, B]}`,
/// and any other `!Name v` becomes `{Fn::Name: v}`.
fn expand_short_form(value: YamlValue) -> YamlValue {
    match value {
        YamlValue::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let name = tag.trim_start_matches('!');
            let key = match name {
                "Ref" | "Condition" => name.to_string(),
                _ => format!("Fn::{name}"),
            };

            let inner = match (name, expand_short_form(tagged.value)) {
                ("GetAtt", YamlValue::String(path)) => match path.split_once('.') {
                    Some((resource, attribute)) => {
                        YamlValue::Sequence(vec![resource.into(), attribute.into()])
                    }
                    None => YamlValue::String(path),
                },
                (_, inner) => inner,
            };

            let mut mapping = Mapping::new();
            mapping.insert(YamlValue::String(key), inner);
            YamlValue::Mapping(mapping)
        }
        YamlValue::Sequence(items) => {
            YamlValue::Sequence(items.into_iter().map(expand_short_form).collect())
        }
        YamlValue::Mapping(mapping) => YamlValue::Mapping(
            mapping
                .into_iter()
                .map(|(key, value)| (key, expand_short_form(value)))
                .collect(),
        ),
        other => other,
    }
}

fn deserialize_outputs<'de, D>(deserializer: D) -> Result<Outputs, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<IndexMap<String, YamlValue>>::deserialize(deserializer)?;

    raw.unwrap_or_default()
        .into_iter()
        .map(|(name, value)| {
            serde_json::to_value(expand_short_form(value))
                .map(|value| (name, value))
                .map_err(serde::de::Error::custom)
        })
        .collect()
}

/// A parsed `serverless.yml`
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceDefinition {
    pub service: ServiceName,
    #[serde(default)]
    pub provider: Provider,
    pub functions: Option<IndexMap<String, FunctionDefinition>>,
    pub step_functions: Option<StepFunctions>,
    pub custom: Option<Custom>,
    pub resources: Option<Resources>,
}

impl ServiceDefinition {
    /// Parses a service definition from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, LoadError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Reads and parses a service definition file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Overrides the provider stage, as the host's `--stage` option does.
    pub fn with_stage(mut self, stage: impl Into<String>) -> Self {
        self.provider.stage = Some(stage.into());
        self
    }

    pub fn export_resources(&self) -> Option<&ExportResourcesConfig> {
        self.custom.as_ref()?.export_resources.as_ref()
    }

    /// Outputs already declared under `resources.Outputs`, or an empty map.
    pub fn existing_outputs(&self) -> Outputs {
        self.resources
            .as_ref()
            .map(|resources| resources.outputs.clone())
            .unwrap_or_default()
    }
}

impl ResourceRegistry for ServiceDefinition {
    fn get_function(&self, logical_name: &str) -> Option<&FunctionDefinition> {
        self.functions.as_ref()?.get(logical_name)
    }

    fn get_state_machine(&self, logical_name: &str) -> Option<&StateMachine> {
        self.step_functions
            .as_ref()?
            .state_machines
            .get(logical_name)
    }

    fn service_name(&self) -> &str {
        self.service.as_str()
    }

    fn stage(&self) -> &str {
        self.provider.stage.as_deref().unwrap_or(DEFAULT_STAGE)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::ServiceDefinition;

    pub const SERVICE_YAML: &str = r#"
service: orders
provider:
  name: aws
  stage: prod
functions:
  createOrder:
    handler: src/create.handler
    description: Creates an order
  cancelOrder:
    handler: src/cancel.handler
    description: ""
  listOrders:
    handler: src/list.handler
stepFunctions:
  stateMachines:
    fulfilment:
      definition:
        Comment: Fulfils an order
        StartAt: Ship
        States:
          Ship:
            Type: Pass
            End: true
    refund-flow:
      name: order-refund-flow
      definition:
        Comment: Refunds an order
        StartAt: Refund
        States:
          Refund:
            Type: Pass
            End: true
    audit:
      definition:
        StartAt: Audit
        States:
          Audit:
            Type: Pass
            End: true
custom:
  exportResources:
    functions:
      - createOrder
    stateMachines:
      - fulfilment
      - refund-flow
resources:
  Outputs:
    ServiceEndpoint:
      Description: Endpoint of the orders API
      Value: https://example.com/orders
"#;

    pub fn service() -> ServiceDefinition {
        ServiceDefinition::from_yaml_str(SERVICE_YAML).unwrap()
    }
}
