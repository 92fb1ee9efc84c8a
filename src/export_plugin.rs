//! Export Resources Pipeline
//!
//! Entry points a host calls, in order, to add resource exports to a service:
//!
//! 1. [`initialize_and_validate`] checks the selection and prepares one
//!    [`OutputInfo`](crate::OutputInfo) per resource. Nothing is produced if
//!    any selected resource fails validation.
//! 2. [`PreparedExports::produce_outputs`] renders the CloudFormation entries
//!    for a stack, and [`update_outputs`] merges them into the outputs the
//!    service already declares.
//!
//! [`run`] chains both steps for a loaded [`ServiceDefinition`].
//!
//! ## Example
//! ```rust
//! use sls_export_resources::{ServiceDefinition, run};
//!
//! let yaml = r#"
//! service: orders
//! functions:
//!   createOrder:
//!     handler: src/create.handler
//!     description: Creates an order
//! custom:
//!   exportResources:
//!     functions: [createOrder]
//! "#;
//! let service = ServiceDefinition::from_yaml_str(yaml).unwrap();
//! let outputs = run(&service).unwrap();
//! assert!(outputs.contains_key("CreateOrderLambdaFunctionExportArn"));
//! ```
use crate::json_utils::{
    ExportEntry, ResourceKind, ResourceOutputs, build_function_outputs,
    build_state_machine_outputs, merge_outputs, render_exports,
};
use crate::sls_resources::{
    ExportResourcesConfig, Outputs, ResourceRegistry, ServiceDefinition, stack_name,
};
use crate::validation_utils::{ExportError, validate_export_requirements};
use indexmap::IndexMap;
use tracing::{debug, info};

/// Validated output records together with the export prefix they render under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedExports {
    pub prefix: String,
    pub outputs: ResourceOutputs,
}

/// Validates the selected resources and prepares their output records.
///
/// # Returns
/// `PreparedExports`, or `ExportError::MissingRequirements` listing every
/// violation when any selected resource is missing or undescribed
pub fn initialize_and_validate<R: ResourceRegistry + ?Sized>(
    registry: &R,
    config: &ExportResourcesConfig,
) -> Result<PreparedExports, ExportError> {
    validate_export_requirements(registry, config)?;
    info!("Resource Export requirement validation complete! No errors were found.");

    let outputs = ResourceOutputs {
        functions: build_function_outputs(registry, config.function_names())?,
        state_machines: build_state_machine_outputs(registry, config.state_machine_names())?,
    };

    Ok(PreparedExports {
        prefix: config.prefix().to_string(),
        outputs,
    })
}

impl PreparedExports {
    /// Renders function entries followed by state machine entries.
    pub fn produce_outputs(&self, stack_name: &str) -> IndexMap<String, ExportEntry> {
        let mut entries = render_exports(
            &self.prefix,
            stack_name,
            &self.outputs.functions,
            ResourceKind::Function,
        );
        entries.extend(render_exports(
            &self.prefix,
            stack_name,
            &self.outputs.state_machines,
            ResourceKind::StateMachine,
        ));

        debug!(stack_name, entries = entries.len(), "rendered export outputs");
        entries
    }
}

/// Adds rendered entries to the service's existing outputs.
pub fn update_outputs(
    existing: Outputs,
    rendered: &IndexMap<String, ExportEntry>,
) -> Result<Outputs, ExportError> {
    let outputs = merge_outputs(existing, rendered)?;
    info!("Successfully added custom resource exports!");
    Ok(outputs)
}

/// Runs the whole pipeline over a service definition.
///
/// A service without `custom.exportResources` gets its outputs back unchanged.
pub fn run(service: &ServiceDefinition) -> Result<Outputs, ExportError> {
    let existing = service.existing_outputs();
    let Some(config) = service.export_resources() else {
        debug!("no exportResources configured, leaving outputs untouched");
        return Ok(existing);
    };

    let prepared = initialize_and_validate(service, config)?;
    let rendered = prepared.produce_outputs(&stack_name(service));
    update_outputs(existing, &rendered)
}
