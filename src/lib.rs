//! # sls-export-resources
//!
//! Deterministic CloudFormation exports for Serverless Framework Lambda
//! functions and Step Functions state machines.
//!
//! ## Modules
//! - [`naming_utils`]: Template resource names for functions and state machines
//! - [`validation_utils`]: Export requirement checks and error types
//! - [`json_utils`]: Output records, CloudFormation export entries, and merging
//! - [`sls_resources`]: Typed `serverless.yml` definitions and the resource registry
//! - [`export_plugin`]: The validate-then-produce pipeline
//!
//! ## Usage
//! Import the desired helpers or types from the crate root:
//!
//! ```rust
//! use sls_export_resources::{ServiceDefinition, initialize_and_validate, stack_name};
//! ```
//!
//! ## Notes
//! - Library functions do no I/O apart from [`ServiceDefinition::from_path`].
//! - The `export-outputs` binary runs the pipeline over a `serverless.yml`.
pub mod naming_utils;

pub use naming_utils::{
    LAMBDA_FUNCTION_POSTFIX, STATE_MACHINE_SUFFIX, function_full_name, state_machine_full_name,
};

pub mod validation_utils;

pub use validation_utils::{
    ExportError, RequirementError, validate_export_requirements, validate_function_exports,
    validate_state_machine_exports,
};

pub mod json_utils;

pub use json_utils::{
    ExportEntry, ExportField, ExportName, OutputInfo, OutputValue, ResourceKind, ResourceOutputs,
    build_function_outputs, build_state_machine_outputs, export_key, merge_outputs,
    render_exports,
};

pub mod sls_resources;

pub use sls_resources::{
    DEFAULT_EXPORT_PREFIX, ExportResourcesConfig, FunctionDefinition, LoadError, Outputs,
    ResourceRegistry, ServiceDefinition, StateMachine, StateMachineDefinition, stack_name,
};

pub mod export_plugin;

pub use export_plugin::{PreparedExports, initialize_and_validate, run, update_outputs};
