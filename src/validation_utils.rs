//! Validation Utilities: Export Requirements
//!
//! This module provides:
//! - Checks that every resource selected for export exists in the service
//! - Checks that each of those resources carries a description
//! - The error types shared by the export pipeline
//!
//! ## Behaviour
//! - Each pass collects every violation instead of stopping at the first one
//! - An empty selection is valid: nothing selected means nothing to check
//! - [`validate_export_requirements`] merges both passes and fails once with
//!   every violation listed, one per line
//!
//! ## Example
//! ```rust
//! use sls_export_resources::{ServiceDefinition, validate_function_exports};
//!
//! let service = ServiceDefinition::from_yaml_str("service: orders").unwrap();
//! let errors = validate_function_exports(&service, &["createOrder".to_string()]);
//! assert_eq!(errors[0].to_string(), "Unable to find function for: createOrder");
//! ```
use crate::sls_resources::{ExportResourcesConfig, ResourceRegistry};
use thiserror::Error;
use tracing::{debug, warn};

/// A single export requirement that a selected resource does not meet.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum RequirementError {
    #[error("Unable to find function for: {0}")]
    FunctionNotFound(String),

    #[error("Require a description for function: {0}")]
    FunctionDescriptionMissing(String),

    #[error("Unable to find state machine for: {0}")]
    StateMachineNotFound(String),

    #[error("Require a description for stateMachine: {0}")]
    StateMachineDescriptionMissing(String),
}

/// Errors that can occur while preparing resource exports.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing Serverless Resource Output requirements\n{}", join_lines(.0))]
    MissingRequirements(Vec<RequirementError>),

    #[error(transparent)]
    Requirement(#[from] RequirementError),

    #[error("Failed to serialize export entry")]
    Serialization(#[from] serde_json::Error),
}

fn join_lines(errors: &[RequirementError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn has_text(value: Option<&str>) -> bool {
    value.is_some_and(|text| !text.is_empty())
}

/// Validates that each selected function exists and has a description.
///
/// # Arguments
/// * `registry` - Resources declared by the service
/// * `function_names` - Logical names selected for export, in order
///
/// # Returns
/// One error per violation, in input order; empty when all are valid
pub fn validate_function_exports<R: ResourceRegistry + ?Sized>(
    registry: &R,
    function_names: &[String],
) -> Vec<RequirementError> {
    let mut errors = Vec::new();

    for name in function_names {
        let Some(function) = registry.get_function(name) else {
            errors.push(RequirementError::FunctionNotFound(name.clone()));
            continue;
        };

        if !has_text(function.description.as_deref()) {
            errors.push(RequirementError::FunctionDescriptionMissing(name.clone()));
        }
    }

    debug!(
        checked = function_names.len(),
        failed = errors.len(),
        "validated function exports"
    );
    errors
}

/// Validates that each selected state machine exists and its definition has a `Comment`.
pub fn validate_state_machine_exports<R: ResourceRegistry + ?Sized>(
    registry: &R,
    state_machine_names: &[String],
) -> Vec<RequirementError> {
    let mut errors = Vec::new();

    for name in state_machine_names {
        let Some(state_machine) = registry.get_state_machine(name) else {
            errors.push(RequirementError::StateMachineNotFound(name.clone()));
            continue;
        };

        if !has_text(state_machine.definition.comment.as_deref()) {
            errors.push(RequirementError::StateMachineDescriptionMissing(
                name.clone(),
            ));
        }
    }

    debug!(
        checked = state_machine_names.len(),
        failed = errors.len(),
        "validated state machine exports"
    );
    errors
}

/// Runs both validation passes and fails with every violation found.
///
/// Function violations come first, then state machine violations.
pub fn validate_export_requirements<R: ResourceRegistry + ?Sized>(
    registry: &R,
    config: &ExportResourcesConfig,
) -> Result<(), ExportError> {
    let mut errors = validate_function_exports(registry, config.function_names());
    errors.extend(validate_state_machine_exports(
        registry,
        config.state_machine_names(),
    ));

    if errors.is_empty() {
        return Ok(());
    }

    warn!(violations = errors.len(), "export requirement validation failed");
    Err(ExportError::MissingRequirements(errors))
}
