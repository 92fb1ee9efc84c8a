//! Naming Utilities for Exported Resources
//!
//! Derives the template resource name ("full name") that the Serverless
//! Framework generates for a function or a state machine. The full name is the
//! `Fn::GetAtt` target of the exported ARN and the stem of the output keys.
//!
//! ## Example
//! ```rust
//! use sls_export_resources::{function_full_name, state_machine_full_name};
//!
//! assert_eq!(function_full_name("createOrder", "LambdaFunction").unwrap(), "CreateOrderLambdaFunction");
//! assert_eq!(state_machine_full_name("refund", "order-refund", ""), "OrderDashrefund");
//! ```
use crate::validation_utils::ExportError;

/// Postfix the framework appends to a function's logical id.
pub const LAMBDA_FUNCTION_POSTFIX: &str = "LambdaFunction";

/// Appended to a state machine's logical name when it has no custom name.
pub const STATE_MACHINE_SUFFIX: &str = "StateMachine";

/// Upper-cases the first character and leaves the rest untouched.
fn capitalize_first(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Generates the full name of a Lambda function
///
/// # Arguments
/// * `logical_name` - Key of the function under `functions:`
/// * `postfix` - Appended verbatim, usually [`LAMBDA_FUNCTION_POSTFIX`]
///
/// # Returns
/// The capitalized logical name followed by `postfix`, or
/// `ExportError::InvalidInput` when `logical_name` is empty
pub fn function_full_name(logical_name: &str, postfix: &str) -> Result<String, ExportError> {
    if logical_name.is_empty() {
        return Err(ExportError::InvalidInput(
            "function logical name must not be empty".to_string(),
        ));
    }

    let mut full_name = capitalize_first(logical_name);
    full_name.push_str(postfix);
    Ok(full_name)
}

/// Generates the full name of a state machine
///
/// Uses `custom_name` when set, otherwise `<logical_name>StateMachine`.
/// Hyphens are not allowed in template logical ids, so each one becomes `Dash`
/// before the first character is capitalized.
pub fn state_machine_full_name(logical_name: &str, custom_name: &str, postfix: &str) -> String {
    let name = if custom_name.is_empty() {
        format!("{logical_name}{STATE_MACHINE_SUFFIX}")
    } else {
        custom_name.to_string()
    };

    let mut full_name = capitalize_first(&name.replace('-', "Dash"));
    full_name.push_str(postfix);
    full_name
}
