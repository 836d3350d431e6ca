use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&success_body(message, data))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
            if let Some(Value::Object(fields)) = data {
                for (key, value) in fields {
                    println!("  {}: {}", key, display_value(&value));
                }
            }
        }
    }
    Ok(())
}

/// A command failure with a machine-readable code for `--json` output
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct CliError {
    pub message: String,
    pub code: &'static str,
}

impl CliError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code,
        }
    }
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str, error_code: Option<&str>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&error_body(message, error_code))?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Print a failed command's error exactly once
pub fn report_error(output_format: &OutputFormat, err: &anyhow::Error, verbose: bool) -> anyhow::Result<()> {
    let code = err.downcast_ref::<CliError>().map(|e| e.code);
    let message = if verbose { format!("{err:?}") } else { err.to_string() };
    output_error(output_format, &message, code)
}

fn error_body(message: &str, error_code: Option<&str>) -> Value {
    let mut response = json!({
        "status": "error",
        "message": message
    });

    if let Some(code) = error_code {
        response["code"] = json!(code);
    }
    response
}

fn success_body(message: &str, data: Option<Value>) -> Value {
    let mut response = Map::new();
    response.insert("status".into(), json!("success"));
    response.insert("message".into(), json!(message));

    match data {
        Some(Value::Object(fields)) => response.extend(fields),
        Some(other) => {
            response.insert("data".into(), other);
        }
        None => {}
    }
    Value::Object(response)
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_data_is_merged_into_the_envelope() {
        let body = success_body("done", Some(json!({ "email": "ada@example.com" })));
        assert_eq!(body["status"], "success");
        assert_eq!(body["email"], "ada@example.com");
    }

    #[test]
    fn error_body_carries_the_code_when_known() {
        let body = error_body("No user with email 'x'", Some("NOT_FOUND"));
        assert_eq!(body["status"], "error");
        assert_eq!(body["code"], "NOT_FOUND");

        assert!(error_body("boom", None).get("code").is_none());
    }

    #[test]
    fn cli_errors_keep_their_message_and_code_through_anyhow() {
        let err: anyhow::Error = CliError::new("NOT_FOUND", "No project with id 42").into();
        assert_eq!(err.to_string(), "No project with id 42");
        assert_eq!(err.downcast_ref::<CliError>().map(|e| e.code), Some("NOT_FOUND"));

        let plain = anyhow::anyhow!("connection refused");
        assert!(plain.downcast_ref::<CliError>().is_none());
    }

    #[test]
    fn scalar_data_goes_under_data() {
        let body = success_body("deleted", Some(json!(12)));
        assert_eq!(body["data"], 12);
        assert_eq!(display_value(&Value::Null), "-");
    }
}
