use serde_json::{json, Map, Value};

use crate::cli::OutputFormat;
use crate::guard::Decision;
use crate::portal::Portal;
use crate::types::Role;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert("success".to_string(), json!(true));
            response.insert("message".to_string(), json!(message));

            match data {
                Some(Value::Object(fields)) => response.extend(fields),
                Some(other) => {
                    response.insert("data".to_string(), other);
                }
                None => {}
            }

            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output a single record: pretty JSON, or one `key: value` line per field
pub fn output_record(output_format: &OutputFormat, record: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        OutputFormat::Text => match record {
            Value::Object(fields) => {
                for (key, value) in fields {
                    println!("{}: {}", key, text_value(value));
                }
            }
            other => println!("{}", text_value(other)),
        },
    }
    Ok(())
}

/// Output a list of records, or `empty_message` when there are none
pub fn output_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    items: &[Value],
    empty_message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = Map::new();
            response.insert(collection_name.to_string(), Value::Array(items.to_vec()));
            println!("{}", serde_json::to_string_pretty(&Value::Object(response))?);
        }
        OutputFormat::Text => {
            if items.is_empty() {
                println!("{}", empty_message);
            }
            for item in items {
                println!("- {}", summary_line(item));
            }
        }
    }
    Ok(())
}

/// Fail early when the current session may not use a command
pub fn require_role(portal: &mut Portal, required: &[Role]) -> anyhow::Result<()> {
    match portal.authorize(required) {
        Decision::Allow => Ok(()),
        Decision::RedirectToLogin => Err(anyhow::anyhow!(
            "Not logged in. Run `payroll auth login <username>` first"
        )),
        Decision::RedirectToRoleHome(home) => {
            let role = portal.role().map(|r| r.to_string()).unwrap_or_default();
            Err(anyhow::anyhow!(
                "Role {} may not run this command (home is {})",
                role,
                home
            ))
        }
    }
}

fn text_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::String(s) => s.clone(),
        Value::Object(_) | Value::Array(_) => value.to_string(),
        other => other.to_string(),
    }
}

// Scalar fields only; nested objects would make list lines unreadable
fn summary_line(item: &Value) -> String {
    match item {
        Value::Object(fields) => fields
            .iter()
            .filter(|(_, v)| !v.is_object() && !v.is_array())
            .map(|(k, v)| format!("{}={}", k, text_value(v)))
            .collect::<Vec<_>>()
            .join(", "),
        other => text_value(other),
    }
}
