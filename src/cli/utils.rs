use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(Value::Object(fields)) = data {
                if let Some(object) = response.as_object_mut() {
                    object.extend(fields);
                }
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Render one account row of a listing as a single text line
pub fn account_line(account: &Value) -> String {
    let field = |name: &str| account.get(name).and_then(Value::as_str).unwrap_or("-").to_string();
    let id = account.get("id").map(|v| v.to_string()).unwrap_or_else(|| "?".into());
    let customers = account.get("customers").and_then(Value::as_array).map(Vec::len).unwrap_or(0);

    format!(
        "{:>6}  {:<32}  {:<12}  {:<28}  {} customer(s)",
        id,
        field("name"),
        field("account_type"),
        field("email"),
        customers
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_line_tolerates_missing_fields() {
        let line = account_line(&json!({"id": 7, "name": "Acme", "customers": [{"id": 1}]}));
        assert!(line.contains("Acme"));
        assert!(line.contains("1 customer(s)"));
        assert!(line.trim_start().starts_with('7'));
    }
}
