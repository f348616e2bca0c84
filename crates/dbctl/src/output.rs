use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, clap::ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
}

/// Render any serializable value as pretty JSON or YAML
pub fn render<T: Serialize>(data: &T, format: OutputFormat) -> Result<String> {
    let json_value: Value = serde_json::to_value(data)?;

    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&json_value)?,
        OutputFormat::Yaml => serde_yaml::to_string(&json_value)?
            .trim_end()
            .to_string(),
    };

    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_json_is_field_per_line() {
        let data = json!({"id": "db1", "connectionStrings": {"cdbDefault": "h:1521/orcl"}});
        let out = render(&data, OutputFormat::Json).unwrap();

        assert!(out.contains("\n  \"id\": \"db1\""));
        assert!(out.contains("\n    \"cdbDefault\": \"h:1521/orcl\""));
        let back: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn test_render_yaml() {
        let data = json!({"id": "db1", "lifecycleState": "PROVISIONING"});
        let out = render(&data, OutputFormat::Yaml).unwrap();

        assert!(out.contains("id: db1"));
        assert!(out.contains("lifecycleState: PROVISIONING"));
        assert!(!out.ends_with('\n'));
    }
}
