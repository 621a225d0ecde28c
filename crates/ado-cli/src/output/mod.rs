use serde::Serialize;

use crate::cli::OutputFormat;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Serialize;

    use super::render;
    use crate::cli::OutputFormat;

    #[derive(Serialize)]
    struct Sample {
        organization: &'static str,
        tenant_id: Option<&'static str>,
    }

    #[test]
    fn raw_is_single_line_json() {
        let rendered = render(
            &Sample {
                organization: "contoso",
                tenant_id: None,
            },
            OutputFormat::Raw,
        )
        .expect("render");
        assert_eq!(rendered, r#"{"organization":"contoso","tenant_id":null}"#);
    }

    #[test]
    fn json_is_pretty() {
        let rendered = render(
            &Sample {
                organization: "contoso",
                tenant_id: Some("t"),
            },
            OutputFormat::Json,
        )
        .expect("render");
        assert!(rendered.contains("\n  \"tenant_id\": \"t\""));
    }
}
