//! Terminal and JSON rendering of previews and stack outputs.

use crate::descriptor::Deployment;
use crate::engine::StackOutputs;
use colored::Colorize;
use std::error::Error;

/// Format a value as a quoted, right-aligned field.
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let quoted = format!("\"{}\"", value.to_string());
    if quoted.len() >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// `(key, value)` pairs; values quoted and right-aligned to a common width.
pub fn output_lines(outputs: &StackOutputs) -> Vec<(&'static str, String)> {
    let values: [(&'static str, Option<&str>); 4] = [
        ("resourceGroupName", Some(outputs.resource_group_name.as_str())),
        ("physicalName", Some(outputs.physical_name.as_str())),
        ("dns", outputs.dns.as_deref()),
        ("ip", Some(outputs.ip.as_str())),
    ];
    let width = values
        .iter()
        .map(|(_, v)| v.map_or(0, |v| v.len() + 2))
        .max()
        .unwrap_or(0);

    values
        .into_iter()
        .map(|(key, value)| match value {
            Some(value) => (key, format_field(value, width)),
            None => (key, format!("{:>width$}", "none")),
        })
        .collect()
}

pub fn print_outputs(outputs: &StackOutputs, json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(outputs)?);
        return Ok(());
    }

    println!("{}", "Outputs:".bold());
    for (key, value) in output_lines(outputs) {
        println!("    {key:<18}: {value}", key = key.cyan());
    }
    if let Some(dns) = &outputs.dns {
        println!(
            "#{}# management console: https://{dns}:8443/setup",
            "NOTE".on_blue()
        );
    }
    Ok(())
}

/// Desired-state graph as pretty JSON.
pub fn print_preview(deployment: &Deployment) -> Result<(), Box<dyn Error>> {
    log::info!(
        "Preview of '{}' (no cloud calls)",
        deployment.resource_group.name
    );
    println!("{}", serde_json::to_string_pretty(deployment)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_field_short() {
        assert_eq!(format_field("test", 10), "    \"test\"");
    }

    #[test]
    fn test_format_field_long() {
        assert_eq!(format_field("long_value", 5), "\"long_value\"");
    }

    #[test]
    fn test_output_lines_aligned() {
        let outputs = StackOutputs {
            resource_group_name: "test-ghes-pulumi".to_string(),
            physical_name: "test-ghes-vm".to_string(),
            dns: None,
            ip: "20.1.2.3".to_string(),
        };
        let lines = output_lines(&outputs);
        assert_eq!(lines[0], ("resourceGroupName", "\"test-ghes-pulumi\"".to_string()));
        assert_eq!(lines[1], ("physicalName", "    \"test-ghes-vm\"".to_string()));
        assert_eq!(lines[2], ("dns", "              none".to_string()));
        assert_eq!(lines[3], ("ip", "        \"20.1.2.3\"".to_string()));
        assert!(lines.iter().all(|(_, value)| value.len() == 18));
    }

    #[test]
    fn test_outputs_json_keys() {
        let outputs = StackOutputs {
            resource_group_name: "rg".to_string(),
            physical_name: "vm".to_string(),
            dns: Some("test-ghes.eastus.cloudapp.azure.com".to_string()),
            ip: "20.1.2.3".to_string(),
        };
        let json = serde_json::to_value(&outputs).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "resourceGroupName": "rg",
                "physicalName": "vm",
                "dns": "test-ghes.eastus.cloudapp.azure.com",
                "ip": "20.1.2.3"
            })
        );
    }
}
