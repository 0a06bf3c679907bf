//! Azure CLI command execution.
//!
//! Used only to obtain credentials; resource calls go through [`super::arm`].

use crate::error::DeployError;
use colored::Colorize;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::process::Command;
use std::sync::OnceLock;

/// Largest stdout accepted from one command.
const MAX_OUTPUT_BYTES: usize = 500_000;

/// Regex for splitting command strings while preserving quoted substrings.
static COMMAND_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_command_regex() -> &'static Regex {
    COMMAND_REGEX.get_or_init(|| {
        Regex::new(r#"'([^']*)'\s*|\"([^\"]*)\"\s*|([^'\s]*)\s*"#).expect("Invalid Regex")
    })
}

/// Run a command line and return its stdout.
///
/// The command string is split on spaces, with quoted substrings preserved.
/// The token printed by `az account get-access-token` is never logged.
pub fn run(cmd: &str) -> Result<String, DeployError> {
    log::debug!("run({cmd})", cmd = cmd.on_blue());

    let cmds: Vec<&str> = split_and_strip(cmd);
    let Some((program, args)) = cmds.split_first() else {
        return Err(DeployError::Cli("empty command".to_string()));
    };
    log::trace!("split cmds={:?}", cmds);

    let output = Command::new(program).args(args).output().map_err(|e| {
        log::error!("Command execution failed: {}", e);
        DeployError::Cli(format!("Failed to execute {program}: {e}"))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::trace!(
            "code={code:?}, status={status}\n┎######\nstderr=\n{stderr}\n┖######",
            code = output.status.code(),
            status = output.status,
            stderr = stderr.red()
        );
        log::warn!(
            "{failed} to run {cmd}",
            failed = "failed".on_red(),
            cmd = cmd.on_blue()
        );
        return Err(DeployError::Cli(format!("{program} failed: {}", stderr.trim())));
    }

    log::debug!("Success cmd: {cmd} stdout.len()={}", output.stdout.len());
    if output.stdout.len() > MAX_OUTPUT_BYTES {
        return Err(DeployError::Cli(format!(
            "Response too large: {} bytes for command: {:?}",
            output.stdout.len(),
            cmds
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| DeployError::Cli(format!("Invalid UTF-8: {e}")))
}

/// Run a command that prints JSON and parse it.
pub fn run_json<T: DeserializeOwned>(cmd: &str) -> Result<T, DeployError> {
    let output = run(cmd)?;
    parse_json(&output)
}

/// Parse JSON, reporting the failing field path.
pub fn parse_json<T: DeserializeOwned>(output: &str) -> Result<T, DeployError> {
    let mut deserializer = serde_json::Deserializer::from_str(output);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        DeployError::Deserialization {
            path: e.path().to_string(),
            message: e.inner().to_string(),
        }
    })
}

/// Split a command string on spaces, preserving quoted substrings.
fn split_and_strip(input: &str) -> Vec<&str> {
    get_command_regex()
        .find_iter(input)
        .map(|m| m.as_str().trim().trim_matches('\'').trim_matches('"'))
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[test]
    fn test_split_and_strip_quoted() {
        let input = "az account get-access-token --subscription 'My Sub' --output json";
        let expected = vec![
            "az",
            "account",
            "get-access-token",
            "--subscription",
            "My Sub",
            "--output",
            "json",
        ];
        assert_eq!(split_and_strip(input), expected);
    }

    #[test]
    fn test_split_and_strip_nospaces() {
        assert_eq!(split_and_strip("NoSpacesHere"), vec!["NoSpacesHere"]);
    }

    #[test]
    fn test_run_empty_command() {
        assert!(matches!(run("   "), Err(DeployError::Cli(_))));
    }

    #[test]
    fn test_parse_json_reports_path() {
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Outer {
            inner: Inner,
        }
        #[derive(Deserialize, Debug)]
        #[allow(dead_code)]
        struct Inner {
            count: u32,
        }

        let err = parse_json::<Outer>(r#"{"inner": {"count": "x"}}"#).unwrap_err();
        match err {
            DeployError::Deserialization { path, .. } => assert_eq!(path, "inner.count"),
            other => panic!("unexpected {other:?}"),
        }
    }
}
