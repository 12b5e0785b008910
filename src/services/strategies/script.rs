//! Generation, and optional execution, of a standalone apply script.

use anyhow::Result;
use async_trait::async_trait;
use chrono::Local;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::fs;
use tokio::process::Command;
use tracing::{error, info, instrument, warn};

use crate::domain::models::{
    ExecutionState, OperationRequest, OutcomeDetails, StrategyKind, StrategyOutcome,
};
use crate::domain::{ApplyError, Strategy};
use crate::services::backup_store::suffixed_path;

pub const SCRIPT_SUFFIX: &str = ".auto_script.py";
const PREVIEW_CHARS: usize = 200;

/// Writes a Python script that backs up the target, writes the proposed
/// content and restores the backup on failure.
///
/// Without auto-execution the outcome is always a failure carrying the
/// script path, so a person can review and run it.
#[derive(Debug, Clone)]
pub struct ScriptStrategy {
    auto_execute: bool,
    interpreter: String,
    timeout: Duration,
}

impl ScriptStrategy {
    pub fn new(auto_execute: bool, interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            auto_execute,
            interpreter: interpreter.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Strategy for ScriptStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ScriptGeneration
    }

    #[instrument(skip_all, fields(run_id = %state.run_id, auto_execute = self.auto_execute))]
    async fn attempt(
        &self,
        request: &OperationRequest,
        state: &mut ExecutionState,
    ) -> Result<StrategyOutcome> {
        let script = generate_script(&request.path, request.new_content.as_deref().unwrap_or_default())?;
        let script_path = suffixed_path(&request.path, SCRIPT_SUFFIX);

        if let Err(err) = fs::write(&script_path, &script).await {
            error!(path = %script_path.display(), error = %err, "Failed to save script");
            return Ok(StrategyOutcome::failure(
                self.kind(),
                format!("Failed to save automation script: {err}"),
            ));
        }
        info!(path = %script_path.display(), "Automation script saved");

        let script_preview = preview(&script);

        if !self.auto_execute {
            return Ok(StrategyOutcome::failure(
                self.kind(),
                "Script generated but not executed (auto_execute disabled)",
            )
            .with_details(OutcomeDetails::Script {
                script_path,
                script_preview,
                executed: false,
                output: None,
            }));
        }

        info!(interpreter = %self.interpreter, "Auto-execution enabled, running script");
        match self.run(&script_path).await {
            Ok(output) => Ok(
                StrategyOutcome::success(self.kind()).with_details(OutcomeDetails::Script {
                    script_path,
                    script_preview,
                    executed: true,
                    output: Some(output),
                }),
            ),
            Err(err) => {
                warn!(error = %err, "Automation script failed");
                Ok(StrategyOutcome::failure(self.kind(), err.to_string()).with_details(
                    OutcomeDetails::Script {
                        script_path,
                        script_preview,
                        executed: true,
                        output: None,
                    },
                ))
            }
        }
    }
}

impl ScriptStrategy {
    /// Run `<interpreter> <script>`; the child is killed if the timeout hits
    async fn run(&self, script_path: &Path) -> Result<String, ApplyError> {
        let child = Command::new(&self.interpreter)
            .arg(script_path)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let output = tokio::time::timeout(self.timeout, child)
            .await
            .map_err(|_| ApplyError::ScriptTimeout(self.timeout.as_secs()))?
            .map_err(|e| ApplyError::ScriptFailed(e.to_string()))?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).into_owned())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ApplyError::ScriptFailed(stderr.trim().to_string()))
        }
    }
}

fn preview(script: &str) -> String {
    let mut shown: String = script.chars().take(PREVIEW_CHARS).collect();
    shown.push_str("...");
    shown
}

/// Render the apply script for `path`.
///
/// Path and content are embedded as JSON string literals, which Python
/// reads back unchanged.
pub fn generate_script(path: &Path, new_content: &str) -> Result<String, serde_json::Error> {
    let file = serde_json::to_string(&path.to_string_lossy())?;
    let content = serde_json::to_string(new_content)?;
    let generated = Local::now().to_rfc3339();

    Ok(format!(
        r#"#!/usr/bin/env python3
"""
Auto-generated modification script
File: {display}
Generated: {generated}
"""

import os
import shutil
import sys

FILEPATH = {file}
BACKUP_PATH = FILEPATH + ".auto_backup"
NEW_CONTENT = {content}


def apply_changes():
    if os.path.exists(FILEPATH):
        shutil.copy2(FILEPATH, BACKUP_PATH)
        print(f"Backup created: {{BACKUP_PATH}}")

    try:
        with open(FILEPATH, "w", encoding="utf-8", newline="") as f:
            f.write(NEW_CONTENT)
        print("Changes applied successfully!")
        return True
    except Exception as e:
        print(f"Error applying changes: {{e}}", file=sys.stderr)
        if os.path.exists(BACKUP_PATH):
            shutil.copy2(BACKUP_PATH, FILEPATH)
            print("Restored from backup", file=sys.stderr)
        return False


if __name__ == "__main__":
    sys.exit(0 if apply_changes() else 1)
"#,
        display = docstring_text(&path.display().to_string()),
    ))
}

/// Escape `text` for a plain `"""` docstring: backslashes first, then any
/// triple quote.
fn docstring_text(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace("\"\"\"", "\\\"\\\"\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script_backup_path(path: &Path) -> std::path::PathBuf {
        suffixed_path(path, ".auto_backup")
    }

    fn python_available() -> bool {
        std::process::Command::new("python3")
            .arg("--version")
            .output()
            .is_ok_and(|o| o.status.success())
    }

    #[test]
    fn test_script_embeds_escaped_content() {
        let script = generate_script(Path::new("/tmp/app.py"), "say \"hi\"\n'''\n").unwrap();

        assert!(script.starts_with("#!/usr/bin/env python3"));
        assert!(script.contains(r#"FILEPATH = "/tmp/app.py""#));
        assert!(script.contains(r#"NEW_CONTENT = "say \"hi\"\n'''\n""#));
        assert!(script.contains(r#"print(f"Backup created: {BACKUP_PATH}")"#));
    }

    #[tokio::test]
    async fn test_manual_mode_reports_script_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.py");
        fs::write(&path, "old").await.unwrap();

        let request = OperationRequest::new("edit", &path, "old", Some("new".to_string()));
        let mut state = ExecutionState::new("old");
        let outcome = ScriptStrategy::new(false, "python3", Duration::from_secs(60))
            .attempt(&request, &mut state)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert_eq!(
            outcome.error_message(),
            "Script generated but not executed (auto_execute disabled)"
        );
        let Some(OutcomeDetails::Script {
            script_path,
            script_preview,
            executed,
            ..
        }) = outcome.details
        else {
            panic!("missing script details");
        };
        assert_eq!(script_path, suffixed_path(&path, SCRIPT_SUFFIX));
        assert!(script_path.exists());
        assert!(script_preview.ends_with("..."));
        assert!(!executed);
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "old");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.txt");

        let request = OperationRequest::new("edit", &path, "", Some("new".to_string()));
        let mut state = ExecutionState::new("");
        let outcome = ScriptStrategy::new(true, "false", Duration::from_secs(5))
            .attempt(&request, &mut state)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.error_message().starts_with("Script execution failed"));
    }

    #[tokio::test]
    async fn test_missing_interpreter_is_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.txt");

        let request = OperationRequest::new("edit", &path, "", Some("new".to_string()));
        let mut state = ExecutionState::new("");
        let outcome = ScriptStrategy::new(true, "definitely-not-an-interpreter", Duration::from_secs(5))
            .attempt(&request, &mut state)
            .await
            .unwrap();

        assert!(!outcome.success);
    }

    #[tokio::test]
    async fn test_auto_execution_applies_content() {
        if !python_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auto.txt");
        fs::write(&path, "before\n").await.unwrap();
        let new_content = "line \"one\"\r\nline 'two'\n\u{e9}\n";

        let request = OperationRequest::new("edit", &path, "before\n", Some(new_content.to_string()));
        let mut state = ExecutionState::new("before\n");
        let outcome = ScriptStrategy::new(true, "python3", Duration::from_secs(60))
            .attempt(&request, &mut state)
            .await
            .unwrap();

        assert!(outcome.success, "{outcome:?}");
        assert_eq!(fs::read_to_string(&path).await.unwrap(), new_content);
        assert_eq!(
            fs::read_to_string(script_backup_path(&path)).await.unwrap(),
            "before\n"
        );
    }

    #[test]
    fn test_docstring_escapes_backslashes_and_quotes() {
        assert_eq!(docstring_text(r"C:\users\x"), r"C:\\users\\x");
        assert_eq!(docstring_text(r#"a"""b"#), r#"a\"\"\"b"#);
        assert_eq!(docstring_text("a\\\"\"\""), r#"a\\\"\"\""#);
    }

    #[tokio::test]
    async fn test_auto_execution_under_backslash_directory() {
        if !python_available() || cfg!(windows) {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join(r"x\users");
        fs::create_dir(&nested).await.unwrap();
        let path = nested.join("auto.txt");
        fs::write(&path, "before\n").await.unwrap();

        let request = OperationRequest::new("edit", &path, "before\n", Some("after\n".to_string()));
        let mut state = ExecutionState::new("before\n");
        let outcome = ScriptStrategy::new(true, "python3", Duration::from_secs(60))
            .attempt(&request, &mut state)
            .await
            .unwrap();

        assert!(outcome.success, "{outcome:?}");
        assert_eq!(fs::read_to_string(&path).await.unwrap(), "after\n");
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        if !python_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slow.txt");

        let request = OperationRequest::new("edit", &path, "", Some("x".to_string()));
        let mut state = ExecutionState::new("");
        let outcome = ScriptStrategy::new(true, "python3", Duration::from_millis(1))
            .attempt(&request, &mut state)
            .await
            .unwrap();

        assert!(!outcome.success);
        assert!(outcome.error_message().contains("timed out"));
    }
}
