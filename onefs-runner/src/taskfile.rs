// SPDX-License-Identifier: GPL-3.0-only

//! Task file loading
//!
//! A task file names one task, the array it runs against, and the task's
//! parameters. The format is picked by extension: `.json`, or `.yaml`/`.yml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use serde_json::Value;

use onefs_papi::ConnectionConfig;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskFile {
    /// Task name, one of [`onefs_tasks::tasks::NAMES`]
    pub task: String,

    pub connection: ConnectionConfig,

    /// Parameters forwarded to the task untouched; the task's own
    /// deserialization rejects unknown fields
    pub params: Value,
}

pub fn load(path: &Path) -> Result<TaskFile> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read task file {}", path.display()))?;
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    let parsed = match extension.as_deref() {
        Some("json") => serde_json::from_str(&text)
            .with_context(|| format!("parse task file {}", path.display()))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(&text)
            .with_context(|| format!("parse task file {}", path.display()))?,
        _ => bail!(
            "unsupported task file extension for {}; expected .json, .yaml or .yml",
            path.display()
        ),
    };
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_json_task_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "quota.json",
            r#"{
                "task": "smartquota",
                "connection": {
                    "onefs_host": "10.1.2.3",
                    "verify_ssl": false,
                    "api_user": "admin",
                    "api_password": "pw"
                },
                "params": {"path": "/ifs/sample_fs", "quota_type": "directory", "state": "present"}
            }"#,
        );

        let file = load(&path).unwrap();
        assert_eq!(file.task, "smartquota");
        assert_eq!(file.connection.onefs_host, "10.1.2.3");
        assert_eq!(file.connection.port_no, 8080);
        assert_eq!(file.params["path"], "/ifs/sample_fs");
    }

    #[test]
    fn test_load_yaml_task_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "snapshot.yaml",
            concat!(
                "task: snapshot\n",
                "connection:\n",
                "  onefs_host: fs.example.com\n",
                "  verify_ssl: true\n",
                "  api_user: admin\n",
                "  api_password: pw\n",
                "params:\n",
                "  snapshot_name: ansible_snapshot\n",
                "  state: present\n",
                "  path: /ifs/sample_fs\n",
                "  desired_retention: 2\n",
            ),
        );

        let file = load(&path).unwrap();
        assert_eq!(file.task, "snapshot");
        assert!(file.connection.verify_ssl);
        assert_eq!(file.params["desired_retention"], 2);
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "task.toml", "task = \"snapshot\"");
        let err = load(&path).unwrap_err();
        assert!(err.to_string().contains("unsupported task file extension"));
    }

    #[test]
    fn test_unknown_top_level_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "task.json",
            r#"{
                "task": "gatherfacts",
                "connection": {
                    "onefs_host": "10.1.2.3",
                    "verify_ssl": false,
                    "api_user": "admin",
                    "api_password": "pw"
                },
                "params": {},
                "become": true
            }"#,
        );
        assert!(load(&path).is_err());
    }

    #[test]
    fn test_missing_file_reports_path() {
        let err = load(Path::new("/nonexistent/task.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/task.json"));
    }
}
