// SPDX-License-Identifier: GPL-3.0-only

//! Task dispatch: map a task name onto its implementation

use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use onefs_papi::PapiClient;
use onefs_tasks::tasks::{self, accesszone, filesystem, gatherfacts, nfs, smartquota, snapshot};

use crate::taskfile::TaskFile;

/// Execute the task a file describes and return its report document.
pub async fn execute(file: &TaskFile) -> Result<Value> {
    if !tasks::NAMES.contains(&file.task.as_str()) {
        bail!(
            "unknown task {:?}; available tasks: {}",
            file.task,
            tasks::NAMES.join(", ")
        );
    }

    let client = PapiClient::connect(&file.connection)
        .with_context(|| format!("connect to {}", file.connection.onefs_host))?;

    match file.task.as_str() {
        "accesszone" => {
            let params: accesszone::AccessZoneParams = parse_params(&file.params)?;
            report(accesszone::run(&client, &params).await?)
        }
        "filesystem" => {
            let params: filesystem::FilesystemParams = parse_params(&file.params)?;
            report(filesystem::run(&client, &params).await?)
        }
        "gatherfacts" => {
            let params: gatherfacts::GatherFactsParams = parse_params(&file.params)?;
            report(gatherfacts::run(&client, &params).await?)
        }
        "nfs" => {
            let params: nfs::NfsExportParams = parse_params(&file.params)?;
            report(nfs::run(&client, &params).await?)
        }
        "smartquota" => {
            let params: smartquota::SmartQuotaParams = parse_params(&file.params)?;
            report(smartquota::run(&client, &params).await?)
        }
        "snapshot" => {
            let params: snapshot::SnapshotParams = parse_params(&file.params)?;
            report(snapshot::run(&client, &params).await?)
        }
        // Guarded by the NAMES check above
        other => bail!("unknown task {other:?}"),
    }
}

fn parse_params<T: DeserializeOwned>(params: &Value) -> Result<T> {
    serde_json::from_value(params.clone()).context("invalid task params")
}

fn report<T: Serialize>(report: T) -> Result<Value> {
    serde_json::to_value(report).context("serialize task report")
}
