// Command layer: runs one subcommand end to end against an `ApiClient`.
// Each command checks the repository first and stops at the first fatal
// problem. Asset uploads after a successful create are best effort.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, Release};
use crate::cli::{Command, CreateArgs, Target};
use crate::error::{ClientError, CommandError};

/// Run `command`. Release JSON for `get` is written to `out`.
pub fn run(client: &ApiClient, command: &Command, out: &mut dyn Write) -> Result<(), CommandError> {
    match command {
        Command::Get(target) => get(client, target, out),
        Command::Create(args) => create(client, args).map(|_| ()),
        Command::Delete(target) => delete(client, target),
    }
}

/// Print the release for `target` as indented, key-sorted JSON.
pub fn get(client: &ApiClient, target: &Target, out: &mut dyn Write) -> Result<(), CommandError> {
    let release = find_release(client, target)?;
    let value = serde_json::to_value(&release).context("Failed to encode release")?;
    writeln!(out, "{:#}", sort_keys(value)).context("Failed to write release")?;
    Ok(())
}

/// Create the release, then attach assets. Returns the number of assets
/// that were uploaded.
pub fn create(client: &ApiClient, args: &CreateArgs) -> Result<usize, CommandError> {
    let target = &args.target;
    let notes = read_notes(&args.notes)?;
    if let Some(missing) = args.assets.iter().find(|path| !path.is_file()) {
        return Err(CommandError::MissingAsset(missing.clone()));
    }

    check_repo(client, &target.repo)?;

    let name = args.name.as_deref().unwrap_or(&target.tag);
    let release = client
        .create_release(&target.repo, &target.tag, name, &notes)?
        .map_err(|failure| CommandError::Api {
            action: "create release",
            failure,
        })?;
    info!(id = release.id, tag = %release.tag_name, "release created");

    if args.assets.is_empty() {
        return Ok(0);
    }
    let uploaded = upload_assets(client, &target.repo, &release, &args.assets)?;
    info!("uploaded {uploaded} of {} assets", args.assets.len());
    Ok(uploaded)
}

/// Delete the release attached to the target tag.
pub fn delete(client: &ApiClient, target: &Target) -> Result<(), CommandError> {
    let release = find_release(client, target)?;
    client
        .delete_release(&target.repo, release.id)?
        .map_err(|failure| CommandError::Api {
            action: "delete release",
            failure,
        })?;
    info!(id = release.id, tag = %release.tag_name, "release deleted");
    Ok(())
}

fn check_repo(client: &ApiClient, repo: &str) -> Result<(), CommandError> {
    match client.repository_exists(repo)? {
        Ok(_) => {
            debug!(repo, "repository found");
            Ok(())
        }
        Err(failure) => {
            debug!(repo, status = %failure.status, "repository lookup failed");
            Err(CommandError::InvalidRepository(repo.to_string()))
        }
    }
}

fn find_release(client: &ApiClient, target: &Target) -> Result<Release, CommandError> {
    check_repo(client, &target.repo)?;
    client
        .get_release(&target.repo, &target.tag)?
        .map_err(|_| CommandError::ReleaseNotFound(target.tag.clone()))
}

fn read_notes(path: &Path) -> Result<String, CommandError> {
    let mut notes = String::new();
    if path == Path::new("-") {
        io::stdin()
            .read_to_string(&mut notes)
            .context("Failed to read release notes from stdin")?;
    } else {
        notes = fs::read_to_string(path)
            .with_context(|| format!("Failed to read release notes {}", path.display()))?;
    }
    Ok(notes)
}

fn upload_assets(
    client: &ApiClient,
    repo: &str,
    release: &Release,
    assets: &[PathBuf],
) -> Result<usize, CommandError> {
    // hidden automatically when stderr is not a terminal
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.enable_steady_tick(Duration::from_millis(100));

    let mut uploaded = 0;
    for (index, path) in assets.iter().enumerate() {
        spinner.set_message(format!(
            "Uploading {} ({}/{})",
            path.display(),
            index + 1,
            assets.len()
        ));
        match client.upload_asset(repo, release.id, path) {
            Ok(Ok(asset)) => {
                uploaded += 1;
                spinner.suspend(|| info!(asset = %asset.name, id = asset.id, "asset uploaded"));
            }
            Ok(Err(failure)) => spinner.suspend(|| {
                warn!(
                    path = %path.display(),
                    status = %failure.status,
                    "asset upload failed:\n{}",
                    failure.payload
                )
            }),
            Err(err @ (ClientError::AssetRead { .. } | ClientError::InvalidAssetPath(_))) => {
                spinner.finish_and_clear();
                return Err(err.into());
            }
            Err(err) => spinner.suspend(|| warn!(path = %path.display(), "asset upload failed: {err}")),
        }
    }
    spinner.finish_and_clear();
    Ok(uploaded)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}
