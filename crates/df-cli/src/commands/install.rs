//! Install command implementation
//!
//! Projects that pin `coreVersion` have nothing to install: the core is
//! resolved when compile is called. Manifest projects get their installed
//! core package verified.

use anyhow::{bail, Context, Result};
use df_core::project::packages::{installed_core_version, CORE_PACKAGE};
use df_core::settings::SettingsSource;
use df_core::ProjectConfig;

use crate::cli::{GlobalArgs, InstallArgs};

/// Execute the install command
pub(crate) async fn execute(args: &InstallArgs, _global: &GlobalArgs) -> Result<()> {
    let root = &args.project_dir;
    let (source, path) = SettingsSource::locate(root)?;
    let config = ProjectConfig::load(&path)
        .with_context(|| format!("Failed to read {}", source.file_name()))?;

    if let Some(version) = &config.core_version {
        bail!(
            "No installation is needed when coreVersion {} is pinned in {}: installation is stateless and lazy, and happens when compile is called",
            version,
            source.file_name()
        );
    }

    let installed = installed_core_version(root)?;
    println!("{} {} is installed", CORE_PACKAGE, installed);
    Ok(())
}
