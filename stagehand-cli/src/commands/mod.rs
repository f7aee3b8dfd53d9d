pub mod list;
pub mod render;

use std::path::Path;

use anyhow::{Context, Result};
use stagehand_core::Settings;

/// Read the settings file named on the command line.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    let settings = Settings::load(path)
        .with_context(|| format!("could not load settings from {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        template_dirs = settings.template_dirs.len(),
        debug = settings.template_debug,
        "settings loaded"
    );
    Ok(settings)
}
