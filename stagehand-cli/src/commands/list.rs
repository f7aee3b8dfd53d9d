//! `stagehand list`: show every template name the loader resolves.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use stagehand_renderer::init;

/// Arguments for `stagehand list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Settings YAML file.
    #[arg(long, short)]
    pub settings: PathBuf,

    /// Also print the resolved source path of each template.
    #[arg(long)]
    pub paths: bool,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let settings = super::load_settings(&self.settings)?;
        let env = init(&settings).context("could not build the template environment")?;

        let mut count = 0;
        for name in env.template_names() {
            count += 1;
            match env.template_path(name).filter(|_| self.paths) {
                Some(path) => println!("{name}\t{}", path.display()),
                None => println!("{name}"),
            }
        }
        if count == 0 {
            println!("No templates found. Check `template_dirs` in {}.", self.settings.display());
        }
        Ok(())
    }
}
