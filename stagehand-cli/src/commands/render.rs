//! `stagehand render <template>`: render one template to stdout.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde_json::Value;

use stagehand_core::{Context as RenderContext, Layer, Loader};
use stagehand_renderer::TemplateLoader;

/// Arguments for `stagehand render`.
#[derive(Args, Debug)]
pub struct RenderArgs {
    /// Template name relative to the search directories.
    pub template: String,

    /// Settings YAML file.
    #[arg(long, short)]
    pub settings: PathBuf,

    /// JSON object file to push as a context layer; repeat for more layers,
    /// later files override earlier ones.
    #[arg(long = "context", short = 'c')]
    pub contexts: Vec<PathBuf>,

    /// Force `template_debug` on and report each render on stderr.
    #[arg(long)]
    pub debug: bool,
}

impl RenderArgs {
    pub fn run(self) -> Result<()> {
        let mut settings = super::load_settings(&self.settings)?;
        if self.debug {
            settings.template_debug = true;
        }

        let loader = TemplateLoader::from_settings(&settings)
            .context("could not build the template environment")?;
        if settings.template_debug {
            loader.environment().template_rendered().connect(|event| {
                eprintln!(
                    "[debug] rendered {} with {} context layer(s)",
                    event.origin,
                    event.context.dicts().len()
                );
            });
        }

        let (template, _path) = loader
            .load_template(&self.template, None)
            .with_context(|| format!("could not load '{}'", self.template))?;

        let mut layers = Vec::with_capacity(self.contexts.len());
        for path in &self.contexts {
            layers.push(read_layer(path)?);
        }
        let context = RenderContext::from_layers(layers);

        let output = template
            .render(&context)
            .with_context(|| format!("could not render '{}'", self.template))?;

        let mut stdout = std::io::stdout().lock();
        stdout.write_all(output.as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}

fn read_layer(path: &Path) -> Result<Layer> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("could not read context file {}", path.display()))?;
    let value: Value = serde_json::from_str(&contents)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    match value {
        Value::Object(layer) => Ok(layer),
        _ => bail!("context file {} must hold a JSON object", path.display()),
    }
}
