//! The long-lived template [`Environment`].
//!
//! Built once from [`Settings`] and shared behind an `Arc`:
//!
//! | Piece              | Source                                          |
//! |--------------------|-------------------------------------------------|
//! | templates          | every file under `template_dirs`, first dir wins |
//! | autoescape         | [`AutoescapePolicy`] from `template_autoescape` |
//! | extensions         | built-ins, then `extensions` from settings      |
//! | `update_querystring` | filter                                        |
//! | `url_for`          | function backed by the [`UrlResolver`]          |
//! | `asset_url`        | function backed by [`AssetsEnvironment`]        |
//! | `MEDIA_URL`, `STATIC_URL` | globals                                  |

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tera::Tera;

use stagehand_core::{Context, Layer, Settings, UrlConf, UrlResolver};

use crate::assets::{AssetUrl, AssetsEnvironment};
use crate::autoescape::AutoescapePolicy;
use crate::context::to_tera_context;
use crate::error::{io_err, RenderError};
use crate::extensions::{Extension, ExtensionContext, ExtensionRegistry, ReverseUrl};
use crate::filters::UpdateQuerystring;
use crate::signals::TemplateRenderedSignal;
use crate::template::Template;

// ---------------------------------------------------------------------------
// Template discovery
// ---------------------------------------------------------------------------

fn template_name(relative: &Path) -> String {
    relative.to_string_lossy().replace('\\', "/")
}

fn collect_template_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), RenderError> {
    let entries = std::fs::read_dir(dir).map_err(|e| io_err(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        let path = entry.path();
        // Symlinks are neither files nor directories here, so loops cannot recurse.
        let meta = entry.metadata().map_err(|e| io_err(&path, e))?;
        if meta.is_dir() {
            collect_template_files(&path, out)?;
        } else if meta.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Walk `dirs` in order. A name already found in an earlier directory
/// shadows later ones.
fn discover_templates(dirs: &[PathBuf]) -> Result<BTreeMap<String, PathBuf>, RenderError> {
    let mut index = BTreeMap::new();
    for dir in dirs {
        if !dir.is_dir() {
            tracing::debug!(dir = %dir.display(), "template directory missing, skipped");
            continue;
        }
        let mut files = Vec::new();
        collect_template_files(dir, &mut files)?;
        files.sort();
        for path in files {
            let relative = path.strip_prefix(dir).unwrap_or(path.as_path());
            index.entry(template_name(relative)).or_insert(path);
        }
    }
    Ok(index)
}

/// Templates that failed to read, translate or compile, by name.
type Broken = BTreeMap<String, Arc<RenderError>>;

/// Read every indexed file and run the extension preprocessors over it.
/// Files that are not UTF-8 are dropped from `index`; read and preprocess
/// failures are recorded in `broken` against that name only.
fn load_sources(
    index: &mut BTreeMap<String, PathBuf>,
    extensions: &[Arc<dyn Extension>],
    broken: &mut Broken,
) -> Vec<(String, String)> {
    let mut sources = Vec::with_capacity(index.len());
    let mut skipped = Vec::new();
    'templates: for (name, path) in index.iter() {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                broken.insert(name.clone(), Arc::new(io_err(path, e)));
                continue;
            }
        };
        let Ok(mut source) = String::from_utf8(bytes) else {
            tracing::debug!(template = %name, path = %path.display(), "not UTF-8, skipped");
            skipped.push(name.clone());
            continue;
        };
        for extension in extensions {
            match extension.preprocess(name, &source) {
                Ok(Some(rewritten)) => source = rewritten,
                Ok(None) => {}
                Err(err) => {
                    broken.insert(name.clone(), Arc::new(err));
                    continue 'templates;
                }
            }
        }
        sources.push((name.clone(), source));
    }
    for name in skipped {
        index.remove(&name);
    }
    sources
}

/// Parse each source on its own and keep the ones Tera can build together.
///
/// A template is rejected when it fails to parse, or when its parent or a
/// macro file it imports is rejected or absent. Rejection spreads down
/// inheritance chains until nothing changes.
fn check_sources(sources: Vec<(String, String)>, broken: &mut Broken) -> Vec<(String, String)> {
    let mut parsed = BTreeMap::new();
    for (name, source) in sources {
        match tera::Template::new(&name, None, &source) {
            Ok(template) => {
                parsed.insert(name, (template, source));
            }
            Err(err) => {
                let err = tera::Error::chain(format!("Failed to parse '{name}'"), err);
                broken.insert(name, Arc::new(RenderError::Tera(err)));
            }
        }
    }

    loop {
        let rejected: Vec<(String, String)> = parsed
            .iter()
            .filter_map(|(name, (template, _))| {
                unmet_dependency(name, template, &parsed).map(|why| (name.clone(), why))
            })
            .collect();
        if rejected.is_empty() {
            break;
        }
        for (name, why) in rejected {
            parsed.remove(&name);
            broken.insert(name, Arc::new(RenderError::Tera(tera::Error::msg(why))));
        }
    }

    parsed
        .into_iter()
        .map(|(name, (_, source))| (name, source))
        .collect()
}

fn unmet_dependency(
    name: &str,
    template: &tera::Template,
    parsed: &BTreeMap<String, (tera::Template, String)>,
) -> Option<String> {
    if let Some(parent) = template.parent.as_deref() {
        if !parsed.contains_key(parent) {
            return Some(format!("'{name}' extends '{parent}', which is missing or broken"));
        }
        let mut seen = BTreeSet::new();
        let mut current = Some(parent);
        while let Some(ancestor) = current {
            if ancestor == name {
                return Some(format!("'{name}' is part of a circular extends chain"));
            }
            if !seen.insert(ancestor) {
                break;
            }
            current = parsed.get(ancestor).and_then(|(t, _)| t.parent.as_deref());
        }
    }
    template
        .imported_macro_files
        .iter()
        .find(|(file, _)| !parsed.contains_key(file))
        .map(|(file, _)| format!("'{name}' imports macros from '{file}', which is missing or broken"))
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// Engine instance plus everything configured around it.
pub struct Environment {
    tera: Tera,
    index: BTreeMap<String, PathBuf>,
    broken: Broken,
    globals: Layer,
    policy: AutoescapePolicy,
    extension_ids: Vec<String>,
    assets: Arc<AssetsEnvironment>,
    debug: bool,
    template_rendered: TemplateRenderedSignal,
}

impl Environment {
    /// Build from `settings` with a [`UrlConf`] over `settings.urls` and the
    /// built-in extension registry.
    pub fn from_settings(settings: &Settings) -> Result<Arc<Self>, RenderError> {
        let resolver = Arc::new(UrlConf::new(settings.urls.clone()));
        Self::new(settings, resolver, &ExtensionRegistry::with_builtins())
    }

    /// Build with an explicit resolver and extension registry.
    pub fn new(
        settings: &Settings,
        resolver: Arc<dyn UrlResolver>,
        registry: &ExtensionRegistry,
    ) -> Result<Arc<Self>, RenderError> {
        let policy = AutoescapePolicy::new(settings.template_autoescape);
        let extensions = registry.resolve_with_builtins(&settings.extensions)?;
        let assets = Arc::new(AssetsEnvironment::new(
            settings.assets_root.clone(),
            settings.assets_url.clone(),
        ));

        let mut tera = Tera::default();
        tera.autoescape_on(policy.tera_suffixes());

        let cx = ExtensionContext {
            resolver: Arc::clone(&resolver),
        };
        for extension in &extensions {
            extension.register(&mut tera, &cx);
        }
        tera.register_filter("update_querystring", UpdateQuerystring);
        tera.register_function("url_for", ReverseUrl::new("url_for", resolver));
        tera.register_function("asset_url", AssetUrl(Arc::clone(&assets)));

        let mut index = discover_templates(&settings.template_dirs)?;
        let mut broken = Broken::new();
        let sources = load_sources(&mut index, &extensions, &mut broken);
        let sources = check_sources(sources, &mut broken);
        tera.add_raw_templates(sources)?;
        for (name, err) in &broken {
            tracing::warn!(template = %name, error = %err, "template cannot be compiled");
        }
        tracing::debug!(
            templates = index.len(),
            broken = broken.len(),
            "template environment ready"
        );

        let mut globals = Layer::new();
        globals.insert("MEDIA_URL".to_string(), Value::String(settings.media_url.clone()));
        globals.insert("STATIC_URL".to_string(), Value::String(settings.static_url.clone()));

        Ok(Arc::new(Environment {
            tera,
            index,
            broken,
            globals,
            policy,
            extension_ids: extensions.iter().map(|e| e.id().to_string()).collect(),
            assets,
            debug: settings.template_debug,
            template_rendered: TemplateRenderedSignal::default(),
        }))
    }

    /// Resolve `name` to a compiled template.
    ///
    /// Returns [`RenderError::TemplateNotFound`] when the engine has no such
    /// template and [`RenderError::Compile`] when this template (and only
    /// this one) failed to build; any other engine error is passed through.
    pub fn get_template(self: &Arc<Self>, name: &str) -> Result<Template, RenderError> {
        if let Some(source) = self.broken.get(name) {
            return Err(RenderError::Compile {
                name: name.to_string(),
                source: Arc::clone(source),
            });
        }
        if let Err(err) = self.tera.get_template(name) {
            return Err(match err.kind {
                tera::ErrorKind::TemplateNotFound(_) => RenderError::TemplateNotFound {
                    name: name.to_string(),
                },
                _ => RenderError::Tera(err),
            });
        }
        let path = self
            .index
            .get(name)
            .cloned()
            .ok_or_else(|| RenderError::TemplateNotFound {
                name: name.to_string(),
            })?;
        Ok(Template::new(Arc::clone(self), name.to_string(), path))
    }

    /// Look up and render `name` in one step.
    pub fn render(self: &Arc<Self>, name: &str, context: &Context) -> Result<String, RenderError> {
        self.get_template(name)?.render(context)
    }

    /// Known template names, sorted.
    pub fn template_names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Resolved source path of `name`.
    pub fn template_path(&self, name: &str) -> Option<&Path> {
        self.index.get(name).map(PathBuf::as_path)
    }

    pub fn globals(&self) -> &Layer {
        &self.globals
    }

    pub fn autoescape(&self) -> AutoescapePolicy {
        self.policy
    }

    /// Identifiers of the applied extensions, in application order.
    pub fn extension_ids(&self) -> &[String] {
        &self.extension_ids
    }

    pub fn assets(&self) -> &AssetsEnvironment {
        &self.assets
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Signal fired once per render while `template_debug` is on.
    pub fn template_rendered(&self) -> &TemplateRenderedSignal {
        &self.template_rendered
    }

    pub(crate) fn render_flat(&self, name: &str, context: &Context) -> Result<String, RenderError> {
        let tera_ctx = to_tera_context(&self.globals, context)?;
        Ok(self.tera.render(name, &tera_ctx)?)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("templates", &self.index.len())
            .field("broken", &self.broken.keys().collect::<Vec<_>>())
            .field("autoescape", &self.policy)
            .field("extensions", &self.extension_ids)
            .field("assets", &self.assets)
            .field("debug", &self.debug)
            .finish()
    }
}
