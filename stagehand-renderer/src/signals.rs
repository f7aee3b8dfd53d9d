//! `template_rendered` debug notification.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use stagehand_core::Context;

use crate::template::Template;

/// Ties a render back to the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    pub name: String,
    pub path: PathBuf,
}

impl Origin {
    pub fn new(name: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self {
            name: name.into(),
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.path.display())
    }
}

/// Payload delivered to receivers, before the template is rendered.
pub struct TemplateRendered<'a> {
    pub template: &'a Template,
    pub origin: &'a Origin,
    /// The layered context as the host passed it, not the flattened one.
    pub context: &'a Context,
}

type Receiver = Arc<dyn Fn(&TemplateRendered<'_>) + Send + Sync>;

/// Fan-out of [`TemplateRendered`] events to connected receivers.
#[derive(Default)]
pub struct TemplateRenderedSignal {
    receivers: RwLock<Vec<Receiver>>,
}

impl TemplateRenderedSignal {
    pub fn connect<F>(&self, receiver: F)
    where
        F: Fn(&TemplateRendered<'_>) + Send + Sync + 'static,
    {
        let mut receivers = self.receivers.write().unwrap_or_else(|e| e.into_inner());
        receivers.push(Arc::new(receiver));
    }

    /// Call every receiver in connection order; returns how many were called.
    ///
    /// Receivers run without the lock held, so they may connect further
    /// receivers. Those join from the next send on.
    pub fn send(&self, event: &TemplateRendered<'_>) -> usize {
        let receivers: Vec<Receiver> = self
            .receivers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        for receiver in &receivers {
            receiver(event);
        }
        receivers.len()
    }

    pub fn receiver_count(&self) -> usize {
        self.receivers.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl fmt::Debug for TemplateRenderedSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateRenderedSignal")
            .field("receivers", &self.receiver_count())
            .finish()
    }
}
