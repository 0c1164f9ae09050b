use std::{
    collections::HashMap,
    sync::LazyLock,
};

use regex::{Captures, Regex};
use tracing::{debug, warn};

use crate::models::{
    message::NotificationKind,
    template::{Template, default_attendance_templates},
};

pub type Variables = HashMap<String, serde_json::Value>;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("placeholder pattern is valid")
});

/// Replaces `{name}` placeholders in a single pass.
///
/// Substituted values are not scanned again. Placeholders without a value are
/// left as written.
pub fn render(template: &str, variables: &Variables) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| match variables.get(&caps[1]) {
            Some(value) => value_to_text(value),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn value_to_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Number(n) => n.to_string(),
        serde_json::Value::Bool(b) => b.to_string(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub struct TemplateRenderer {
    templates: HashMap<NotificationKind, Template>,
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(default_attendance_templates())
    }
}

impl TemplateRenderer {
    pub fn new(templates: Vec<Template>) -> Self {
        let templates = templates
            .into_iter()
            .map(|template| (template.kind, template))
            .collect();

        Self { templates }
    }

    pub fn template_for(&self, kind: NotificationKind) -> Option<&Template> {
        self.templates.get(&kind).filter(|template| template.active)
    }

    pub fn upsert(&mut self, template: Template) {
        self.templates.insert(template.kind, template);
    }

    pub fn render_kind(&self, kind: NotificationKind, variables: &Variables) -> Option<String> {
        let Some(template) = self.template_for(kind) else {
            warn!(%kind, "No active template for notification kind");
            return None;
        };

        debug!(
            template = %template.name,
            variable_count = variables.len(),
            "Rendering template"
        );

        Some(render(&template.body, variables))
    }
}
