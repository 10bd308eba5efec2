use crate::error::Error;
use crate::sync::naming::title_case;
use ahash::AHashMap;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error as ThisError;
use tracing::debug;

lazy_static! {
    static ref PLACEHOLDER: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*(?:\|\s*([A-Za-z_]+)\s*)?\}\}")
            .expect("placeholder pattern is valid");
}

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no template named '{0}'")]
    MissingTemplate(String),

    #[error("template '{template}' references unknown field '{field}'")]
    UnknownField { template: String, field: String },

    #[error("template '{template}' uses unknown filter '{filter}'")]
    UnknownFilter { template: String, filter: String },

    #[error("template '{template}' has a malformed placeholder")]
    Malformed { template: String },
}

/// Named values a template is rendered against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct View {
    fields: BTreeMap<&'static str, String>,
}

impl View {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &'static str, value: impl Into<String>) -> Self {
        self.fields.insert(field, value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }
}

/// Turns a named view into file bytes.
pub trait Renderer {
    fn render(&self, template: &str, view: &View) -> Result<Vec<u8>, RenderError>;
}

impl<F> Renderer for F
where
    F: Fn(&str, &View) -> Result<Vec<u8>, RenderError>,
{
    fn render(&self, template: &str, view: &View) -> Result<Vec<u8>, RenderError> {
        self(template, view)
    }
}

/// Placeholder templates: `{{ field }}` and `{{ field | title_case }}`.
#[derive(Debug, Default, Clone)]
pub struct TemplateRenderer {
    templates: AHashMap<String, String>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }

    /// Load every `<name>.md` file in a directory as template `<name>`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, Error> {
        let mut renderer = TemplateRenderer::new();
        for entry in fs::read_dir(dir.as_ref())? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("md") {
                continue;
            }
            if let Some(name) = path.file_stem().and_then(|stem| stem.to_str()) {
                let text = fs::read_to_string(&path)?;
                debug!("Loaded template '{}' from {}", name, path.display());
                renderer.templates.insert(name.to_string(), text);
            }
        }
        Ok(renderer)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }
}

fn literal<'t>(template: &str, segment: &'t str) -> Result<&'t str, RenderError> {
    if segment.contains("{{") {
        return Err(RenderError::Malformed {
            template: template.to_string(),
        });
    }
    Ok(segment)
}

impl Renderer for TemplateRenderer {
    fn render(&self, template: &str, view: &View) -> Result<Vec<u8>, RenderError> {
        let text = self
            .templates
            .get(template)
            .ok_or_else(|| RenderError::MissingTemplate(template.to_string()))?;

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for caps in PLACEHOLDER.captures_iter(text) {
            let Some(whole) = caps.get(0) else { continue };
            out.push_str(literal(template, &text[last..whole.start()])?);

            let field = &caps[1];
            let value = view.get(field).ok_or_else(|| RenderError::UnknownField {
                template: template.to_string(),
                field: field.to_string(),
            })?;

            match caps.get(2).map(|filter| filter.as_str()) {
                None => out.push_str(value),
                Some("title_case") => out.push_str(&title_case(value)),
                Some(other) => {
                    return Err(RenderError::UnknownFilter {
                        template: template.to_string(),
                        filter: other.to_string(),
                    })
                }
            }
            last = whole.end();
        }
        out.push_str(literal(template, &text[last..])?);

        Ok(out.into_bytes())
    }
}
