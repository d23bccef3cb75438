//! Template renderer for jgen.
//! Wraps a MiniJinja environment configured with jgen's delimiters, search
//! path, filters and whitespace rules.
use crate::config::{has_extension, Delimiters, EngineConfig};
use crate::data::Namespace;
use crate::error::{Error, Result};
use crate::filters::FilterRegistry;
use crate::loader::SearchPath;
use crate::references::{collect_references, Reference, ReferenceKind};
use log::debug;
use minijinja::{context, AutoEscape, Environment, ErrorKind, Value};
use std::fs;

/// Trait for template rendering engines.
pub trait TemplateRenderer {
    /// Renders the template named `template_name` with `namespace` bound as `data`.
    ///
    /// # Arguments
    /// * `template_name` - Name resolved against the search path
    /// * `namespace` - Data exposed to the template as `data`
    ///
    /// # Returns
    /// * `Result<String>` - The rendered text
    ///
    /// # Errors
    /// * `Error::TemplateNotFound` if the template or an include is missing
    /// * `Error::TemplateSyntaxError` on malformed directives or unknown filters
    fn render(&self, template_name: &str, namespace: &Namespace) -> Result<String>;
}

/// MiniJinja-based template rendering engine.
///
/// The environment is fully configured on construction and only read
/// afterwards, so one renderer can serve concurrent renders.
pub struct MiniJinjaRenderer {
    env: Environment<'static>,
    delimiters: Delimiters,
    filters: FilterRegistry,
    search_path: SearchPath,
    keep_trailing_newline: bool,
}

impl MiniJinjaRenderer {
    /// Builds a renderer from `config`.
    ///
    /// # Arguments
    /// * `config` - Delimiters, search path, filters and whitespace flags
    ///
    /// # Returns
    /// * `Result<MiniJinjaRenderer>` - A renderer ready for any number of renders
    ///
    /// # Errors
    /// * `Error::ConfigError` if the delimiters are invalid
    pub fn new(config: &EngineConfig) -> Result<Self> {
        let mut env = Environment::new();
        env.set_syntax(config.delimiters.to_syntax_config()?);
        env.set_trim_blocks(config.trim_blocks);
        env.set_keep_trailing_newline(config.keep_trailing_newline);

        let extensions = config.autoescape_extensions.clone();
        env.set_auto_escape_callback(move |name| {
            if has_extension(name, &extensions) {
                AutoEscape::Html
            } else {
                AutoEscape::None
            }
        });

        let search_path = config.search_path.clone();
        env.set_loader(move |name| {
            search_path.load(name).map_err(|e| {
                minijinja::Error::new(
                    ErrorKind::InvalidOperation,
                    format!("could not read template {name:?}"),
                )
                .with_source(e)
            })
        });

        config.filters.register(&mut env);

        Ok(Self {
            env,
            delimiters: config.delimiters.clone(),
            filters: config.filters.clone(),
            search_path: config.search_path.clone(),
            keep_trailing_newline: config.keep_trailing_newline,
        })
    }

    /// Whether the environment knows the filter or test `reference` names.
    fn is_defined(&self, reference: &Reference<'_>) -> bool {
        if reference.kind == ReferenceKind::Filter && self.filters.contains(reference.name) {
            return true;
        }
        let (start, end) = (&self.delimiters.variable_start, &self.delimiters.variable_end);
        let lookup = match reference.kind {
            ReferenceKind::Filter => format!("{start}none|{}{end}", reference.name),
            ReferenceKind::Test => format!("{start}none is {}{end}", reference.name),
        };
        !matches!(
            self.env.render_str(&lookup, context! {}),
            Err(err) if matches!(err.kind(), ErrorKind::UnknownFilter | ErrorKind::UnknownTest)
        )
    }

    /// Rejects filters and tests the environment does not define.
    ///
    /// MiniJinja only looks names up when an instruction runs, so this covers
    /// branches that never execute.
    ///
    /// # Errors
    /// * `Error::TemplateSyntaxError` naming the first unknown filter or test
    fn check_references(&self, template_name: &str, source: &str) -> Result<()> {
        for reference in collect_references(source, &self.delimiters) {
            if self.is_defined(&reference) {
                continue;
            }
            let kind = match reference.kind {
                ReferenceKind::Filter => "filter",
                ReferenceKind::Test => "test",
            };
            return Err(Error::TemplateSyntaxError {
                name: template_name.to_string(),
                line: reference.line,
                message: format!("unknown {kind} (no {kind} named '{}')", reference.name),
            });
        }
        Ok(())
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    /// Renders the top-level template found on the search path.
    ///
    /// A source ending in a newline always yields output ending in a newline,
    /// even when that newline directly follows a block tag and is trimmed.
    fn render(&self, template_name: &str, namespace: &Namespace) -> Result<String> {
        let path = self.search_path.resolve(template_name).ok_or_else(|| {
            Error::TemplateNotFound(format!(
                "template {template_name:?} does not exist on the search path"
            ))
        })?;
        debug!("Rendering template {}", path.display());

        let source = fs::read_to_string(&path)?;
        self.check_references(template_name, &source)?;
        let ctx = context! { data => Value::from_serialize(namespace) };
        let mut rendered = self.env.render_named_str(template_name, &source, ctx)?;

        if self.keep_trailing_newline && source.ends_with('\n') && !rendered.ends_with('\n') {
            rendered.push('\n');
        }
        Ok(rendered)
    }
}
