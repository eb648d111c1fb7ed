//! Embedded Tera templates for printable reports and starter plans

use chrono::{DateTime, Utc};
use miette::Diagnostic;
use rust_embed::Embed;
use tera::Tera;
use thiserror::Error;

use crate::sampling::{CalculationInput, CalculationResult, HOURS_PER_MAN_DAY};

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

const REPORT_TEMPLATE: &str = "report.md.tera";
const PLAN_TEMPLATE: &str = "plan.yaml.tera";

/// Everything the printable report shows
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub input: &'a CalculationInput,
    pub result: &'a CalculationResult,
    pub custom_name: Option<&'a str>,
    pub generated: DateTime<Utc>,
}

impl<'a> ReportContext<'a> {
    pub fn new(input: &'a CalculationInput, result: &'a CalculationResult) -> Self {
        Self {
            input,
            result,
            custom_name: None,
            generated: Utc::now(),
        }
    }
}

/// Template errors
#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    #[diagnostic(code(inspcalc::template::not_found))]
    NotFound(String),

    #[error("Template rendering error: {0}")]
    #[diagnostic(code(inspcalc::template::render))]
    RenderError(String),
}

/// Renders the embedded templates
pub struct TemplateGenerator {
    tera: Tera,
}

impl TemplateGenerator {
    /// Create a new template generator with embedded templates
    pub fn new() -> Result<Self, TemplateError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                if let Ok(template_str) = std::str::from_utf8(&content.data) {
                    tera.add_raw_template(filename, template_str)
                        .map_err(|e| TemplateError::RenderError(e.to_string()))?;
                }
            }
        }

        Ok(Self { tera })
    }

    fn render(&self, name: &str, context: &tera::Context) -> Result<String, TemplateError> {
        if !self.tera.get_template_names().any(|n| n == name) {
            return Err(TemplateError::NotFound(name.to_string()));
        }
        self.tera
            .render(name, context)
            .map_err(|e| TemplateError::RenderError(error_chain(&e)))
    }

    /// Printable Markdown report for one calculation
    pub fn render_report(&self, ctx: &ReportContext<'_>) -> Result<String, TemplateError> {
        let mut context = tera::Context::new();
        context.insert("input", ctx.input);
        context.insert("result", ctx.result);
        context.insert("factory_name", &ctx.input.factory_name);
        context.insert("custom_name", &ctx.custom_name);
        context.insert("generated", &ctx.generated.format("%Y-%m-%d %H:%M UTC").to_string());
        context.insert("hours_per_day", &HOURS_PER_MAN_DAY);

        self.render(REPORT_TEMPLATE, &context)
    }

    /// Starter plan file pre-filled with `defaults`
    pub fn render_plan(
        &self,
        defaults: &CalculationInput,
        filename: &str,
    ) -> Result<String, TemplateError> {
        let mut context = tera::Context::new();
        context.insert("filename", filename);
        context.insert("inspection_level", defaults.inspection_level.as_str());
        context.insert("aql_major", defaults.aql_major.as_str());
        context.insert("aql_minor", defaults.aql_minor.as_str());
        context.insert("preparation_time_minutes", &defaults.preparation_time_minutes);
        context.insert("sampling_time_minutes", &defaults.sampling_time_minutes);
        context.insert(
            "inspection_time_per_unit_minutes",
            &defaults.inspection_time_per_unit_minutes,
        );
        context.insert("packing_check_time_minutes", &defaults.packing_check_time_minutes);
        context.insert("report_time_minutes", &defaults.report_time_minutes);
        context.insert("travel_time_minutes", &defaults.travel_time_minutes);

        self.render(PLAN_TEMPLATE, &context)
    }
}

/// Tera nests the useful message in the error source chain
fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
