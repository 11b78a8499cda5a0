//! HTML rendering for the intake page.
//!
//! The page is a Tera template compiled once at startup. Its context is
//! built from the form state with serde, and every value goes through Tera's
//! HTML autoescaping.

use crate::form::{fields_to_json, FieldSpec, FormState, InputSpec, SYMPTOMS, VITALS};
use fluradar_domain::{CanonicalField, CanonicalFieldSet, FieldKind, NumberKind, YesNo};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

/// Page title
pub const TITLE: &str = "Flu Radar";

/// Shown instead of a result when fields are missing or invalid
pub const PROMPT: &str =
    "Please complete the required clinical fields to see the predicted probability.";

const TEMPLATE_NAME: &str = "intake.html";
const TEMPLATE: &str = include_str!("../templates/intake.html");

/// Page rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    /// Template could not be compiled
    #[error("template parse error: {0}")]
    TemplateParse(String),

    /// Template could not be rendered
    #[error("template rendering failed: {0}")]
    TemplateRender(String),

    /// Context could not be serialized
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<tera::Error> for RenderError {
    fn from(e: tera::Error) -> Self {
        RenderError::TemplateRender(e.to_string())
    }
}

/// What the top of the page shows
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Scorer answered
    Probability(f64),

    /// Some field is missing or out of range
    Incomplete,

    /// Scorer could not be reached or answered badly
    ScoringFailed(String),
}

/// Everything needed to render the intake page
#[derive(Debug)]
pub struct Page<'a> {
    /// Field values and problems
    pub form: &'a FormState,
    /// Result area
    pub outcome: Outcome,
    /// Fetched data, when a fetch was requested
    pub fetched: Option<&'a CanonicalFieldSet>,
    /// Token to echo back
    pub token: &'a str,
    /// Observation URL to echo back
    pub observation_url: &'a str,
}

#[derive(Serialize)]
struct PageContext<'a> {
    title: &'static str,
    prompt: &'static str,
    probability: Option<String>,
    scoring_error: Option<String>,
    fetched_json: Option<String>,
    columns: Vec<ColumnContext>,
    token: &'a str,
    observation_url: &'a str,
}

#[derive(Serialize)]
struct ColumnContext {
    heading: &'static str,
    fields: Vec<FieldContext>,
}

#[derive(Serialize)]
struct FieldContext {
    key: &'static str,
    label: &'static str,
    select: bool,
    options: Vec<OptionContext>,
    min: String,
    max: String,
    step: &'static str,
    value: String,
    problem: Option<String>,
}

#[derive(Serialize)]
struct OptionContext {
    value: &'static str,
    selected: bool,
}

/// Compiled intake page template
#[derive(Debug)]
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    /// Compile the built-in template
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_template(TEMPLATE_NAME, TEMPLATE)
            .map_err(|e| RenderError::TemplateParse(e.to_string()))?;
        Ok(Self { tera })
    }

    /// Render the full page
    pub fn render(&self, page: &Page<'_>) -> Result<String, RenderError> {
        let value = serde_json::to_value(page_context(page)?)?;
        let context =
            Context::from_value(value).map_err(|e| RenderError::TemplateRender(e.to_string()))?;

        let rendered = self.tera.render(TEMPLATE_NAME, &context)?;
        Ok(rendered)
    }
}

fn page_context<'a>(page: &Page<'a>) -> Result<PageContext<'a>, RenderError> {
    let (probability, scoring_error) = match &page.outcome {
        Outcome::Probability(p) => (Some(format!("{:.2}", p)), None),
        Outcome::Incomplete => (None, None),
        Outcome::ScoringFailed(reason) => (None, Some(reason.clone())),
    };

    let fetched_json = page
        .fetched
        .map(|fetched| serde_json::to_string_pretty(&fields_to_json(fetched)))
        .transpose()?;

    Ok(PageContext {
        title: TITLE,
        prompt: PROMPT,
        probability,
        scoring_error,
        fetched_json,
        columns: vec![
            column("Vitals & Timing", &VITALS, page.form),
            column("Symptoms & History", &SYMPTOMS, page.form),
        ],
        token: page.token,
        observation_url: page.observation_url,
    })
}

fn column(heading: &'static str, fields: &[CanonicalField], form: &FormState) -> ColumnContext {
    ColumnContext {
        heading,
        fields: fields.iter().map(|field| field_context(*field, form)).collect(),
    }
}

fn field_context(field: CanonicalField, form: &FormState) -> FieldContext {
    let widget = FieldSpec::of(field);
    let value = form.display_value(field);

    let (select, min, max) = match widget.input {
        InputSpec::Number { min, max, .. } => (false, min.to_string(), max.to_string()),
        InputSpec::YesNo => (true, String::new(), String::new()),
    };

    let options = if select {
        [YesNo::No, YesNo::Yes]
            .into_iter()
            .map(|option| OptionContext {
                value: option.as_str(),
                selected: value == option.as_str(),
            })
            .collect()
    } else {
        Vec::new()
    };

    // Decimal widgets accept any precision
    let step = match field.kind() {
        FieldKind::Numeric(NumberKind::Integer) => "1",
        _ => "any",
    };

    FieldContext {
        key: field.key(),
        label: widget.label,
        select,
        options,
        min,
        max,
        step,
        value,
        problem: form.problem(field).map(|problem| problem.to_string()),
    }
}
