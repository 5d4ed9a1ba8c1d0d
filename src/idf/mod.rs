//! Input file formatter.
//!
//! Objects are built as class + ordered fields, then rendered through a single
//! function so every object gets the same separators and terminator: fields are
//! comma-separated, the last one ends with a semicolon, each field carries a `!-`
//! comment naming it.

pub mod objects;
pub mod schema;

use crate::error::ValidationError;
use crate::validate::ValidatedModel;
use tracing::debug;

/// Column at which field comments start.
const COMMENT_COLUMN: usize = 30;

const INDENT: &str = "    ";

#[derive(Debug, Clone, PartialEq)]
struct Field {
    value: String,
    comment: String,
}

/// One object of the input file.
#[derive(Debug, Clone, PartialEq)]
pub struct IdfObject {
    pub class: &'static str,
    fields: Vec<Field>,
}

impl IdfObject {
    pub fn new(class: &'static str) -> Self {
        Self {
            class,
            fields: Vec::new(),
        }
    }

    pub fn text(mut self, value: impl Into<String>, comment: &str) -> Self {
        self.push(value, comment);
        self
    }

    pub fn num(mut self, value: f64, comment: &str) -> Self {
        self.push(fmt_num(value), comment);
        self
    }

    pub fn blank(mut self, comment: &str) -> Self {
        self.push("", comment);
        self
    }

    pub fn push(&mut self, value: impl Into<String>, comment: impl Into<String>) {
        self.fields.push(Field {
            value: value.into(),
            comment: comment.into(),
        });
    }

    pub fn push_num(&mut self, value: f64, comment: impl Into<String>) {
        self.push(fmt_num(value), comment);
    }

    /// First field, which names the object for every named class.
    pub fn name(&self) -> Option<&str> {
        self.fields.first().map(|f| f.value.as_str())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.value.as_str())
    }

    /// Appends the rendered object followed by an empty line.
    pub fn render(&self, out: &mut String) {
        if self.fields.is_empty() {
            out.push_str(self.class);
            out.push_str(";\n\n");
            return;
        }
        out.push_str(self.class);
        out.push_str(",\n");
        let last = self.fields.len() - 1;
        for (i, f) in self.fields.iter().enumerate() {
            let sep = if i == last { ';' } else { ',' };
            let body = format!("{INDENT}{}{sep}", f.value);
            let pad = COMMENT_COLUMN.saturating_sub(body.chars().count()).max(2);
            out.push_str(&body);
            out.push_str(&" ".repeat(pad));
            out.push_str("!- ");
            out.push_str(&f.comment);
            out.push('\n');
        }
        out.push('\n');
    }
}

/// Formats a number without trailing zeros. Integers carry no decimal point and
/// negative zero is written as 0.
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0. && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{v:.10}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

/// Renders a validated model.
///
/// Each object's field count is checked against the target schema before it is
/// written. The output depends only on the model: no timestamps or run ids.
pub fn serialize(validated: &ValidatedModel) -> Result<String, ValidationError> {
    let model = validated.model();
    let schema = validated.schema();
    let objects = objects::model_objects(model);

    let mut out = String::with_capacity(objects.len() * 320);
    out.push_str(&format!(
        "!- Generated by {} {}\n!- Building: {}\n!- Target schema: {}\n\n",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        model.building.name,
        schema
    ));
    for o in &objects {
        schema.check_field_count(o.class, o.field_count())?;
        o.render(&mut out);
    }
    debug!(objects = objects.len(), bytes = out.len(), "serialized model");
    Ok(out)
}

/// Splits rendered text back into (class, fields), dropping comments.
///
/// Not a full parser: it assumes field values contain no separators, which the
/// validator guarantees for generated files.
pub fn split_objects(text: &str) -> Vec<(String, Vec<String>)> {
    let stripped: String = text
        .lines()
        .map(|l| l.split('!').next().unwrap_or(""))
        .collect::<Vec<_>>()
        .join("\n");
    stripped
        .split(';')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            let mut parts = chunk.split(',').map(|p| p.trim().to_string());
            let class = parts.next().unwrap_or_default();
            (class, parts.collect())
        })
        .collect()
}
