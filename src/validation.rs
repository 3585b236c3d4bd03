//! Validation and normalization of imported technology documents.
//!
//! An import document is decoded into a [`serde_json::Value`] first, then its
//! shape is detected ([`InputShape`]) and every candidate record is checked
//! independently. All records are checked even after a failure so the user
//! sees every problem in one pass.

use std::collections::HashSet;

use chrono::Local;
use serde_json::{Map, Value};

use crate::ids::{IdAllocator, MAX_ID};
use crate::models::{deadline_format, ImportMetadata, Status, Technology};

/// The accepted layouts of an import document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputShape<'a> {
    /// A bare array of technology objects.
    Collection(&'a [Value]),
    /// An object carrying a `technologies` array, such as an export.
    Wrapped {
        technologies: &'a [Value],
        roadmap_name: Option<&'a str>,
        exported_at: Option<&'a str>,
    },
    /// A single technology object.
    Single(&'a Value),
}

impl<'a> InputShape<'a> {
    pub fn detect(raw: &'a Value) -> Result<Self, String> {
        match raw {
            Value::Array(items) => Ok(Self::Collection(items)),
            Value::Object(fields) => {
                if let Some(Value::Array(items)) = fields.get("technologies") {
                    return Ok(Self::Wrapped {
                        technologies: items,
                        roadmap_name: fields.get("roadmapName").and_then(Value::as_str),
                        exported_at: fields.get("exportedAt").and_then(Value::as_str),
                    });
                }
                if fields.contains_key("title") && fields.contains_key("description") {
                    return Ok(Self::Single(raw));
                }
                Err("No technologies array or technology record found".to_string())
            }
            _ => Err("Import data must be a JSON object or array".to_string()),
        }
    }

    fn records(&self) -> Vec<&'a Value> {
        match *self {
            Self::Collection(items) => items.iter().collect(),
            Self::Wrapped { technologies, .. } => technologies.iter().collect(),
            Self::Single(record) => vec![record],
        }
    }
}

/// Outcome of validating an import document.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// True only when `errors` is empty.
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    /// Normalized records that passed their checks. When `valid` is false this
    /// is the passing subset, which callers may inspect but should not apply.
    pub technologies: Vec<Technology>,
    pub metadata: ImportMetadata,
}

/// Validate a decoded import document.
///
/// `default_roadmap` names the roadmap when the document carries no name.
pub fn validate(raw: &Value, default_roadmap: &str) -> ValidationReport {
    let shape = match InputShape::detect(raw) {
        Ok(shape) => shape,
        Err(message) => {
            return ValidationReport {
                valid: false,
                errors: vec![message],
                warnings: Vec::new(),
                technologies: Vec::new(),
                metadata: metadata(None, None, default_roadmap, 0),
            }
        }
    };

    let records = shape.records();
    let mut normalizer = Normalizer::new(&records);
    for (index, record) in records.iter().enumerate() {
        normalizer.check(index + 1, record);
    }

    let (roadmap_name, exported_at) = match shape {
        InputShape::Wrapped {
            roadmap_name,
            exported_at,
            ..
        } => (roadmap_name, exported_at),
        _ => (None, None),
    };

    let count = normalizer.technologies.len();
    ValidationReport {
        valid: normalizer.errors.is_empty(),
        errors: normalizer.errors,
        warnings: normalizer.warnings,
        technologies: normalizer.technologies,
        metadata: metadata(roadmap_name, exported_at, default_roadmap, count),
    }
}

fn metadata(
    roadmap_name: Option<&str>,
    exported_at: Option<&str>,
    default_roadmap: &str,
    count: usize,
) -> ImportMetadata {
    ImportMetadata {
        roadmap_name: roadmap_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(default_roadmap)
            .to_string(),
        count,
        exported_at: exported_at
            .map(str::to_string)
            .unwrap_or_else(|| Local::now().to_rfc3339()),
    }
}

struct Normalizer {
    ids: IdAllocator,
    seen_ids: HashSet<u64>,
    errors: Vec<String>,
    warnings: Vec<String>,
    technologies: Vec<Technology>,
}

impl Normalizer {
    fn new(records: &[&Value]) -> Self {
        // Generated ids start past every explicit id in the document, so a
        // record without an id never takes the id of a later record.
        let mut ids = IdAllocator::default();
        for record in records {
            if let Some(id) = record.get("id").and_then(explicit_id) {
                if id <= MAX_ID {
                    ids.observe(id);
                }
            }
        }

        Self {
            ids,
            seen_ids: HashSet::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            technologies: Vec::new(),
        }
    }

    fn check(&mut self, number: usize, record: &Value) {
        let Some(fields) = record.as_object() else {
            self.errors
                .push(format!("Technology #{}: expected an object", number));
            return;
        };

        let mut problems = Vec::new();

        let title = match fields.get("title").and_then(Value::as_str).map(str::trim) {
            Some(title) if !title.is_empty() => Some(title.to_string()),
            _ => {
                problems.push("title is required and must be non-empty text".to_string());
                None
            }
        };

        let description = match fields.get("description") {
            Some(Value::String(description)) => Some(description.clone()),
            _ => {
                problems.push("description is required and must be text".to_string());
                None
            }
        };

        let status = match fields.get("status") {
            None | Some(Value::Null) => Some(Status::NotStarted),
            Some(value) => match value.as_str().and_then(Status::from_str) {
                Some(status) => Some(status),
                None => {
                    problems.push(invalid_status(value));
                    None
                }
            },
        };

        let deadline = match fields.get("deadline") {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(text)) if text.trim().is_empty() => Some(None),
            Some(Value::String(text)) => match deadline_format::parse(text.trim()) {
                Ok(date) => Some(Some(date)),
                Err(_) => {
                    problems.push(format!(
                        "deadline \"{}\" is not a date in YYYY-MM-DD format",
                        text
                    ));
                    None
                }
            },
            Some(other) => {
                problems.push(format!("deadline must be text, got {}", other));
                None
            }
        };

        if let Some(id) = fields.get("id").and_then(explicit_id) {
            if id > MAX_ID {
                problems.push(format!("id {} is out of range (maximum {})", id, MAX_ID));
            }
        }

        if !problems.is_empty() {
            for problem in problems {
                self.errors
                    .push(format!("Technology #{}: {}", number, problem));
            }
            return;
        }

        let (Some(title), Some(description), Some(status), Some(deadline)) =
            (title, description, status, deadline)
        else {
            return;
        };

        let Some(id) = self.assign_id(number, fields.get("id")) else {
            self.errors
                .push(format!("Technology #{}: no free id left to assign", number));
            return;
        };
        let notes = self.text_field(number, fields, "notes");
        let resources = self.resources(number, fields.get("resources"));
        let category = fields
            .get("category")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        self.technologies.push(Technology {
            id,
            title,
            description,
            status,
            notes,
            deadline,
            resources,
            category,
        });
    }

    fn assign_id(&mut self, number: usize, raw: Option<&Value>) -> Option<u64> {
        let explicit = raw.filter(|v| !v.is_null()).map(|v| (v, explicit_id(v)));

        let id = match explicit {
            None => self.ids.allocate()?,
            Some((_, Some(id))) if self.seen_ids.contains(&id) => {
                let fresh = self.ids.allocate()?;
                self.warnings.push(format!(
                    "Technology #{}: duplicate id {} replaced with {}",
                    number, id, fresh
                ));
                fresh
            }
            Some((_, Some(id))) => id,
            Some((value, None)) => {
                let fresh = self.ids.allocate()?;
                self.warnings.push(format!(
                    "Technology #{}: id {} is not a number, replaced with {}",
                    number, value, fresh
                ));
                fresh
            }
        };

        self.seen_ids.insert(id);
        Some(id)
    }

    fn text_field(&mut self, number: usize, fields: &Map<String, Value>, name: &str) -> String {
        match fields.get(name) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(_) => {
                self.warnings.push(format!(
                    "Technology #{}: {} is not text and was cleared",
                    number, name
                ));
                String::new()
            }
        }
    }

    fn resources(&mut self, number: usize, raw: Option<&Value>) -> Vec<String> {
        match raw {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let urls: Vec<String> = items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
                if urls.len() != items.len() {
                    self.warnings.push(format!(
                        "Technology #{}: {} non-text resource(s) dropped",
                        number,
                        items.len() - urls.len()
                    ));
                }
                urls
            }
            Some(_) => {
                self.warnings.push(format!(
                    "Technology #{}: resources is not an array and was cleared",
                    number
                ));
                Vec::new()
            }
        }
    }
}

/// Ids are non-negative integers, also accepted as numeric strings.
fn explicit_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn invalid_status(value: &Value) -> String {
    let shown = match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    };
    let allowed: Vec<&str> = Status::ALL.iter().map(Status::as_str).collect();
    format!(
        "invalid status {} (allowed: {})",
        shown,
        allowed.join(", ")
    )
}
