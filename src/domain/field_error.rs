//! Path-scoped configuration errors.
//!
//! Checks push [`FieldError`]s onto an [`ErrorList`] and keep going; the list
//! is turned into a single [`Error::Validation`] once every check has run.

use serde::Serialize;
use std::fmt;

use crate::error::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Name(String),
    Index(usize),
}

/// Location of a field inside the install config, e.g. `compute[0].platform.ovirt`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    pub fn new(names: &[&str]) -> Self {
        FieldPath { segments: names.iter().map(|n| Segment::Name(n.to_string())).collect() }
    }

    pub fn child(&self, name: &str) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Name(name.to_string()));
        path
    }

    pub fn index(&self, idx: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(Segment::Index(idx));
        path
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Name(name) if i == 0 => write!(f, "{}", name)?,
                Segment::Name(name) => write!(f, ".{}", name)?,
                Segment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    Required,
    Invalid,
    NotFound,
    Internal,
    Duplicate,
}

impl ErrorType {
    fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Required => "Required value",
            ErrorType::Invalid => "Invalid value",
            ErrorType::NotFound => "Not found",
            ErrorType::Internal => "Internal error",
            ErrorType::Duplicate => "Duplicate value",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    pub error_type: ErrorType,
    pub field: FieldPath,
    pub bad_value: Option<serde_json::Value>,
    pub detail: String,
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Option<serde_json::Value> {
    serde_json::to_value(value).ok()
}

impl FieldError {
    pub fn required(field: FieldPath, detail: impl Into<String>) -> Self {
        FieldError { error_type: ErrorType::Required, field, bad_value: None, detail: detail.into() }
    }

    pub fn invalid<T: Serialize + ?Sized>(field: FieldPath, value: &T, detail: impl Into<String>) -> Self {
        FieldError { error_type: ErrorType::Invalid, field, bad_value: to_value(value), detail: detail.into() }
    }

    pub fn not_found<T: Serialize + ?Sized>(field: FieldPath, value: &T) -> Self {
        FieldError { error_type: ErrorType::NotFound, field, bad_value: to_value(value), detail: String::new() }
    }

    pub fn internal(field: FieldPath, err: impl fmt::Display) -> Self {
        FieldError { error_type: ErrorType::Internal, field, bad_value: None, detail: err.to_string() }
    }

    pub fn duplicate<T: Serialize + ?Sized>(field: FieldPath, value: &T, detail: impl Into<String>) -> Self {
        FieldError { error_type: ErrorType::Duplicate, field, bad_value: to_value(value), detail: detail.into() }
    }

    fn render_value(&self) -> String {
        match &self.bad_value {
            Some(serde_json::Value::String(s)) => format!("{:?}", s),
            Some(v) => v.to_string(),
            None => "null".to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.error_type.as_str())?;
        match self.error_type {
            ErrorType::Required | ErrorType::Internal => {}
            ErrorType::Invalid | ErrorType::NotFound | ErrorType::Duplicate => write!(f, ": {}", self.render_value())?,
        }
        if !self.detail.is_empty() {
            write!(f, ": {}", self.detail)?;
        }
        Ok(())
    }
}

/// Ordered accumulator threaded through every check.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ErrorList {
    errors: Vec<FieldError>,
}

impl ErrorList {
    pub fn new() -> Self {
        ErrorList { errors: Vec::new() }
    }

    pub fn push(&mut self, err: FieldError) {
        self.errors.push(err);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }

    pub fn count_of(&self, error_type: ErrorType) -> usize {
        self.errors.iter().filter(|e| e.error_type == error_type).count()
    }

    /// Collapses the list into `Ok(())` when empty, a single validation error otherwise.
    pub fn into_result(self) -> Result<()> {
        if self.is_empty() { Ok(()) } else { Err(Error::Validation(self)) }
    }
}

impl IntoIterator for ErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.as_slice() {
            [] => Ok(()),
            [single] => write!(f, "{}", single),
            many => {
                let rendered: Vec<String> = many.iter().map(|e| e.to_string()).collect();
                write!(f, "[{}]", rendered.join(", "))
            }
        }
    }
}
