use serde::{Deserialize, Serialize};
use std::fmt;

/// Column headers of the `ex_data` sheet, in output order.
pub const EXERCISE_COLUMNS: [&str; 14] = [
    "exid",
    "title",
    "description",
    "category",
    "subcategoryid",
    "level",
    "language",
    "qlocation",
    "module",
    "ex_seq",
    "cat_seq",
    "subcat_seq",
    "league",
    "labels",
];

/// Column headers of the `qa_data` sheet, in output order.
pub const QUESTION_COLUMNS: [&str; 7] = ["exid", "key", "question", "type", "options", "answer", "hint"];

/// A single spreadsheet cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(n) => write!(f, "{}", n),
            CellValue::Float(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// Exercise metadata block, one row of `ex_data`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub exid: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub subcategoryid: String,
    pub level: i64,
    pub language: String,
    pub qlocation: String,
    pub module: String,
    pub ex_seq: i64,
    pub cat_seq: i64,
    pub subcat_seq: i64,
    pub league: String,
    pub labels: String,
}

impl Exercise {
    /// Stores `value` under `field`. Integer fields fall back to 0 when the value
    /// does not parse. Returns false for unknown fields.
    pub fn set_field(&mut self, field: &str, value: &str) -> bool {
        let int = || value.parse::<i64>().unwrap_or(0);
        match field {
            "exid" => self.exid = value.to_string(),
            "title" => self.title = value.to_string(),
            "description" => self.description = value.to_string(),
            "category" => self.category = value.to_string(),
            "subcategoryid" => self.subcategoryid = value.to_string(),
            "level" => self.level = int(),
            "language" => self.language = value.to_string(),
            "qlocation" => self.qlocation = value.to_string(),
            "module" => self.module = value.to_string(),
            "ex_seq" => self.ex_seq = int(),
            "cat_seq" => self.cat_seq = int(),
            "subcat_seq" => self.subcat_seq = int(),
            "league" => self.league = value.to_string(),
            "labels" => self.labels = value.to_string(),
            _ => return false,
        }
        true
    }

    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::text(&self.exid),
            CellValue::text(&self.title),
            CellValue::text(&self.description),
            CellValue::text(&self.category),
            CellValue::text(&self.subcategoryid),
            CellValue::Integer(self.level),
            CellValue::text(&self.language),
            CellValue::text(&self.qlocation),
            CellValue::text(&self.module),
            CellValue::Integer(self.ex_seq),
            CellValue::Integer(self.cat_seq),
            CellValue::Integer(self.subcat_seq),
            CellValue::text(&self.league),
            CellValue::text(&self.labels),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerType {
    Radio,
    Checkbox,
    Number,
    Text,
}

impl AnswerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerType::Radio => "radio",
            AnswerType::Checkbox => "checkbox",
            AnswerType::Number => "number",
            AnswerType::Text => "text",
        }
    }
}

/// One question/answer pair, one row of `qa_data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub exid: String,
    pub key: u32,
    pub question: String,
    pub answer_type: AnswerType,
    pub options: String,
    pub answer: CellValue,
    pub hint: String,
}

impl Question {
    pub fn to_row(&self) -> Vec<CellValue> {
        vec![
            CellValue::text(&self.exid),
            CellValue::Integer(i64::from(self.key)),
            CellValue::text(&self.question),
            CellValue::text(self.answer_type.as_str()),
            CellValue::text(&self.options),
            self.answer.clone(),
            CellValue::text(&self.hint),
        ]
    }
}

/// Code captured between a `Code:` marker and the question section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub qlocation: String,
    pub code: String,
}
