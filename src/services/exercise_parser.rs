//! Extracts exercise metadata, question/answer pairs and code blocks from the
//! paragraphs of an exercise document.
//!
//! Documents follow a line-oriented layout:
//!
//! ```text
//! exid : EX001
//! title : Loops
//! ...
//! labels : basics,loops          <- completes one exercise record
//! Code:
//! for i in range(3):
//!     print(i)
//! Answer the following questions:
//! Question 1: What is printed last?
//! Answer: 2 Hint: range stops before 3
//! ```

use tracing::{debug, info, warn};

use crate::models::{AnswerType, CellValue, CodeBlock, Exercise, Question, EXERCISE_COLUMNS};

pub const QA_SECTION_MARKER: &str = "Answer the following questions:";
pub const CODE_MARKER: &str = "Code:";

const EXID_PREFIX: &str = "exid :";
const QLOCATION_PREFIX: &str = "qlocation :";
const OPTIONS_MARKER: &str = "Options:";
const MCQ_ANSWER_MARKER: &str = "answer:";
const DIRECT_ANSWER_MARKER: &str = "Answer:";
const HINT_MARKER: &str = "Hint:";

/// Collects one [`Exercise`] per `labels :` line.
pub fn extract_exercises(paragraphs: &[String]) -> Vec<Exercise> {
    let mut exercises = Vec::new();
    let mut current = Exercise::default();

    info!("Starting exercise data extraction");

    for paragraph in paragraphs {
        let text = paragraph.trim();
        if text.is_empty() {
            continue;
        }

        for field in EXERCISE_COLUMNS {
            let prefix = format!("{} :", field);
            let Some(value) = field_value(text, &prefix) else {
                continue;
            };

            current.set_field(field, value);
            debug!(field = field, value = value, "Extracted exercise field");

            if field == "labels" {
                info!(exid = %current.exid, "Added exercise record");
                exercises.push(std::mem::take(&mut current));
            }
            break;
        }
    }

    info!(count = exercises.len(), "Exercise extraction finished");
    exercises
}

/// Collects the question/answer pairs that follow the question section marker.
pub fn extract_questions(paragraphs: &[String]) -> Vec<Question> {
    let Some(exid) = paragraphs
        .iter()
        .find_map(|p| field_value(p.trim(), EXID_PREFIX).map(str::to_string))
    else {
        warn!("No exid found in document, skipping question extraction");
        return Vec::new();
    };

    info!(exid = %exid, "Starting question extraction");

    let mut questions = Vec::new();
    let mut key: u32 = 1;
    let mut in_qa_section = false;
    let mut i = 0;

    while i < paragraphs.len() {
        let text = paragraphs[i].trim();

        if text.is_empty() {
            i += 1;
            continue;
        }

        if text.contains(QA_SECTION_MARKER) {
            in_qa_section = true;
            debug!("Entered question section");
            i += 1;
            continue;
        }

        if in_qa_section && text.to_lowercase().starts_with("question") {
            let question_text = match text.split_once(':') {
                Some((_, rest)) => rest.trim(),
                None => text,
            };

            if let Some(next) = paragraphs.get(i + 1) {
                let answer_text = next.trim();
                match parse_answer(answer_text) {
                    Ok(Some(parsed)) => {
                        debug!(key = key, answer_type = parsed.answer_type.as_str(), "Added question");
                        questions.push(Question {
                            exid: exid.clone(),
                            key,
                            question: question_text.to_string(),
                            answer_type: parsed.answer_type,
                            options: parsed.options,
                            answer: parsed.answer,
                            hint: parsed.hint,
                        });
                    }
                    Ok(None) => {
                        debug!(key = key, "Question has no recognizable answer line");
                    }
                    Err(reason) => {
                        warn!(
                            question = question_text,
                            answer = answer_text,
                            reason = reason,
                            "Skipping malformed question"
                        );
                        i += 1;
                        continue;
                    }
                }
                key += 1;
                i += 2;
                continue;
            }
        }

        i += 1;
    }

    info!(count = questions.len(), "Question extraction finished");
    questions
}

#[derive(Debug, PartialEq)]
struct ParsedAnswer {
    answer_type: AnswerType,
    options: String,
    answer: CellValue,
    hint: String,
}

/// `Ok(None)` when the line is not an answer line at all.
fn parse_answer(line: &str) -> Result<Option<ParsedAnswer>, &'static str> {
    if line.contains(OPTIONS_MARKER) && line.contains(MCQ_ANSWER_MARKER) {
        let after_options = line.split(OPTIONS_MARKER).nth(1).unwrap_or("");
        let (options, answer_part) =
            split_exactly_once(after_options, MCQ_ANSWER_MARKER).ok_or("expected exactly one 'answer:' marker")?;
        let (answer, hint) = split_hint(answer_part.trim())?;

        let (answer_type, answer) = if answer.contains(',') {
            (AnswerType::Checkbox, CellValue::text(answer))
        } else {
            let value = match answer.parse::<i64>() {
                Ok(n) => CellValue::Integer(n),
                Err(_) => CellValue::text(answer),
            };
            (AnswerType::Radio, value)
        };

        return Ok(Some(ParsedAnswer {
            answer_type,
            options: options.trim().to_string(),
            answer,
            hint,
        }));
    }

    if line.contains(DIRECT_ANSWER_MARKER) {
        let after_answer = line.split(DIRECT_ANSWER_MARKER).nth(1).unwrap_or("");
        let (answer, hint) = split_hint(after_answer.trim())?;

        let (answer_type, answer) = match answer.parse::<f64>() {
            Ok(n) if !n.is_finite() => (AnswerType::Text, CellValue::text(answer)),
            Ok(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => (AnswerType::Number, CellValue::Integer(n as i64)),
            Ok(n) => (AnswerType::Number, CellValue::Float(n)),
            Err(_) => (AnswerType::Text, CellValue::text(answer)),
        };

        return Ok(Some(ParsedAnswer {
            answer_type,
            options: String::new(),
            answer,
            hint,
        }));
    }

    Ok(None)
}

/// Value of a `<field> :` line. A repeated prefix ends the value.
fn field_value<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(prefix)?;
    Some(rest.split(prefix).next().unwrap_or(rest).trim())
}

fn split_exactly_once<'a>(text: &'a str, marker: &str) -> Option<(&'a str, &'a str)> {
    let (before, after) = text.split_once(marker)?;
    if after.contains(marker) {
        return None;
    }
    Some((before, after))
}

fn split_hint(answer: &str) -> Result<(String, String), &'static str> {
    if !answer.contains(HINT_MARKER) {
        return Ok((answer.to_string(), String::new()));
    }
    let (answer, hint) = split_exactly_once(answer, HINT_MARKER).ok_or("expected at most one 'Hint:' marker")?;
    Ok((answer.trim().to_string(), hint.trim().to_string()))
}

/// Collects the code between `Code:` and the question section marker, keyed
/// by the most recent `qlocation :` value.
pub fn code_blocks(paragraphs: &[String]) -> Vec<CodeBlock> {
    let mut blocks = Vec::new();
    let mut collecting = false;
    let mut lines: Vec<&str> = Vec::new();
    let mut qlocation: Option<String> = None;

    for paragraph in paragraphs {
        let text = paragraph.trim();

        if let Some(value) = field_value(text, QLOCATION_PREFIX) {
            let mut location = value.to_string();
            if !location.ends_with(".txt") {
                location.push_str(".txt");
            }
            qlocation = Some(location);
        } else if text.starts_with(CODE_MARKER) {
            collecting = true;
            lines.clear();
        } else if collecting && text.contains(QA_SECTION_MARKER) {
            match &qlocation {
                Some(location) if !lines.is_empty() => {
                    debug!(qlocation = %location, lines = lines.len(), "Captured code block");
                    blocks.push(CodeBlock {
                        qlocation: location.clone(),
                        code: lines.join("\n"),
                    });
                }
                _ => warn!("Code block without content or qlocation, skipping"),
            }
            collecting = false;
            lines.clear();
        } else if collecting {
            lines.push(paragraph.trim_end());
        }
    }

    info!(count = blocks.len(), "Code block extraction finished");
    blocks
}
