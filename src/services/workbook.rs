use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{CellValue, Exercise, Question, EXERCISE_COLUMNS, QUESTION_COLUMNS};

pub const EXERCISE_SHEET: &str = "ex_data";
pub const QUESTION_SHEET: &str = "qa_data";

/// Builds the two-sheet workbook and returns the `.xlsx` bytes.
pub fn build(exercises: &[Exercise], questions: &[Question]) -> AppResult<Vec<u8>> {
    if exercises.is_empty() {
        return Err(AppError::processing("no exercise data found in document"));
    }
    if questions.is_empty() {
        return Err(AppError::processing("no question data found in document"));
    }

    let header = Format::new().set_bold();
    let mut workbook = Workbook::new();

    let exercise_rows: Vec<Vec<CellValue>> = exercises.iter().map(Exercise::to_row).collect();
    write_sheet(
        workbook.add_worksheet(),
        EXERCISE_SHEET,
        &EXERCISE_COLUMNS,
        &exercise_rows,
        &header,
    )?;

    let question_rows: Vec<Vec<CellValue>> = questions.iter().map(Question::to_row).collect();
    write_sheet(
        workbook.add_worksheet(),
        QUESTION_SHEET,
        &QUESTION_COLUMNS,
        &question_rows,
        &header,
    )?;

    let bytes = workbook.save_to_buffer()?;

    info!(
        exercises = exercises.len(),
        questions = questions.len(),
        bytes = bytes.len(),
        "Workbook written"
    );
    Ok(bytes)
}

fn write_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    columns: &[&str],
    rows: &[Vec<CellValue>],
    header: &Format,
) -> AppResult<()> {
    worksheet.set_name(name)?;

    for (col, title) in columns.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, header)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let row_num = index as u32 + 1;
        for (col, value) in row.iter().enumerate() {
            match value {
                CellValue::Integer(n) => worksheet.write_number(row_num, col as u16, *n as f64)?,
                CellValue::Float(n) => worksheet.write_number(row_num, col as u16, *n)?,
                CellValue::Text(s) => worksheet.write_string(row_num, col as u16, s)?,
            };
        }
    }

    // Width is the longest rendered value in the column plus padding.
    for (col, title) in columns.iter().enumerate() {
        let longest = rows
            .iter()
            .filter_map(|row| row.get(col))
            .map(|value| value.to_string().chars().count())
            .chain(std::iter::once(title.chars().count()))
            .max()
            .unwrap_or(0);
        worksheet.set_column_width(col as u16, (longest + 2) as f64)?;
    }

    Ok(())
}
