pub mod converter;
pub mod docx_reader;
pub mod exercise_parser;
pub mod text_files;
pub mod workbook;

pub use converter::DocumentConverter;
pub use docx_reader::DocxReader;
