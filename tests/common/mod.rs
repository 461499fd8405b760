#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const BOUNDARY: &str = "docshift-test-boundary";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

/// Minimal `.docx` package with one body paragraph per line.
pub fn create_test_docx(lines: &[&str]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
    <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
    <Default Extension="xml" ContentType="application/xml"/>
    <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#).unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
    <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#).unwrap();

    let paragraphs: String = lines
        .iter()
        .map(|line| {
            format!(
                r#"<w:p><w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                escape_xml(line)
            )
        })
        .collect();

    zip.start_file("word/document.xml", options).unwrap();
    let document_xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        paragraphs
    );
    zip.write_all(document_xml.as_bytes()).unwrap();

    zip.finish().unwrap().into_inner()
}

/// The exercise document used throughout the tests.
pub fn exercise_lines() -> Vec<&'static str> {
    vec![
        "exid : TEST001",
        "title : Test Exercise",
        "description : This is a test exercise for data extraction",
        "category : Testing",
        "subcategoryid : TEST",
        "level : 1",
        "language : python",
        "qlocation : test.txt",
        "module : test",
        "ex_seq : 1",
        "cat_seq : 1",
        "subcat_seq : 1",
        "league : beginner",
        "labels : test,example",
        "Code:",
        "def hello_world():",
        "    print('Hello, World!')",
        "    return True",
        "Answer the following questions:",
        "Question 1: What will be the output of hello_world()?",
        "Options: Hello World,Hi World,Hello, World!,World Hello answer: 3 Hint: Look at the print statement",
        "Question 2: What Python concepts are used in the code?",
        "Options: function definition,print statement,return statement,variables answer: 1,2,3 Hint: Look at code structure",
        "Question 3: How many lines of code are in the function?",
        "Answer: 2 Hint: Count the indented lines",
        "Question 4: What is the purpose of the return statement?",
        "Answer: To indicate successful execution Hint: Think about function behavior",
    ]
}

pub fn exercise_docx() -> Vec<u8> {
    create_test_docx(&exercise_lines())
}

/// Multipart body with a single `file` field. Returns the content type and body.
pub fn multipart_file(field: &str, file_name: &str, content: &[u8]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n",
            b = BOUNDARY,
            field = field,
            name = file_name,
            mime = DOCX_MIME,
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}
