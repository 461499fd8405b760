//! Server-rendered upload page.
//!
//! Element ids, messages, the target path and the reset delay all come from
//! [`crate::ui::controller`], so the page script and the controller share one
//! contract.

use once_cell::sync::Lazy;

use crate::ui::controller::{
    FILE_FIELD, FILE_INPUT_ID, GENERATE_ACTION, GENERATE_TEXT_FILES_PATH, GENERATING_LABEL,
    INVALID_EXTENSION_MESSAGE, NO_FILE_ON_GENERATE_MESSAGE, NO_FILE_ON_SUBMIT_MESSAGE, RESET_DELAY,
    UPLOAD_FORM_ID,
};

pub const UPLOAD_PATH: &str = "/upload";
pub const GENERATE_BUTTON_LABEL: &str = "Generate Text Files";

const LOADER_CSS: &str = r#"
    .loader {
        display: inline-block;
        width: 0.9em;
        height: 0.9em;
        border: 2px solid currentColor;
        border-right-color: transparent;
        border-radius: 50%;
        animation: spin 1s linear infinite;
    }
    @keyframes spin {
        100% { transform: rotate(360deg); }
    }
"#;

const PAGE_CSS: &str = r#"
    body { font-family: system-ui, sans-serif; max-width: 40rem; margin: 3rem auto; padding: 0 1rem; }
    .flash { padding: 0.75rem 1rem; border-radius: 4px; margin-bottom: 1rem; }
    .flash-error { background: #fdecea; color: #611a15; }
    .actions { display: flex; gap: 0.5rem; margin-top: 1rem; }
    button[disabled] { opacity: 0.6; cursor: progress; }
"#;

static INDEX_PAGE: Lazy<String> = Lazy::new(|| render(None));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashCategory {
    Error,
}

impl FlashCategory {
    fn css_class(&self) -> &'static str {
        match self {
            FlashCategory::Error => "flash flash-error",
        }
    }
}

/// One-shot message rendered above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub category: FlashCategory,
    pub message: String,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            category: FlashCategory::Error,
            message: message.into(),
        }
    }
}

/// Renders the upload page, reusing the cached copy when there is no flash.
pub fn render_index(flash: Option<&Flash>) -> String {
    match flash {
        None => String::clone(&INDEX_PAGE),
        Some(_) => render(flash),
    }
}

fn render(flash: Option<&Flash>) -> String {
    let flash_html = flash
        .map(|f| {
            format!(
                r#"<div class="{}" role="alert">{}</div>"#,
                f.category.css_class(),
                escape_html(&f.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Word Exercise Converter</title>
    <style>{page_css}</style>
    <style>{loader_css}</style>
</head>
<body>
    <h1>Word Exercise Converter</h1>
    <p>Upload an exercise document (.docx) to convert it into a spreadsheet, or generate its code files.</p>
    {flash_html}
    <form id="{form_id}" action="{upload_path}" method="post" enctype="multipart/form-data">
        <input type="file" id="{file_id}" name="{file_field}" accept=".docx">
        <div class="actions">
            <button type="submit">Convert to Excel</button>
            <button type="button" data-action="{generate_action}">{generate_label}</button>
        </div>
    </form>
    <script>{script}</script>
</body>
</html>
"#,
        page_css = PAGE_CSS,
        loader_css = LOADER_CSS,
        flash_html = flash_html,
        form_id = UPLOAD_FORM_ID,
        upload_path = UPLOAD_PATH,
        file_id = FILE_INPUT_ID,
        file_field = FILE_FIELD,
        generate_action = GENERATE_ACTION,
        generate_label = GENERATE_BUTTON_LABEL,
        script = page_script(),
    )
}

/// JS string literal for `value`, safe inside a `<script>` element.
fn js_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}

fn page_script() -> String {
    format!(
        r#"
(function () {{
    'use strict';

    var FILE_INPUT_ID = {file_id};
    var UPLOAD_FORM_ID = {form_id};
    var GENERATE_ACTION = {generate_action};
    var TARGET_PATH = {target};
    var FILE_FIELD = {file_field};
    var GENERATING_LABEL = {generating};
    var RESET_DELAY_MS = {reset_ms};
    var MESSAGES = {{
        invalidExtension: {invalid},
        noFileOnSubmit: {no_file_submit},
        noFileOnGenerate: {no_file_generate}
    }};

    var initialized = false;
    var loading = null;

    function isValidExtension(name) {{
        var dot = name.lastIndexOf('.');
        return dot >= 0 && name.slice(dot + 1).toLowerCase() === 'docx';
    }}

    function restoreTrigger(trigger) {{
        if (loading === null) {{
            return;
        }}
        clearTimeout(loading.timer);
        trigger.textContent = loading.originalLabel;
        trigger.disabled = false;
        loading = null;
    }}

    function downloadName(response) {{
        var disposition = response.headers.get('Content-Disposition') || '';
        var match = /filename="([^"]+)"/.exec(disposition);
        return match ? match[1] : 'code_files.zip';
    }}

    function generateTextFiles(fileInput, trigger) {{
        if (!fileInput.files.length) {{
            alert(MESSAGES.noFileOnGenerate);
            return;
        }}
        if (loading !== null) {{
            return;
        }}

        loading = {{ originalLabel: trigger.textContent, timer: null }};
        trigger.innerHTML = '<span class="loader" aria-hidden="true"></span> ';
        trigger.appendChild(document.createTextNode(GENERATING_LABEL));
        trigger.disabled = true;

        var body = new FormData();
        body.append(FILE_FIELD, fileInput.files[0], fileInput.files[0].name);

        loading.timer = setTimeout(function () {{
            restoreTrigger(trigger);
        }}, RESET_DELAY_MS);

        fetch(TARGET_PATH, {{
            method: 'POST',
            body: body,
            headers: {{ 'Accept': 'application/json' }}
        }}).then(function (response) {{
            if (!response.ok) {{
                return response.json().then(function (payload) {{
                    throw new Error(payload.error && payload.error.message ? payload.error.message : response.statusText);
                }});
            }}
            return response.blob().then(function (blob) {{
                var url = URL.createObjectURL(blob);
                var link = document.createElement('a');
                link.href = url;
                link.download = downloadName(response);
                document.body.appendChild(link);
                link.click();
                link.remove();
                URL.revokeObjectURL(url);
            }});
        }}).then(function () {{
            restoreTrigger(trigger);
        }}, function (error) {{
            restoreTrigger(trigger);
            alert(error.message);
        }});
    }}

    function initialize() {{
        if (initialized) {{
            return false;
        }}
        initialized = true;

        var fileInput = document.getElementById(FILE_INPUT_ID);
        var form = document.getElementById(UPLOAD_FORM_ID);
        var trigger = document.querySelector('[data-action="' + GENERATE_ACTION + '"]');

        fileInput.addEventListener('change', function () {{
            var file = this.files[0];
            if (file && !isValidExtension(file.name)) {{
                alert(MESSAGES.invalidExtension);
                this.value = '';
            }}
        }});

        form.addEventListener('submit', function (event) {{
            if (!fileInput.files.length) {{
                event.preventDefault();
                alert(MESSAGES.noFileOnSubmit);
            }}
        }});

        trigger.addEventListener('click', function () {{
            generateTextFiles(fileInput, trigger);
        }});
        return true;
    }}

    document.addEventListener('DOMContentLoaded', initialize, {{ once: true }});
}})();
"#,
        file_id = js_string(FILE_INPUT_ID),
        form_id = js_string(UPLOAD_FORM_ID),
        generate_action = js_string(GENERATE_ACTION),
        target = js_string(GENERATE_TEXT_FILES_PATH),
        file_field = js_string(FILE_FIELD),
        generating = js_string(GENERATING_LABEL),
        reset_ms = RESET_DELAY.as_millis(),
        invalid = js_string(INVALID_EXTENSION_MESSAGE),
        no_file_submit = js_string(NO_FILE_ON_SUBMIT_MESSAGE),
        no_file_generate = js_string(NO_FILE_ON_GENERATE_MESSAGE),
    )
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
