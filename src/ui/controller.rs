//! Upload form controller.
//!
//! Framework-free state machine behind the upload page. The host that owns
//! the real page (the rendered page script, or a test double) implements
//! [`UploadPage`] and forwards user events to [`UploadController`].
//!
//! Trigger control states:
//!
//! ```text
//! Idle --generate (file selected)--> Loading --reset elapsed | response--> Idle
//! ```

use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use crate::models::is_valid_extension;

pub const FILE_INPUT_ID: &str = "file";
pub const UPLOAD_FORM_ID: &str = "uploadForm";
pub const GENERATE_ACTION: &str = "generate-text-files";
pub const GENERATE_TEXT_FILES_PATH: &str = "/generate-text-files";
pub const FILE_FIELD: &str = "file";

pub const INVALID_EXTENSION_MESSAGE: &str = "Please select a valid Word document (.docx)";
pub const NO_FILE_ON_SUBMIT_MESSAGE: &str = "Please select a file to upload";
pub const NO_FILE_ON_GENERATE_MESSAGE: &str = "Please select a file first";

pub const GENERATING_LABEL: &str = "Generating...";
pub const RESET_DELAY: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub bytes: Bytes,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Outbound POST carrying a copy of the selected file as the multipart field `file`.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionRequest {
    pub method: &'static str,
    pub action: &'static str,
    pub field: &'static str,
    pub file: SelectedFile,
}

impl SubmissionRequest {
    fn for_file(file: SelectedFile) -> Self {
        Self {
            method: "POST",
            action: GENERATE_TEXT_FILES_PATH,
            field: FILE_FIELD,
            file,
        }
    }
}

/// Identifies one scheduled reset; the host hands it back when the timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResetTicket(u64);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ButtonState {
    #[default]
    Idle,
    Loading {
        original_label: String,
        ticket: ResetTicket,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitDecision {
    /// Let the browser submit the form unchanged.
    Proceed,
    /// Cancel the default submission.
    Prevent,
}

/// The page the controller drives.
pub trait UploadPage {
    /// Registers the change, submit and trigger listeners.
    fn bind_listeners(&mut self);
    /// Shows a blocking message to the user.
    fn alert(&mut self, message: &str);
    /// Empties the file picker.
    fn clear_selection(&mut self);
    fn trigger_label(&self) -> String;
    fn set_trigger(&mut self, label: &str, disabled: bool);
    fn dispatch(&mut self, request: SubmissionRequest);
    /// Arms the fallback timer; when it fires the host calls
    /// [`UploadController::on_reset_elapsed`] with `ticket`.
    fn schedule_reset(&mut self, delay: Duration, ticket: ResetTicket);
}

pub struct UploadController<P: UploadPage> {
    page: P,
    initialized: bool,
    selected: Option<SelectedFile>,
    button: ButtonState,
    next_ticket: u64,
}

impl<P: UploadPage> UploadController<P> {
    pub fn new(page: P) -> Self {
        Self {
            page,
            initialized: false,
            selected: None,
            button: ButtonState::Idle,
            next_ticket: 0,
        }
    }

    /// Binds the page listeners. Runs once per page load; later calls return false.
    pub fn initialize(&mut self) -> bool {
        if self.initialized {
            warn!("Upload controller already initialized, ignoring");
            return false;
        }
        self.page.bind_listeners();
        self.initialized = true;
        debug!("Upload controller initialized");
        true
    }

    pub fn on_file_changed(&mut self, file: Option<SelectedFile>) {
        match file {
            Some(file) if !is_valid_extension(&file.name) => {
                info!(file_name = %file.name, "Rejected file with invalid extension");
                self.page.alert(INVALID_EXTENSION_MESSAGE);
                self.page.clear_selection();
                self.selected = None;
            }
            other => self.selected = other,
        }
    }

    pub fn on_form_submit(&mut self) -> SubmitDecision {
        if self.selected.is_none() {
            self.page.alert(NO_FILE_ON_SUBMIT_MESSAGE);
            return SubmitDecision::Prevent;
        }
        SubmitDecision::Proceed
    }

    /// Starts text file generation. Returns true when a request was dispatched.
    pub fn generate_text_files(&mut self) -> bool {
        let Some(file) = self.selected.clone() else {
            self.page.alert(NO_FILE_ON_GENERATE_MESSAGE);
            return false;
        };

        // Disabled trigger
        if matches!(self.button, ButtonState::Loading { .. }) {
            debug!("Generation already in flight, ignoring trigger");
            return false;
        }

        self.next_ticket += 1;
        let ticket = ResetTicket(self.next_ticket);
        let original_label = self.page.trigger_label();
        self.page.set_trigger(GENERATING_LABEL, true);
        self.button = ButtonState::Loading { original_label, ticket };

        info!(file_name = %file.name, target = GENERATE_TEXT_FILES_PATH, "Dispatching text file generation");
        self.page.dispatch(SubmissionRequest::for_file(file));
        self.page.schedule_reset(RESET_DELAY, ticket);
        true
    }

    /// Fallback timer; restores the trigger if the loading cycle that armed
    /// `ticket` is still the current one.
    pub fn on_reset_elapsed(&mut self, ticket: ResetTicket) {
        let current = match &self.button {
            ButtonState::Loading { ticket, .. } => Some(*ticket),
            ButtonState::Idle => None,
        };
        match current {
            Some(current) if current == ticket => self.restore_trigger(),
            Some(_) => debug!("Ignoring reset timer from an earlier generation"),
            None => {}
        }
    }

    /// Response-driven completion of a generation request.
    pub fn on_generate_finished(&mut self, result: Result<(), String>) {
        self.restore_trigger();
        if let Err(message) = result {
            warn!(error = %message, "Text file generation failed");
            self.page.alert(&message);
        }
    }

    fn restore_trigger(&mut self) {
        if let ButtonState::Loading { original_label, .. } = std::mem::take(&mut self.button) {
            self.page.set_trigger(&original_label, false);
        }
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected.as_ref()
    }

    pub fn button_state(&self) -> &ButtonState {
        &self.button
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn page(&self) -> &P {
        &self.page
    }
}
