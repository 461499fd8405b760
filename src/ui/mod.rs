//! Upload page: the form controller and the page that hosts it.

pub mod controller;
pub mod page;

pub use controller::{
    ButtonState, ResetTicket, SelectedFile, SubmissionRequest, SubmitDecision, UploadController, UploadPage,
};
pub use page::{render_index, Flash, FlashCategory};
