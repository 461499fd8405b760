pub mod exercise;
pub mod request;
pub mod response;

pub use exercise::*;
pub use request::*;
pub use response::*;
