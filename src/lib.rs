// Image Handler Library
// Declarative edits applied to S3-style image requests

pub mod aws;
pub mod config;
pub mod edits;
pub mod error;
pub mod imaging;
pub mod logging;
pub mod overlay;
pub mod pipeline;
pub mod smart_crop;
pub mod watermark;

pub use edits::{EditDirective, EditSet};
pub use error::{CollaboratorError, EditError};
pub use imaging::{ImageHandle, OutputFormat};
pub use pipeline::{ImageHandler, ImageRequest};
