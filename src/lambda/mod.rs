//! Lambda function handlers. The binaries under `src/bin` only wire these
//! into `lambda_runtime`.

pub mod greeter;
pub mod image_resizer;

pub use greeter::{GreetingRequest, greet};
pub use image_resizer::ImageResizer;
