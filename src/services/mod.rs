//! Service layer separating response handling and file output from request assembly

pub mod io;

pub use io::{ApiErrorBody, ApiErrorEntry, ResultWriter};
