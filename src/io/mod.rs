//! I/O module
//!
//! Handles delimited-text parsing and output.
//!
//! # Components
//!
//! - `csv_format` - Input parsing and results report serialization
//! - `template` - Built-in sample batch and blank input templates
//! - `attachments` - Attachment name discovery from directories

pub mod attachments;
pub mod csv_format;
pub mod template;

pub use attachments::list_attachment_names;
pub use csv_format::{parse_customers, write_results_csv};
pub use template::{sample_batch, write_template_csv};
