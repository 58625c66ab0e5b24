//! Processor module for the content sync pipeline.
//!
//! Transforms CMS records into search documents and applies the publication
//! policy.

mod document_transformer;

pub use document_transformer::{strip_html, url_for, DocumentTransformer, ProcessedRecord};
