//! HTTP route modules.

pub mod documents;
pub mod session;
pub mod sys;
