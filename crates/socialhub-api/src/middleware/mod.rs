//! Tower layers applied to the whole application.

pub mod cors;
