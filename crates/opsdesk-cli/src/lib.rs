//! opsdesk CLI Library
//!
//! Operator tooling for inspecting the role registry and evaluating access
//! decisions from the command line.

pub mod access_cmd;
