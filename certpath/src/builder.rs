//! Certification path building: search nodes, loop detection, candidate ordering and the
//! backtracking path builder

pub mod cert_issuers_iter;
pub mod loop_checker;
pub mod path_builder;
pub mod prioritizer;

pub use crate::builder::{
    cert_issuers_iter::*, loop_checker::*, path_builder::*, prioritizer::*,
};
