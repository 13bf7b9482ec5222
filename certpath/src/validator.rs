//! Certificates, per-certificate errors, results and settings used by certification path building
//! along with a basic chain validator

pub mod basic_validator;
pub mod cert_errors;
pub mod parsed_certificate;
pub mod path_results;
pub mod path_settings;

pub use crate::{
    validator::basic_validator::*, validator::cert_errors::*, validator::parsed_certificate::*,
    validator::path_results::*, validator::path_settings::*,
};
