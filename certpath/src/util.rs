//! Basic utility functionality supporting certification path building

pub mod error;
pub mod logging;
pub mod pdv_utilities;
pub mod time_of_interest;

pub use crate::{
    util::error::*, util::logging::*, util::pdv_utilities::*, util::time_of_interest::*,
};
