//! Training profiles and drift reports.
//!
//! [`build_profile`] summarises the training features once per run;
//! [`compare`] measures each inference batch against that summary.

pub mod drift;
pub mod error;
pub mod profiler;
pub mod quantile;
pub mod store;

pub use drift::{MEDIAN_EPSILON, TOP_CATEGORIES, compare, relative_shift};
pub use error::{ProfileError, Result};
pub use profiler::build_profile;
pub use quantile::{quantile, sorted_present};
pub use store::{load_profile, write_profile};
