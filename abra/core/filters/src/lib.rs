//! Filters module contains the image filters built on top of `primitives`.
//!
//! Currently hosts the two-dimensional ranked-bitmap median filter; see
//! [`median`].

pub mod median;

pub use median::{median_filter, median_filter_with_workers};
