//! Helper functions for building links

mod url;

pub use url::*;
