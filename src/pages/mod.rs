//! Page builders - turn content store queries into page data
//!
//! Both builders query the source independently and hand plain data to the
//! renderer; neither keeps state between builds.

mod detail;
mod list;

pub use detail::DetailPageBuilder;
pub use list::ListPageBuilder;
