//! Configuration module

mod site;

pub use site::ContentfulConfig;
pub use site::RetryConfig;
pub use site::SiteConfig;
pub use site::{ACCESS_TOKEN_ENV, SPACE_ID_ENV};
