//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::config::SiteConfig;

/// Characters escaped in a path segment; unreserved ones stay readable
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/images/profile.jpg") // -> "/blog/images/profile.jpg"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        return path.to_string();
    }

    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Prefix a rooted path with the site `url`
///
/// # Examples
/// ```ignore
/// full_url(&config, "/posts/hello/") // -> "https://example.com/posts/hello/"
/// ```
pub fn full_url(config: &SiteConfig, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}{}", config.url.trim_end_matches('/'), path)
}

/// Public URL path of a post page, always ending in `/`
///
/// The slug is percent-encoded; the output directory keeps it verbatim.
pub fn post_path(config: &SiteConfig, slug: &str) -> String {
    let segment = utf8_percent_encode(slug, SEGMENT);
    url_for(config, &format!("{}{}/", post_dir(config), segment))
}

/// Output path of a post page relative to the public directory
pub fn post_output_path(config: &SiteConfig, slug: &str) -> String {
    format!("{}{}/index.html", post_dir(config), slug)
}

/// The post directory with a trailing `/`, or empty for top-level posts
fn post_dir(config: &SiteConfig) -> String {
    match config.post_dir.trim_matches('/') {
        "" => String::new(),
        dir => format!("{}/", dir),
    }
}
