//! Initialize a new blog site

use anyhow::Result;
use std::fs;
use std::path::Path;

const CONFIG: &str = r#"# Site
title: My Blog
author: Your Name
description: A blog built from Contentful entries
intro: I'm learning web development and writing about my journey.
avatar: /images/profile.jpg
language: en

# URL
url: http://example.com
root: /

# Directory
public_dir: public
static_dir: static
post_dir: posts

# Date format (chrono syntax)
date_format: "%B %-d, %Y"

# Content store
# CONTENTFUL_SPACE_ID and CONTENTFUL_ACCESS_TOKEN override the values below.
contentful:
  space: ''
  access_token: ''
  environment: master
  content_type: blogPost
  page_size: 100
  include: 1
  timeout_secs: 30
  retry:
    max_retries: 3
    base_delay_ms: 500
    max_delay_ms: 30000
"#;

/// A saved entries response for `generate --offline entries.json`
const SAMPLE_ENTRIES: &str = r#"{
  "total": 1,
  "skip": 0,
  "limit": 100,
  "items": [
    {
      "sys": {
        "id": "hello-world",
        "contentType": { "sys": { "type": "Link", "linkType": "ContentType", "id": "blogPost" } }
      },
      "fields": {
        "title": "Hello World",
        "slug": "hello-world",
        "date": "2022-01-01",
        "body": "Welcome! Replace `entries.json` with your own entries, or set\n`CONTENTFUL_SPACE_ID` and `CONTENTFUL_ACCESS_TOKEN` and run `headless-blog generate`.\n"
      }
    }
  ],
  "includes": {}
}
"#;

/// Initialize a new site in the given directory
///
/// Existing files are left alone.
pub fn init_site(target_dir: &Path) -> Result<()> {
    fs::create_dir_all(target_dir.join("static/images"))?;

    write_new(&target_dir.join("_config.yml"), CONFIG)?;
    write_new(&target_dir.join("entries.json"), SAMPLE_ENTRIES)?;

    Ok(())
}

fn write_new(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        tracing::warn!("Skipping existing {:?}", path);
        return Ok(());
    }
    fs::write(path, content)?;
    tracing::debug!("Created: {:?}", path);
    Ok(())
}
