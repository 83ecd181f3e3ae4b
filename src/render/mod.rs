//! Server-side HTML rendering.
//!
//! Pages are plain functions from view data to a `String`. Every piece of
//! text or attribute taken from TMDb, Trakt, or the request goes through
//! [`escape`] before it is interpolated.

pub mod components;
pub mod pages;

use std::fmt::Write as _;

use cinescope_tmdb::{image_url, ImageSize};

/// Escape text for use in HTML element content or a quoted attribute.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Minimal percent-encoding for query parameter values.
pub fn urlencoded(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(b as char);
            }
            b' ' => out.push('+'),
            _ => {
                out.push('%');
                out.push(char::from(HEX[(b >> 4) as usize]));
                out.push(char::from(HEX[(b & 0x0f) as usize]));
            }
        }
    }
    out
}

const HEX: [u8; 16] = *b"0123456789ABCDEF";

/// Build `path?k=v&...`, skipping empty values.
pub fn href(path: &str, params: &[(&str, &str)]) -> String {
    let mut out = path.to_string();
    let mut sep = '?';
    for (key, value) in params.iter().filter(|(_, v)| !v.is_empty()) {
        let _ = write!(out, "{sep}{key}={}", urlencoded(value));
        sep = '&';
    }
    out
}

/// Image URL builder bound to the configured CDN base.
#[derive(Debug, Clone)]
pub struct Images {
    base: String,
}

impl Images {
    pub fn new(base: impl Into<String>) -> Self {
        Self { base: base.into() }
    }

    pub fn url(&self, size: ImageSize, path: Option<&str>) -> Option<String> {
        image_url(&self.base, size, path)
    }

    pub fn poster(&self, path: Option<&str>) -> Option<String> {
        self.url(ImageSize::POSTER, path)
    }

    pub fn backdrop(&self, path: Option<&str>) -> Option<String> {
        self.url(ImageSize::BACKDROP, path)
    }

    pub fn profile(&self, path: Option<&str>) -> Option<String> {
        self.url(ImageSize::PROFILE, path)
    }
}

/// Top-level navigation entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Home,
    Search,
    History,
    None,
}

/// Wrap `body` in the document shell: head, navigation bar, and search box.
pub fn layout(title: &str, nav: Nav, search_value: &str, body: &str) -> String {
    let link = |target: Nav, href: &str, label: &str| {
        let class = if nav == target { " class=\"active\"" } else { "" };
        format!("<a href=\"{href}\"{class}>{label}</a>")
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Cinescope</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body>
<header class="topbar">
<a class="brand" href="/">Cinescope</a>
<nav>{home}{search}{history}</nav>
<form class="search" action="/search" method="get">
<input type="search" name="q" placeholder="Search movies, shows, people" value="{value}">
</form>
</header>
<main>
{body}
</main>
<footer>Data from TMDb and Trakt.</footer>
</body>
</html>
"#,
        title = escape(title),
        home = link(Nav::Home, "/", "Home"),
        search = link(Nav::Search, "/search", "Search"),
        history = link(Nav::History, "/history", "History"),
        value = escape(search_value),
    )
}
