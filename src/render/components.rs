//! Reusable page fragments.

use std::fmt::Write as _;

use chrono::FixedOffset;
use cinescope_common::MediaKind;
use cinescope_tmdb::{CastMember, ImageSize, MediaSummary, Provider, ReviewPage, WatchProviders};

use super::{escape, Images};
use crate::history::HistoryItem;

/// Local page for a title.
pub fn title_link(kind: MediaKind, id: u64) -> String {
    format!("/{}/{id}", kind.as_path())
}

/// `"7.8"` from a vote average, or nothing for unrated titles.
pub fn rating(vote_average: Option<f64>) -> Option<String> {
    vote_average
        .filter(|v| *v > 0.0)
        .map(|v| format!("{v:.1}"))
}

fn poster_img(images: &Images, path: Option<&str>, alt: &str) -> String {
    match images.poster(path) {
        Some(src) => format!(
            r#"<img src="{}" alt="{}" loading="lazy">"#,
            escape(&src),
            escape(alt)
        ),
        None => r#"<div class="placeholder"></div>"#.to_string(),
    }
}

/// Poster card for a movie or show. Items whose kind is unknown render
/// without a link.
pub fn media_card(images: &Images, item: &MediaSummary) -> String {
    let title = item.display_title();
    let mut meta = String::new();
    if let Some(year) = item.year() {
        let _ = write!(meta, "<span>{year}</span>");
    }
    if let Some(r) = rating(item.vote_average) {
        let _ = write!(meta, r#"<span class="rating">★ {r}</span>"#);
    }

    let inner = format!(
        r#"{poster}<div class="card-title">{title}</div><div class="card-meta">{meta}</div>"#,
        poster = poster_img(images, item.poster_path.as_deref(), title),
        title = escape(title),
    );
    match item.kind() {
        Some(kind) => format!(
            r#"<a class="card" href="{}">{inner}</a>"#,
            title_link(kind, item.id)
        ),
        None => format!(r#"<div class="card">{inner}</div>"#),
    }
}

/// Horizontally scrolling row of cards under a heading. Empty rows render
/// nothing.
pub fn carousel(heading: &str, cards: &[String]) -> String {
    if cards.is_empty() {
        return String::new();
    }
    format!(
        r#"<section class="carousel"><h2>{}</h2><div class="row">{}</div></section>"#,
        escape(heading),
        cards.concat()
    )
}

pub fn media_carousel(images: &Images, heading: &str, items: &[MediaSummary]) -> String {
    let cards: Vec<String> = items.iter().map(|m| media_card(images, m)).collect();
    carousel(heading, &cards)
}

pub fn cast_carousel(images: &Images, cast: &[&CastMember]) -> String {
    let cards: Vec<String> = cast
        .iter()
        .map(|c| {
            let photo = match images.profile(c.profile_path.as_deref()) {
                Some(src) => format!(
                    r#"<img src="{}" alt="{}" loading="lazy">"#,
                    escape(&src),
                    escape(&c.name)
                ),
                None => r#"<div class="placeholder"></div>"#.to_string(),
            };
            let character = c
                .character
                .as_deref()
                .filter(|s| !s.is_empty())
                .map(|s| format!(r#"<div class="card-meta">{}</div>"#, escape(s)))
                .unwrap_or_default();
            format!(
                r#"<a class="card person" href="/person/{}">{photo}<div class="card-title">{}</div>{character}</a>"#,
                c.id,
                escape(&c.name)
            )
        })
        .collect();
    carousel("Cast", &cards)
}

/// Hero backdrop with a "next backdrop" toggle when more than one is
/// available. `index` is the position shown; the toggle links to the next
/// one and wraps.
pub fn backdrop_hero(url: Option<&str>, base_href: &str, index: usize, count: usize) -> String {
    let Some(url) = url else {
        return String::new();
    };
    let toggle = if count > 1 {
        let next = ((index + 1) % count).to_string();
        format!(
            r#"<a class="backdrop-toggle" href="{}">Backdrop {} of {count} ›</a>"#,
            escape(&super::href(base_href, &[("backdrop", next.as_str())])),
            index % count + 1
        )
    } else {
        String::new()
    };
    format!(
        r#"<div class="hero" style="background-image: url('{}')">{toggle}</div>"#,
        escape(url)
    )
}

/// Previous/next links for a paged list. `extra` carries the other query
/// parameters to preserve.
pub fn pagination(
    path: &str,
    param: &str,
    page: u32,
    total_pages: u32,
    extra: &[(&str, &str)],
) -> String {
    if total_pages <= 1 {
        return String::new();
    }
    let link = |target: u32, label: &str| {
        let target = target.to_string();
        let mut params: Vec<(&str, &str)> = extra.to_vec();
        params.push((param, target.as_str()));
        format!(
            r#"<a href="{}">{label}</a>"#,
            escape(&super::href(path, &params))
        )
    };

    let mut out = String::from(r#"<nav class="pagination">"#);
    if page > 1 {
        out.push_str(&link(page - 1, "‹ Previous"));
    }
    let _ = write!(out, "<span>Page {page} of {total_pages}</span>");
    if page < total_pages {
        out.push_str(&link(page + 1, "Next ›"));
    }
    out.push_str("</nav>");
    out
}

/// Review list with its own pagination. `extra` keeps the page's other
/// parameters (such as the chosen backdrop) on the paging links.
pub fn reviews_section(reviews: &ReviewPage, path: &str, extra: &[(&str, &str)]) -> String {
    let mut out = String::from(r#"<section class="reviews" id="reviews"><h2>Reviews</h2>"#);
    if reviews.results.is_empty() {
        out.push_str(r#"<p class="empty">No reviews yet.</p>"#);
    }
    for review in &reviews.results {
        let rating = review
            .author_details
            .rating
            .map(|r| format!(r#" <span class="rating">★ {r:.0}/10</span>"#))
            .unwrap_or_default();
        let date = review
            .date()
            .map(|d| format!(" <time>{}</time>", escape(d)))
            .unwrap_or_default();
        let _ = write!(
            out,
            r#"<article class="review"><header><strong>{}</strong>{rating}{date}</header><div class="review-body">{}</div></article>"#,
            escape(review.author_name()),
            paragraphs(&review.content)
        );
    }
    out.push_str(&pagination(path, "reviews", reviews.page, reviews.total_pages, extra));
    out.push_str("</section>");
    out
}

fn provider_logos(images: &Images, heading: &str, providers: &[Provider]) -> String {
    if providers.is_empty() {
        return String::new();
    }
    let mut out = format!(r#"<div class="providers"><h3>{}</h3><ul>"#, escape(heading));
    for p in providers {
        let logo = images
            .url(ImageSize::LOGO, p.logo_path.as_deref())
            .map(|src| format!(r#"<img src="{}" alt="">"#, escape(&src)))
            .unwrap_or_default();
        let _ = write!(out, "<li>{logo}<span>{}</span></li>", escape(&p.provider_name));
    }
    out.push_str("</ul></div>");
    out
}

pub fn watch_providers_section(images: &Images, providers: Option<&WatchProviders>) -> String {
    let Some(wp) = providers.filter(|wp| !wp.is_empty()) else {
        return String::new();
    };
    let mut out = String::from(r#"<section class="watch"><h2>Where to watch</h2>"#);
    out.push_str(&provider_logos(images, "Stream", &wp.flatrate));
    out.push_str(&provider_logos(images, "Free", &wp.free));
    out.push_str(&provider_logos(images, "With ads", &wp.ads));
    out.push_str(&provider_logos(images, "Rent", &wp.rent));
    out.push_str(&provider_logos(images, "Buy", &wp.buy));
    if let Some(link) = wp.link.as_deref() {
        let _ = write!(
            out,
            r#"<p><a href="{}" rel="noopener">All options on TMDb</a></p>"#,
            escape(link)
        );
    }
    out.push_str("</section>");
    out
}

/// Split text on blank lines into escaped paragraphs.
pub fn paragraphs(text: &str) -> String {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", escape(p).replace('\n', "<br>")))
        .collect()
}

/// `label: value` rows, skipping absent values.
pub fn facts(rows: &[(&str, Option<String>)]) -> String {
    let items: String = rows
        .iter()
        .filter_map(|(label, value)| {
            value
                .as_deref()
                .filter(|v| !v.is_empty())
                .map(|v| format!("<dt>{}</dt><dd>{}</dd>", escape(label), escape(v)))
        })
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!(r#"<dl class="facts">{items}</dl>"#)
    }
}

pub fn notice(message: &str) -> String {
    format!(r#"<div class="notice">{}</div>"#, escape(message))
}

/// Card for one play; `offset` is the zone the page groups by.
pub fn history_card(images: &Images, item: &HistoryItem, offset: FixedOffset) -> String {
    let watched = item.watched_at.with_timezone(&offset);
    let episode = item
        .episode_label
        .as_deref()
        .map(|l| format!(r#"<div class="card-meta">{}</div>"#, escape(l)))
        .unwrap_or_default();
    let inner = format!(
        r#"{poster}<div class="card-title">{title}</div>{episode}<div class="card-meta"><time datetime="{iso}">{when}</time></div>"#,
        poster = poster_img(images, item.poster_path.as_deref(), &item.title),
        title = escape(&item.title),
        iso = watched.to_rfc3339(),
        when = watched.format("%-d %b %Y %H:%M"),
    );
    match item.link.as_deref() {
        Some(link) => format!(r#"<a class="card" href="{}">{inner}</a>"#, escape(link)),
        None => format!(r#"<div class="card">{inner}</div>"#),
    }
}
