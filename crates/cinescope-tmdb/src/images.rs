//! Image CDN URLs and backdrop ranking.

use std::cmp::Ordering;

use crate::models::Image;

/// Size segment of a TMDb image URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    W45,
    W92,
    W154,
    W185,
    W300,
    W342,
    W500,
    W780,
    W1280,
    H632,
    Original,
}

impl ImageSize {
    /// Poster in cards and carousels.
    pub const POSTER: ImageSize = ImageSize::W342;
    /// Poster on detail pages.
    pub const POSTER_LARGE: ImageSize = ImageSize::W500;
    /// Full-width hero backdrop.
    pub const BACKDROP: ImageSize = ImageSize::W1280;
    /// Episode stills and backdrop thumbnails.
    pub const STILL: ImageSize = ImageSize::W300;
    /// Cast headshots.
    pub const PROFILE: ImageSize = ImageSize::W185;
    /// Watch-provider and network logos.
    pub const LOGO: ImageSize = ImageSize::W92;

    pub fn as_str(self) -> &'static str {
        match self {
            ImageSize::W45 => "w45",
            ImageSize::W92 => "w92",
            ImageSize::W154 => "w154",
            ImageSize::W185 => "w185",
            ImageSize::W300 => "w300",
            ImageSize::W342 => "w342",
            ImageSize::W500 => "w500",
            ImageSize::W780 => "w780",
            ImageSize::W1280 => "w1280",
            ImageSize::H632 => "h632",
            ImageSize::Original => "original",
        }
    }
}

/// Build a CDN URL for an image path fragment such as `"/abc123.jpg"`.
///
/// Returns `None` for absent or blank paths so callers can fall back to a
/// placeholder.
pub fn image_url(base: &str, size: ImageSize, path: Option<&str>) -> Option<String> {
    let path = path.map(str::trim).filter(|p| !p.is_empty())?;
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        Some(format!("{base}/{}{path}", size.as_str()))
    } else {
        Some(format!("{base}/{}/{path}", size.as_str()))
    }
}

/// Preferred backdrop resolutions, best first.
const RESOLUTION_PRIORITY: [(u32, u32); 4] = [(3840, 2160), (2560, 1440), (1920, 1080), (1280, 720)];

fn resolution_rank(image: &Image) -> usize {
    RESOLUTION_PRIORITY
        .iter()
        .position(|&(w, h)| image.width == w && image.height == h)
        .unwrap_or(RESOLUTION_PRIORITY.len())
}

fn is_language_neutral(image: &Image) -> bool {
    image
        .iso_639_1
        .as_deref()
        .map_or(true, |lang| lang.is_empty() || lang == "xx")
}

/// Rank backdrops best first.
///
/// The candidate pool is the English images; if there are none, the
/// language-neutral ones; if there are none of those either, everything.
/// Within the pool, images are ordered by resolution tier, then by vote
/// average, then by width. The sort is stable, so ties keep TMDb's order.
pub fn rank_backdrops(images: &[Image]) -> Vec<&Image> {
    let english: Vec<&Image> = images
        .iter()
        .filter(|i| i.iso_639_1.as_deref() == Some("en"))
        .collect();

    let mut pool = if !english.is_empty() {
        english
    } else {
        let neutral: Vec<&Image> = images.iter().filter(|i| is_language_neutral(i)).collect();
        if neutral.is_empty() {
            images.iter().collect()
        } else {
            neutral
        }
    };

    pool.sort_by(|a, b| {
        resolution_rank(a)
            .cmp(&resolution_rank(b))
            .then_with(|| {
                b.vote_average
                    .partial_cmp(&a.vote_average)
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| b.width.cmp(&a.width))
    });
    pool
}

/// The top-ranked backdrop, if any.
pub fn best_backdrop(images: &[Image]) -> Option<&Image> {
    rank_backdrops(images).into_iter().next()
}

/// A backdrop picked from the ranked list.
#[derive(Debug, Clone, Copy)]
pub struct RankedBackdrop<'a> {
    pub image: &'a Image,
    /// Position in ranked order, after wrapping.
    pub index: usize,
    /// Length of the ranked list.
    pub count: usize,
}

/// The backdrop at `index` in ranked order, wrapping around so a "next
/// backdrop" toggle can keep incrementing.
pub fn backdrop_at(images: &[Image], index: usize) -> Option<RankedBackdrop<'_>> {
    let ranked = rank_backdrops(images);
    if ranked.is_empty() {
        return None;
    }
    let count = ranked.len();
    let index = index % count;
    Some(RankedBackdrop {
        image: ranked[index],
        index,
        count,
    })
}
