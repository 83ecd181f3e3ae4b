//! TMDb response types.
//!
//! Everything TMDb may omit is an `Option` or a defaulted collection; the
//! derived helpers (`display_title`, `year`, ...) guard against absent and
//! empty values so templates never have to.

use std::collections::{HashMap, HashSet};

use cinescope_common::MediaKind;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Extract a four-digit year from a date string like `"2023-04-15"`.
pub fn parse_year(date: Option<&str>) -> Option<u16> {
    date.and_then(|d| d.get(..4)).and_then(|y| y.parse::<u16>().ok())
}

/// First non-blank value of a list of optional strings.
fn first_present<'a>(candidates: &[Option<&'a str>]) -> Option<&'a str> {
    candidates
        .iter()
        .flatten()
        .copied()
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// Format a runtime in minutes as `"2h 28m"`.
pub fn runtime_label(minutes: Option<u32>) -> Option<String> {
    match minutes? {
        0 => None,
        m if m < 60 => Some(format!("{m}m")),
        m if m % 60 == 0 => Some(format!("{}h", m / 60)),
        m => Some(format!("{}h {}m", m / 60, m % 60)),
    }
}

/// A page of results, as returned by every list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Paged<T> {
    /// An empty page, used as the fallback when a request fails.
    pub fn empty(page: u32) -> Self {
        Self {
            page: page.max(1),
            results: Vec::new(),
            total_pages: 0,
            total_results: 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// A movie or show as it appears in lists (trending, recommendations, search).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaSummary {
    pub id: u64,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub original_title: Option<String>,
    pub original_name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub vote_average: Option<f64>,
    pub popularity: Option<f64>,
}

impl MediaSummary {
    pub fn display_title(&self) -> &str {
        first_present(&[
            self.title.as_deref(),
            self.name.as_deref(),
            self.original_title.as_deref(),
            self.original_name.as_deref(),
        ])
        .unwrap_or("Untitled")
    }

    pub fn year(&self) -> Option<u16> {
        parse_year(self.release_date.as_deref()).or_else(|| parse_year(self.first_air_date.as_deref()))
    }

    /// Movie or show. Uses `media_type` when TMDb sent it, otherwise infers
    /// from which title field is populated.
    pub fn kind(&self) -> Option<MediaKind> {
        match self.media_type.as_deref() {
            Some("movie") => Some(MediaKind::Movie),
            Some("tv") => Some(MediaKind::Tv),
            Some(_) => None,
            None if self.title.is_some() => Some(MediaKind::Movie),
            None if self.name.is_some() => Some(MediaKind::Tv),
            None => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub release_date: Option<String>,
    pub runtime: Option<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub status: Option<String>,
    pub homepage: Option<String>,
    pub imdb_id: Option<String>,
    pub budget: Option<u64>,
    pub revenue: Option<u64>,
}

impl MovieDetails {
    pub fn display_title(&self) -> &str {
        first_present(&[self.title.as_deref(), self.original_title.as_deref()]).unwrap_or("Untitled")
    }

    pub fn year(&self) -> Option<u16> {
        parse_year(self.release_date.as_deref())
    }

    pub fn runtime_label(&self) -> Option<String> {
        runtime_label(self.runtime)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Creator {
    pub id: u64,
    pub name: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub id: u64,
    pub name: String,
    pub logo_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub id: u64,
    pub season_number: u32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub episode_count: Option<u32>,
    pub poster_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvDetails {
    pub id: u64,
    pub name: Option<String>,
    pub original_name: Option<String>,
    pub tagline: Option<String>,
    pub overview: Option<String>,
    pub first_air_date: Option<String>,
    pub last_air_date: Option<String>,
    #[serde(default)]
    pub episode_run_time: Vec<u32>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub vote_average: Option<f64>,
    pub vote_count: Option<u32>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub status: Option<String>,
    pub homepage: Option<String>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub seasons: Vec<SeasonSummary>,
    #[serde(default)]
    pub created_by: Vec<Creator>,
    #[serde(default)]
    pub networks: Vec<Network>,
}

impl TvDetails {
    pub fn display_title(&self) -> &str {
        first_present(&[self.name.as_deref(), self.original_name.as_deref()]).unwrap_or("Untitled")
    }

    pub fn year(&self) -> Option<u16> {
        parse_year(self.first_air_date.as_deref())
    }

    /// `"2008–2013"` style span; open-ended while the show is running.
    pub fn year_span(&self) -> Option<String> {
        let start = self.year()?;
        let ended = matches!(self.status.as_deref(), Some("Ended") | Some("Canceled"));
        match parse_year(self.last_air_date.as_deref()) {
            Some(end) if ended && end != start => Some(format!("{start}–{end}")),
            Some(_) if ended => Some(start.to_string()),
            _ => Some(format!("{start}–")),
        }
    }

    pub fn runtime_label(&self) -> Option<String> {
        runtime_label(self.episode_run_time.first().copied())
    }

    pub fn creators(&self) -> Vec<&str> {
        self.created_by.iter().map(|c| c.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: u64,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub episode_number: u32,
    pub season_number: u32,
    pub still_path: Option<String>,
    pub runtime: Option<u32>,
    pub vote_average: Option<f64>,
}

impl Episode {
    /// `"S01E02"`.
    pub fn code(&self) -> String {
        format!("S{:02}E{:02}", self.season_number, self.episode_number)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub id: u64,
    pub season_number: u32,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub air_date: Option<String>,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

// ---------------------------------------------------------------------------
// Credits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    pub order: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

impl Credits {
    /// Crew members credited as "Director", de-duplicated by person.
    pub fn directors(&self) -> Vec<&CrewMember> {
        let mut seen = HashSet::new();
        self.crew
            .iter()
            .filter(|c| c.job.as_deref() == Some("Director"))
            .filter(|c| seen.insert(c.id))
            .collect()
    }

    /// Cast in billing order, capped at `limit`.
    pub fn top_cast(&self, limit: usize) -> Vec<&CastMember> {
        let mut cast: Vec<&CastMember> = self.cast.iter().collect();
        cast.sort_by_key(|c| c.order.unwrap_or(u32::MAX));
        cast.truncate(limit);
        cast
    }
}

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorDetails {
    pub name: Option<String>,
    pub username: Option<String>,
    pub avatar_path: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub author: Option<String>,
    #[serde(default)]
    pub author_details: AuthorDetails,
    #[serde(default)]
    pub content: String,
    pub created_at: Option<String>,
    pub url: Option<String>,
}

impl Review {
    pub fn author_name(&self) -> &str {
        first_present(&[
            self.author.as_deref(),
            self.author_details.name.as_deref(),
            self.author_details.username.as_deref(),
        ])
        .unwrap_or("Anonymous")
    }

    /// Date part of `created_at`.
    pub fn date(&self) -> Option<&str> {
        self.created_at.as_deref().and_then(|d| d.get(..10))
    }
}

pub type ReviewPage = Paged<Review>;

// ---------------------------------------------------------------------------
// Watch providers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: u64,
    pub provider_name: String,
    pub logo_path: Option<String>,
    pub display_priority: Option<u32>,
}

/// Where a title can be watched in one region.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatchProviders {
    pub link: Option<String>,
    #[serde(default)]
    pub flatrate: Vec<Provider>,
    #[serde(default)]
    pub free: Vec<Provider>,
    #[serde(default)]
    pub ads: Vec<Provider>,
    #[serde(default)]
    pub rent: Vec<Provider>,
    #[serde(default)]
    pub buy: Vec<Provider>,
}

impl WatchProviders {
    pub fn is_empty(&self) -> bool {
        self.flatrate.is_empty()
            && self.free.is_empty()
            && self.ads.is_empty()
            && self.rent.is_empty()
            && self.buy.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct WatchProvidersResponse {
    pub results: HashMap<String, WatchProviders>,
}

// ---------------------------------------------------------------------------
// Images and videos
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub file_path: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub aspect_ratio: Option<f64>,
    pub iso_639_1: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub vote_count: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageSet {
    #[serde(default)]
    pub backdrops: Vec<Image>,
    #[serde(default)]
    pub posters: Vec<Image>,
    #[serde(default)]
    pub logos: Vec<Image>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub key: String,
    pub name: Option<String>,
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    #[serde(default)]
    pub official: bool,
}

impl Video {
    pub fn url(&self) -> Option<String> {
        match self.site.as_str() {
            "YouTube" => Some(format!("https://www.youtube.com/watch?v={}", self.key)),
            "Vimeo" => Some(format!("https://vimeo.com/{}", self.key)),
            _ => None,
        }
    }
}

/// Best trailer: official YouTube trailers first, then any linkable trailer,
/// then any linkable teaser.
pub fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    let linkable = |v: &&Video| v.url().is_some();
    videos
        .iter()
        .filter(linkable)
        .find(|v| v.video_type == "Trailer" && v.official && v.site == "YouTube")
        .or_else(|| videos.iter().filter(linkable).find(|v| v.video_type == "Trailer"))
        .or_else(|| videos.iter().filter(linkable).find(|v| v.video_type == "Teaser"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct VideosResponse {
    #[serde(default)]
    pub results: Vec<Video>,
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: u64,
    pub name: String,
    pub biography: Option<String>,
    pub birthday: Option<String>,
    pub deathday: Option<String>,
    pub place_of_birth: Option<String>,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub also_known_as: Vec<String>,
}

/// One entry of a person's combined credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonCredit {
    pub id: u64,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    pub character: Option<String>,
    pub job: Option<String>,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub popularity: Option<f64>,
    pub vote_count: Option<u32>,
}

impl PersonCredit {
    pub fn display_title(&self) -> &str {
        first_present(&[self.title.as_deref(), self.name.as_deref()]).unwrap_or("Untitled")
    }

    pub fn year(&self) -> Option<u16> {
        parse_year(self.release_date.as_deref()).or_else(|| parse_year(self.first_air_date.as_deref()))
    }

    pub fn kind(&self) -> Option<MediaKind> {
        self.media_type.as_deref().and_then(|m| m.parse().ok())
    }

    /// Character for acting credits, job otherwise.
    pub fn role(&self) -> Option<&str> {
        first_present(&[self.character.as_deref(), self.job.as_deref()])
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CombinedCredits {
    #[serde(default)]
    pub cast: Vec<PersonCredit>,
    #[serde(default)]
    pub crew: Vec<PersonCredit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonSummary {
    pub id: u64,
    pub name: String,
    pub profile_path: Option<String>,
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub known_for: Vec<MediaSummary>,
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// One `/search/multi` hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum SearchHit {
    Movie(MediaSummary),
    Tv(MediaSummary),
    Person(PersonSummary),
    #[serde(other)]
    Unknown,
}

pub type SearchPage = Paged<SearchHit>;
