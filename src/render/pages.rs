//! Full pages, one function per route.

use std::fmt::Write as _;

use cinescope_common::MediaKind;
use cinescope_tmdb::{
    Credits, ImageSize, MediaSummary, MovieDetails, Person, PersonCredit, ReviewPage, SearchHit,
    SearchPage, Season, TvDetails, WatchProviders,
};

use super::components::{
    backdrop_hero, carousel, cast_carousel, facts, history_card, media_card, media_carousel,
    notice, pagination, paragraphs, rating, reviews_section, title_link,
    watch_providers_section,
};
use super::{escape, layout, Images, Nav};
use crate::history::{Grouping, HistoryQuery, HistoryView, KindFilter, SortKey};

/// Cast members shown on a title page.
const CAST_LIMIT: usize = 20;

// ---------------------------------------------------------------------------
// Home
// ---------------------------------------------------------------------------

pub fn home(images: &Images, movies: &[MediaSummary], shows: &[MediaSummary], trending: bool) -> String {
    let (movie_heading, show_heading) = if trending {
        ("Trending movies", "Trending shows")
    } else {
        ("Popular movies", "Popular shows")
    };
    let mut body = String::new();
    body.push_str(&media_carousel(images, movie_heading, movies));
    body.push_str(&media_carousel(images, show_heading, shows));
    if movies.is_empty() && shows.is_empty() {
        body.push_str(&notice("Nothing to show right now. Check the TMDb API key."));
    }
    layout("Home", Nav::Home, "", &body)
}

// ---------------------------------------------------------------------------
// Titles
// ---------------------------------------------------------------------------

/// Which backdrop a title page shows and how many there are to cycle through.
#[derive(Debug, Clone, Default)]
pub struct Backdrop {
    pub url: Option<String>,
    pub index: usize,
    pub count: usize,
}

/// Everything the movie and show pages share beyond the details record.
#[derive(Debug, Clone)]
pub struct TitleExtras {
    pub backdrop: Backdrop,
    pub credits: Credits,
    pub reviews: ReviewPage,
    pub recommendations: Vec<MediaSummary>,
    pub providers: Option<WatchProviders>,
    pub trailer_url: Option<String>,
}

struct Header<'a> {
    kind: MediaKind,
    id: u64,
    title: &'a str,
    year: Option<String>,
    tagline: Option<&'a str>,
    overview: Option<&'a str>,
    poster_path: Option<&'a str>,
    vote_average: Option<f64>,
    genres: Vec<&'a str>,
}

fn title_page(images: &Images, header: Header<'_>, facts_html: &str, extras: &TitleExtras, middle: &str) -> String {
    let path = title_link(header.kind, header.id);
    let backdrop_param = extras.backdrop.index.to_string();
    let keep: Vec<(&str, &str)> = if extras.backdrop.index > 0 {
        vec![("backdrop", backdrop_param.as_str())]
    } else {
        Vec::new()
    };

    let mut body = backdrop_hero(
        extras.backdrop.url.as_deref(),
        &path,
        extras.backdrop.index,
        extras.backdrop.count,
    );

    let poster = images
        .url(ImageSize::POSTER_LARGE, header.poster_path)
        .map(|src| format!(r#"<img class="poster" src="{}" alt="">"#, escape(&src)))
        .unwrap_or_default();
    let year = header
        .year
        .map(|y| format!(r#" <span class="year">({})</span>"#, escape(&y)))
        .unwrap_or_default();
    let tagline = header
        .tagline
        .filter(|t| !t.is_empty())
        .map(|t| format!(r#"<p class="tagline">{}</p>"#, escape(t)))
        .unwrap_or_default();
    let score = rating(header.vote_average)
        .map(|r| format!(r#"<span class="rating">★ {r}</span>"#))
        .unwrap_or_default();
    let genres = if header.genres.is_empty() {
        String::new()
    } else {
        format!(
            r#"<span class="genres">{}</span>"#,
            escape(&header.genres.join(", "))
        )
    };
    let directors: Vec<&str> = extras.credits.directors().into_iter().map(|d| d.name.as_str()).collect();
    let directed = if directors.is_empty() {
        String::new()
    } else {
        format!(
            r#"<p class="directors">Directed by {}</p>"#,
            escape(&directors.join(", "))
        )
    };
    let trailer = extras
        .trailer_url
        .as_deref()
        .map(|u| format!(r#"<a class="trailer" href="{}" rel="noopener">Watch trailer</a>"#, escape(u)))
        .unwrap_or_default();

    let _ = write!(
        body,
        r#"<section class="details">{poster}<div class="summary"><h1>{title}{year}</h1>{tagline}<div class="meta">{score}{genres}</div>{directed}{overview}{facts_html}{trailer}</div></section>"#,
        title = escape(header.title),
        overview = header.overview.map(paragraphs).unwrap_or_default(),
    );

    body.push_str(&cast_carousel(images, &extras.credits.top_cast(CAST_LIMIT)));
    body.push_str(middle);
    body.push_str(&watch_providers_section(images, extras.providers.as_ref()));
    body.push_str(&reviews_section(&extras.reviews, &path, &keep));
    body.push_str(&media_carousel(images, "Recommendations", &extras.recommendations));

    layout(header.title, Nav::None, "", &body)
}

pub fn movie(images: &Images, movie: &MovieDetails, extras: &TitleExtras) -> String {
    let header = Header {
        kind: MediaKind::Movie,
        id: movie.id,
        title: movie.display_title(),
        year: movie.year().map(|y| y.to_string()),
        tagline: movie.tagline.as_deref(),
        overview: movie.overview.as_deref(),
        poster_path: movie.poster_path.as_deref(),
        vote_average: movie.vote_average,
        genres: movie.genres.iter().map(|g| g.name.as_str()).collect(),
    };
    let money = |v: Option<u64>| v.filter(|v| *v > 0).map(format_dollars);
    let facts_html = facts(&[
        ("Released", movie.release_date.clone()),
        ("Runtime", movie.runtime_label()),
        ("Status", movie.status.clone()),
        ("Budget", money(movie.budget)),
        ("Revenue", money(movie.revenue)),
    ]);
    title_page(images, header, &facts_html, extras, "")
}

pub fn tv(images: &Images, show: &TvDetails, extras: &TitleExtras) -> String {
    let header = Header {
        kind: MediaKind::Tv,
        id: show.id,
        title: show.display_title(),
        year: show.year_span(),
        tagline: show.tagline.as_deref(),
        overview: show.overview.as_deref(),
        poster_path: show.poster_path.as_deref(),
        vote_average: show.vote_average,
        genres: show.genres.iter().map(|g| g.name.as_str()).collect(),
    };
    let creators = show.creators();
    let networks: Vec<&str> = show.networks.iter().map(|n| n.name.as_str()).collect();
    let facts_html = facts(&[
        ("Created by", (!creators.is_empty()).then(|| creators.join(", "))),
        ("Network", (!networks.is_empty()).then(|| networks.join(", "))),
        ("First aired", show.first_air_date.clone()),
        ("Episode runtime", show.runtime_label()),
        ("Seasons", show.number_of_seasons.map(|n| n.to_string())),
        ("Episodes", show.number_of_episodes.map(|n| n.to_string())),
        ("Status", show.status.clone()),
    ]);

    let seasons: Vec<String> = show
        .seasons
        .iter()
        .map(|s| {
            let name = s
                .name
                .clone()
                .unwrap_or_else(|| format!("Season {}", s.season_number));
            let poster = images
                .poster(s.poster_path.as_deref())
                .map(|src| format!(r#"<img src="{}" alt="" loading="lazy">"#, escape(&src)))
                .unwrap_or_else(|| r#"<div class="placeholder"></div>"#.to_string());
            let count = s
                .episode_count
                .map(|n| format!(r#"<div class="card-meta">{n} episodes</div>"#))
                .unwrap_or_default();
            format!(
                r#"<a class="card" href="/tv/{}/season/{}">{poster}<div class="card-title">{}</div>{count}</a>"#,
                show.id,
                s.season_number,
                escape(&name)
            )
        })
        .collect();

    title_page(images, header, &facts_html, extras, &carousel("Seasons", &seasons))
}

pub fn season(images: &Images, show_id: u64, show_title: &str, season: &Season) -> String {
    let name = season
        .name
        .clone()
        .unwrap_or_else(|| format!("Season {}", season.season_number));

    let mut body = format!(
        r#"<p class="crumbs"><a href="/tv/{show_id}">{}</a></p><h1>{}</h1>"#,
        escape(show_title),
        escape(&name)
    );
    if let Some(overview) = season.overview.as_deref() {
        body.push_str(&paragraphs(overview));
    }

    body.push_str(r#"<ol class="episodes">"#);
    for ep in &season.episodes {
        let still = images
            .url(ImageSize::STILL, ep.still_path.as_deref())
            .map(|src| format!(r#"<img src="{}" alt="" loading="lazy">"#, escape(&src)))
            .unwrap_or_default();
        let title = ep
            .name
            .clone()
            .unwrap_or_else(|| format!("Episode {}", ep.episode_number));
        let aired = ep
            .air_date
            .as_deref()
            .map(|d| format!(" · <time>{}</time>", escape(d)))
            .unwrap_or_default();
        let runtime = cinescope_tmdb::runtime_label(ep.runtime)
            .map(|r| format!(" · {r}"))
            .unwrap_or_default();
        let _ = write!(
            body,
            r#"<li class="episode">{still}<div><h3><span class="code">{}</span> {}</h3><div class="card-meta">{aired}{runtime}</div>{}</div></li>"#,
            ep.code(),
            escape(&title),
            ep.overview.as_deref().map(paragraphs).unwrap_or_default()
        );
    }
    if season.episodes.is_empty() {
        body.push_str(r#"<li class="empty">No episodes listed.</li>"#);
    }
    body.push_str("</ol>");

    layout(&format!("{show_title} · {name}"), Nav::None, "", &body)
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

pub fn person(images: &Images, person: &Person, credits: &[PersonCredit]) -> String {
    let photo = images
        .url(ImageSize::POSTER, person.profile_path.as_deref())
        .map(|src| format!(r#"<img class="poster" src="{}" alt="">"#, escape(&src)))
        .unwrap_or_default();
    let facts_html = facts(&[
        ("Known for", person.known_for_department.clone()),
        ("Born", person.birthday.clone()),
        ("Died", person.deathday.clone()),
        ("Place of birth", person.place_of_birth.clone()),
    ]);
    let bio = person
        .biography
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .map(paragraphs)
        .unwrap_or_else(|| r#"<p class="empty">No biography available.</p>"#.to_string());

    let mut body = format!(
        r#"<section class="details">{photo}<div class="summary"><h1>{}</h1>{facts_html}{bio}</div></section>"#,
        escape(&person.name)
    );

    let cards: Vec<String> = credits
        .iter()
        .map(|c| {
            let mut meta = String::new();
            if let Some(year) = c.year() {
                let _ = write!(meta, "<span>{year}</span>");
            }
            if let Some(role) = c.role().filter(|r| !r.is_empty()) {
                let _ = write!(meta, r#"<span class="role">{}</span>"#, escape(role));
            }
            let poster = images
                .poster(c.poster_path.as_deref())
                .map(|src| format!(r#"<img src="{}" alt="" loading="lazy">"#, escape(&src)))
                .unwrap_or_else(|| r#"<div class="placeholder"></div>"#.to_string());
            let inner = format!(
                r#"{poster}<div class="card-title">{}</div><div class="card-meta">{meta}</div>"#,
                escape(c.display_title())
            );
            match c.kind() {
                Some(kind) => format!(r#"<a class="card" href="{}">{inner}</a>"#, title_link(kind, c.id)),
                None => format!(r#"<div class="card">{inner}</div>"#),
            }
        })
        .collect();
    body.push_str(&carousel("Known for", &cards));

    layout(&person.name, Nav::None, "", &body)
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

pub fn search(images: &Images, query: &str, results: &SearchPage) -> String {
    let query = query.trim();
    let mut body = String::new();

    if query.is_empty() {
        body.push_str("<h1>Search</h1>");
        body.push_str(&notice("Type a title or a name to search."));
        return layout("Search", Nav::Search, "", &body);
    }

    let _ = write!(
        body,
        r#"<h1>Results for “{}”</h1><p class="count">{} results</p>"#,
        escape(query),
        results.total_results
    );

    let cards: Vec<String> = results
        .results
        .iter()
        .filter_map(|hit| match hit {
            SearchHit::Movie(m) | SearchHit::Tv(m) => Some(media_card(images, m)),
            SearchHit::Person(p) => {
                let photo = images
                    .profile(p.profile_path.as_deref())
                    .map(|src| format!(r#"<img src="{}" alt="" loading="lazy">"#, escape(&src)))
                    .unwrap_or_else(|| r#"<div class="placeholder"></div>"#.to_string());
                let dept = p
                    .known_for_department
                    .as_deref()
                    .map(|d| format!(r#"<div class="card-meta">{}</div>"#, escape(d)))
                    .unwrap_or_default();
                Some(format!(
                    r#"<a class="card person" href="/person/{}">{photo}<div class="card-title">{}</div>{dept}</a>"#,
                    p.id,
                    escape(&p.name)
                ))
            }
            SearchHit::Unknown => None,
        })
        .collect();

    if cards.is_empty() {
        body.push_str(&notice("No matches."));
    } else {
        let _ = write!(body, r#"<div class="grid">{}</div>"#, cards.concat());
    }
    body.push_str(&pagination(
        "/search",
        "page",
        results.page,
        results.total_pages,
        &[("q", query)],
    ));

    layout(&format!("Search: {query}"), Nav::Search, query, &body)
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

fn select<T: Copy + PartialEq>(
    name: &str,
    options: &[T],
    current: T,
    value: impl Fn(T) -> &'static str,
    label: impl Fn(T) -> &'static str,
) -> String {
    let mut out = format!(r#"<select name="{name}">"#);
    for &opt in options {
        let selected = if opt == current { " selected" } else { "" };
        let _ = write!(
            out,
            r#"<option value="{}"{selected}>{}</option>"#,
            value(opt),
            escape(label(opt))
        );
    }
    out.push_str("</select>");
    out
}

fn history_controls(query: &HistoryQuery) -> String {
    format!(
        r#"<form class="history-controls" action="/history" method="get"><input type="search" name="q" placeholder="Filter history" value="{}">{}{}{}<button type="submit">Apply</button></form>"#,
        escape(&query.q),
        select("type", &KindFilter::ALL, query.kind, KindFilter::as_str, KindFilter::label),
        select("sort", &SortKey::ALL, query.sort, SortKey::as_str, SortKey::label),
        select("group", &Grouping::ALL, query.group, Grouping::as_str, Grouping::label),
    )
}

/// History page. `view` is `None` when Trakt is not configured.
pub fn history(images: &Images, user: Option<&str>, view: Option<&HistoryView>) -> String {
    let mut body = String::from("<h1>Watch history</h1>");

    let Some(view) = view else {
        body.push_str(&notice(
            "Trakt is not configured. Set trakt.client_id and trakt.username to see watch history.",
        ));
        return layout("History", Nav::History, "", &body);
    };

    if let Some(user) = user {
        let _ = write!(body, r#"<p class="subtitle">Trakt user {}</p>"#, escape(user));
    }
    body.push_str(&history_controls(&view.query));
    let _ = write!(
        body,
        r#"<p class="count">{} of {} plays · {} movies · {} episodes</p>"#,
        view.matched, view.total, view.movies, view.episodes
    );

    if view.total == 0 {
        body.push_str(&notice("No history could be loaded from Trakt."));
    } else if view.matched == 0 {
        body.push_str(&notice("Nothing in your history matches these filters."));
    }

    for group in &view.groups {
        let cards: String = group
            .items
            .iter()
            .map(|i| history_card(images, i, view.offset))
            .collect();
        let heading = if view.query.group == Grouping::None {
            String::new()
        } else {
            format!(
                "<h2>{} <small>({})</small></h2>",
                escape(&group.label),
                group.items.len()
            )
        };
        let _ = write!(
            body,
            r#"<section class="history-group" data-key="{}">{heading}<div class="grid">{cards}</div></section>"#,
            escape(&group.key)
        );
    }

    layout("History", Nav::History, "", &body)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

pub fn not_found(message: &str) -> String {
    let body = format!(
        r#"<h1>Not found</h1>{}<p><a href="/">Back to home</a></p>"#,
        notice(message)
    );
    layout("Not found", Nav::None, "", &body)
}

fn format_dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
