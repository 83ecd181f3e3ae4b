//! Search, filter, sort, and grouping over enriched history.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, Offset, Utc};
use cinescope_trakt::HistoryKind;
use serde::Serialize;

use super::item::HistoryItem;

// ---------------------------------------------------------------------------
// Query options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KindFilter {
    #[default]
    All,
    Movies,
    Episodes,
}

impl KindFilter {
    pub const ALL: [KindFilter; 3] = [KindFilter::All, KindFilter::Movies, KindFilter::Episodes];

    pub fn as_str(self) -> &'static str {
        match self {
            KindFilter::All => "all",
            KindFilter::Movies => "movies",
            KindFilter::Episodes => "episodes",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KindFilter::All => "Everything",
            KindFilter::Movies => "Movies",
            KindFilter::Episodes => "Episodes",
        }
    }

    fn admits(self, kind: HistoryKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Movies => kind == HistoryKind::Movie,
            KindFilter::Episodes => kind == HistoryKind::Episode,
        }
    }
}

impl FromStr for KindFilter {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(KindFilter::All),
            "movie" | "movies" => Ok(KindFilter::Movies),
            "episode" | "episodes" | "show" | "shows" | "tv" => Ok(KindFilter::Episodes),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    WatchedDesc,
    WatchedAsc,
    TitleAsc,
    TitleDesc,
    YearDesc,
    YearAsc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::WatchedDesc,
        SortKey::WatchedAsc,
        SortKey::TitleAsc,
        SortKey::TitleDesc,
        SortKey::YearDesc,
        SortKey::YearAsc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::WatchedDesc => "watched_desc",
            SortKey::WatchedAsc => "watched_asc",
            SortKey::TitleAsc => "title_asc",
            SortKey::TitleDesc => "title_desc",
            SortKey::YearDesc => "year_desc",
            SortKey::YearAsc => "year_asc",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::WatchedDesc => "Recently watched",
            SortKey::WatchedAsc => "Oldest first",
            SortKey::TitleAsc => "Title A–Z",
            SortKey::TitleDesc => "Title Z–A",
            SortKey::YearDesc => "Newest release",
            SortKey::YearAsc => "Oldest release",
        }
    }
}

impl FromStr for SortKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "watched_desc" | "recent" => Ok(SortKey::WatchedDesc),
            "watched_asc" | "oldest" => Ok(SortKey::WatchedAsc),
            "title" | "title_asc" => Ok(SortKey::TitleAsc),
            "title_desc" => Ok(SortKey::TitleDesc),
            "year" | "year_desc" => Ok(SortKey::YearDesc),
            "year_asc" => Ok(SortKey::YearAsc),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Grouping {
    #[default]
    None,
    Day,
    Month,
    Year,
}

impl Grouping {
    pub const ALL: [Grouping; 4] = [Grouping::None, Grouping::Day, Grouping::Month, Grouping::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            Grouping::None => "none",
            Grouping::Day => "day",
            Grouping::Month => "month",
            Grouping::Year => "year",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Grouping::None => "No grouping",
            Grouping::Day => "By day",
            Grouping::Month => "By month",
            Grouping::Year => "By year",
        }
    }

    /// Group key and heading for an item.
    fn key(self, item: &HistoryItem, offset: FixedOffset) -> (String, String) {
        let local = item.watched_at.with_timezone(&offset);
        match self {
            Grouping::None => ("all".to_string(), "All history".to_string()),
            Grouping::Day => (
                local.format("%Y-%m-%d").to_string(),
                local.format("%a, %-d %b %Y").to_string(),
            ),
            Grouping::Month => (
                local.format("%Y-%m").to_string(),
                local.format("%B %Y").to_string(),
            ),
            Grouping::Year => (local.format("%Y").to_string(), local.format("%Y").to_string()),
        }
    }
}

impl FromStr for Grouping {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Grouping::None),
            "day" => Ok(Grouping::Day),
            "month" => Ok(Grouping::Month),
            "year" => Ok(Grouping::Year),
            _ => Err(()),
        }
    }
}

/// Everything the history page lets a viewer change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HistoryQuery {
    pub q: String,
    pub kind: KindFilter,
    pub sort: SortKey,
    pub group: Grouping,
}

impl HistoryQuery {
    /// Build a query from raw parameters. Unknown values fall back to the
    /// defaults instead of failing the request.
    pub fn from_params(
        q: Option<&str>,
        kind: Option<&str>,
        sort: Option<&str>,
        group: Option<&str>,
    ) -> Self {
        Self {
            q: q.unwrap_or_default().trim().to_string(),
            kind: kind.and_then(|k| k.parse().ok()).unwrap_or_default(),
            sort: sort.and_then(|s| s.parse().ok()).unwrap_or_default(),
            group: group.and_then(|g| g.parse().ok()).unwrap_or_default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct HistoryGroup {
    pub key: String,
    pub label: String,
    pub items: Vec<HistoryItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryView {
    pub query: HistoryQuery,
    /// Entries before filtering.
    pub total: usize,
    /// Entries left after search and kind filter.
    pub matched: usize,
    /// Movie plays in the whole history.
    pub movies: usize,
    /// Episode plays in the whole history.
    pub episodes: usize,
    pub groups: Vec<HistoryGroup>,
    /// Offset the groups were keyed in.
    #[serde(skip)]
    pub offset: FixedOffset,
}

impl HistoryView {
    /// When `item` was watched, in the same offset as its group.
    pub fn local_time(&self, item: &HistoryItem) -> DateTime<FixedOffset> {
        item.watched_at.with_timezone(&self.offset)
    }
}

/// Fixed offset for `minutes` east of UTC; out-of-range values mean UTC.
pub fn utc_offset(minutes: i32) -> FixedOffset {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Apply `query` to `items`: search, kind filter, sort, then group.
///
/// Groups appear in the order their first item appears after sorting, so
/// "oldest first" also yields the oldest day first.
pub fn apply(items: &[HistoryItem], query: &HistoryQuery, offset: FixedOffset) -> HistoryView {
    let needle = query.q.trim().to_lowercase();

    let mut matched: Vec<&HistoryItem> = items
        .iter()
        .filter(|item| query.kind.admits(item.kind))
        .filter(|item| needle.is_empty() || item.matches(&needle))
        .collect();
    matched.sort_by(|a, b| compare(a, b, query.sort));

    let mut groups: Vec<HistoryGroup> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for item in &matched {
        let (key, label) = query.group.key(item, offset);
        let slot = *index.entry(key.clone()).or_insert_with(|| {
            groups.push(HistoryGroup {
                key,
                label,
                items: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].items.push((*item).clone());
    }

    HistoryView {
        query: query.clone(),
        total: items.len(),
        matched: matched.len(),
        movies: items.iter().filter(|i| i.kind == HistoryKind::Movie).count(),
        episodes: items.iter().filter(|i| i.kind == HistoryKind::Episode).count(),
        groups,
        offset,
    }
}

/// Primary key from `sort`, then most recent play, then entry id.
fn compare(a: &HistoryItem, b: &HistoryItem, sort: SortKey) -> Ordering {
    let primary = match sort {
        SortKey::WatchedDesc => b.watched_at.cmp(&a.watched_at),
        SortKey::WatchedAsc => a.watched_at.cmp(&b.watched_at),
        SortKey::TitleAsc => compare_titles(a, b),
        SortKey::TitleDesc => compare_titles(b, a),
        SortKey::YearDesc => compare_years(a.year, b.year, true),
        SortKey::YearAsc => compare_years(a.year, b.year, false),
    };
    primary
        .then_with(|| b.watched_at.cmp(&a.watched_at))
        .then_with(|| a.id.cmp(&b.id))
}

fn compare_titles(a: &HistoryItem, b: &HistoryItem) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.episode_label.cmp(&b.episode_label))
}

/// Missing years always sort last.
fn compare_years(a: Option<u16>, b: Option<u16>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) if descending => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn item(id: u64, kind: HistoryKind, title: &str, year: Option<u16>, watched: DateTime<Utc>) -> HistoryItem {
        HistoryItem {
            id,
            watched_at: watched,
            kind,
            title: title.to_string(),
            episode_label: (kind == HistoryKind::Episode).then(|| format!("S01E{id:02} Episode {id}")),
            year,
            tmdb_id: None,
            link: None,
            poster_path: None,
            backdrop_path: None,
        }
    }

    fn sample() -> Vec<HistoryItem> {
        vec![
            item(1, HistoryKind::Movie, "Alien", Some(1979), at(2024, 5, 30, 22)),
            item(2, HistoryKind::Episode, "Severance", Some(2022), at(2024, 6, 2, 9)),
            item(3, HistoryKind::Movie, "arrival", Some(2016), at(2024, 6, 2, 21)),
            item(4, HistoryKind::Episode, "Severance", Some(2022), at(2023, 12, 31, 23)),
            item(5, HistoryKind::Movie, "Zodiac", None, at(2024, 6, 1, 12)),
        ]
    }

    fn ids(view: &HistoryView) -> Vec<u64> {
        view.groups.iter().flat_map(|g| g.items.iter().map(|i| i.id)).collect()
    }

    fn query(q: &str, kind: KindFilter, sort: SortKey, group: Grouping) -> HistoryQuery {
        HistoryQuery {
            q: q.to_string(),
            kind,
            sort,
            group,
        }
    }

    #[test]
    fn default_is_most_recent_first_in_one_group() {
        let view = apply(&sample(), &HistoryQuery::default(), utc_offset(0));
        assert_eq!(view.groups.len(), 1);
        assert_eq!(view.groups[0].key, "all");
        assert_eq!(ids(&view), vec![3, 2, 5, 1, 4]);
        assert_eq!((view.total, view.matched, view.movies, view.episodes), (5, 5, 3, 2));
    }

    #[test]
    fn search_is_case_insensitive_and_covers_episode_labels() {
        let items = sample();
        let view = apply(&items, &query("ALI", KindFilter::All, SortKey::WatchedDesc, Grouping::None), utc_offset(0));
        assert_eq!(ids(&view), vec![1]);

        let view = apply(&items, &query("episode 4", KindFilter::All, SortKey::WatchedDesc, Grouping::None), utc_offset(0));
        assert_eq!(ids(&view), vec![4]);

        let view = apply(&items, &query("   ", KindFilter::All, SortKey::WatchedDesc, Grouping::None), utc_offset(0));
        assert_eq!(view.matched, 5);
    }

    #[test]
    fn kind_filter() {
        let view = apply(&sample(), &query("", KindFilter::Episodes, SortKey::WatchedAsc, Grouping::None), utc_offset(0));
        assert_eq!(ids(&view), vec![4, 2]);
        assert_eq!(view.movies, 3);
    }

    #[test]
    fn title_sort_ignores_case() {
        let view = apply(&sample(), &query("", KindFilter::All, SortKey::TitleAsc, Grouping::None), utc_offset(0));
        assert_eq!(ids(&view), vec![1, 3, 2, 4, 5]);

        let view = apply(&sample(), &query("", KindFilter::All, SortKey::TitleDesc, Grouping::None), utc_offset(0));
        assert_eq!(ids(&view), vec![5, 4, 2, 3, 1]);
    }

    #[test]
    fn year_sort_puts_missing_last_and_breaks_ties_by_recency() {
        let view = apply(&sample(), &query("", KindFilter::All, SortKey::YearDesc, Grouping::None), utc_offset(0));
        assert_eq!(ids(&view), vec![2, 4, 3, 1, 5]);

        let view = apply(&sample(), &query("", KindFilter::All, SortKey::YearAsc, Grouping::None), utc_offset(0));
        assert_eq!(ids(&view), vec![1, 3, 2, 4, 5]);
    }

    #[test]
    fn group_by_day_and_month() {
        let items = sample();
        let view = apply(&items, &query("", KindFilter::All, SortKey::WatchedDesc, Grouping::Day), utc_offset(0));
        let keys: Vec<&str> = view.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2024-06-02", "2024-06-01", "2024-05-30", "2023-12-31"]);
        assert_eq!(view.groups[0].label, "Sun, 2 Jun 2024");
        assert_eq!(view.groups[0].items.len(), 2);

        let view = apply(&items, &query("", KindFilter::All, SortKey::WatchedAsc, Grouping::Month), utc_offset(0));
        let keys: Vec<&str> = view.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2023-12", "2024-05", "2024-06"]);
        assert_eq!(view.groups[2].label, "June 2024");
    }

    #[test]
    fn grouping_respects_utc_offset() {
        // 23:00 UTC on New Year's Eve is already 2024 two hours east.
        let items = sample();
        let view = apply(&items, &query("", KindFilter::Episodes, SortKey::WatchedDesc, Grouping::Year), utc_offset(120));
        let keys: Vec<&str> = view.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2024"]);

        let view = apply(&items, &query("", KindFilter::Episodes, SortKey::WatchedDesc, Grouping::Year), utc_offset(0));
        let keys: Vec<&str> = view.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2024", "2023"]);
    }

    #[test]
    fn groups_follow_title_sort_order() {
        let view = apply(&sample(), &query("", KindFilter::All, SortKey::TitleAsc, Grouping::Year), utc_offset(0));
        let keys: Vec<&str> = view.groups.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2024", "2023"]);
        assert_eq!(view.groups[0].items.len(), 4);
    }

    #[test]
    fn lenient_param_parsing() {
        let q = HistoryQuery::from_params(Some("  dune "), Some("movie"), Some("title"), Some("bogus"));
        assert_eq!(q.q, "dune");
        assert_eq!(q.kind, KindFilter::Movies);
        assert_eq!(q.sort, SortKey::TitleAsc);
        assert_eq!(q.group, Grouping::None);

        assert_eq!(HistoryQuery::from_params(None, None, None, None), HistoryQuery::default());
    }

    #[test]
    fn offset_out_of_range_is_utc() {
        assert_eq!(utc_offset(24 * 60).local_minus_utc(), 0);
        assert_eq!(utc_offset(-300).local_minus_utc(), -300 * 60);
    }
}
