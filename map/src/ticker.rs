// map/src/ticker.rs
//
// Investment-news banner shown above the map. The browser side fetches the
// text and inserts the element; everything that can be decided without a
// DOM lives here.

use estate_shared::escape;
use estate_shared::TickerNews;

pub const TICKER_ID: &str = "ai-news-ticker-box";
pub const ANCHOR_ID: &str = "ai-ticker-anchor";
pub const TOP_BAR_ID: &str = "top-bar";
pub const MAP_DISPLAY_ID: &str = "map-display";
pub const WRAP_ID: &str = "wrap";

/// `city` query parameter from a `location.search` string, or empty.
pub fn city_from_query(search: &str) -> String {
    let query = search.strip_prefix('?').unwrap_or(search);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "city")
        .map(|(_, v)| v.trim().to_string())
        .unwrap_or_default()
}

pub fn news_request_path(city: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(city.as_bytes()).collect();
    format!("/api/investment-news?city={encoded}")
}

const LIVE_BADGE: &str = "<span class=\"ticker-badge ticker-badge--live\" style=\"background:#ef4444;color:#fff;padding:6px 18px;border-radius:50px;font-weight:800;font-size:12px;letter-spacing:1px;white-space:nowrap;flex-shrink:0;\">&#x1F534; LIVE</span>";
const TRENDING_BADGE: &str = "<span class=\"ticker-badge ticker-badge--trending\" style=\"background:#f97316;color:#fff;padding:6px 18px;border-radius:50px;font-weight:800;font-size:12px;letter-spacing:1px;white-space:nowrap;flex-shrink:0;\">&#x1F525; TRENDING</span>";

/// Inner HTML of the ticker element, or `None` when there is no news.
///
/// The text is repeated twice so the scroll animation (which moves by half
/// the strip width) loops without a gap.
pub fn banner_html(news: &TickerNews) -> Option<String> {
    let text = news.news.trim();
    if text.is_empty() {
        return None;
    }
    let city = news.city.as_deref().map(str::trim).filter(|c| !c.is_empty());

    let (badge, title) = match city {
        Some(city) => (
            LIVE_BADGE,
            format!(
                "&#x1F4C8; Top Investment Opportunities in <b style=\"color:#fbbf24;font-size:17px;\">{}</b>",
                escape(city)
            ),
        ),
        None => (TRENDING_BADGE, "&#x1F3D9;&#xFE0F; Top Trending Properties".to_string()),
    };

    let safe = escape(text);
    let item = format!(
        "<span style=\"padding:0 48px;color:#fff;font-size:15px;font-weight:500;line-height:1.6;\">{safe}</span>\
         <span style=\"color:#fbbf24;font-size:22px;padding:0 16px;\">&#x25CF;</span>"
    );

    Some(format!(
        "<style>@keyframes ticker_scroll{{0%{{transform:translateX(0)}}100%{{transform:translateX(-50%)}}}}</style>\
         <div style=\"background:linear-gradient(135deg,#1e3a8a 0%,#2563eb 55%,#0891b2 100%);border-radius:16px;padding:18px 24px;margin:12px 30px 20px;box-shadow:0 8px 28px rgba(30,58,138,0.35);border:1px solid rgba(255,255,255,0.25);\">\
         <div style=\"display:flex;align-items:center;gap:14px;margin-bottom:14px;flex-wrap:wrap;\">{badge}\
         <div style=\"color:#fff;font-size:16px;font-weight:700;\">{title}</div></div>\
         <div style=\"overflow:hidden;background:rgba(0,0,0,0.22);border-radius:10px;border-left:5px solid #fbbf24;\">\
         <div style=\"display:inline-flex;align-items:center;white-space:nowrap;animation:ticker_scroll 50s linear infinite;padding:10px 0;\">{item}{item}</div>\
         </div></div>"
    ))
}

/// Where the banner goes, first match wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickerPlacement {
    /// Appended to `#ai-ticker-anchor`.
    IntoAnchor,
    /// Right after `#top-bar`.
    AfterTopBar,
    /// Right before `#map-display`.
    BeforeMapDisplay,
    /// First child of `#wrap`.
    WrapStart,
    /// First child of `<body>`.
    BodyStart,
}

impl TickerPlacement {
    /// Element id the placement is relative to; `None` for the body.
    pub fn target_id(self) -> Option<&'static str> {
        match self {
            TickerPlacement::IntoAnchor => Some(ANCHOR_ID),
            TickerPlacement::AfterTopBar => Some(TOP_BAR_ID),
            TickerPlacement::BeforeMapDisplay => Some(MAP_DISPLAY_ID),
            TickerPlacement::WrapStart => Some(WRAP_ID),
            TickerPlacement::BodyStart => None,
        }
    }
}

/// `usable(id)` tells whether the element exists and can take the banner
/// (siblings need a parent).
pub fn choose_placement(usable: impl Fn(&str) -> bool) -> TickerPlacement {
    [
        TickerPlacement::IntoAnchor,
        TickerPlacement::AfterTopBar,
        TickerPlacement::BeforeMapDisplay,
        TickerPlacement::WrapStart,
    ]
    .into_iter()
    .find(|p| p.target_id().is_some_and(&usable))
    .unwrap_or(TickerPlacement::BodyStart)
}
