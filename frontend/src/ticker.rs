// frontend/src/ticker.rs
//
// Fetches the investment-news text and inserts the banner. Failures only
// log; the page works the same without a ticker.

use crate::http::http_get_json;
use estate_map::ticker::{
    banner_html, choose_placement, city_from_query, news_request_path, TickerPlacement, TICKER_ID,
};
use estate_map::{log, log_error};
use estate_shared::TickerNews;
use web_sys::{Document, Node};

pub async fn load_ticker() {
    let Some(window) = web_sys::window() else {
        return;
    };
    let search = window.location().search().unwrap_or_default();
    let city = city_from_query(&search);
    log!("[Ticker] Requesting news, city=\"{city}\"");

    let news = match http_get_json::<TickerNews>(&news_request_path(&city)).await {
        Ok(news) => news,
        Err(e) => {
            log_error!("[Ticker] Failed: {e}");
            return;
        }
    };
    let Some(html) = banner_html(&news) else {
        return;
    };
    let Some(doc) = window.document() else {
        return;
    };
    if let Err(e) = insert_ticker(&doc, &html) {
        log_error!("[Ticker] Failed: {e}");
    }
}

/// Replaces any existing banner, then places the new one at the first
/// available spot.
fn insert_ticker(doc: &Document, html: &str) -> Result<(), String> {
    if let Some(old) = doc.get_element_by_id(TICKER_ID) {
        old.remove();
    }

    let wrapper = doc
        .create_element("div")
        .map_err(|e| format!("create ticker element: {e:?}"))?;
    wrapper.set_id(TICKER_ID);
    wrapper.set_inner_html(html);

    let placement = choose_placement(|id| {
        doc.get_element_by_id(id)
            .is_some_and(|el| el.parent_node().is_some())
    });

    let target: Node = match placement.target_id() {
        Some(id) => doc
            .get_element_by_id(id)
            .ok_or(format!("#{id} disappeared"))?
            .into(),
        None => doc.body().ok_or("no <body>".to_string())?.into(),
    };

    let inserted = match placement {
        TickerPlacement::IntoAnchor => target.append_child(&wrapper),
        TickerPlacement::AfterTopBar => {
            let parent = target.parent_node().ok_or("top bar lost its parent".to_string())?;
            parent.insert_before(&wrapper, target.next_sibling().as_ref())
        }
        TickerPlacement::BeforeMapDisplay => {
            let parent = target.parent_node().ok_or("map display lost its parent".to_string())?;
            parent.insert_before(&wrapper, Some(&target))
        }
        TickerPlacement::WrapStart | TickerPlacement::BodyStart => {
            target.insert_before(&wrapper, target.first_child().as_ref())
        }
    };
    inserted.map(|_| ()).map_err(|e| format!("insert ticker: {e:?}"))
}
