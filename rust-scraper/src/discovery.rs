//! Replay link discovery across the pages of a forum thread

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::debug;

use crate::fetch::Fetcher;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// URL of page `page` (1-based) of a thread. Page 1 is the bare thread URL.
pub fn page_url(thread_url: &str, page: u32) -> String {
    if page <= 1 {
        thread_url.to_string()
    } else {
        format!("{}page-{}", thread_url, page)
    }
}

/// Drop the query string, if any
pub fn strip_query(href: &str) -> &str {
    href.split('?').next().unwrap_or(href)
}

/// Replay links on one page, in document order, query strings removed.
/// Duplicates are kept; `discover` handles them.
pub fn extract_replay_links(html: &str, hosts: &[String]) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|a| a.value().attr("href"))
        .filter(|href| hosts.iter().any(|host| href.contains(host.as_str())))
        .map(|href| strip_query(href).to_string())
        .collect()
}

/// Collect every replay link posted in a thread.
///
/// Walks `thread_url`, `thread_url + "page-2"`, ... until a page fails to
/// load or contributes no link that wasn't already seen. Links are unique and
/// in first-seen order. A failed page ends discovery with whatever was found.
pub async fn discover<F: Fetcher + ?Sized>(
    thread_url: &str,
    fetcher: &F,
    hosts: &[String],
    page_delay: Duration,
) -> Vec<String> {
    let mut replays: Vec<String> = Vec::new();
    let mut page = 1;

    loop {
        let url = page_url(thread_url, page);

        let html = match fetcher.fetch(&url).await {
            Ok(html) => html,
            Err(e) => {
                debug!("Stopping at page {} of {}: {}", page, thread_url, e);
                break;
            }
        };

        let before = replays.len();
        for link in extract_replay_links(&html, hosts) {
            if !replays.contains(&link) {
                replays.push(link);
            }
        }

        // A page with nothing new is taken as the end of the thread
        if replays.len() == before {
            debug!("No new replays on page {} of {}", page, thread_url);
            break;
        }

        page += 1;
        if !page_delay.is_zero() {
            tokio::time::sleep(page_delay).await;
        }
    }

    replays
}
