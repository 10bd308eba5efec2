use super::render::View;
use super::{RecordKind, SyncRecord};
use crate::storage::models::BookmarkRecord;
use url::Url;

const TWITTER_HOSTS: [&str; 4] = ["twitter.com", "www.twitter.com", "mobile.twitter.com", "x.com"];

/// Description to publish for a bookmark. Tweets are described by author and
/// time since their saved titles are the tweet text; Wikipedia titles lose
/// the site suffix.
pub fn describe(bookmark: &BookmarkRecord) -> String {
    let url = match Url::parse(&bookmark.href) {
        Ok(url) => url,
        Err(_) => return bookmark.description.clone(),
    };
    let host = url.host_str().unwrap_or_default();

    if TWITTER_HOSTS.contains(&host) {
        let author = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty());
        if let Some(author) = author {
            return format!(
                "Tweet from {} on {}",
                author,
                bookmark.time.replace(':', "_")
            );
        }
    }

    if host == "wikipedia.org" || host.ends_with(".wikipedia.org") {
        return bookmark.description.replace(" - Wikipedia", "");
    }

    bookmark.description.clone()
}

impl SyncRecord for BookmarkRecord {
    const KIND: RecordKind = RecordKind::Bookmark;

    fn identifier(&self) -> &str {
        &self.hash
    }

    fn title(&self) -> String {
        describe(self)
    }

    fn view(&self, date_code: &str) -> View {
        View::new()
            .with("date", date_code)
            .with("description", describe(self))
            .with("extended", self.extended.as_str())
            .with("hash", self.hash.as_str())
            .with("href", self.href.as_str())
            .with("meta", self.meta.as_str())
            .with("shared", self.shared.as_str())
            .with("tags", self.tags.as_str())
            .with("time", self.time.as_str())
            .with("toread", self.toread.as_str())
    }
}
