use super::render::View;
use super::{RecordKind, SyncRecord};
use crate::storage::models::StarredRepoRecord;

impl SyncRecord for StarredRepoRecord {
    const KIND: RecordKind = RecordKind::Star;

    fn identifier(&self) -> &str {
        &self.name
    }

    fn title(&self) -> String {
        self.name.clone()
    }

    fn view(&self, date_code: &str) -> View {
        View::new()
            .with("date", date_code)
            .with("name", self.name.as_str())
            .with("description", self.description.as_str())
            .with("login", self.login.as_str())
            .with("url", self.url.as_str())
            .with("language", self.language.as_str())
            .with("topics", self.topics.as_str())
    }
}
