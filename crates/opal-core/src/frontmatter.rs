use crate::error::Error;
use crate::storage::models::FrontmatterRecord;
use crate::storage::ContentStore;
use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

/// The leading `---` fenced YAML block of a note and the text after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontmatterBlock<'a> {
    pub yaml: &'a str,
    pub body: &'a str,
}

/// Split a note into its frontmatter and body. The first line must be exactly
/// `---`; without a closing fence the opening line is a divider, not
/// frontmatter.
pub fn split(content: &str) -> Option<FrontmatterBlock<'_>> {
    let rest = content.strip_prefix("---")?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            return Some(FrontmatterBlock {
                yaml: &rest[..offset],
                body: &rest[offset + line.len()..],
            });
        }
        offset += line.len();
    }
    None
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct IdentifierFields {
    bookmark_hash: Option<String>,
    github_repo: Option<String>,
}

/// Parse the identifying fields out of a stored frontmatter blob. Unknown
/// fields are ignored.
pub fn parse_record(file_id: &str, content: &str) -> Result<FrontmatterRecord, serde_yaml::Error> {
    let fields: IdentifierFields = serde_yaml::from_str(content)?;
    Ok(FrontmatterRecord {
        file_id: file_id.to_string(),
        bookmark_hash: fields.bookmark_hash.filter(|hash| !hash.is_empty()),
        github_repo: fields.github_repo.filter(|repo| !repo.is_empty()),
    })
}

/// Every parseable frontmatter record in the store. Malformed blobs are
/// logged and skipped so a partly broken vault still syncs.
pub fn load_frontmatter(store: &ContentStore) -> Result<Vec<FrontmatterRecord>, Error> {
    let blobs = store.list_frontmatter_blobs()?;
    let mut records = Vec::with_capacity(blobs.len());
    let mut skipped = 0usize;

    for (file_id, content) in blobs {
        match parse_record(&file_id, &content) {
            Ok(record) => records.push(record),
            Err(err) => {
                skipped += 1;
                warn!("Skipping malformed frontmatter in {}: {}", file_id, err);
            }
        }
    }

    debug!(
        "Loaded {} frontmatter records ({} malformed skipped)",
        records.len(),
        skipped
    );
    Ok(records)
}

/// Normalise a tag/alias style field to a sequence: null becomes empty, a
/// scalar becomes a one-element list. Duplicates are dropped, first wins.
fn as_sequence(value: Option<Value>) -> Vec<Value> {
    let items = match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Sequence(items)) => items,
        Some(other) => vec![other],
    };

    let mut unique: Vec<Value> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(&item) {
            unique.push(item);
        }
    }
    unique
}

/// Merge note-derived data into existing frontmatter. Existing keys are kept
/// in place; `tags` and `aliases` become lists and the lower-cased title is
/// added to the aliases.
pub fn merge(existing: Option<Mapping>, title: &str) -> Mapping {
    let mut merged = existing.unwrap_or_default();

    let tags = as_sequence(merged.remove("tags"));
    let mut aliases = as_sequence(merged.remove("aliases"));

    let alias = Value::String(title.to_lowercase());
    if !aliases.contains(&alias) {
        aliases.push(alias);
    }

    merged.insert(Value::String("tags".to_string()), Value::Sequence(tags));
    merged.insert(Value::String("aliases".to_string()), Value::Sequence(aliases));
    merged
}

/// Render a mapping as a fenced frontmatter block ending in a newline.
pub fn render(frontmatter: &Mapping) -> Result<String, Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    Ok(format!("---\n{}---\n", yaml))
}
