/// Hash the indexer records for a zero-byte file. Empty files legitimately
/// share it, so it is never treated as a duplicate.
pub const EMPTY_FILE_HASH: &str = "0";

/// Schema tag of frontmatter blobs in the `metadata` table.
pub const FRONTMATTER_SCHEMA: &str = "!frontmatter";

/// A tracked file as recorded by the indexer (`file` table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub id: String,
    pub content_hash: String,
}

impl FileRecord {
    /// True for records whose hash identifies real content: neither missing
    /// nor the empty-file sentinel.
    pub fn has_content(&self) -> bool {
        !self.content_hash.is_empty() && self.content_hash != EMPTY_FILE_HASH
    }
}

/// One file seen by an index walk, with the raw YAML of its frontmatter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexedFile {
    pub record: FileRecord,
    pub frontmatter: Option<String>,
}

/// The content hash a note had when it last went through the fix pipeline
/// (`opal_metadata` table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedMark {
    pub id: String,
    pub processed_hash: String,
}

/// The fields of a note's frontmatter that identify an external record it
/// materialises.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontmatterRecord {
    pub file_id: String,
    pub bookmark_hash: Option<String>,
    pub github_repo: Option<String>,
}

/// A harvested Pinboard bookmark (`pinboard_bookmark` table).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkRecord {
    pub description: String,
    pub extended: String,
    pub hash: String,
    pub href: String,
    pub meta: String,
    pub shared: String,
    pub tags: String,
    pub time: String,
    pub toread: String,
}

/// A harvested GitHub starred repository (`github_star` table).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarredRepoRecord {
    pub name: String,
    pub description: String,
    pub login: String,
    pub url: String,
    pub language: String,
    pub topics: String,
}
