use crate::error::Error;
use crate::frontmatter;
use crate::note::Note;
use serde_yaml::Value;
use std::fs;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixOutcome {
    /// The note's bytes changed and were written back.
    Rewritten,
    /// The note already had merged frontmatter and a title.
    Unchanged,
    /// Frontmatter could not be parsed; the note was left alone.
    SkippedMalformed,
}

/// First `# ` heading of a markdown body.
pub fn find_title(body: &str) -> Option<&str> {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(str::trim)
        .filter(|title| !title.is_empty())
}

/// Produce the fixed text of a note, or `None` if its frontmatter is
/// malformed. Applying this to its own output returns the same text.
pub fn fixed_content(note: &Note, content: &str) -> Result<Option<String>, Error> {
    let (existing, body) = match frontmatter::split(content) {
        Some(block) => match serde_yaml::from_str::<Value>(block.yaml) {
            Ok(Value::Mapping(mapping)) => (Some(mapping), block.body),
            Ok(Value::Null) => (None, block.body),
            Ok(_) => return Ok(None),
            Err(err) => {
                debug!("Unparseable frontmatter in {}: {}", note.id(), err);
                return Ok(None);
            }
        },
        None => (None, content),
    };

    let heading = find_title(body);
    let title = heading.unwrap_or(note.display_name.as_str());

    let merged = frontmatter::merge(existing, title);
    let mut fixed = frontmatter::render(&merged)?;
    if heading.is_none() {
        fixed.push_str(&format!("# {}\n", title));
    }
    fixed.push_str(body);
    Ok(Some(fixed))
}

/// Merge frontmatter into a note and give it a title heading if it lacks
/// one. The file is only written when its bytes change.
pub fn fix_note(note: &Note) -> Result<FixOutcome, Error> {
    let content = fs::read_to_string(&note.file_path)?;

    let fixed = match fixed_content(note, &content)? {
        Some(fixed) => fixed,
        None => {
            warn!("Skipping {}: malformed frontmatter", note.file_path.display());
            return Ok(FixOutcome::SkippedMalformed);
        }
    };

    if fixed == content {
        return Ok(FixOutcome::Unchanged);
    }

    fs::write(&note.file_path, fixed)?;
    debug!("Fixed {}", note.file_path.display());
    Ok(FixOutcome::Rewritten)
}
