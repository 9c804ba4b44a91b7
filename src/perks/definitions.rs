use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Marker that opens a record; the rest of the line is the perk name.
const NAME_MARKER: &str = "*>";
/// Marker that closes a (possibly multi-line) description.
const DESCRIPTION_END_MARKER: &str = "*<";

/// A perk as described in the hand-authored definitions asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerkDefinition {
    pub name: String,
    pub description: String,
    pub owner: String,
    pub role: String,
}

/// Record under construction. Owner and role arrive after the description.
#[derive(Debug, Default)]
struct PartialPerk {
    name: String,
    description: String,
    owner: Option<String>,
}

#[derive(Debug, Default)]
struct ParseState {
    records: Vec<PerkDefinition>,
    current: Option<PartialPerk>,
    in_description: bool,
}

impl ParseState {
    fn step(mut self, line: &str) -> Self {
        if line.contains(NAME_MARKER) {
            // An unfinished record is dropped here, never emitted.
            self.current = Some(PartialPerk {
                name: line.replace(NAME_MARKER, ""),
                ..PartialPerk::default()
            });
            self.in_description = true;
            return self;
        }

        let Some(mut perk) = self.current.take() else {
            return self;
        };

        if self.in_description {
            if line.contains(DESCRIPTION_END_MARKER) {
                perk.description
                    .push_str(&line.replace(DESCRIPTION_END_MARKER, ""));
                self.in_description = false;
            } else {
                perk.description.push_str(line);
            }
            self.current = Some(perk);
            return self;
        }

        match perk.owner.take() {
            None => {
                perk.owner = Some(line.to_string());
                self.current = Some(perk);
            }
            Some(owner) => self.records.push(PerkDefinition {
                name: perk.name,
                description: perk.description,
                owner,
                role: line.to_string(),
            }),
        }

        self
    }
}

/// Parse perk definitions from raw text.
///
/// Records look like:
///
/// ```text
/// *>Sprint Burst
/// Increases movement speed.*<
/// Survivor
/// Speed-type
/// ```
///
/// Description lines are concatenated without a separator. A record whose
/// description is never closed, or that is interrupted by the next `*>`
/// before its role line, is not emitted. Malformed input yields fewer
/// records rather than an error.
pub fn parse_perk_definitions(text: &str) -> Vec<PerkDefinition> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.is_empty())
        .fold(ParseState::default(), ParseState::step)
        .records
}

/// Read and parse a perk definitions file.
pub async fn read_perk_definitions(path: &Path) -> Result<Vec<PerkDefinition>, AppError> {
    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        AppError::InputRead(format!("Failed to read '{}': {}", path.display(), e))
    })?;

    let definitions = parse_perk_definitions(&text);
    tracing::debug!(
        path = %path.display(),
        count = definitions.len(),
        "parsed perk definitions"
    );

    Ok(definitions)
}
