use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Identity of a whole dataset as published by the remote service.
///
/// Two descriptors are either identical or describe different datasets; no
/// ordering between them is implied. Any difference between the remote and
/// the persisted descriptor triggers a rebuild.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionDescriptor {
    pub game: String,
    pub language: String,
}
impl VersionDescriptor {
    pub fn new(game: impl Into<String>, language: impl Into<String>) -> Self {
        Self { game: game.into(), language: language.into() }
    }
}
impl Display for VersionDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}/{}", self.game, self.language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() {
        let version: VersionDescriptor = serde_json::from_str(r#"{"game":"0.21.1:abc","language":"eng_us:3"}"#).unwrap();
        assert_eq!(version, VersionDescriptor::new("0.21.1:abc", "eng_us:3"));
        assert_eq!(version.to_string(), "0.21.1:abc/eng_us:3");
    }

    #[test]
    fn test_any_field_difference_is_inequality() {
        let base = VersionDescriptor::new("1", "a");
        assert_ne!(base, VersionDescriptor::new("2", "a"));
        assert_ne!(base, VersionDescriptor::new("1", "b"));
    }
}
