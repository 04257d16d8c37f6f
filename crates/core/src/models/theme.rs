//! Shop themes.

use serde::{Deserialize, Serialize};

use crate::types::ThemeId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(rename = "_id", alias = "id")]
    pub id: ThemeId,
    pub name: String,
    #[serde(default)]
    pub preview_image: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

/// The active theme of a list, if the API marked one.
#[must_use]
pub fn active_theme(themes: &[Theme]) -> Option<&Theme> {
    themes.iter().find(|theme| theme.is_active)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_active_theme() {
        let themes: Vec<Theme> = serde_json::from_str(
            r#"[{"_id":"t1","name":"Classic"},{"_id":"t2","name":"Bold","isActive":true}]"#,
        )
        .unwrap();
        assert_eq!(active_theme(&themes).unwrap().name, "Bold");
        assert!(active_theme(&themes[..1]).is_none());
    }
}
