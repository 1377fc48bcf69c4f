use serde::{Deserialize, Serialize};

const DEFAULT_THEME: &str = "d2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct ThemeSetting {
    pub name: String,
}

impl ThemeSetting {
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ThemeSetting {
    fn default() -> Self {
        Self::named(DEFAULT_THEME)
    }
}

/// Page transition animation toggle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct TransitionSetting {
    pub active: bool,
}

impl Default for TransitionSetting {
    fn default() -> Self {
        Self { active: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OpenedPage {
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub title: Option<String>,
}

impl OpenedPage {
    pub fn home() -> Self {
        Self {
            name: "index".to_string(),
            path: "/index".to_string(),
            title: Some("Home".to_string()),
        }
    }
}

/// Tabs left open at the end of the last session. Never empty by default:
/// the home page is always the first tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct OpenedPages(pub Vec<OpenedPage>);

impl Default for OpenedPages {
    fn default() -> Self {
        Self(vec![OpenedPage::home()])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub enum ComponentSize {
    #[default]
    Default,
    Medium,
    Small,
    Mini,
}
