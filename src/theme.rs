//! Token color themes
//!
//! YAML-based theming with compile-time embedded builtins and
//! user-defined themes from the config directory.
//!
//! Theme loading priority:
//! 1. User config: `~/.config/prism/themes/{id}.yaml`
//! 2. Embedded: built-in themes compiled into the library

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// Embed theme YAML files at compile time
pub const DARK_YAML: &str = include_str!("../themes/dark.yaml");
pub const LIGHT_YAML: &str = include_str!("../themes/light.yaml");

/// A built-in theme entry
pub struct BuiltinTheme {
    /// Stable identifier for config (e.g. "dark", "light")
    pub id: &'static str,
    /// Embedded YAML content
    pub yaml: &'static str,
}

/// Registry of all built-in themes
pub const BUILTIN_THEMES: &[BuiltinTheme] = &[
    BuiltinTheme {
        id: "dark",
        yaml: DARK_YAML,
    },
    BuiltinTheme {
        id: "light",
        yaml: LIGHT_YAML,
    },
];

/// Where a theme came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeSource {
    /// User-defined theme in ~/.config/prism/themes/
    User,
    /// Built-in theme embedded in the library
    Builtin,
}

/// Information about an available theme
#[derive(Debug, Clone)]
pub struct ThemeInfo {
    /// Stable identifier (e.g. "dark", "my-custom-theme")
    pub id: String,
    /// Display name from YAML (e.g. "Prism Dark")
    pub name: String,
    /// Where this theme is loaded from
    pub source: ThemeSource,
}

// ============================================================================
// Theme data
// ============================================================================

/// Visual settings a rule applies to matched tokens
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreground: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

/// One theme rule: a scope selector plus the style to apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenColor {
    /// Dotted scope selector, matched as a segment-boundary prefix
    pub scope: String,
    pub settings: TokenStyle,
}

/// A loaded theme: a name and an ordered rule list. Order matters,
/// earlier rules win specificity ties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    #[serde(default)]
    pub token_colors: Vec<TokenColor>,
}

impl Theme {
    /// Parse a theme from YAML content
    pub fn from_yaml(yaml: &str) -> Result<Theme, String> {
        serde_yaml::from_str(yaml).map_err(|e| format!("Failed to parse theme: {}", e))
    }

    /// Load a built-in theme by id
    pub fn from_builtin(id: &str) -> Result<Theme, String> {
        BUILTIN_THEMES
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| format!("Unknown builtin theme: {}", id))
            .and_then(|t| Theme::from_yaml(t.yaml))
    }
}

// ============================================================================
// Loading
// ============================================================================

/// Load a theme from a YAML file
pub fn from_file(path: &Path) -> Result<Theme, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read theme file {}: {}", path.display(), e))?;
    Theme::from_yaml(&content)
}

/// Load theme by id with priority: user → builtin
///
/// Searches in order:
/// 1. `~/.config/prism/themes/{id}.yaml`
/// 2. Embedded builtin themes
pub fn load_theme(id: &str) -> Result<Theme, String> {
    if let Some(user_dir) = crate::config_paths::themes_dir() {
        let user_path = user_dir.join(format!("{}.yaml", id));
        if user_path.exists() {
            tracing::info!("Loading user theme from {}", user_path.display());
            return from_file(&user_path);
        }
    }

    tracing::info!("Loading builtin theme: {}", id);
    Theme::from_builtin(id)
}

/// List all available themes from all sources
///
/// Duplicates are resolved by priority: user themes override builtins with
/// the same id.
pub fn list_available_themes() -> Vec<ThemeInfo> {
    let mut themes = Vec::new();
    let mut seen_ids = std::collections::HashSet::new();

    // Collect user themes (highest priority)
    if let Some(user_dir) = crate::config_paths::themes_dir() {
        if let Ok(entries) = std::fs::read_dir(&user_dir) {
            for entry in entries.filter_map(|e| e.ok()) {
                let path = entry.path();
                if path
                    .extension()
                    .is_some_and(|ext| ext == "yaml" || ext == "yml")
                {
                    if let Some(id) = path.file_stem().and_then(|s| s.to_str()) {
                        if seen_ids.insert(id.to_string()) {
                            let name = extract_theme_name(&path).unwrap_or_else(|| id.to_string());
                            themes.push(ThemeInfo {
                                id: id.to_string(),
                                name,
                                source: ThemeSource::User,
                            });
                        }
                    }
                }
            }
        }
    }

    // Add builtins (user themes with same id take priority)
    for builtin in BUILTIN_THEMES {
        if seen_ids.insert(builtin.id.to_string()) {
            let name = Theme::from_yaml(builtin.yaml)
                .map(|t| t.name)
                .unwrap_or_else(|_| builtin.id.to_string());
            themes.push(ThemeInfo {
                id: builtin.id.to_string(),
                name,
                source: ThemeSource::Builtin,
            });
        }
    }

    themes
}

/// Extract theme name from a YAML file without full parsing
fn extract_theme_name(path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(path).ok()?;
    for line in content.lines() {
        let trimmed = line.trim();
        if let Some(name) = trimmed.strip_prefix("name:") {
            return Some(name.trim().trim_matches('"').to_string());
        }
    }
    None
}

/// Save a user theme as a starting point for customization
pub fn save_user_theme(id: &str, theme: &Theme) -> Result<PathBuf, String> {
    let dir = crate::config_paths::ensure_themes_dir()?;
    let path = dir.join(format!("{}.yaml", id));
    let content = serde_yaml::to_string(theme)
        .map_err(|e| format!("Failed to serialize theme: {}", e))?;
    std::fs::write(&path, content)
        .map_err(|e| format!("Failed to write theme to {}: {}", path.display(), e))?;
    Ok(path)
}
