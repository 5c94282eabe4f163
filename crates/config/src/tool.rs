//! Tool configuration
//!
//! Each managed tool lives in `<dotfiles_dir>/tools/<tool_name>/tool.toml`:
//!
//! ```toml
//! target = "~/.gitconfig"
//! merge = "builtin:concat"
//! install = "./install.sh"
//!
//! [[layers]]
//! name = "base"
//! path = "configs/git/base"
//!
//! [[layers]]
//! name = "work"
//! source = "work-profile"
//! path = "configs/git/work"
//! ```
//!
//! Layers are listed lowest priority first. Loading resolves every declared
//! layer path against the dotfiles directory; the engine only ever reads the
//! resolved form.

use crate::hook::HookSpec;
use dotlayer_core::path::{AbsPath, expand_tilde};
use dotlayer_core::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory (under the dotfiles dir) holding one subdirectory per tool
pub const TOOLS_DIR: &str = "tools";

/// File name of a tool's configuration
pub const TOOL_FILE: &str = "tool.toml";

/// One layer of a tool's configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    /// Layer name, used in headers and the `LAYERS` environment entry
    pub name: String,
    /// Where the layer came from (profile, machine, ...)
    pub source: String,
    /// Path as written in `tool.toml`
    pub declared_path: String,
    /// Absolute path filled in by [`ToolConfig::resolve_layers`]
    pub resolved_path: Option<PathBuf>,
}

impl Layer {
    /// Create an unresolved layer whose source is its own name
    pub fn new(name: impl Into<String>, declared_path: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            source: name.clone(),
            name,
            declared_path: declared_path.into(),
            resolved_path: None,
        }
    }

    /// Set the source label
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the resolved path directly
    #[must_use]
    pub fn with_resolved(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolved_path = Some(path.into());
        self
    }

    /// The resolved path, required before any strategy reads the layer
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the layer was never resolved or
    /// resolved to an empty path.
    pub fn resolved(&self) -> Result<&Path> {
        match &self.resolved_path {
            Some(path) if !path.as_os_str().is_empty() => Ok(path),
            _ => Err(Error::InvalidInput(format!(
                "layer '{}' has no resolved path",
                self.name
            ))),
        }
    }

    /// The resolved path as a string, or `""` when unresolved
    pub fn resolved_display(&self) -> String {
        self.resolved_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }
}

/// A fully loaded tool: layers, target, and hooks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    /// Tool identifier (e.g. "git")
    pub tool_name: String,
    /// Destination path, absolute or `~`-prefixed
    pub target: String,
    /// Layers, lowest priority first
    pub layers: Vec<Layer>,
    /// Strategy that composes the layers into the target
    pub merge_hook: Option<HookSpec>,
    /// Optional step that runs after a successful merge
    pub install_hook: Option<HookSpec>,
}

impl ToolConfig {
    /// Create a configuration with no layers and no hooks
    pub fn new(tool_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            tool_name: tool_name.into(),
            target: target.into(),
            layers: Vec::new(),
            merge_hook: None,
            install_hook: None,
        }
    }

    /// Append a layer (higher priority than every layer already present)
    #[must_use]
    pub fn with_layer(mut self, layer: Layer) -> Self {
        self.layers.push(layer);
        self
    }

    /// Set the merge hook
    #[must_use]
    pub fn with_merge(mut self, hook: HookSpec) -> Self {
        self.merge_hook = Some(hook);
        self
    }

    /// Set the install hook
    #[must_use]
    pub fn with_install(mut self, hook: HookSpec) -> Self {
        self.install_hook = Some(hook);
        self
    }

    /// Number of layers
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Layer at `index`, lowest priority at 0
    pub fn layer(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }

    /// Highest-priority layer
    pub fn last_layer(&self) -> Option<&Layer> {
        self.layers.last()
    }

    /// Target with `~` expanded
    ///
    /// # Errors
    ///
    /// Returns an error if the target is empty, relative after expansion, or
    /// the home directory is unknown.
    pub fn target_path(&self) -> Result<AbsPath> {
        AbsPath::expand(&self.target).map_err(|e| match e {
            Error::InvalidInput(_) => {
                Error::InvalidInput(format!("tool '{}' has no target", self.tool_name))
            }
            other => other,
        })
    }

    /// Directory that relative script hooks are resolved against
    pub fn tool_dir(&self, dotfiles_dir: &AbsPath) -> AbsPath {
        dotfiles_dir.join(TOOLS_DIR).join(&self.tool_name)
    }

    /// Resolve every layer's declared path against the dotfiles directory
    ///
    /// Absolute and `~`-prefixed declarations are used as-is (after tilde
    /// expansion). An empty declaration leaves the layer unresolved, which a
    /// strategy reading it will later report as a configuration error.
    pub fn resolve_layers(&mut self, dotfiles_dir: &AbsPath) -> Result<()> {
        for layer in &mut self.layers {
            if layer.declared_path.is_empty() {
                tracing::warn!(
                    tool = %self.tool_name,
                    layer = %layer.name,
                    "Layer declares no path"
                );
                layer.resolved_path = None;
                continue;
            }

            let expanded = expand_tilde(&layer.declared_path)?;
            let resolved = if expanded.is_absolute() {
                expanded
            } else {
                dotfiles_dir.join(expanded).into_path_buf()
            };
            tracing::trace!(layer = %layer.name, path = %resolved.display(), "Resolved layer");
            layer.resolved_path = Some(resolved);
        }
        Ok(())
    }

    /// Load `<dotfiles_dir>/tools/<tool_name>/tool.toml` and resolve its layers
    pub fn load(dotfiles_dir: &AbsPath, tool_name: &str) -> Result<Self> {
        if tool_name.is_empty() {
            return Err(Error::InvalidInput("tool name is empty".to_string()));
        }

        let path = dotfiles_dir.join(TOOLS_DIR).join(tool_name).join(TOOL_FILE);
        if !path.as_path().is_file() {
            return Err(Error::NotFound(format!(
                "no configuration for tool '{tool_name}' at {path}"
            )));
        }

        let content = fs::read_to_string(path.as_path())?;
        let file: ToolFile = toml::from_str(&content)
            .map_err(|e| Error::Validation(format!("{path}: {}", e.message())))?;
        let mut config = Self::from_file(tool_name, file);
        config.resolve_layers(dotfiles_dir)?;
        Ok(config)
    }

    /// Parse a tool's TOML without resolving layers
    pub fn from_toml(tool_name: &str, content: &str) -> Result<Self> {
        let file: ToolFile =
            toml::from_str(content).map_err(|e| Error::Validation(e.message().to_string()))?;
        Ok(Self::from_file(tool_name, file))
    }

    fn from_file(tool_name: &str, file: ToolFile) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            target: file.target,
            layers: file
                .layers
                .into_iter()
                .map(|l| Layer {
                    source: l.source.unwrap_or_else(|| l.name.clone()),
                    name: l.name,
                    declared_path: l.path,
                    resolved_path: None,
                })
                .collect(),
            merge_hook: file.merge,
            install_hook: file.install,
        }
    }
}

/// On-disk shape of `tool.toml`
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ToolFile {
    target: String,
    merge: Option<HookSpec>,
    install: Option<HookSpec>,
    #[serde(default)]
    layers: Vec<LayerEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LayerEntry {
    name: String,
    source: Option<String>,
    #[serde(default)]
    path: String,
}

/// List tools that have a `tool.toml`, sorted by name
pub fn discover_tools(dotfiles_dir: &AbsPath) -> Result<Vec<String>> {
    let tools_dir = dotfiles_dir.join(TOOLS_DIR);
    if !tools_dir.as_path().is_dir() {
        return Ok(Vec::new());
    }

    let mut tools = Vec::new();
    for entry in fs::read_dir(tools_dir.as_path())? {
        let entry = entry?;
        if entry.path().join(TOOL_FILE).is_file()
            && let Some(name) = entry.file_name().to_str()
        {
            tools.push(name.to_string());
        }
    }
    tools.sort();
    Ok(tools)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use tempfile::TempDir;

    const GIT_TOML: &str = r#"
target = "~/.gitconfig"
merge = "builtin:concat"
install = "./install.sh"

[[layers]]
name = "base"
path = "configs/git/base"

[[layers]]
name = "work"
source = "work-profile"
path = "/etc/dotfiles/git/work"
"#;

    fn write_tool(dir: &Path, tool: &str, content: &str) {
        let tool_dir = dir.join(TOOLS_DIR).join(tool);
        fs::create_dir_all(&tool_dir).unwrap();
        fs::write(tool_dir.join(TOOL_FILE), content).unwrap();
    }

    #[test]
    fn test_from_toml_preserves_layer_order() {
        let config = ToolConfig::from_toml("git", GIT_TOML).unwrap();

        assert_eq!(config.tool_name, "git");
        assert_eq!(config.target, "~/.gitconfig");
        assert_eq!(config.layer_count(), 2);
        assert_eq!(config.layer(0).unwrap().name, "base");
        assert_eq!(config.layer(0).unwrap().source, "base");
        assert_eq!(config.layer(1).unwrap().source, "work-profile");
        assert_eq!(config.merge_hook, Some(HookSpec::Builtin("concat".into())));
        assert_eq!(
            config.install_hook,
            Some(HookSpec::Script(PathBuf::from("./install.sh")))
        );
    }

    #[test]
    fn test_from_toml_rejects_unknown_fields() {
        let err = ToolConfig::from_toml("git", "target = \"/x\"\nmerg = \"builtin:skip\"").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_from_toml_rejects_empty_hook() {
        let err = ToolConfig::from_toml("git", "target = \"/x\"\nmerge = \"\"").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn test_resolve_layers() {
        let dotfiles = AbsPath::new("/dotfiles".into()).unwrap();
        let mut config = ToolConfig::from_toml("git", GIT_TOML).unwrap();
        config.resolve_layers(&dotfiles).unwrap();

        assert_eq!(
            config.layer(0).unwrap().resolved().unwrap(),
            Path::new("/dotfiles/configs/git/base")
        );
        assert_eq!(
            config.layer(1).unwrap().resolved().unwrap(),
            Path::new("/etc/dotfiles/git/work")
        );
    }

    #[test]
    fn test_unresolved_layer_is_configuration_error() {
        let layer = Layer::new("base", "configs/base");
        let err = layer.resolved().unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(err.to_string().contains("base"));

        let empty = Layer::new("base", "").with_resolved("");
        assert!(empty.resolved().is_err());
        assert_eq!(empty.resolved_display(), "");
    }

    #[test]
    fn test_target_path_expands_tilde() {
        let config = ToolConfig::new("git", "~/.gitconfig");
        let home = dirs::home_dir().unwrap();
        assert_eq!(config.target_path().unwrap().as_path(), home.join(".gitconfig"));
    }

    #[test]
    fn test_target_path_errors() {
        let empty = ToolConfig::new("git", "");
        let err = empty.target_path().unwrap_err();
        assert!(err.to_string().contains("git"));

        let relative = ToolConfig::new("git", "gitconfig");
        assert!(matches!(
            relative.target_path(),
            Err(Error::PathNotAbsolute { .. })
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let temp = TempDir::new().unwrap();
        write_tool(temp.path(), "git", GIT_TOML);
        let dotfiles = AbsPath::from_path(temp.path()).unwrap();

        let config = ToolConfig::load(&dotfiles, "git").unwrap();
        assert_eq!(
            config.layer(0).unwrap().resolved().unwrap(),
            temp.path().join("configs/git/base")
        );
        assert_eq!(
            config.tool_dir(&dotfiles).as_path(),
            temp.path().join("tools/git")
        );
    }

    #[test]
    fn test_load_missing_tool() {
        let temp = TempDir::new().unwrap();
        let dotfiles = AbsPath::from_path(temp.path()).unwrap();

        let err = ToolConfig::load(&dotfiles, "nvim").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("nvim"));

        let err = ToolConfig::load(&dotfiles, "").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_load_malformed_toml() {
        let temp = TempDir::new().unwrap();
        write_tool(temp.path(), "git", "target = ");
        let dotfiles = AbsPath::from_path(temp.path()).unwrap();

        let err = ToolConfig::load(&dotfiles, "git").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
        assert!(err.to_string().contains("tool.toml"));
    }

    #[test]
    fn test_discover_tools_sorted() {
        let temp = TempDir::new().unwrap();
        write_tool(temp.path(), "zsh", "target = \"~/.zshrc\"");
        write_tool(temp.path(), "git", "target = \"~/.gitconfig\"");
        // A directory without tool.toml is ignored
        fs::create_dir_all(temp.path().join("tools/notes")).unwrap();

        let dotfiles = AbsPath::from_path(temp.path()).unwrap();
        assert_eq!(discover_tools(&dotfiles).unwrap(), vec!["git", "zsh"]);
    }

    #[test]
    fn test_discover_tools_without_tools_dir() {
        let temp = TempDir::new().unwrap();
        let dotfiles = AbsPath::from_path(temp.path()).unwrap();
        assert!(discover_tools(&dotfiles).unwrap().is_empty());
    }
}
