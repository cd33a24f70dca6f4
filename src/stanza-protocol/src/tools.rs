//! Stable tool names and the available-tool set.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tools the composer knows by stable name.
///
/// The host registry may expose more tools than these; capability checks
/// only ever look for the names below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ToolName {
    ReplaceString,
    ApplyPatch,
    CreateFile,
    EditFile,
    EditNotebook,
    RunInTerminal,
    RunTask,
    GetTaskOutput,
}

impl ToolName {
    /// The stable wire name for this tool.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ReplaceString => "replace-string",
            Self::ApplyPatch => "apply-patch",
            Self::CreateFile => "create-file",
            Self::EditFile => "edit-file",
            Self::EditNotebook => "edit-notebook",
            Self::RunInTerminal => "run-in-terminal",
            Self::RunTask => "run-task",
            Self::GetTaskOutput => "get-task-output",
        }
    }

    /// All tool names that edit workspace files.
    pub fn editing_tools() -> &'static [ToolName] {
        &[
            Self::ReplaceString,
            Self::ApplyPatch,
            Self::CreateFile,
            Self::EditFile,
            Self::EditNotebook,
        ]
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolName {
    type Err = UnknownToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "replace-string" => Ok(Self::ReplaceString),
            "apply-patch" => Ok(Self::ApplyPatch),
            "create-file" => Ok(Self::CreateFile),
            "edit-file" => Ok(Self::EditFile),
            "edit-notebook" => Ok(Self::EditNotebook),
            "run-in-terminal" => Ok(Self::RunInTerminal),
            "run-task" => Ok(Self::RunTask),
            "get-task-output" => Ok(Self::GetTaskOutput),
            _ => Err(UnknownToolError(s.to_string())),
        }
    }
}

/// Error for a tool name the composer does not recognize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownToolError(pub String);

impl fmt::Display for UnknownToolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown tool name: {}", self.0)
    }
}

impl std::error::Error for UnknownToolError {}

/// The set of tools available for one render, keyed by stable name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AvailableTools {
    names: BTreeSet<String>,
}

impl AvailableTools {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from known tool names.
    pub fn from_tools(tools: &[ToolName]) -> Self {
        let mut set = Self::new();
        for tool in tools {
            set.insert(tool.as_str());
        }
        set
    }

    /// Register a tool by name.
    pub fn insert(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Whether a known tool is available.
    pub fn contains(&self, tool: ToolName) -> bool {
        self.names.contains(tool.as_str())
    }

    /// Whether a tool is available by raw name.
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether any file-editing tool is available.
    pub fn has_editing_tool(&self) -> bool {
        ToolName::editing_tools().iter().any(|t| self.contains(*t))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }
}
