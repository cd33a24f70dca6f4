//! Workspace task sections.

use serde_json::Value;

use crate::context::WorkspaceTask;

/// Definition keys that never reach the prompt: presentation concerns,
/// problem matchers, and the per-platform override containers themselves.
const STRIPPED_KEYS: &[&str] = &["presentation", "problemMatcher", "windows", "osx", "linux"];

/// The platform override key for the current OS.
pub fn platform_key() -> &'static str {
    match std::env::consts::OS {
        "windows" => "windows",
        "macos" => "osx",
        _ => "linux",
    }
}

/// Simplify a task definition for the prompt: merge the current platform's
/// override keys over the base definition, then strip presentation,
/// problem-matcher, and platform keys.
pub fn simplify_definition(definition: &Value, platform: &str) -> Value {
    let Some(base) = definition.as_object() else {
        return definition.clone();
    };

    let mut merged = base.clone();
    if let Some(Value::Object(overrides)) = base.get(platform) {
        for (key, value) in overrides {
            merged.insert(key.clone(), value.clone());
        }
    }
    for key in STRIPPED_KEYS {
        merged.remove(*key);
    }
    Value::Object(merged)
}

/// Build the tasks-listing section over runnable, non-hidden tasks.
///
/// Hidden and untyped tasks never surface; with no qualifying task the
/// section is entirely absent rather than an empty tag.
pub fn build_tasks_section(tasks: &[WorkspaceTask]) -> Option<String> {
    let platform = platform_key();
    let mut lines = Vec::new();

    for task in tasks.iter().filter(|t| t.is_runnable()) {
        let definition = simplify_definition(&task.definition, platform);
        let mut line = format!("- {}: {}", task.label, definition);
        if task.running {
            line.push_str(" (currently running)");
        }
        lines.push(line);
    }

    if lines.is_empty() {
        return None;
    }
    Some(format!("## Workspace tasks\n\n{}\n", lines.join("\n")))
}

/// Build the terminal/task-state section over currently running tasks.
pub fn build_terminal_state_section(tasks: &[WorkspaceTask]) -> Option<String> {
    let running: Vec<String> = tasks
        .iter()
        .filter(|t| t.running)
        .map(|t| format!("- {} is running in a terminal", t.label))
        .collect();

    if running.is_empty() {
        return None;
    }
    Some(format!("## Terminal state\n\n{}\n", running.join("\n")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_simplify_merges_platform_and_strips_keys() {
        let definition = json!({
            "type": "shell",
            "command": "make",
            "problemMatcher": "$gcc",
            "presentation": {"reveal": "always"},
            "linux": {"command": "make -j"},
            "windows": {"command": "nmake"},
        });

        let simplified = simplify_definition(&definition, "linux");
        assert_eq!(simplified["command"], "make -j");
        assert_eq!(simplified["type"], "shell");
        assert!(simplified.get("problemMatcher").is_none());
        assert!(simplified.get("presentation").is_none());
        assert!(simplified.get("linux").is_none());
        assert!(simplified.get("windows").is_none());
    }

    #[test]
    fn test_tasks_section_absent_without_runnable_tasks() {
        let tasks = vec![
            WorkspaceTask::new("secret", "shell", json!({})).hidden(),
            WorkspaceTask::untyped("legacy", json!({})),
        ];
        assert!(build_tasks_section(&tasks).is_none());
        assert!(build_tasks_section(&[]).is_none());
    }

    #[test]
    fn test_tasks_section_annotates_running() {
        let tasks = vec![
            WorkspaceTask::new("build", "shell", json!({"command": "make"})),
            WorkspaceTask::new("watch", "npm", json!({"script": "watch"})).running(),
        ];

        let section = build_tasks_section(&tasks).unwrap();
        assert!(section.contains("- build:"));
        assert!(section.contains("- watch:"));
        assert!(section.contains("(currently running)"));
        assert_eq!(section.matches("currently running").count(), 1);
    }

    #[test]
    fn test_terminal_state_lists_only_running() {
        let tasks = vec![
            WorkspaceTask::new("build", "shell", json!({})),
            WorkspaceTask::new("serve", "shell", json!({})).running(),
        ];

        let section = build_terminal_state_section(&tasks).unwrap();
        assert!(section.contains("serve is running"));
        assert!(!section.contains("build is running"));

        assert!(build_terminal_state_section(&tasks[..1]).is_none());
    }
}
