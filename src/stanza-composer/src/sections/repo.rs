//! Repository context section.

use crate::context::RepoContext;

/// Build the repository section, or nothing when the workspace has no
/// recognized hosting-provider repository. No placeholder is emitted.
pub fn build_repo_section(repo: Option<&RepoContext>) -> Option<String> {
    let repo = repo?;

    let mut content = String::new();
    content.push_str(&format!("- Repository: {}/{}\n", repo.owner, repo.name));
    if let Some(branch) = &repo.branch {
        content.push_str(&format!("- Branch: {branch}\n"));
    }
    content.push_str(&format!("- Default branch: {}\n", repo.default_branch));
    if let Some(pr) = &repo.pull_request {
        content.push_str(&format!("- Active pull request: #{} {}\n", pr.number, pr.title));
    }

    Some(format!("## Repository\n\n{content}"))
}
