//! Interactive prompts for commands that were not fully specified by flags.
//!
//! Uses dialoguer for terminal-based input, selection, and confirmation.

use dialoguer::{Confirm, Input, Select};

/// Asks a yes/no question.
pub fn confirm(question: &str, default: bool) -> anyhow::Result<bool> {
    let answer = Confirm::new()
        .with_prompt(question)
        .default(default)
        .interact()?;
    Ok(answer)
}

/// Presents a single-choice list and returns the selected index.
pub fn select<T: ToString>(question: &str, items: &[T]) -> anyhow::Result<usize> {
    let index = Select::new()
        .with_prompt(question)
        .items(items)
        .default(0)
        .interact()?;
    Ok(index)
}

/// Prompts for a project name, re-asking until the input passes validation.
/// A default (the current directory name during conversion) may be offered.
pub fn project_name(default: Option<&str>) -> anyhow::Result<String> {
    let name = match default {
        Some(default) => Input::<String>::new()
            .with_prompt("Project name")
            .default(default.to_string())
            .validate_with(|value: &String| validate_project_name(value))
            .interact_text()?,
        None => Input::<String>::new()
            .with_prompt("Project name")
            .validate_with(|value: &String| validate_project_name(value))
            .interact_text()?,
    };
    Ok(name)
}

pub(crate) fn validate_project_name(value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err("project name is required".to_string());
    }
    if value.contains(' ') {
        return Err("project name cannot contain spaces".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_and_whitespace_names() {
        assert!(validate_project_name("").is_err());
        assert!(validate_project_name("   ").is_err());
    }

    #[test]
    fn rejects_names_with_spaces() {
        assert!(validate_project_name("my game").is_err());
    }

    #[test]
    fn accepts_reasonable_names() {
        assert!(validate_project_name("my-game").is_ok());
        assert!(validate_project_name("platformer_2").is_ok());
    }
}
