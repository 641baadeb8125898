use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "gdkit",
    version,
    about = "Scaffold and manage Godot projects with a Rust GDExtension"
)]
pub struct Cli {
    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a new Godot project with a Rust extension subproject.
    New,

    /// Add a Rust extension subproject to an existing Godot project,
    /// optionally restructuring it into godot/ and rust/ folders.
    Convert,

    /// Add a tool from the catalog to the project.
    Add {
        /// Name of the Rust package to add the tool to.
        #[arg(short = 'p', long = "project")]
        project: Option<String>,

        /// Catalog id (or script URL) of the tool to add.
        #[arg(short = 't', long = "tool")]
        tool: Option<String>,
    },

    /// Remove a catalog tool from the project.
    #[command(visible_alias = "rm")]
    Remove {
        /// Name of the Rust package to remove the tool from.
        #[arg(short = 'p', long = "project")]
        project: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_new_command() {
        let cli = Cli::try_parse_from(["gdkit", "new"]).expect("parse");
        assert!(matches!(cli.command, Command::New));
    }

    #[test]
    fn parses_add_with_project_and_tool_flags() {
        let cli = Cli::try_parse_from(["gdkit", "add", "-p", "platformer", "-t", "gd-props"])
            .expect("parse");
        match cli.command {
            Command::Add { project, tool } => {
                assert_eq!(project.as_deref(), Some("platformer"));
                assert_eq!(tool.as_deref(), Some("gd-props"));
            }
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn rm_is_an_alias_for_remove() {
        let cli = Cli::try_parse_from(["gdkit", "rm", "-p", "platformer"]).expect("parse");
        match cli.command {
            Command::Remove { project } => assert_eq!(project.as_deref(), Some("platformer")),
            _ => panic!("unexpected command"),
        }
    }

    #[test]
    fn flags_are_optional_on_add_and_remove() {
        let cli = Cli::try_parse_from(["gdkit", "add"]).expect("parse");
        match cli.command {
            Command::Add { project, tool } => {
                assert!(project.is_none());
                assert!(tool.is_none());
            }
            _ => panic!("unexpected command"),
        }

        let cli = Cli::try_parse_from(["gdkit", "remove"]).expect("parse");
        assert!(matches!(cli.command, Command::Remove { project: None }));
    }

    #[test]
    fn parses_verbose_flag() {
        let cli = Cli::try_parse_from(["gdkit", "--verbose", "convert"]).expect("parse");
        assert!(cli.verbose);
    }
}
