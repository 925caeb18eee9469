//! Shell completions generation.

use clap::CommandFactory;
use clap_complete::Shell;

use crate::cli::args::Cli;
use crate::error::ListAllError;

/// Name completions are registered under.
pub const BIN_NAME: &str = "listall";

/// Generate the completion script for `shell`.
///
/// # Errors
///
/// Returns an error if the generated script is not valid UTF-8.
pub fn generate_completions(shell: Shell) -> Result<String, ListAllError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    clap_complete::generate(shell, &mut cmd, BIN_NAME, &mut buf);
    String::from_utf8(buf)
        .map_err(|e| ListAllError::InvalidInput(format!("completion script is not UTF-8: {e}")))
}

/// How to install completions for `shell`.
#[must_use]
pub fn completion_install_instructions(shell: Shell) -> String {
    match shell {
        Shell::Bash => r"# Add to ~/.bashrc or ~/.bash_profile:
source <(listall completions bash)
"
        .to_string(),

        Shell::Zsh => r"# Save to your fpath:
listall completions zsh > ~/.zsh/completions/_listall
# Then add to ~/.zshrc:
fpath=(~/.zsh/completions $fpath)
autoload -Uz compinit && compinit
"
        .to_string(),

        Shell::Fish => r"# Save to fish completions directory:
listall completions fish > ~/.config/fish/completions/listall.fish
"
        .to_string(),

        Shell::PowerShell => r"# Add to your PowerShell profile ($PROFILE):
listall completions powershell | Out-String | Invoke-Expression
"
        .to_string(),

        Shell::Elvish => r"# Save to elvish completions directory:
listall completions elvish > ~/.elvish/lib/listall.elv
"
        .to_string(),

        _ => format!("# Run `listall completions {shell}` and source the output.\n"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_bash_completions() {
        let script = generate_completions(Shell::Bash).unwrap();
        assert!(script.contains("listall"));
        assert!(script.contains("complete"));
    }

    #[test]
    fn test_generate_zsh_completions_include_subcommands() {
        let script = generate_completions(Shell::Zsh).unwrap();
        assert!(script.contains("import"));
        assert!(script.contains("export"));
    }

    #[test]
    fn test_completion_instructions_not_empty() {
        assert!(completion_install_instructions(Shell::Fish).contains("listall.fish"));
        assert!(!completion_install_instructions(Shell::Bash).is_empty());
    }
}
