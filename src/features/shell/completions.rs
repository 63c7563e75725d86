//! Shell completions generation.
//!
//! Generates shell completion scripts for bash, zsh, fish, elvish and PowerShell.

use clap::CommandFactory;
use clap_complete::Shell;
use std::io::Write;

use crate::cli::args::Cli;
use crate::error::CrmError;

const BIN_NAME: &str = "fieldcrm";

/// Generate shell completions for the specified shell.
///
/// # Errors
///
/// Returns an error if the generated script is not valid UTF-8.
pub fn generate_completions(shell: Shell) -> Result<String, CrmError> {
    let mut cmd = Cli::command();
    let mut buf = Vec::new();
    generate_to(&mut buf, shell, &mut cmd);
    String::from_utf8(buf)
        .map_err(|e| CrmError::InvalidArgument(format!("Completion script is not UTF-8: {e}")))
}

fn generate_to<W: Write>(buf: &mut W, shell: Shell, cmd: &mut clap::Command) {
    clap_complete::generate(shell, cmd, BIN_NAME, buf);
}

/// Get installation instructions for shell completions.
#[must_use]
pub fn completion_install_instructions(shell: Shell) -> String {
    match shell {
        Shell::Bash => r"# Add to ~/.bashrc or ~/.bash_profile:
source <(fieldcrm completions bash)

# Or save to a file:
fieldcrm completions bash > /usr/local/etc/bash_completion.d/fieldcrm
"
        .to_string(),

        Shell::Zsh => r"# Add to ~/.zshrc (before compinit):
source <(fieldcrm completions zsh)

# Or save to your fpath:
fieldcrm completions zsh > ~/.zsh/completions/_fieldcrm
# Then add to ~/.zshrc:
fpath=(~/.zsh/completions $fpath)
autoload -Uz compinit && compinit
"
        .to_string(),

        Shell::Fish => r"# Save to fish completions directory:
fieldcrm completions fish > ~/.config/fish/completions/fieldcrm.fish
"
        .to_string(),

        Shell::PowerShell => r"# Add to your PowerShell profile ($PROFILE):
fieldcrm completions powershell | Out-String | Invoke-Expression
"
        .to_string(),

        Shell::Elvish => r"# Save to elvish completions directory:
fieldcrm completions elvish > ~/.elvish/lib/fieldcrm.elv

# Then add to ~/.elvish/rc.elv:
use fieldcrm
"
        .to_string(),

        _ => format!("# No instructions for {shell}; redirect `fieldcrm completions {shell}` to a file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_bash_completions() {
        let script = generate_completions(Shell::Bash).unwrap();
        assert!(script.contains("fieldcrm"));
        assert!(script.contains("complete"));
    }

    #[test]
    fn test_generate_zsh_completions_include_subcommands() {
        let script = generate_completions(Shell::Zsh).unwrap();
        assert!(script.contains("fieldcrm"));
        assert!(script.contains("automation"));
        assert!(script.contains("template"));
    }

    #[test]
    fn test_generate_fish_completions() {
        let script = generate_completions(Shell::Fish).unwrap();
        assert!(script.contains("fieldcrm"));
    }

    #[test]
    fn test_completion_instructions_name_the_binary() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            assert!(completion_install_instructions(shell).contains("fieldcrm completions"));
        }
    }
}
