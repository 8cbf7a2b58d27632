use anyhow::Result;
use clap::Args;
use clap_complete::{Shell, generate};
use std::io::Write;

/// Arguments for `tw completions`.
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to emit a completion script for.
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Write the completion script for `command` to `out`.
///
/// # Errors
///
/// Returns an error if flushing `out` fails.
pub fn run_completions(shell: Shell, command: &mut clap::Command, out: &mut dyn Write) -> Result<()> {
    let name = command.get_name().to_string();
    generate(shell, command, name, out);
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    #[test]
    fn bash_script_names_the_binary_and_subcommands() {
        let mut command = Command::new("tw")
            .subcommand(Command::new("snapshot").arg(Arg::new("position").long("position")));
        let mut buf = Vec::new();
        run_completions(Shell::Bash, &mut command, &mut buf).expect("generate");
        let script = String::from_utf8(buf).expect("utf8");
        assert!(script.contains("_tw"));
        assert!(script.contains("snapshot"));
        assert!(script.contains("--position"));
    }
}
