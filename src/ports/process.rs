use color_eyre::eyre::Result;
use tokio_util::sync::CancellationToken;

/// An executable plus its arguments, ready to spawn without any shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub program: String,
    pub args: Vec<String>,
}

impl CommandLine {
    /// A command invoked with no arguments. Generator commands use this shape:
    /// the whole configured string is the executable path.
    pub fn bare(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Split a full command line: the first whitespace-delimited token is the
    /// executable, the remainder is its argument string. Double quotes group
    /// an argument (acquisition templates substitute `${title}`/`${artist}`
    /// as quoted values); an unterminated quote runs to the end of the line.
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed.split_once(char::is_whitespace) {
            Some((program, rest)) => Self {
                program: program.to_string(),
                args: split_arguments(rest),
            },
            None => Self::bare(trimmed),
        }
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

fn split_arguments(rest: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut seen_any = false;

    for c in rest.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                seen_any = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if seen_any {
                    args.push(std::mem::take(&mut current));
                    seen_any = false;
                }
            }
            c => {
                current.push(c);
                seen_any = true;
            }
        }
    }
    if seen_any {
        args.push(current);
    }

    args
}

/// Captured result of one external process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Capability for running external processes (generator and acquisition
/// commands), injected so tests can substitute a fake runner without touching
/// matching or reconciliation logic.
///
/// Implementations must honor the cancellation token by requesting process
/// termination and returning promptly.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: &CommandLine, cancel: &CancellationToken) -> Result<ProcessOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_program_only() {
        let cmd = CommandLine::parse("fetch-billboard-chart");
        assert_eq!(cmd.program, "fetch-billboard-chart");
        assert!(cmd.args.is_empty());
    }

    #[test]
    fn test_parse_unquoted_arguments() {
        let cmd = CommandLine::parse("yt-fetch --audio-only best");
        assert_eq!(cmd.program, "yt-fetch");
        assert_eq!(cmd.args, vec!["--audio-only", "best"]);
    }

    #[test]
    fn test_parse_quoted_argument_keeps_spaces() {
        let cmd = CommandLine::parse(r#"yt-fetch "Song A" "Artist X""#);
        assert_eq!(cmd.program, "yt-fetch");
        assert_eq!(cmd.args, vec!["Song A", "Artist X"]);
    }

    #[test]
    fn test_parse_mixed_quoted_and_flags() {
        let cmd = CommandLine::parse(r#"downloader --title "Bohemian Rhapsody" --artist "Queen" -q"#);
        assert_eq!(cmd.program, "downloader");
        assert_eq!(
            cmd.args,
            vec!["--title", "Bohemian Rhapsody", "--artist", "Queen", "-q"]
        );
    }

    #[test]
    fn test_parse_empty_quoted_argument() {
        let cmd = CommandLine::parse(r#"downloader "" next"#);
        assert_eq!(cmd.args, vec!["", "next"]);
    }

    #[test]
    fn test_parse_unterminated_quote_runs_to_end() {
        let cmd = CommandLine::parse(r#"downloader "Song A feat. B"#);
        assert_eq!(cmd.args, vec!["Song A feat. B"]);
    }

    #[test]
    fn test_parse_collapses_repeated_whitespace() {
        let cmd = CommandLine::parse("downloader   a    b");
        assert_eq!(cmd.args, vec!["a", "b"]);
    }

    #[test]
    fn test_success_requires_zero_exit() {
        let ok = ProcessOutput {
            exit_code: Some(0),
            stdout: String::new(),
            stderr: String::new(),
        };
        let failed = ProcessOutput {
            exit_code: Some(2),
            stdout: String::new(),
            stderr: String::new(),
        };
        let killed = ProcessOutput {
            exit_code: None,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(ok.success());
        assert!(!failed.success());
        assert!(!killed.success());
    }
}
