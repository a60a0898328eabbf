/// Top-level commands accepted at the `Ready` prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    Mask,
    ChangeInterpolation,
    Write,
    ListRegions,
    Help,
    /// Anything else, kept verbatim for the error message.
    Unrecognized(String),
}

impl Command {
    pub fn parse(input: &str) -> Self {
        match input.trim() {
            "q" | "Q" | "quit" | "exit" => Command::Quit,
            "mask" => Command::Mask,
            "funcType" | "kind" => Command::ChangeInterpolation,
            "write" => Command::Write,
            "regions" => Command::ListRegions,
            "commands" | "help" => Command::Help,
            other => Command::Unrecognized(other.to_string()),
        }
    }
}

pub const HELP: &str = "\
You can mask out regions of the spectrum with the commands below.

  q, Q, quit   : quit the bad pixel masker
  mask         : mask a region
  funcType     : change the interpolating function
  write        : write the updated spectrum to file
  regions      : list (and optionally remove) the masked regions
  commands     : display these commands again";

/// Answer to a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Other,
}

impl Answer {
    pub fn parse(input: &str) -> Self {
        let input = input.trim();
        if input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes") {
            Answer::Yes
        } else if input.eq_ignore_ascii_case("n") || input.eq_ignore_ascii_case("no") {
            Answer::No
        } else {
            Answer::Other
        }
    }
}

/// `q` / `Q` used to back out of a sub-prompt.
pub fn is_skip(input: &str) -> bool {
    matches!(input.trim(), "q" | "Q")
}
