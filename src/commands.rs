use crate::error::CommandError;
use crate::models::Score;
use std::path::PathBuf;

/// Which response panel a score applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelRef {
    /// 1-based panel number as displayed
    Position(usize),
    /// Model name
    Model(String),
}

/// A reviewer action typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Previous,
    Next,
    Score { panel: PanelRef, score: Score },
    Save,
    SaveAll,
    Export(Option<PathBuf>),
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  score <panel|model> <1-5>   rate a response (alias: s); a model named
                              like a number wins over the panel number
  next                        go to the next question (alias: n)
  prev                        go to the previous question (alias: p)
  save                        save or update scores for this question
  save-all                    save every scored question not yet saved
  export [path]               write saved scores as CSV
  show                        redraw the current question
  help                        show this message
  quit                        end the session (alias: q)";

const SCORE_USAGE: &str = "score <panel|model> <1-5>";

impl Command {
    /// Parse one line of input. Blank lines redraw the current view.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(Command::Show);
        };

        match name.to_ascii_lowercase().as_str() {
            "n" | "next" => Ok(Command::Next),
            "p" | "prev" | "previous" => Ok(Command::Previous),
            "save" => Ok(Command::Save),
            "save-all" | "saveall" => Ok(Command::SaveAll),
            "export" | "download" => {
                let rest = words.collect::<Vec<_>>().join(" ");
                Ok(Command::Export((!rest.is_empty()).then(|| PathBuf::from(rest))))
            }
            "show" | "r" => Ok(Command::Show),
            "h" | "help" | "?" => Ok(Command::Help),
            "q" | "quit" | "exit" => Ok(Command::Quit),
            "s" | "score" => Self::parse_score(words.collect()),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }

    /// `<panel|model> <score>`; model names may contain spaces
    fn parse_score(args: Vec<&str>) -> Result<Self, CommandError> {
        let Some((value, target)) = args.split_last() else {
            return Err(CommandError::Usage(SCORE_USAGE));
        };
        if target.is_empty() {
            return Err(CommandError::Usage(SCORE_USAGE));
        }

        let value: i64 = value
            .parse()
            .map_err(|_| CommandError::NotANumber(value.to_string()))?;
        let score = Score::new(value)?;

        let target = target.join(" ");
        let panel = match target.parse::<usize>() {
            Ok(position) => PanelRef::Position(position),
            Err(_) => PanelRef::Model(target),
        };

        Ok(Command::Score { panel, score })
    }
}
