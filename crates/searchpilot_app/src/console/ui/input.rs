//! Line-oriented command parsing for the console.

use searchpilot_core::{Browser, Level, Msg};

pub const HELP: &str = "\
Queries
  load                      load the saved query list
  save                      save the current query list
  edit                      replace the list; one query per line, end with '.'
  add <query>               append one query
  generate <n> [save] <topic>
                            generate n queries about a topic
Profiles
  browser <edge|chrome>     switch browser (clears the profile list)
  profiles                  fetch profiles and levels for the browser
  toggle <name>             select or unselect a profile
  all | none                select every profile / clear the selection
  apply                     use the current selection for the next run
  level <name>              flip a profile between L1 and L2
  setlevel <1|2> <name>     set a profile's level
Run
  delay <seconds>           pause between searches
  mobile <on|off>           include mobile searches
  start | pause | resume | stop
Other
  show                      print the full state
  help                      this text
  quit                      leave the console";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    BeginEdit,
    Show,
    Help,
    Quit,
}

/// Feeds raw input lines through command parsing, collecting `edit` blocks.
#[derive(Debug, Default)]
pub struct LineReader {
    editing: Option<Vec<String>>,
}

impl LineReader {
    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Returns `None` for lines that produce nothing yet (blank lines, lines
    /// inside an edit block).
    pub fn feed(&mut self, line: &str) -> Option<Result<Command, String>> {
        if let Some(buffer) = self.editing.as_mut() {
            if line.trim() == "." {
                let text = buffer.join("\n");
                self.editing = None;
                return Some(Ok(Command::Dispatch(Msg::QueriesEdited(text))));
            }
            buffer.push(line.to_string());
            return None;
        }

        if line.trim().is_empty() {
            return None;
        }
        let parsed = parse_command(line);
        if matches!(parsed, Ok(Command::BeginEdit)) {
            self.editing = Some(Vec::new());
        }
        Some(parsed)
    }
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let msg = match word.to_ascii_lowercase().as_str() {
        "load" => Msg::LoadQueriesClicked,
        "save" => Msg::SaveQueriesClicked,
        "edit" => return Ok(Command::BeginEdit),
        "add" => Msg::QueryAppended(required(rest, "add <query>")?.to_string()),
        "generate" | "gen" => parse_generate(rest)?,
        "browser" => {
            let browser = required(rest, "browser <edge|chrome>")?.parse::<Browser>()?;
            Msg::BrowserSelected(browser)
        }
        "profiles" => Msg::ProfilePickerOpened,
        "toggle" => Msg::ProfileToggled(required(rest, "toggle <name>")?.to_string()),
        "all" => Msg::SelectAllClicked,
        "none" => Msg::ClearAllClicked,
        "apply" => Msg::SelectionApplied,
        "level" => Msg::LevelToggled(required(rest, "level <name>")?.to_string()),
        "setlevel" => parse_set_level(rest)?,
        "delay" => {
            let raw = required(rest, "delay <seconds>")?;
            let secs = raw
                .parse::<f64>()
                .map_err(|_| format!("'{raw}' is not a number of seconds"))?;
            Msg::DelayChanged(secs)
        }
        "mobile" => match rest.to_ascii_lowercase().as_str() {
            "on" => Msg::MobileToggled(true),
            "off" => Msg::MobileToggled(false),
            _ => return Err("usage: mobile <on|off>".to_string()),
        },
        "start" => Msg::StartClicked,
        "pause" => Msg::PauseClicked,
        "resume" => Msg::ResumeClicked,
        "stop" => Msg::StopClicked,
        "show" | "status" => return Ok(Command::Show),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        other => return Err(format!("unknown command '{other}' (type help)")),
    };
    Ok(Command::Dispatch(msg))
}

fn required<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    if rest.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(rest)
    }
}

fn parse_generate(rest: &str) -> Result<Msg, String> {
    const USAGE: &str = "usage: generate <count> [save] <topic>";
    let (count, rest) = rest.split_once(char::is_whitespace).ok_or(USAGE)?;
    let count = count
        .parse::<u32>()
        .map_err(|_| format!("'{count}' is not a query count"))?;
    let rest = rest.trim();
    let (save, prompt) = match rest.split_once(char::is_whitespace) {
        Some((flag, prompt)) if flag.eq_ignore_ascii_case("save") => (true, prompt.trim()),
        _ => (false, rest),
    };
    if prompt.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(Msg::GenerateClicked {
        prompt: prompt.to_string(),
        count,
        save,
    })
}

fn parse_set_level(rest: &str) -> Result<Msg, String> {
    const USAGE: &str = "usage: setlevel <1|2> <name>";
    let (number, profile) = rest.split_once(char::is_whitespace).ok_or(USAGE)?;
    let level = number
        .parse::<u8>()
        .ok()
        .and_then(Level::from_number)
        .ok_or_else(|| format!("level must be 1 or 2, got '{number}'"))?;
    let profile = profile.trim();
    if profile.is_empty() {
        return Err(USAGE.to_string());
    }
    Ok(Msg::LevelSetRequested {
        profile: profile.to_string(),
        level,
    })
}
