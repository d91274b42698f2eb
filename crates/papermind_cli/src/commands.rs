#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    History,
    Quit,
    Unknown(String),
}

pub const HELP_TEXT: &str = "Commands:\n  /help     show this help\n  /history  print the transcript\n  /quit     end the session (Ctrl-D also works)";

pub fn parse_slash_command(input: &str) -> Option<SlashCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let command = trimmed
        .split_whitespace()
        .next()
        .unwrap_or(trimmed)
        .to_string();

    let parsed = match command.as_str() {
        "/help" => SlashCommand::Help,
        "/history" => SlashCommand::History,
        "/quit" | "/exit" => SlashCommand::Quit,
        _ => SlashCommand::Unknown(command),
    };

    Some(parsed)
}
