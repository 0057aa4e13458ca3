use teloxide::types::BotCommand;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Reset,
    Help,
}

impl Command {
    fn all() -> Vec<BotCommand> {
        vec![
            BotCommand {
                command: "start".to_string(),
                description: "Say hello".to_string(),
            },
            BotCommand {
                command: "reset".to_string(),
                description: "Clear conversation history".to_string(),
            },
            BotCommand {
                command: "help".to_string(),
                description: "Show help".to_string(),
            },
        ]
    }

    #[must_use]
    pub fn bot_commands() -> Vec<BotCommand> {
        Self::all()
    }

    /// Recognize one of our commands at the start of `text`.
    ///
    /// Accepts `/cmd`, `/cmd@bot_name` and trailing arguments. A command
    /// addressed to a different bot is not ours.
    #[must_use]
    pub fn parse_from_text(text: &str, bot_name: Option<&str>) -> Option<Self> {
        let word = text.split_whitespace().next()?.strip_prefix('/')?;

        let (name, mention) = match word.split_once('@') {
            Some((name, mention)) => (name, Some(mention)),
            None => (word, None),
        };

        if let (Some(mention), Some(bot_name)) = (mention, bot_name) {
            if !mention.eq_ignore_ascii_case(bot_name) {
                return None;
            }
        }

        match name.to_lowercase().as_str() {
            "start" => Some(Self::Start),
            "reset" => Some(Self::Reset),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

}

/// Where an inbound text message goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Command(Command),
    /// A command that is not ours, or is addressed to another bot.
    Ignore,
    /// Plain text for the completion service.
    Relay,
}

impl Route {
    /// Classify `text`. `leading_command` is whether Telegram marked the
    /// start of the message as a `bot_command` entity; text that merely
    /// begins with `/` is still relayed.
    #[must_use]
    pub fn classify(text: &str, leading_command: bool, bot_name: Option<&str>) -> Self {
        if !leading_command {
            return Self::Relay;
        }
        Command::parse_from_text(text, bot_name).map_or(Self::Ignore, Self::Command)
    }
}
