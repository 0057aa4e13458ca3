use crate::{Command, Result, Route, TelegramBot, TelegramReplier};
use mick_conversation::HandleOutcome;
use teloxide::types::{Message, MessageEntityKind, User};
use tracing::{debug, info, warn};

/// Handle bot commands
pub async fn handle_command(
    bot: &TelegramBot,
    user: &User,
    sink: &TelegramReplier,
    cmd: Command,
) -> Result<()> {
    let username = user.username.as_deref().unwrap_or("unknown");

    match cmd {
        Command::Start => {
            info!("[@{username}] Command: /start");
            bot.handler.greet(&user.first_name, sink).await?;
        }
        Command::Reset => {
            info!("[@{username}] Command: /reset");
            bot.handler.reset(user.id.0, sink).await?;
        }
        Command::Help => {
            info!("[@{username}] Command: /help");
            bot.handler.help(sink).await?;
        }
    }

    Ok(())
}

/// Handle any message (commands or regular text)
pub async fn handle_message(bot: TelegramBot, msg: Message) -> Result<()> {
    let Some(text) = msg.text() else {
        debug!("Ignoring non-text message in chat {}", msg.chat.id);
        return Ok(());
    };
    let Some(user) = msg.from.as_ref() else {
        debug!("Ignoring message without sender in chat {}", msg.chat.id);
        return Ok(());
    };
    let username = user.username.as_deref().unwrap_or("unknown");
    let sink = TelegramReplier::new(bot.bot.clone(), msg.chat.id);

    let leading_command = msg.entities().is_some_and(|entities| {
        entities
            .iter()
            .any(|e| e.offset == 0 && matches!(e.kind, MessageEntityKind::BotCommand))
    });

    match Route::classify(text, leading_command, bot.username()) {
        Route::Command(cmd) => return handle_command(&bot, user, &sink, cmd).await,
        Route::Ignore => {
            debug!("[@{username}] Ignoring command: {text}");
            return Ok(());
        }
        Route::Relay => {}
    }

    info!("[@{username}] Message: {text}");

    match bot.handler.handle(user.id.0, text, &sink).await? {
        HandleOutcome::Replied { chunks } => {
            info!("[@{username}] Replied in {chunks} message(s)");
        }
        HandleOutcome::Failed { error } => {
            warn!("[@{username}] Completion failed: {error}");
        }
    }

    Ok(())
}
