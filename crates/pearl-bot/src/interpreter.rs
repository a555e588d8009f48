//! Command interpreter

use pearl_gateway::{Command, CommandAction};

/// Reply for a denied author
pub const PERMISSION_DENIED: &str = "Permission Denied";

/// Built-in commands with their help text
pub const COMMANDS: &[(&str, &str)] = &[
    ("ping", "check that the bot is alive"),
    ("help", "list commands"),
    ("echo <text>", "repeat <text>"),
];

/// Text to post back to the command's channel
pub fn interpret(command: &Command, prefix: char) -> String {
    let (name, args) = match &command.action {
        CommandAction::PermissionDenied => return PERMISSION_DENIED.to_string(),
        CommandAction::Run { name, args } => (name.as_str(), args),
    };

    match name {
        "ping" => "pong".to_string(),
        "help" => help(prefix),
        "echo" if args.is_empty() => format!("Usage: {prefix}echo <text>"),
        "echo" => args.join(" "),
        other => format!("Unknown command: {other}"),
    }
}

fn help(prefix: char) -> String {
    let lines: Vec<String> = COMMANDS
        .iter()
        .map(|(usage, about)| format!("{prefix}{usage} - {about}"))
        .collect();
    format!("Commands:\n{}", lines.join("\n"))
}
