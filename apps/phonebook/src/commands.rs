//! REPL commands and their effect on the controller.

use std::io::{self, Write};

use client_core::{
    AddOutcome, ConfirmationGate, ContactListController, DeleteOutcome, DirectoryClient,
    NotificationKind,
};
use shared::domain::ContactId;

pub const HELP: &str = "\
commands:
  list              show contacts matching the current filter
  filter [text]     filter shown with text (no text clears the filter)
  name <text>       set the name of the contact to add
  number <text>     set the number of the contact to add
  add               add the pending contact
  delete <id>       delete a contact (asks for confirmation)
  help              show this text
  quit              leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List,
    Filter(String),
    Name(String),
    Number(String),
    Add,
    Delete(ContactId),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => Ok(Command::List),
        "filter" => Ok(Command::Filter(rest.to_string())),
        "name" => Ok(Command::Name(rest.to_string())),
        "number" => Ok(Command::Number(rest.to_string())),
        "add" => Ok(Command::Add),
        "delete" | "rm" if !rest.is_empty() => Ok(Command::Delete(ContactId::new(rest))),
        "delete" | "rm" => Err("usage: delete <id>".to_string()),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        "" => Err("type 'help' for a list of commands".to_string()),
        other => Err(format!("unknown command '{other}'; type 'help'")),
    }
}

pub async fn execute<D, G>(
    controller: &mut ContactListController<D>,
    command: Command,
    gate: &mut G,
    out: &mut impl Write,
) -> io::Result<Flow>
where
    D: DirectoryClient,
    G: ConfirmationGate + ?Sized,
{
    match command {
        Command::List => {}
        Command::Filter(text) => controller.set_filter(text),
        Command::Name(text) => controller.set_new_name(text),
        Command::Number(text) => controller.set_new_number(text),
        Command::Add => {
            if let AddOutcome::Added(contact) = controller.submit().await {
                tracing::debug!(contact_id = %contact.id, "repl: add completed");
            }
        }
        Command::Delete(id) => {
            if let DeleteOutcome::UnknownContact(id) = controller.delete_contact(&id, gate).await {
                writeln!(out, "no contact with id {id}")?;
            }
        }
        Command::Help => {
            writeln!(out, "{HELP}")?;
            return Ok(Flow::Continue);
        }
        Command::Quit => return Ok(Flow::Exit),
    }
    render(controller, out)?;
    Ok(Flow::Continue)
}

/// Prints the live notification (if any) followed by the filtered list.
pub fn render<D: DirectoryClient>(
    controller: &ContactListController<D>,
    out: &mut impl Write,
) -> io::Result<()> {
    if let Some(notification) = controller.notification() {
        let tag = match notification.kind {
            NotificationKind::Success => "ok",
            NotificationKind::Error => "error",
        };
        writeln!(out, "[{tag}] {}", notification.message)?;
    }

    if controller.filter().is_empty() {
        writeln!(out, "Numbers")?;
    } else {
        writeln!(out, "Numbers (filter: {})", controller.filter())?;
    }
    for contact in controller.visible_contacts() {
        writeln!(out, "  {:>4}  {} {}", contact.id, contact.name, contact.number)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
