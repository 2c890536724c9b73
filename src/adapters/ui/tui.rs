//! Implements InputPort and AuthPrompt. Inquire-based interactive prompts.
//!
//! Main menu: dictate or type a message, review the corrected draft, send it.
//! Errors from any action are printed and the menu comes back; nothing here
//! ends the program except Quit or Ctrl-C at the main menu.

use crate::adapters::ui::banner::{CYBER_GREEN, NEON_PURPLE};
use crate::adapters::ui::progress::with_spinner;
use crate::domain::{Contact, ContactRole, DomainError, DraftOrigin, DraftState, MessageDraft, Recipient};
use crate::ports::{AuthPort, AuthPrompt, ContactDirectory, DictationSource, GrammarCorrector, InputPort};
use crate::usecases::contacts_service::parse_aliases;
use crate::usecases::status::collect_status;
use crate::usecases::{AutoPreview, ContactsService, DraftEdit, MessageSession, PreviewOutcome, SendOutcome};
use async_trait::async_trait;
use crossterm::ExecutableCommand;
use crossterm::style::{Color as TermColor, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use inquire::error::InquireError;
use inquire::ui::{Color, RenderConfig, StyleSheet, Styled};
use inquire::{Confirm, Password, PasswordDisplayMode, Select, Text};
use std::fmt;
use std::io::{Write, stdout};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Neon prompt styling, applied once for all inquire prompts.
pub fn apply_theme() {
    let purple = Color::rgb(NEON_PURPLE.0, NEON_PURPLE.1, NEON_PURPLE.2);
    let green = Color::rgb(CYBER_GREEN.0, CYBER_GREEN.1, CYBER_GREEN.2);
    let mut config = RenderConfig::default();
    config.prompt_prefix = Styled::new("❯").with_fg(purple);
    config.highlighted_option_prefix = Styled::new("➤").with_fg(green);
    config.answer = StyleSheet::new().with_fg(green);
    config.help_message = StyleSheet::new().with_fg(Color::DarkGrey);
    inquire::set_global_render_config(config);
}

fn ui_err(e: InquireError) -> DomainError {
    DomainError::Ui(e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuAction {
    Dictate,
    Type,
    Contacts,
    Status,
    Quit,
}

impl fmt::Display for MenuAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuAction::Dictate => "🎙  Dictate a message",
            MenuAction::Type => "⌨  Type a message",
            MenuAction::Contacts => "👥 Contacts",
            MenuAction::Status => "📡 Status",
            MenuAction::Quit => "Quit",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReviewAction {
    Send,
    EditText,
    ChangeRecipient,
    Discard,
}

impl fmt::Display for ReviewAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewAction::Send => "Send",
            ReviewAction::EditText => "Edit text",
            ReviewAction::ChangeRecipient => "Change recipient",
            ReviewAction::Discard => "Discard",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContactsAction {
    List,
    Add,
    Remove,
}

impl fmt::Display for ContactsAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContactsAction::List => "List contacts",
            ContactsAction::Add => "Add contact",
            ContactsAction::Remove => "Remove contact",
        })
    }
}

/// Recipient choice offered before composing or while reviewing.
#[derive(Debug, Clone)]
enum RecipientChoice {
    /// Compose only: let the resolver infer from the text.
    Infer,
    Saved(Contact),
    TypeHandle,
}

impl fmt::Display for RecipientChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecipientChoice::Infer => f.write_str("Work it out from the message"),
            RecipientChoice::Saved(c) => write!(f, "{} ({}, {})", c.display_name, c.handle, c.role),
            RecipientChoice::TypeHandle => f.write_str("Enter a username or phone number…"),
        }
    }
}

/// TUI adapter. Drives the message session from inquire prompts.
pub struct TuiInputPort {
    session: Arc<MessageSession>,
    auto_preview: AutoPreview,
    contacts: ContactsService,
    dictation: Mutex<Box<dyn DictationSource>>,
    corrector: Arc<dyn GrammarCorrector>,
    directory: Arc<dyn ContactDirectory>,
    /// `None` in dry-run mode.
    auth: Option<Arc<dyn AuthPort>>,
}

impl TuiInputPort {
    pub fn new(
        session: Arc<MessageSession>,
        directory: Arc<dyn ContactDirectory>,
        corrector: Arc<dyn GrammarCorrector>,
        dictation: Box<dyn DictationSource>,
        auth: Option<Arc<dyn AuthPort>>,
    ) -> Self {
        Self {
            auto_preview: AutoPreview::new(Arc::clone(&session)),
            contacts: ContactsService::new(Arc::clone(&directory)),
            session,
            dictation: Mutex::new(dictation),
            corrector,
            directory,
            auth,
        }
    }

    async fn choose_recipient(
        &self,
        message: &str,
        allow_infer: bool,
    ) -> Result<Option<RecipientChoice>, DomainError> {
        let (contacts, err) = self.contacts.list().await;
        if let Some(e) = err {
            print_error(&e);
        }
        let mut options = Vec::with_capacity(contacts.len() + 2);
        if allow_infer {
            options.push(RecipientChoice::Infer);
        }
        options.extend(contacts.into_iter().map(RecipientChoice::Saved));
        options.push(RecipientChoice::TypeHandle);
        Select::new(message, options)
            .with_page_size(12)
            .prompt_skippable()
            .map_err(ui_err)
    }

    /// Explicit contact for a new draft. `Ok(None)` = cancelled.
    async fn choose_compose_target(&self) -> Result<Option<ComposeTarget>, DomainError> {
        Ok(match self.choose_recipient("Send to:", true).await? {
            None => None,
            Some(RecipientChoice::Infer) => Some(ComposeTarget::Infer),
            Some(RecipientChoice::Saved(c)) => Some(ComposeTarget::Contact(c)),
            Some(RecipientChoice::TypeHandle) => prompt_handle()?.map(ComposeTarget::Handle),
        })
    }

    async fn dictate(&self) -> Result<(), DomainError> {
        let Some(target) = self.choose_compose_target().await? else {
            return Ok(());
        };
        print_accent("Listening… (a blank line ends the message)\r\n");

        let outcome = {
            let mut source = self.dictation.lock().await;
            self.auto_preview
                .next_preview(&mut **source, target.contact(), print_interim)
                .await
        };
        clear_line();

        match outcome {
            None => {
                print_accent("Dictation input has ended; use Type instead.\r\n");
                Ok(())
            }
            Some(result) => {
                let outcome = result?;
                self.after_preview(outcome, target).await
            }
        }
    }

    async fn type_message(&self) -> Result<(), DomainError> {
        let Some(target) = self.choose_compose_target().await? else {
            return Ok(());
        };
        let Some(text) = Text::new("Message:")
            .with_help_message("e.g. \"tell Imran the project is ready\"")
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };

        let outcome = with_spinner(
            "Correcting…",
            self.session.preview(&text, target.contact(), DraftOrigin::Typed),
        )
        .await?;
        self.after_preview(outcome, target).await
    }

    async fn after_preview(&self, outcome: PreviewOutcome, target: ComposeTarget) -> Result<(), DomainError> {
        match outcome {
            PreviewOutcome::Ignored => {
                print_accent("Still working on the previous message.\r\n");
                Ok(())
            }
            PreviewOutcome::Ready(draft) => {
                // A typed handle isn't a contact, so the resolver never saw it.
                if let ComposeTarget::Handle(handle) = target {
                    debug!(inferred = ?draft.recipient, "explicit handle overrides");
                    self.session
                        .edit(DraftEdit::recipient(Recipient::Handle(handle)))
                        .await?;
                }
                self.review().await
            }
        }
    }

    /// Review loop over the current draft until it is sent or discarded.
    async fn review(&self) -> Result<(), DomainError> {
        loop {
            let Some(draft) = self.session.draft().await else {
                return Ok(());
            };
            let state = self.session.state().await;
            print_draft(&draft, state);

            let actions = vec![
                ReviewAction::Send,
                ReviewAction::EditText,
                ReviewAction::ChangeRecipient,
                ReviewAction::Discard,
            ];
            let prompt = if state == DraftState::Failed {
                "Send failed. Retry?"
            } else {
                "What now?"
            };
            let action = match Select::new(prompt, actions).prompt_skippable().map_err(ui_err)? {
                Some(a) => a,
                None => ReviewAction::Discard,
            };

            match action {
                ReviewAction::Send => match with_spinner("Sending…", self.session.send()).await {
                    Ok(SendOutcome::Sent(receipt)) => {
                        print_accent(&format!(
                            "✓ Sent to {} ({})\r\n",
                            receipt.recipient_display_name, receipt.recipient_handle
                        ));
                        return Ok(());
                    }
                    Ok(SendOutcome::Ignored) => {
                        print_accent("A send is already in progress.\r\n");
                    }
                    Err(e) => print_error(&e),
                },
                ReviewAction::EditText => {
                    if let Some(text) = Text::new("Text:")
                        .with_initial_value(&draft.corrected_text)
                        .prompt_skippable()
                        .map_err(ui_err)?
                    {
                        if let Err(e) = self.session.edit(DraftEdit::text(text)).await {
                            print_error(&e);
                        }
                    }
                }
                ReviewAction::ChangeRecipient => {
                    let recipient = match self.choose_recipient("Send to:", false).await? {
                        Some(RecipientChoice::Saved(c)) => Some(Recipient::Contact(c)),
                        Some(RecipientChoice::TypeHandle) => prompt_handle()?.map(Recipient::Handle),
                        _ => None,
                    };
                    if let Some(recipient) = recipient {
                        if let Err(e) = self.session.edit(DraftEdit::recipient(recipient)).await {
                            print_error(&e);
                        }
                    }
                }
                ReviewAction::Discard => {
                    self.session.discard().await?;
                    print_accent("Draft discarded.\r\n");
                    return Ok(());
                }
            }
        }
    }

    async fn manage_contacts(&self) -> Result<(), DomainError> {
        let actions = vec![ContactsAction::List, ContactsAction::Add, ContactsAction::Remove];
        let Some(action) = Select::new("Contacts:", actions)
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };

        match action {
            ContactsAction::List => {
                let (contacts, err) = self.contacts.list().await;
                if let Some(e) = err {
                    print_error(&e);
                }
                if contacts.is_empty() {
                    println!("No contacts yet.");
                }
                for c in &contacts {
                    let aliases = if c.aliases.is_empty() {
                        String::new()
                    } else {
                        format!("  aka {}", c.aliases.join(", "))
                    };
                    println!("  {:<20} {:<22} {:<10}{}", c.display_name, c.handle, c.role, aliases);
                }
                Ok(())
            }
            ContactsAction::Add => self.add_contact().await,
            ContactsAction::Remove => {
                let (contacts, _) = self.contacts.list().await;
                if contacts.is_empty() {
                    println!("No contacts to remove.");
                    return Ok(());
                }
                let options: Vec<RecipientChoice> =
                    contacts.into_iter().map(RecipientChoice::Saved).collect();
                let Some(RecipientChoice::Saved(contact)) = Select::new("Remove:", options)
                    .prompt_skippable()
                    .map_err(ui_err)?
                else {
                    return Ok(());
                };
                let confirmed = Confirm::new(&format!("Remove {}?", contact.display_name))
                    .with_default(false)
                    .prompt()
                    .map_err(ui_err)?;
                if confirmed {
                    self.contacts.remove(&contact.id).await?;
                    print_accent(&format!("Removed {}.\r\n", contact.display_name));
                }
                Ok(())
            }
        }
    }

    async fn add_contact(&self) -> Result<(), DomainError> {
        let Some(name) = Text::new("Name:").prompt_skippable().map_err(ui_err)? else {
            return Ok(());
        };
        let Some(handle) = Text::new("Telegram username or phone:")
            .with_help_message("@username or +15550102030")
            .prompt_skippable()
            .map_err(ui_err)?
        else {
            return Ok(());
        };
        let role = Select::new("Role:", ContactRole::ALL.to_vec())
            .prompt_skippable()
            .map_err(ui_err)?
            .unwrap_or_default();
        let aliases = Text::new("Other names (comma separated):")
            .prompt_skippable()
            .map_err(ui_err)?
            .unwrap_or_default();
        let notes = Text::new("Notes:")
            .prompt_skippable()
            .map_err(ui_err)?
            .unwrap_or_default();

        let contact = self
            .contacts
            .add(&name, &handle, role, parse_aliases(&aliases), &notes)
            .await?;
        print_accent(&format!("Saved {} ({}).\r\n", contact.display_name, contact.handle));
        Ok(())
    }

    async fn show_status(&self) -> Result<(), DomainError> {
        let report = collect_status(
            self.auth.as_deref(),
            self.corrector.as_ref(),
            self.directory.as_ref(),
        )
        .await;
        println!("{}", report);
        Ok(())
    }
}

/// What a new draft is addressed to before the resolver runs.
enum ComposeTarget {
    Infer,
    Contact(Contact),
    Handle(String),
}

impl ComposeTarget {
    fn contact(&self) -> Option<&Contact> {
        match self {
            ComposeTarget::Contact(c) => Some(c),
            _ => None,
        }
    }
}

fn prompt_handle() -> Result<Option<String>, DomainError> {
    let handle = Text::new("Username or phone:")
        .prompt_skippable()
        .map_err(ui_err)?;
    Ok(handle.map(|h| h.trim().to_string()).filter(|h| !h.is_empty()))
}

fn print_draft(draft: &MessageDraft, state: DraftState) {
    let to = draft
        .recipient
        .as_ref()
        .map(|r| r.to_string())
        .unwrap_or_else(|| "(no recipient yet)".to_string());
    println!();
    print_accent(&format!("To:   {}\r\n", to));
    println!("Text: {}", draft.corrected_text);
    if draft.source_text.trim() != draft.corrected_text.trim() {
        println!("      (heard: {})", draft.source_text);
    }
    debug!(%state, "draft shown");
}

fn print_interim(text: &str) {
    let mut out = stdout();
    let _ = out.execute(Clear(ClearType::CurrentLine));
    let _ = out.execute(Print(format!("\r… {}", text)));
    let _ = out.flush();
}

fn clear_line() {
    let mut out = stdout();
    let _ = out.execute(Clear(ClearType::CurrentLine));
    let _ = out.execute(Print("\r"));
    let _ = out.flush();
}

fn print_accent(text: &str) {
    let (r, g, b) = CYBER_GREEN;
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(TermColor::Rgb { r, g, b }));
    let _ = out.execute(Print(text));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

fn print_error(e: &DomainError) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(TermColor::Red));
    let _ = out.execute(Print(format!("✗ {}\r\n", e)));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

#[async_trait]
impl InputPort for TuiInputPort {
    async fn run(&self) -> Result<(), DomainError> {
        loop {
            let actions = vec![
                MenuAction::Dictate,
                MenuAction::Type,
                MenuAction::Contacts,
                MenuAction::Status,
                MenuAction::Quit,
            ];
            let action = match Select::new("Main menu:", actions).prompt() {
                Ok(a) => a,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    MenuAction::Quit
                }
                Err(e) => return Err(ui_err(e)),
            };

            let result = match action {
                MenuAction::Dictate => self.dictate().await,
                MenuAction::Type => self.type_message().await,
                MenuAction::Contacts => self.manage_contacts().await,
                MenuAction::Status => self.show_status().await,
                MenuAction::Quit => return Ok(()),
            };
            if let Err(e) = result {
                print_error(&e);
            }
        }
    }
}

#[async_trait]
impl AuthPrompt for TuiInputPort {
    async fn phone(&self) -> Result<String, DomainError> {
        Text::new("Phone number (international format):")
            .with_help_message("e.g. +15550102030")
            .prompt()
            .map_err(|e| DomainError::Auth(e.to_string()))
    }

    async fn login_code(&self) -> Result<String, DomainError> {
        Text::new("Login code from Telegram:")
            .prompt()
            .map_err(|e| DomainError::Auth(e.to_string()))
    }

    async fn password(&self, hint: Option<&str>) -> Result<String, DomainError> {
        let message = match hint {
            Some(h) => format!("Two-factor password (hint: {}):", h),
            None => "Two-factor password:".to_string(),
        };
        Password::new(&message)
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()
            .map_err(|e| DomainError::Auth(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_target_contact() {
        let c = Contact {
            id: "imran".into(),
            display_name: "Imran".into(),
            handle: "@imran".into(),
            role: ContactRole::Colleague,
            aliases: vec![],
            notes: String::new(),
        };
        assert_eq!(ComposeTarget::Contact(c.clone()).contact(), Some(&c));
        assert!(ComposeTarget::Infer.contact().is_none());
        assert!(ComposeTarget::Handle("@x".into()).contact().is_none());
        assert_eq!(
            RecipientChoice::Saved(c).to_string(),
            "Imran (@imran, colleague)"
        );
    }
}
