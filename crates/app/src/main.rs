//! Terminal front end for the chat client.
//!
//! All decisions (budgets, warnings, reply splitting, send preconditions)
//! live in `chat_core`; this binary only reads lines and prints results.

mod commands;
mod disk_file;

use chat_core::{CatalogState, ChatSession, CoreError, Exchange, RejectReason};
use commands::{parse_line, Command, HELP};
use disk_file::DiskFile;
use providers::HttpBackend;
use shared::attachment::AttachmentKind;
use shared::locale::{Locale, UiText};
use shared::settings::ClientSettings;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

fn print_models(session: &ChatSession) {
    let locale = session.locale();
    match session.catalog().state() {
        CatalogState::Loading => println!("{}", locale.text(UiText::ModelLoading)),
        CatalogState::Error => println!("{}", locale.text(UiText::ModelLoadError)),
        CatalogState::Loaded(items) if items.is_empty() => {
            println!("{}", locale.text(UiText::ModelEmpty))
        }
        CatalogState::Loaded(items) => {
            for item in items {
                let marker = if item.name == session.active_model() { '*' } else { ' ' };
                let size = item.parameter_size.as_deref().unwrap_or("");
                println!(" {} {:<32} {}", marker, item.name, size);
            }
        }
    }
}

fn print_exchange(locale: Locale, exchange: &Exchange) {
    if let Some(thoughts) = exchange.reply.thoughts.as_deref().filter(|t| !t.is_empty()) {
        println!("{}", locale.text(UiText::ThoughtsSummary));
        for line in thoughts.lines() {
            println!("  │ {}", line);
        }
        println!();
    }

    if exchange.reply.answer.is_empty() {
        println!("{}", locale.text(UiText::Ready));
    } else {
        println!("{}", exchange.reply.answer);
    }

    if let Some(key) = &exchange.document_warning {
        println!("⚠ {}", locale.server_warning_text(key));
    }
}

fn print_error(locale: Locale, err: &CoreError) {
    match err {
        CoreError::SubmissionRejected(RejectReason::AttachmentNotReady) => {
            println!("{}", locale.text(UiText::AttachmentPending))
        }
        CoreError::SubmissionRejected(RejectReason::Empty) => {}
        CoreError::AttachmentRead { .. } => {
            println!("{}", locale.text(UiText::AttachmentReadFailed))
        }
        CoreError::Transport(e) => println!("{}{}", locale.text(UiText::NetworkPrefix), e),
        CoreError::CatalogLoad(_) => println!("{}", locale.text(UiText::ModelLoadError)),
    }
}

async fn attach(session: &mut ChatSession, path: &Path) {
    let locale = session.locale();
    let file = match DiskFile::open(path).await {
        Ok(file) => file,
        Err(e) => {
            println!("{}: {:#}", locale.text(UiText::Error), e);
            return;
        }
    };

    let kind = AttachmentKind::from_path(path);
    if let Err(e) = session.attach(Arc::new(file), kind).await {
        print_error(locale, &e);
        return;
    }

    if let Some(pending) = session.pending_attachment() {
        match pending.preview_text() {
            Some(preview) => println!("📎 {} — {}", pending.file_name(), preview),
            None => println!("📎 {} ({})", pending.file_name(), kind.as_str()),
        }
        if let Some(code) = pending.warning() {
            println!("⚠ {}", locale.warning_text(code));
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = ClientSettings::load();
    tracing::info!("using chat server at {}", settings.backend_url);
    let backend = HttpBackend::new(&settings)?;
    let mut session = ChatSession::from_settings(&settings);

    // A failed load is already logged and shown by print_models.
    let _ = session.refresh_models(&backend).await;
    print_models(&session);
    println!("{}", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(cmd) = parse_line(&line) else {
            continue;
        };
        let locale = session.locale();

        match cmd {
            Command::Send(prompt) => match session.send(&backend, &prompt).await {
                Ok(exchange) => print_exchange(locale, &exchange),
                Err(e) => print_error(locale, &e),
            },
            Command::Attach(path) => attach(&mut session, &path).await,
            Command::Detach => session.clear_attachment(),
            Command::Model(name) => {
                if !session.select_model(&name) {
                    println!("{}: {}", locale.text(UiText::Error), name);
                }
                print_models(&session);
            }
            Command::Models => {
                let _ = session.refresh_models(&backend).await;
                print_models(&session);
            }
            Command::Lang(tag) => {
                session.set_locale(Locale::from_tag(&tag));
                println!("{}", session.locale().tag());
            }
            Command::Clear => session.clear(),
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
        }
    }

    Ok(())
}
