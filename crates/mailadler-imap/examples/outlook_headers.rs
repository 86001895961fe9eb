#![allow(clippy::expect_used, clippy::doc_markdown, clippy::uninlined_format_args)]
//! Example: Show the newest INBOX headers of an Outlook account
//!
//! ## Prerequisites
//!
//! 1. Go to https://account.microsoft.com/security
//! 2. Enable "Two-step verification" (if not already enabled)
//! 3. Go to "Advanced security options" → "App passwords"
//! 4. Generate a new app password for "Mail"
//! 5. Use this app password (not your regular password)
//!
//! ## Running
//!
//! ```bash
//! cargo run --package mailadler-imap --example outlook_headers
//! ```

use std::io::{self, Write};

use mailadler_imap::{Config, Event, connect};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Mailadler - Outlook header test");
    println!("===============================\n");

    print!("Email address: ");
    io::stdout().flush()?;
    let mut email = String::new();
    io::stdin().read_line(&mut email)?;
    let email = email.trim().to_string();

    print!("App password: ");
    io::stdout().flush()?;
    let mut password = String::new();
    io::stdin().read_line(&mut password)?;
    let password = password.trim().to_string();

    let (client, mut events) = connect(Config::new("outlook.office365.com"));

    while let Some(event) = events.recv().await {
        match event {
            Event::Status(message) => println!("  {}", message),
            Event::Connected => client.login(&email, &password)?,
            Event::Authenticated => client.select_mailbox(None)?,
            Event::FolderSelected { .. } => client.fetch_headers(10)?,
            Event::HeadersReceived(headers) => {
                println!();
                for header in &headers {
                    let marker = if header.is_unread() { "*" } else { " " };
                    println!("{} {} | {}", marker, header.sender, header.subject);
                }
                println!();
                client.logout()?;
            }
            Event::Error(message) => eprintln!("✗ {}", message),
            Event::Disconnected => break,
        }
    }

    Ok(())
}
