//! `mailadler` - show the newest message headers of an IMAP mailbox
//!
//! Connects over implicit TLS, logs in, selects a mailbox, fetches the
//! envelopes of the most recent messages, prints them, and logs out.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod providers;
mod settings;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::Parser;
use mailadler_imap::{
    CertificatePolicy, Config, DEFAULT_FETCH_COUNT, DEFAULT_MAILBOX, Event, MessageSummary,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use settings::AccountSettings;

/// Environment variable holding the login password.
const PASSWORD_ENV: &str = "MAILADLER_PASSWORD";

/// Show the newest message headers of an IMAP mailbox.
#[derive(Debug, Parser)]
#[command(name = "mailadler", version, about)]
struct Args {
    /// Provider preset (GMX, Web.de, Gmail, Outlook, Yahoo, T-Online, iCloud).
    #[arg(long)]
    provider: Option<String>,

    /// IMAP server host; overrides the provider preset.
    #[arg(long)]
    host: Option<String>,

    /// IMAP server port.
    #[arg(long)]
    port: Option<u16>,

    /// Login name, usually the email address.
    #[arg(long, short)]
    user: Option<String>,

    /// Mailbox to show.
    #[arg(long, short, default_value = DEFAULT_MAILBOX)]
    mailbox: String,

    /// Number of most recent messages to show.
    #[arg(long, short = 'n', default_value_t = DEFAULT_FETCH_COUNT)]
    count: u32,

    /// Reject server certificates that do not verify.
    #[arg(long)]
    verify_certificates: bool,

    /// Save the resulting account settings.
    #[arg(long)]
    save: bool,

    /// Give up after this many seconds.
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Settings file to use instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailadler=info,mailadler_imap=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let path = args.config.clone().unwrap_or_else(settings::default_path);

    let mut account = AccountSettings::load(&path).await?;
    apply_args(&mut account, &args)?;
    if let Ok(password) = std::env::var(PASSWORD_ENV) {
        account.password = password;
    }

    if account.email.is_empty() {
        bail!("no login name given; use --user");
    }
    if account.password.is_empty() {
        bail!("no password given; set {PASSWORD_ENV}");
    }

    if args.save {
        account.save(&path).await?;
    }

    let policy = if args.verify_certificates {
        CertificatePolicy::Verify
    } else {
        CertificatePolicy::AcceptInvalid
    };
    let config = Config::builder(account.imap_server.clone())
        .port(account.imap_port)
        .certificate_policy(policy)
        .build();

    let headers = tokio::time::timeout(
        Duration::from_secs(args.timeout),
        fetch_headers(config, &account, &args.mailbox, args.count),
    )
    .await
    .with_context(|| format!("no answer within {} seconds", args.timeout))??;

    for header in &headers {
        println!("{}", format_header(header));
    }
    Ok(())
}

/// Merges command-line flags over the saved settings.
fn apply_args(account: &mut AccountSettings, args: &Args) -> anyhow::Result<()> {
    if let Some(user) = &args.user {
        account.email.clone_from(user);
    }

    let preset = match &args.provider {
        Some(name) => Some(providers::find(name).with_context(|| {
            format!("unknown provider {name:?}; known: {}", providers::names())
        })?),
        None if args.host.is_none() && args.user.is_some() => providers::detect(&account.email),
        None => None,
    };
    if let Some(preset) = preset {
        info!(provider = preset.name, "using provider preset");
        account.imap_server = preset.imap_host.to_string();
        account.imap_port = preset.imap_port;
    }

    if let Some(host) = &args.host {
        account.imap_server.clone_from(host);
    }
    if let Some(port) = args.port {
        account.imap_port = port;
    }
    Ok(())
}

/// Runs one session and returns the fetched headers, newest first.
async fn fetch_headers(
    config: Config,
    account: &AccountSettings,
    mailbox: &str,
    count: u32,
) -> anyhow::Result<Vec<MessageSummary>> {
    let (client, mut events) = mailadler_imap::connect(config);
    let mut headers = Vec::new();

    while let Some(event) = events.recv().await {
        match event {
            Event::Status(message) => info!("{message}"),
            Event::Connected => client.login(&account.email, &account.password)?,
            Event::Authenticated => client.select_mailbox(Some(mailbox))?,
            Event::FolderSelected { .. } => client.fetch_headers(count)?,
            Event::HeadersReceived(received) => {
                headers = received;
                client.logout()?;
            }
            Event::Error(message) => bail!(message),
            Event::Disconnected => return Ok(headers),
        }
    }

    bail!("connection ended unexpectedly")
}

/// Formats one header line; `N` marks unseen messages.
fn format_header(header: &MessageSummary) -> String {
    let marker = if header.is_unread() { 'N' } else { ' ' };
    format!(
        "[{marker}] {} | {} | {}",
        header.date, header.sender, header.subject
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("mailadler").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.mailbox, "INBOX");
        assert_eq!(args.count, 50);
        assert!(!args.verify_certificates);
    }

    #[test]
    fn test_provider_preset() {
        let mut account = AccountSettings::default();
        apply_args(&mut account, &parse(&["--provider", "web.de", "-u", "jane@web.de"])).unwrap();
        assert_eq!(account.imap_server, "imap.web.de");
        assert_eq!(account.email, "jane@web.de");
    }

    #[test]
    fn test_host_overrides_preset() {
        let mut account = AccountSettings::default();
        apply_args(
            &mut account,
            &parse(&["--provider", "gmail", "--host", "imap.example.org", "--port", "1993"]),
        )
        .unwrap();
        assert_eq!(account.imap_server, "imap.example.org");
        assert_eq!(account.imap_port, 1993);
    }

    #[test]
    fn test_provider_detected_from_user() {
        let mut account = AccountSettings::default();
        apply_args(&mut account, &parse(&["--user", "max@t-online.de"])).unwrap();
        assert_eq!(account.imap_server, "secureimap.t-online.de");
    }

    #[test]
    fn test_saved_host_kept_without_flags() {
        let mut account = AccountSettings {
            imap_server: "imap.example.org".to_string(),
            ..AccountSettings::default()
        };
        apply_args(&mut account, &parse(&[])).unwrap();
        assert_eq!(account.imap_server, "imap.example.org");
    }

    #[test]
    fn test_unknown_provider() {
        let mut account = AccountSettings::default();
        let err = apply_args(&mut account, &parse(&["--provider", "nope"])).unwrap_err();
        assert!(err.to_string().contains("GMX"));
    }

    #[test]
    fn test_format_header() {
        let header = MessageSummary {
            uid: "42".to_string(),
            sender: "Jane Doe <jane@example.com>".to_string(),
            seen: false,
            subject: "Hello".to_string(),
            date: "Mon, 1 Jan 2024 10:00:00 +0000".to_string(),
        };
        assert_eq!(
            format_header(&header),
            "[N] Mon, 1 Jan 2024 10:00:00 +0000 | Jane Doe <jane@example.com> | Hello"
        );

        let seen = MessageSummary { seen: true, ..header };
        assert!(format_header(&seen).starts_with("[ ] "));
    }
}
