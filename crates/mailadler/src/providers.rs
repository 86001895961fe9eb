//! Known mail provider presets.

/// IMAP settings of a well-known mail provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Provider {
    /// Display name, also accepted by `--provider`.
    pub name: &'static str,
    /// IMAP server host.
    pub imap_host: &'static str,
    /// IMAP server port (implicit TLS).
    pub imap_port: u16,
    /// Mail domains served by this provider.
    domains: &'static [&'static str],
}

/// All presets, in display order.
pub const PROVIDERS: &[Provider] = &[
    Provider {
        name: "GMX",
        imap_host: "imap.gmx.net",
        imap_port: 993,
        domains: &["gmx.de", "gmx.net", "gmx.at", "gmx.ch"],
    },
    Provider {
        name: "Web.de",
        imap_host: "imap.web.de",
        imap_port: 993,
        domains: &["web.de"],
    },
    Provider {
        name: "Gmail",
        imap_host: "imap.gmail.com",
        imap_port: 993,
        domains: &["gmail.com", "googlemail.com"],
    },
    Provider {
        name: "Outlook",
        imap_host: "outlook.office365.com",
        imap_port: 993,
        domains: &["outlook.com", "outlook.de", "hotmail.com", "live.com"],
    },
    Provider {
        name: "Yahoo",
        imap_host: "imap.mail.yahoo.com",
        imap_port: 993,
        domains: &["yahoo.com", "yahoo.de", "ymail.com"],
    },
    Provider {
        name: "T-Online",
        imap_host: "secureimap.t-online.de",
        imap_port: 993,
        domains: &["t-online.de"],
    },
    Provider {
        name: "iCloud",
        imap_host: "imap.mail.me.com",
        imap_port: 993,
        domains: &["icloud.com", "me.com", "mac.com"],
    },
];

/// Looks up a preset by name, ignoring ASCII case.
#[must_use]
pub fn find(name: &str) -> Option<&'static Provider> {
    PROVIDERS.iter().find(|p| p.name.eq_ignore_ascii_case(name))
}

/// Guesses the provider from the domain of an email address.
#[must_use]
pub fn detect(email: &str) -> Option<&'static Provider> {
    let domain = email.rsplit_once('@')?.1.to_lowercase();
    PROVIDERS.iter().find(|p| p.domains.contains(&domain.as_str()))
}

/// Comma-separated preset names, for help and error text.
#[must_use]
pub fn names() -> String {
    PROVIDERS
        .iter()
        .map(|p| p.name)
        .collect::<Vec<_>>()
        .join(", ")
}
