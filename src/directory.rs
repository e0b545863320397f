//! Computer names from the LDAP directory, used to pre-populate the system
//! picker of the capture form.
//!
//! A failed lookup is not fatal: the caller gets [`DirectoryLookup::Unavailable`]
//! and the form falls back to manual entry.

use std::collections::HashMap;
use std::time::Duration;

use ldap3::{LdapConnAsync, LdapConnSettings, LdapError, Scope, SearchEntry};

use crate::config::DirectoryConfig;

const COMPUTER_FILTER: &str = "(objectClass=computer)";
const NAME_ATTR: &str = "name";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug)]
pub enum DirectoryError {
    Connect(LdapError),
    Bind(LdapError),
    Search(LdapError),
}

impl std::fmt::Display for DirectoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DirectoryError::Connect(err) => write!(f, "could not connect to directory: {err}"),
            DirectoryError::Bind(err) => write!(f, "directory bind failed: {err}"),
            DirectoryError::Search(err) => write!(f, "directory search failed: {err}"),
        }
    }
}

impl std::error::Error for DirectoryError {}

#[derive(Debug)]
pub enum DirectoryLookup {
    Found(Vec<String>),
    Unavailable(DirectoryError),
}

impl DirectoryLookup {
    /// Names to offer; empty when the lookup failed.
    pub fn systems(&self) -> &[String] {
        match self {
            DirectoryLookup::Found(names) => names,
            DirectoryLookup::Unavailable(_) => &[],
        }
    }

    pub fn into_systems(self) -> Vec<String> {
        match self {
            DirectoryLookup::Found(names) => names,
            DirectoryLookup::Unavailable(_) => Vec::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, DirectoryLookup::Found(_))
    }
}

/// Accept both `dc01.corp.local` and full `ldap://` / `ldaps://` URLs.
pub fn server_url(server: &str) -> String {
    let server = server.trim();
    if server.contains("://") {
        server.to_string()
    } else {
        format!("ldap://{server}")
    }
}

/// Sorted, de-duplicated `name` values from raw entry attributes.
pub fn computer_names<I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = HashMap<String, Vec<String>>>,
{
    let mut names: Vec<String> = entries
        .into_iter()
        .filter_map(|attrs| {
            attrs
                .into_iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(NAME_ATTR))
                .and_then(|(_, values)| values.into_iter().next())
        })
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    names.dedup();
    names
}

pub async fn lookup_systems(config: &DirectoryConfig) -> DirectoryLookup {
    match fetch_computer_names(config).await {
        Ok(names) => {
            tracing::info!(count = names.len(), "Loaded systems from directory");
            DirectoryLookup::Found(names)
        }
        Err(e) => {
            tracing::warn!("Directory lookup failed: {e}");
            DirectoryLookup::Unavailable(e)
        }
    }
}

async fn fetch_computer_names(config: &DirectoryConfig) -> Result<Vec<String>, DirectoryError> {
    let url = server_url(&config.server);
    let settings = LdapConnSettings::new().set_conn_timeout(CONNECT_TIMEOUT);

    let (conn, mut ldap) = LdapConnAsync::with_settings(settings, &url)
        .await
        .map_err(DirectoryError::Connect)?;
    ldap3::drive!(conn);

    ldap.simple_bind(&config.bind_dn, &config.password)
        .await
        .and_then(|result| result.success())
        .map_err(DirectoryError::Bind)?;

    let (entries, _) = ldap
        .search(&config.search_base, Scope::Subtree, COMPUTER_FILTER, vec![NAME_ATTR])
        .await
        .and_then(|result| result.success())
        .map_err(DirectoryError::Search)?;

    let names = computer_names(
        entries
            .into_iter()
            .map(|entry| SearchEntry::construct(entry).attrs),
    );

    if let Err(e) = ldap.unbind().await {
        tracing::debug!("Directory unbind failed: {e}");
    }

    Ok(names)
}
