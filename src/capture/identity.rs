pub const UNKNOWN_USER: &str = "unknown";

/// The operator's identity as the OS reports it, `DOMAIN\user` when a
/// Windows domain is set.
pub fn current_user() -> String {
    let var = |key: &str| std::env::var(key).ok();
    resolve_user(var("USERDOMAIN"), var("USERNAME").or_else(|| var("USER")))
}

pub fn resolve_user(domain: Option<String>, user: Option<String>) -> String {
    let Some(user) = user
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
    else {
        return UNKNOWN_USER.to_string();
    };

    match domain.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(domain) => format!("{domain}\\{user}"),
        None => user,
    }
}
