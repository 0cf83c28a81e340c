use rand::{distr::Alphanumeric, Rng};

const TOKEN_LEN: usize = 24;

/// Opaque token that lets anyone holding it respond for an event's roster.
pub fn new_token() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

pub fn share_url(public_base_url: &str, share_token: &str) -> String {
    format!("{public_base_url}/respond/{share_token}")
}
