//! JSON envelopes printed by the CLI

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Account, ArticleId, AuthPayload, ProfilePayload};

#[derive(Debug, Serialize)]
pub struct UserEnvelope {
    pub user: AuthPayload,
}

#[derive(Debug, Serialize)]
pub struct ProfileEnvelope {
    pub profile: ProfilePayload,
}

/// Field-keyed error messages, e.g. `{"errors": {"email": ["is already taken"]}}`
#[derive(Debug, Serialize)]
pub struct ErrorsEnvelope {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ErrorsEnvelope {
    pub fn invalid_login() -> Self {
        let mut errors = BTreeMap::new();
        errors.insert("email or password".to_string(), vec!["is invalid".to_string()]);
        Self { errors }
    }
}

/// Favorite state of one article for one account
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesEnvelope {
    pub article: ArticleId,
    pub favorited: bool,
    pub favorites_count: usize,
}

impl FavoritesEnvelope {
    pub fn new(account: &Account, article: &ArticleId) -> Self {
        Self {
            article: *article,
            favorited: account.is_favorite(article),
            favorites_count: account.favorites().len(),
        }
    }
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
