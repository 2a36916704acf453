//! Session lookup for the CMS API

use axum::http::{header, HeaderMap};
use serde::Serialize;
use std::collections::HashMap;

use crate::config::AuthConfig;

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub name: String,
    pub image: String,
}

/// An authenticated session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user: SessionUser,
}

impl Session {
    /// A session only counts if it identifies a user
    pub fn is_valid(&self) -> bool {
        !self.user.id.is_empty()
    }
}

/// Resolves the current session of a request, if any
pub trait SessionProvider: Send + Sync {
    fn session(&self, headers: &HeaderMap) -> Option<Session>;
}

/// Sessions backed by the bearer tokens in `quicksilver.yml`
#[derive(Debug, Default)]
pub struct TokenSessions {
    users: HashMap<String, SessionUser>,
}

impl TokenSessions {
    pub fn new(config: &AuthConfig) -> Self {
        let users = config
            .tokens
            .iter()
            .filter(|t| !t.token.is_empty())
            .map(|t| {
                (
                    t.token.clone(),
                    SessionUser {
                        id: t.id.clone(),
                        name: t.name.clone(),
                        image: t.image.clone(),
                    },
                )
            })
            .collect::<HashMap<_, _>>();

        if users.is_empty() {
            tracing::warn!("No API tokens configured, settings updates will be rejected");
        }

        Self { users }
    }
}

impl SessionProvider for TokenSessions {
    fn session(&self, headers: &HeaderMap) -> Option<Session> {
        let token = bearer_token(headers)?;
        let user = self.users.get(token)?;
        Some(Session { user: user.clone() })
    }
}

/// Extract the token from an `Authorization: Bearer ...` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
