//! Feed record types
//!
//! Records shown in the client's live regions:
//! - `Wallet`: an account and its balance
//! - `Stage`: a discussion stage (also used for the moderation queue)
//! - `Engagement`: a stage the user takes part in, with a post counter
//! - `Post`: a message posted on the open stage

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use crate::view::Record;

/// A wallet and its balance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Wallet {
    /// Wallet address
    pub token: String,
    /// Balance; the wire may carry `20934` or `"20,934"`
    #[serde(deserialize_with = "deserialize_balance")]
    pub balance: u64,
    /// Hash of the wallet key, when the server sends one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Wallet {
    pub fn new(token: impl Into<String>, balance: u64) -> Self {
        Self {
            token: token.into(),
            balance,
            hash: None,
        }
    }
}

/// A stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stage {
    pub token: String,
    pub caption: String,
    #[serde(default)]
    pub author: String,
    /// Posts on this stage go through moderation
    #[serde(default)]
    pub moderation: bool,
    /// Posts seen since the stage was listed
    #[serde(default)]
    pub count: u64,
}

impl Stage {
    pub fn new(token: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            caption: caption.into(),
            author: String::new(),
            moderation: false,
            count: 0,
        }
    }

    /// Builder method: set author
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Builder method: mark as moderated
    pub fn moderated(mut self) -> Self {
        self.moderation = true;
        self
    }
}

/// A stage the user is engaged in, keyed by the stage token
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Engagement {
    pub token: String,
    pub name: String,
    #[serde(default)]
    pub count: u64,
}

impl Engagement {
    pub fn new(token: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            name: name.into(),
            count: 0,
        }
    }
}

/// A post on a stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    pub token: String,
    pub author: String,
    /// Display timestamp as sent by the server (e.g. "17:34:12")
    #[serde(default)]
    pub timestamp: String,
    pub content: String,
    /// Extra class for the post element (e.g. "pending", "approved")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Awaiting approval by the stage moderator
    #[serde(default)]
    pub moderation: bool,
}

impl Post {
    pub fn new(
        token: impl Into<String>,
        author: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            author: author.into(),
            timestamp: String::new(),
            content: content.into(),
            status: None,
            moderation: false,
        }
    }

    /// Builder method: set timestamp
    pub fn timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }
}

impl Record for Wallet {
    fn token(&self) -> &str {
        &self.token
    }
}

impl Record for Stage {
    fn token(&self) -> &str {
        &self.token
    }
}

impl Record for Engagement {
    fn token(&self) -> &str {
        &self.token
    }
}

impl Record for Post {
    fn token(&self) -> &str {
        &self.token
    }
}

/// Parse a balance with optional digit-group separators ("20,934")
pub fn parse_balance(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '_' | ' '))
        .collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn deserialize_balance<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawBalance {
        Number(u64),
        Text(String),
    }

    match RawBalance::deserialize(deserializer)? {
        RawBalance::Number(n) => Ok(n),
        RawBalance::Text(s) => {
            parse_balance(&s).ok_or_else(|| de::Error::custom(format!("invalid balance: {:?}", s)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_balance() {
        assert_eq!(parse_balance("20,934"), Some(20934));
        assert_eq!(parse_balance(" 1_000 "), Some(1000));
        assert_eq!(parse_balance("7"), Some(7));
        assert_eq!(parse_balance(""), None);
        assert_eq!(parse_balance("-5"), None);
        assert_eq!(parse_balance("12.5"), None);
    }

    #[test]
    fn test_wallet_balance_forms() {
        let w: Wallet = serde_json::from_str(r#"{"token": "0xab", "balance": "20,934"}"#).unwrap();
        assert_eq!(w.balance, 20934);
        assert_eq!(w.hash, None);

        let w: Wallet =
            serde_json::from_str(r#"{"token": "0xab", "balance": 12, "hash": "ff"}"#).unwrap();
        assert_eq!(w.balance, 12);
        assert_eq!(w.hash.as_deref(), Some("ff"));

        let err = serde_json::from_str::<Wallet>(r#"{"token": "0xab", "balance": "lots"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_stage_defaults() {
        let s: Stage = serde_json::from_str(r#"{"token": "s1", "caption": "Aereum"}"#).unwrap();
        assert_eq!(s, Stage::new("s1", "Aereum"));
        assert!(!s.moderation);
    }
}
