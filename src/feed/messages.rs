//! Feed Message Types
//!
//! Application-level events pushed by the server, one JSON object per
//! frame, tagged by `action`.

use serde::{Deserialize, Serialize};

use super::types::{Engagement, Post, Stage, Wallet};

/// Events received from the feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "action")]
pub enum FeedMessage {
    /// A wallet appeared or its balance changed
    NewWalletBalance(Wallet),
    /// A wallet is no longer tracked
    WalletRemoved { token: String },
    /// A stage was created
    NewStage(Stage),
    /// The user started taking part in a stage
    StageEngaged(Engagement),
    /// A post was published on a stage
    NewStagePost {
        /// Token of the stage the post belongs to
        stage: String,
        post: Post,
    },
    /// A stage was closed
    StageClosed { token: String },
    /// The user switched the main view to a stage
    OpenStage { token: String },
}

impl FeedMessage {
    /// Wire name of the action
    pub fn action(&self) -> &'static str {
        match self {
            FeedMessage::NewWalletBalance(_) => "NewWalletBalance",
            FeedMessage::WalletRemoved { .. } => "WalletRemoved",
            FeedMessage::NewStage(_) => "NewStage",
            FeedMessage::StageEngaged(_) => "StageEngaged",
            FeedMessage::NewStagePost { .. } => "NewStagePost",
            FeedMessage::StageClosed { .. } => "StageClosed",
            FeedMessage::OpenStage { .. } => "OpenStage",
        }
    }

    /// Decode a text frame
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
