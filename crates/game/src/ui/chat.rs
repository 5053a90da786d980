use bevy::prelude::*;
use serde::Serialize;

use crate::character::player::PlayerId;

/// Colors the chat layer understands, sent as bare hex without `#`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChatColor {
    Info,
    Announcement,
    Success,
    Warning,
    Error,
}

impl ChatColor {
    pub fn as_hex(self) -> &'static str {
        match self {
            ChatColor::Info => "FFFFFF",
            ChatColor::Announcement => "FF9900",
            ChatColor::Success => "00FF00",
            ChatColor::Warning => "FFFF00",
            ChatColor::Error => "FF0000",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatTarget {
    All,
    Player(PlayerId),
}

#[derive(Message, Debug, Clone, PartialEq)]
pub struct ChatLine {
    pub target: ChatTarget,
    pub text: String,
    pub color: ChatColor,
}

impl ChatLine {
    pub fn broadcast(text: impl Into<String>, color: ChatColor) -> Self {
        Self {
            target: ChatTarget::All,
            text: text.into(),
            color,
        }
    }

    pub fn to_player(player: PlayerId, text: impl Into<String>, color: ChatColor) -> Self {
        Self {
            target: ChatTarget::Player(player),
            text: text.into(),
            color,
        }
    }

    /// User-facing failure: always red, always private.
    pub fn error(player: PlayerId, error: &impl std::fmt::Display) -> Self {
        Self::to_player(player, error.to_string(), ChatColor::Error)
    }
}
