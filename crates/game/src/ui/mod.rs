//! Outbound presentation traffic: per-player JSON payloads and chat lines.
//!
//! The host forwards `UiPush` messages verbatim over its UI channel and
//! `ChatLine` messages to its chat system. Nothing here renders.

pub mod chat;
pub mod message;
pub mod scoreboard;
pub mod status;

pub use chat::{ChatColor, ChatLine, ChatTarget};
pub use message::{DamageNumberPayload, UiMessage, UiPush};
pub use scoreboard::{ScoreboardEntry, ScoreboardTimer};
