//! # Conversation Log
//!
//! The persisted form of a conversation: an ordered list of turns,
//! replayed through the driver at session start.

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::WLResult;

/// One completed exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    /// What the user said.
    pub user_text: String,

    /// What the model answered.
    pub bot_text: String,
}

impl ConversationTurn {
    /// Create a new turn.
    pub fn new<U, B>(
        user_text: U,
        bot_text: B,
    ) -> Self
    where
        U: Into<String>,
        B: Into<String>,
    {
        Self {
            user_text: user_text.into(),
            bot_text: bot_text.into(),
        }
    }
}

/// The column layout: parallel `UserText` / `BotText` arrays.
#[derive(Debug, Deserialize)]
struct ColumnarLog {
    #[serde(rename = "UserText", default)]
    user_text: Vec<String>,

    #[serde(rename = "BotText", default)]
    bot_text: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LogDocument {
    Turns { turns: Vec<ConversationTurn> },
    Columnar(ColumnarLog),
}

/// An ordered list of [`ConversationTurn`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationLog {
    /// The turns, oldest first.
    pub turns: Vec<ConversationTurn>,
}

impl ConversationLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed turn.
    pub fn push_turn(
        &mut self,
        turn: ConversationTurn,
    ) {
        self.turns.push(turn);
    }

    /// The turns, oldest first.
    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Is the log empty?
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Serialize as a `{"turns": [...]}` JSON document.
    pub fn to_json(&self) -> WLResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a JSON document.
    ///
    /// Accepts the `{"turns": [...]}` layout and the column layout
    /// `{"UserText": [...], "BotText": [...]}`; in the latter a missing
    /// bot answer reads as ``""``.
    ///
    /// ## Errors
    /// [`crate::WLError::Parse`] if the document matches neither layout.
    pub fn from_json(json: &str) -> WLResult<Self> {
        Ok(serde_json::from_str::<LogDocument>(json)?.into())
    }

    /// Parse a JSON document from a reader; see [`Self::from_json`].
    pub fn from_reader<R: Read>(reader: R) -> WLResult<Self> {
        Ok(serde_json::from_reader::<_, LogDocument>(reader)?.into())
    }
}

impl From<LogDocument> for ConversationLog {
    fn from(doc: LogDocument) -> Self {
        match doc {
            LogDocument::Turns { turns } => Self { turns },
            LogDocument::Columnar(ColumnarLog {
                user_text,
                mut bot_text,
            }) => {
                bot_text.resize(user_text.len(), String::new());
                let turns = user_text
                    .into_iter()
                    .zip(bot_text)
                    .map(|(u, b)| ConversationTurn::new(u, b))
                    .collect();
                Self { turns }
            }
        }
    }
}

impl FromIterator<ConversationTurn> for ConversationLog {
    fn from_iter<I: IntoIterator<Item = ConversationTurn>>(iter: I) -> Self {
        Self {
            turns: iter.into_iter().collect(),
        }
    }
}

/// Speaker prefixes used to render turns as model input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurnTemplate {
    /// Placed before the user's text.
    pub user_prefix: String,

    /// Placed after the user's text, before the answer.
    pub bot_prefix: String,
}

impl Default for TurnTemplate {
    fn default() -> Self {
        Self::new("\n\nUser: ", "\n\nBot:")
    }
}

impl TurnTemplate {
    /// Create a template from the two prefixes.
    pub fn new<U, B>(
        user_prefix: U,
        bot_prefix: B,
    ) -> Self
    where
        U: Into<String>,
        B: Into<String>,
    {
        Self {
            user_prefix: user_prefix.into(),
            bot_prefix: bot_prefix.into(),
        }
    }

    /// Speaker-named prefixes, e.g. ``"\n\nBob: "`` and ``"\n\nAlice:"``.
    pub fn for_speakers(
        user: &str,
        bot: &str,
    ) -> Self {
        Self::new(format!("\n\n{user}: "), format!("\n\n{bot}:"))
    }

    /// Render the prompt which asks for an answer to `user_text`.
    pub fn render_prompt(
        &self,
        user_text: &str,
    ) -> String {
        format!("{}{}{}", self.user_prefix, user_text, self.bot_prefix)
    }

    /// Render a completed turn for replay.
    pub fn render_turn(
        &self,
        turn: &ConversationTurn,
    ) -> String {
        let mut text = self.render_prompt(&turn.user_text);
        text.push_str(&turn.bot_text);
        text
    }
}
