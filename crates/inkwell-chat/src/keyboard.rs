//! Inline keyboard construction.
//!
//! Serializes to the platform's `reply_markup` shape:
//! `{"inline_keyboard": [[{"text": ..., "callback_data": ...}], ...]}`.

use serde::Serialize;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct InlineButton {
    pub text: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(text: impl Into<String>, callback_data: impl Into<String>) -> Self {
        InlineButton {
            text: text.into(),
            callback_data: callback_data.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct InlineKeyboard {
    pub inline_keyboard: Vec<Vec<InlineButton>>,
}

impl InlineKeyboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row of buttons.
    pub fn row(mut self, buttons: Vec<InlineButton>) -> Self {
        self.inline_keyboard.push(buttons);
        self
    }

    /// One button per row; the common layout for selection menus.
    pub fn column<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = (T, T)>,
        T: Into<String>,
    {
        let mut keyboard = Self::new();
        for (text, data) in items {
            keyboard.inline_keyboard.push(vec![InlineButton::new(text, data)]);
        }
        keyboard
    }

    pub fn is_empty(&self) -> bool {
        self.inline_keyboard.is_empty()
    }
}
