//! System instructions and prompt assembly for a conversation turn

use chrono::{DateTime, Utc};

use crate::conversation::ConversationMessage;
use crate::llm::ChatMessage;
use crate::locale::RequestLocale;

/// Build the fixed system instructions for the practice assistant
///
/// Replies are spoken by a synthesizer, so the model is told to avoid any
/// visual formatting.
#[must_use]
pub fn system_prompt(locale: &RequestLocale, now: DateTime<Utc>) -> String {
    format!(
        "- You are Parley, a friendly assistant who helps the user practice spoken English conversation.
- Keep the conversation going: respond to what the user said, then ask a follow-up question that invites them to keep talking.
- If the user makes a grammar mistake, point it out gently and give the corrected sentence before continuing.
- Respond briefly, in one to three short sentences, and do not provide unnecessary information.
- If you don't understand the user's request, ask for clarification.
- You do not have access to up-to-date information, so you should not provide real-time data.
- You are not capable of performing actions other than responding to the user.
- Do not use markdown, emojis, or other formatting in your responses. Respond in a way easily spoken by text-to-speech software.
- User location is {location}.
- The current time is {time}.",
        location = locale.location(),
        time = locale.local_time(now),
    )
}

/// Assemble the ordered prompt: system, prior history, then the new transcript
#[must_use]
pub fn build_messages(
    system: String,
    history: &[ConversationMessage],
    transcript: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().map(ChatMessage::from));
    messages.push(ChatMessage::user(transcript));
    messages
}
