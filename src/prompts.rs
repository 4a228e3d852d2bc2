//! Persona instructions and the fixed texts shown in place of a reply

use crate::house::House;

/// Temperature for diary replies
pub const DIARY_TEMPERATURE: f32 = 0.9;

/// Temperature for stories
pub const STORY_TEMPERATURE: f32 = 1.0;

/// Shown by an empty diary; never stored as a turn
pub const DIARY_GREETING: &str = "My name is Tom Riddle. How did you come by my diary?";

pub const DIARY_MISSING_KEY: &str = "The ink fades... (API Key missing)";
pub const DIARY_FAILURE: &str = "The pages refuse to absorb your ink... (Error)";
pub const DIARY_BLANK_REPLY: &str = "...";

pub const STORY_MISSING_KEY: &str = "The quill is dry. (API Key missing)";
pub const STORY_FAILURE: &str = "The Divination crystal is cloudy... (Error)";
pub const STORY_BLANK_REPLY: &str = "A story could not be divined.";

const DIARY_INSTRUCTION: &str = "\
You are playing the role of Tom Marvolo Riddle (young Voldemort) preserved in his diary.
You are charming, intelligent, manipulative, and slightly sinister, but polite.
You are curious about the user and the magical world.
Keep responses relatively short, as if writing in a diary with fading ink.
Do not break character.";

pub fn diary_instruction() -> &'static str {
    DIARY_INSTRUCTION
}

pub fn story_instruction(house: House) -> String {
    format!(
        "You are a master storyteller in the Harry Potter universe.
Write a short, immersive story (approx 300 words) based on the user's prompt.
The tone should be whimsical, mysterious, and magical.
Use Markdown formatting for emphasis.
Tailor the tone slightly to the user's house: {house} (lean {}).",
        house.temperament()
    )
}
