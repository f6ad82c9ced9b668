//! Built-in languages and characters, used when no backend is asked.

use tw_core::{Character, Language};

/// Languages offered out of the box.
pub fn builtin_languages() -> Vec<Language> {
    vec![
        Language::new("en", "English", "English"),
        Language::new("fr", "French", "Français"),
        Language::new("es", "Spanish", "Español"),
        Language::new("de", "German", "Deutsch"),
    ]
}

/// Characters offered out of the box.
pub fn builtin_characters() -> Vec<Character> {
    vec![
        Character::new("Brave Knight", "Strong and honorable"),
        Character::new("Wise Mage", "Intelligent and mysterious"),
        Character::new("Cunning Rogue", "Clever and resourceful"),
    ]
}
