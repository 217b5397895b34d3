use once_cell::sync::Lazy;
use regex::Regex;

/// One emoji, counting multi-codepoint sequences as a single match:
/// flags (regional indicator pairs), keycaps, and pictographs with optional
/// VS16 / skin tone, tag sequence, and ZWJ continuations.
///
/// Pictographs whose default presentation is text (`©`, `❤`, `☝`) only match
/// when followed by VS16 or a skin tone. A lone skin tone or regional
/// indicator is not an emoji.
static EMOJI_RE: Lazy<Regex> = Lazy::new(|| {
    let pattern = concat!(
        // flag
        r"[\x{1F1E6}-\x{1F1FF}]{2}",
        // keycap
        r"|[#*0-9]\x{FE0F}?\x{20E3}",
        // emoji-presentation pictograph, or text-default one made emoji by VS16 / skin tone
        r"|(?:[\p{Extended_Pictographic}&&\p{Emoji_Presentation}][\x{FE0F}\x{1F3FB}-\x{1F3FF}]?",
        r"|\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}])",
        // subdivision tag sequence
        r"(?:[\x{E0020}-\x{E007E}]+\x{E007F})?",
        r"(?:\x{200D}\p{Extended_Pictographic}[\x{FE0F}\x{1F3FB}-\x{1F3FF}]?)*",
    );
    Regex::new(pattern).expect("emoji pattern is valid")
});

/// Fixed inputs printed by the `emoji` command when no text is given.
pub const SAMPLES: &[&str] = &[
    "Hello 👋 world 🌍",
    "No emoji here",
    "family 👨‍👩‍👧 time",
    "thumbs 👍🏽 up",
    "flag 🇫🇷 and keycap 1️⃣",
    "rainbow 🏳️‍🌈 flag",
    "just the number 42 #1",
    "Copyright © 2024",
];

/// First emoji in `text`, or `None`.
pub fn first_emoji(text: &str) -> Option<&str> {
    EMOJI_RE.find(text).map(|m| m.as_str())
}

pub fn all_emoji(text: &str) -> Vec<&str> {
    EMOJI_RE.find_iter(text).map(|m| m.as_str()).collect()
}

pub fn print_matches(inputs: &[&str]) {
    for input in inputs {
        match first_emoji(input) {
            Some(found) => println!("[+] {:?} -> {:?} (U+{})", input, found, codepoints(found)),
            None => println!("[*] {:?} -> no match", input),
        }
    }
}

fn codepoints(s: &str) -> String {
    s.chars().map(|c| format!("{:04X}", c as u32)).collect::<Vec<_>>().join(" U+")
}
