//! Human-readable game names
//!
//! Names are three lower-case words: adjective, colour, noun half of the time,
//! otherwise adjective, adjective, noun ("brave golden dragon",
//! "clever swift eagle").

use rand::seq::IndexedRandom;
use rand::Rng;

const ADJECTIVES: &[&str] = &[
    "happy", "clever", "swift", "gentle", "brave", "kind", "wise", "calm", "bright", "cool",
    "mighty", "noble", "quick", "bold", "fair", "keen", "proud", "grand", "wild", "pure", "rare",
    "warm", "vast", "eager",
];

const COLORS: &[&str] = &[
    "blue", "red", "green", "golden", "silver", "purple", "orange", "amber", "jade", "ruby",
    "pearl", "ivory", "coral", "azure", "crimson", "emerald",
];

const NOUNS: &[&str] = &[
    "panda", "dolphin", "eagle", "tiger", "dragon", "phoenix", "wizard", "knight", "castle",
    "river", "mountain", "ocean", "forest", "meadow", "valley", "storm", "comet", "star", "moon",
    "sun", "cloud", "thunder", "hawk", "wolf", "bear", "lion", "falcon", "raven", "fox", "deer",
];

pub fn generate_game_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let first = pick(ADJECTIVES, rng);
    let second = if rng.random_bool(0.5) {
        pick(COLORS, rng)
    } else {
        pick(ADJECTIVES, rng)
    };
    let noun = pick(NOUNS, rng);
    format!("{first} {second} {noun}")
}

fn pick<R: Rng + ?Sized>(words: &'static [&'static str], rng: &mut R) -> &'static str {
    words.choose(rng).copied().unwrap_or("unnamed")
}
