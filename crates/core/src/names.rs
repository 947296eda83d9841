//! Pseudo-random player names and colors, assigned once at first contact.
//! Uniqueness is not guaranteed; collisions are acceptable.

use std::fmt::Write as _;

use rand::Rng;

pub const ADJECTIVES: &[&str] = &[
    "Brave", "Clever", "Happy", "Kind", "Quick", "Witty", "Bright", "Calm", "Bold", "Sharp",
    "Gentle", "Loyal", "Strong", "Wise", "Fierce", "Noble", "Friendly", "Quiet", "Swift",
    "Charming", "Graceful", "Fearless", "Mighty", "Playful", "Cheerful", "Daring", "Elegant",
    "Generous", "Humble", "Jolly", "Lively", "Patient", "Proud", "Sincere", "Thoughtful",
    "Vibrant", "Zesty", "Adventurous", "Ambitious", "Courageous", "Diligent", "Energetic",
    "Faithful", "Merry", "Harmonious", "Inventive", "Joyful", "Radiant", "Resilient", "Spirited",
];

pub const NOUNS: &[&str] = &[
    "Tiger", "Eagle", "Fox", "Bear", "Wolf", "Lion", "Hawk", "Shark", "Panda", "Falcon", "Otter",
    "Dolphin", "Cheetah", "Leopard", "Jaguar", "Panther", "Rabbit", "Deer", "Koala", "Penguin",
    "Turtle", "Crocodile", "Alligator", "Peacock", "Swan", "Raven", "Owl", "Parrot", "Lynx",
    "Seal", "Whale", "Octopus", "Crane", "Stork", "Hedgehog", "Badger", "Moose", "Buffalo",
    "Antelope", "Gazelle", "Kangaroo", "Wallaby", "Platypus", "Armadillo", "Sloth", "Chameleon",
    "Iguana", "Gecko", "Flamingo", "Toucan",
];

/// Adjective and noun picked by the same random index, so the noun choice is
/// constrained by the adjective list length, plus a 0-99 suffix.
pub fn generate_name<R: Rng + ?Sized>(rng: &mut R) -> String {
    let index = rng.gen_range(0..ADJECTIVES.len());
    let noun = NOUNS[index % NOUNS.len()];
    format!("{}{}{}", ADJECTIVES[index], noun, rng.gen_range(0..100))
}

/// A `#`-prefixed 6-hex-digit color string.
pub fn generate_color<R: Rng + ?Sized>(rng: &mut R) -> String {
    let mut color = String::from("#");
    for _ in 0..6 {
        let _ = write!(color, "{:x}", rng.gen_range(0..16));
    }
    color
}
