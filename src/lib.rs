//! Animated color effects for blocks of ASCII art.

pub mod animation;
pub mod colors;
pub mod config;
pub mod terminal;
pub mod text;
