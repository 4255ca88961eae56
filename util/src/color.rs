// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

use std::fmt::{Debug, Display};

pub const BLUE: &str = "\x1b[34;1m";
pub const BRIGHT: &str = "\x1b[0;1m";
pub const CLEAR: &str = "\x1b[0;0m";
pub const DIM: &str = "\x1b[2m";
pub const GREY: &str = "\x1b[0;0m\x1b[90m";
pub const LAVENDER: &str = "\x1b[38;5;183;1m";
pub const MINT: &str = "\x1b[38;5;48;1m";
pub const PINK: &str = "\x1b[38;5;161;1m";
pub const RED: &str = "\x1b[31;1m";
pub const WHITE: &str = "\x1b[0;1m";
pub const YELLOW: &str = "\x1b[33;1m";

pub trait Color {
    fn color(&self, color: &str) -> String;

    fn blue(&self) -> String;
    fn dim(&self) -> String;
    fn grey(&self) -> String;
    fn lavender(&self) -> String;
    fn mint(&self) -> String;
    fn pink(&self) -> String;
    fn red(&self) -> String;
    fn white(&self) -> String;
    fn yellow(&self) -> String;
}

impl<T> Color for T
where
    T: Display,
{
    fn color(&self, color: &str) -> String {
        format!("{color}{self}{CLEAR}")
    }

    fn blue(&self) -> String {
        self.color(BLUE)
    }

    fn dim(&self) -> String {
        self.color(DIM)
    }

    fn grey(&self) -> String {
        self.color(GREY)
    }

    fn lavender(&self) -> String {
        self.color(LAVENDER)
    }

    fn mint(&self) -> String {
        self.color(MINT)
    }

    fn pink(&self) -> String {
        self.color(PINK)
    }

    fn red(&self) -> String {
        self.color(RED)
    }

    fn white(&self) -> String {
        self.color(WHITE)
    }

    fn yellow(&self) -> String {
        self.color(YELLOW)
    }
}

/// Colors for types that only implement [`Debug`], like alloy's addresses and hashes.
pub trait DebugColor {
    fn debug_color(&self, color: &str) -> String;

    fn debug_lavender(&self) -> String;
    fn debug_mint(&self) -> String;
    fn debug_red(&self) -> String;
}

impl<T> DebugColor for T
where
    T: Debug,
{
    fn debug_color(&self, color: &str) -> String {
        format!("{color}{self:?}{CLEAR}")
    }

    fn debug_lavender(&self) -> String {
        self.debug_color(LAVENDER)
    }

    fn debug_mint(&self) -> String {
        self.debug_color(MINT)
    }

    fn debug_red(&self) -> String {
        self.debug_color(RED)
    }
}
