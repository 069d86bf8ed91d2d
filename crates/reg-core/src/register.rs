//! Register keys and value maps
//!
//! A registry holds at most one value per key. Keys form a closed
//! alphabet: the unnamed slot followed by `a`..`z`.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::{RegError, RegResult};

/// Textual form of the unnamed slot
pub const UNNAMED_REGISTER: &str = "\"";

/// One of the 27 register slots. Ordered by declaration.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub enum RegisterKey {
    Unnamed,
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
}

impl RegisterKey {
    /// Every key, in declaration order
    pub const ALL: [RegisterKey; 27] = [
        RegisterKey::Unnamed,
        RegisterKey::A,
        RegisterKey::B,
        RegisterKey::C,
        RegisterKey::D,
        RegisterKey::E,
        RegisterKey::F,
        RegisterKey::G,
        RegisterKey::H,
        RegisterKey::I,
        RegisterKey::J,
        RegisterKey::K,
        RegisterKey::L,
        RegisterKey::M,
        RegisterKey::N,
        RegisterKey::O,
        RegisterKey::P,
        RegisterKey::Q,
        RegisterKey::R,
        RegisterKey::S,
        RegisterKey::T,
        RegisterKey::U,
        RegisterKey::V,
        RegisterKey::W,
        RegisterKey::X,
        RegisterKey::Y,
        RegisterKey::Z,
    ];

    /// Letter for named slots, `None` for the unnamed slot
    pub fn letter(self) -> Option<char> {
        match self {
            RegisterKey::Unnamed => None,
            // Index 1..=26 maps onto 'a'..='z'
            named => Some((b'a' + (named as u8 - 1)) as char),
        }
    }

    pub fn from_letter(c: char) -> Option<Self> {
        if c.is_ascii_lowercase() {
            Some(Self::ALL[(c as u8 - b'a') as usize + 1])
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        const NAMES: [&str; 27] = [
            UNNAMED_REGISTER,
            "a",
            "b",
            "c",
            "d",
            "e",
            "f",
            "g",
            "h",
            "i",
            "j",
            "k",
            "l",
            "m",
            "n",
            "o",
            "p",
            "q",
            "r",
            "s",
            "t",
            "u",
            "v",
            "w",
            "x",
            "y",
            "z",
        ];
        NAMES[self as usize]
    }
}

impl fmt::Display for RegisterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RegisterKey {
    type Err = RegError;

    fn from_str(s: &str) -> RegResult<Self> {
        if s == UNNAMED_REGISTER {
            return Ok(RegisterKey::Unnamed);
        }
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => RegisterKey::from_letter(c),
            _ => None,
        }
        .ok_or_else(|| RegError::InvalidRegisterName { name: s.to_string() })
    }
}

impl Serialize for RegisterKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RegisterKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Value of one register; `None` means no value is set.
pub type RegisterValue = Option<String>;

/// Partial update: `None` clears the key, absent keys are untouched.
pub type PartialValues = BTreeMap<RegisterKey, RegisterValue>;

/// Full contents of a registry. Replaces everything on apply.
pub type FullValues = BTreeMap<RegisterKey, String>;
