//! Cosmetic catalog: avatars, color themes and sound packs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::problem::ParseEnumError;

pub const DEFAULT_AVATAR: &str = "🦊";
pub const DEFAULT_THEME: &str = "default";
pub const DEFAULT_SOUND_PACK: &str = "classic";

/// Avatars a child can pick when creating a profile.
pub const STARTER_AVATARS: [&str; 12] = [
    "🦊", "🐱", "🐶", "🦁", "🐼", "🐨", "🐰", "🦄", "🚀", "⭐", "🌈", "🎮",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShopCategory {
    Avatars,
    Themes,
    SoundPacks,
}

impl ShopCategory {
    pub const ALL: [ShopCategory; 3] = [
        ShopCategory::Avatars,
        ShopCategory::Themes,
        ShopCategory::SoundPacks,
    ];

    /// Item every profile owns from the start.
    #[must_use]
    pub fn default_item(self) -> &'static str {
        match self {
            ShopCategory::Avatars => DEFAULT_AVATAR,
            ShopCategory::Themes => DEFAULT_THEME,
            ShopCategory::SoundPacks => DEFAULT_SOUND_PACK,
        }
    }

    /// Listing view of the catalog for this category.
    #[must_use]
    pub fn items(self) -> Vec<ShopItem> {
        match self {
            ShopCategory::Avatars => AVATAR_ITEMS.to_vec(),
            ShopCategory::Themes => THEMES.iter().map(Theme::as_item).collect(),
            ShopCategory::SoundPacks => SOUND_PACKS.iter().map(SoundPack::as_item).collect(),
        }
    }

    #[must_use]
    pub fn find(self, id: &str) -> Option<ShopItem> {
        self.items().into_iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ShopCategory::Avatars => "avatars",
            ShopCategory::Themes => "themes",
            ShopCategory::SoundPacks => "sound_packs",
        }
    }
}

impl fmt::Display for ShopCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShopCategory {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avatars" | "avatar" => Ok(Self::Avatars),
            "themes" | "theme" => Ok(Self::Themes),
            "sound_packs" | "soundpacks" | "sounds" => Ok(Self::SoundPacks),
            _ => Err(ParseEnumError::new("shop category", s)),
        }
    }
}

/// A purchasable entry in one of the shop categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopItem {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u32,
    pub tier: u8,
}

const fn avatar(id: &'static str, name: &'static str, price: u32, tier: u8) -> ShopItem {
    ShopItem {
        id,
        name,
        price,
        tier,
    }
}

pub const AVATAR_ITEMS: [ShopItem; 23] = [
    avatar("🦊", "Fox", 0, 0),
    avatar("🐱", "Cat", 50, 1),
    avatar("🐶", "Dog", 50, 1),
    avatar("🐰", "Bunny", 50, 1),
    avatar("🐼", "Panda", 50, 1),
    avatar("🦁", "Lion", 100, 2),
    avatar("🐨", "Koala", 100, 2),
    avatar("🦄", "Unicorn", 100, 2),
    avatar("🐸", "Frog", 100, 2),
    avatar("🐢", "Turtle", 100, 2),
    avatar("🦉", "Owl", 100, 2),
    avatar("🚀", "Rocket", 200, 3),
    avatar("⭐", "Star", 200, 3),
    avatar("🌈", "Rainbow", 200, 3),
    avatar("🎮", "Gamer", 200, 3),
    avatar("🎨", "Artist", 200, 3),
    avatar("🎪", "Circus", 200, 3),
    avatar("🐲", "Dragon", 500, 4),
    avatar("🦖", "Dino", 500, 4),
    avatar("🤖", "Robot", 500, 4),
    avatar("👑", "Crown", 500, 4),
    avatar("💎", "Diamond", 500, 4),
    avatar("🏆", "Trophy", 500, 4),
];

/// Color scheme for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u32,
    pub tier: u8,
    pub primary: &'static str,
    pub gradient: &'static str,
    pub bg_gradient: &'static str,
    pub card_border: &'static str,
}

impl Theme {
    #[must_use]
    pub fn as_item(&self) -> ShopItem {
        ShopItem {
            id: self.id,
            name: self.name,
            price: self.price,
            tier: self.tier,
        }
    }
}

pub const THEMES: [Theme; 6] = [
    Theme {
        id: "default",
        name: "Purple Dream",
        price: 0,
        tier: 0,
        primary: "purple",
        gradient: "from-purple-500 to-purple-600",
        bg_gradient: "from-purple-50 to-pink-50",
        card_border: "border-purple-200",
    },
    Theme {
        id: "ocean",
        name: "Ocean Breeze",
        price: 150,
        tier: 1,
        primary: "cyan",
        gradient: "from-cyan-500 to-blue-600",
        bg_gradient: "from-cyan-50 to-blue-50",
        card_border: "border-cyan-200",
    },
    Theme {
        id: "sunset",
        name: "Sunset Sky",
        price: 150,
        tier: 1,
        primary: "orange",
        gradient: "from-orange-500 to-pink-600",
        bg_gradient: "from-orange-50 to-pink-50",
        card_border: "border-orange-200",
    },
    Theme {
        id: "forest",
        name: "Forest Friend",
        price: 150,
        tier: 1,
        primary: "emerald",
        gradient: "from-emerald-500 to-green-600",
        bg_gradient: "from-emerald-50 to-green-50",
        card_border: "border-emerald-200",
    },
    Theme {
        id: "rainbow",
        name: "Rainbow Magic",
        price: 300,
        tier: 2,
        primary: "pink",
        gradient: "from-pink-500 via-purple-500 to-blue-500",
        bg_gradient: "from-pink-50 via-purple-50 to-blue-50",
        card_border: "border-pink-200",
    },
    Theme {
        id: "space",
        name: "Space Explorer",
        price: 300,
        tier: 2,
        primary: "indigo",
        gradient: "from-indigo-600 to-purple-700",
        bg_gradient: "from-indigo-50 to-purple-50",
        card_border: "border-indigo-200",
    },
];

/// Theme by id, falling back to the default theme.
#[must_use]
pub fn theme(id: &str) -> &'static Theme {
    THEMES
        .iter()
        .find(|t| t.id == id)
        .unwrap_or(&THEMES[0])
}

/// Set of feedback sounds the presentation layer plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoundPack {
    pub id: &'static str,
    pub name: &'static str,
    pub price: u32,
    pub tier: u8,
    pub description: &'static str,
}

impl SoundPack {
    #[must_use]
    pub fn as_item(&self) -> ShopItem {
        ShopItem {
            id: self.id,
            name: self.name,
            price: self.price,
            tier: self.tier,
        }
    }
}

pub const SOUND_PACKS: [SoundPack; 5] = [
    SoundPack {
        id: "classic",
        name: "Classic",
        price: 0,
        tier: 0,
        description: "Default sounds",
    },
    SoundPack {
        id: "chime",
        name: "Chime",
        price: 100,
        tier: 1,
        description: "Bell-like tones",
    },
    SoundPack {
        id: "arcade",
        name: "Arcade",
        price: 100,
        tier: 1,
        description: "Retro game sounds",
    },
    SoundPack {
        id: "nature",
        name: "Nature",
        price: 100,
        tier: 1,
        description: "Bird chirps and gentle tones",
    },
    SoundPack {
        id: "orchestra",
        name: "Orchestra",
        price: 250,
        tier: 2,
        description: "Grand orchestral notes",
    },
];

/// Sound pack by id, falling back to the classic pack.
#[must_use]
pub fn sound_pack(id: &str) -> &'static SoundPack {
    SOUND_PACKS
        .iter()
        .find(|p| p.id == id)
        .unwrap_or(&SOUND_PACKS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_free_catalog_entries() {
        for category in ShopCategory::ALL {
            let item = category.find(category.default_item()).unwrap();
            assert_eq!(item.price, 0);
        }
    }

    #[test]
    fn starter_avatars_are_in_catalog() {
        for id in STARTER_AVATARS {
            assert!(ShopCategory::Avatars.find(id).is_some(), "{id} missing");
        }
    }

    #[test]
    fn lookups_fall_back() {
        assert_eq!(theme("ocean").name, "Ocean Breeze");
        assert_eq!(theme("neon").id, DEFAULT_THEME);
        assert_eq!(sound_pack("orchestra").price, 250);
        assert_eq!(sound_pack("dubstep").id, DEFAULT_SOUND_PACK);
    }
}
