//! Shared UI icons, with plain-text fallbacks for terminals without emoji.

use console::Emoji;

// Status indicators
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "[OK]");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!]");

// Board
pub static BASKET: Emoji<'_, '_> = Emoji("🧺 ", "");
pub static BLANKET: Emoji<'_, '_> = Emoji("🛏️  ", "+B");
pub static PAID: Emoji<'_, '_> = Emoji("💰 ", "$");
pub static LIVE: Emoji<'_, '_> = Emoji("📡 ", "[LIVE]");
pub static MOVED: Emoji<'_, '_> = Emoji("🔄 ", "->");

// Loyalty
pub static STAR: Emoji<'_, '_> = Emoji("⭐ ", "*");
pub static GIFT: Emoji<'_, '_> = Emoji("🎁 ", "-");
