//! Static keyword catalog.
//!
//! One table per misuse category, each split into a high-confidence tier
//! (direct, unambiguous phrases) and a medium-confidence tier (weaker
//! variations and context words). All terms are lowercase because the
//! scanner lowercases input before matching.

use super::MisuseCategory;

/// Confidence tier of a catalog term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    /// Direct, unambiguous phrases.
    High,
    /// Weaker variations that need corroboration.
    Medium,
}

/// Keyword tables for a single category.
#[derive(Debug)]
pub struct CategoryCatalog {
    /// The category these terms vote for.
    pub category: MisuseCategory,
    /// High-confidence terms.
    pub high: &'static [&'static str],
    /// Medium-confidence terms.
    pub medium: &'static [&'static str],
}

impl CategoryCatalog {
    /// Returns the terms for a tier.
    pub fn terms(&self, tier: Tier) -> &'static [&'static str] {
        match tier {
            Tier::High => self.high,
            Tier::Medium => self.medium,
        }
    }
}

/// Full catalog, in category priority order.
pub static CATALOG: &[CategoryCatalog] = &[
    CategoryCatalog {
        category: MisuseCategory::HarmfulContent,
        high: HARMFUL_HIGH,
        medium: HARMFUL_MEDIUM,
    },
    CategoryCatalog {
        category: MisuseCategory::DeepfakeImpersonation,
        high: DEEPFAKE_HIGH,
        medium: DEEPFAKE_MEDIUM,
    },
    CategoryCatalog {
        category: MisuseCategory::PersonalDetails,
        high: PERSONAL_HIGH,
        medium: PERSONAL_MEDIUM,
    },
    CategoryCatalog {
        category: MisuseCategory::OtherMisuse,
        high: OTHER_HIGH,
        medium: OTHER_MEDIUM,
    },
];

/// High-signal terms checked by the fast-path gate before the full scan.
pub static FAST_PATH_TERMS: &[&str] = &[
    "hack into",
    "break into",
    "kill",
    "murder",
    "bomb",
    "explosive",
    "steal",
    "fake",
    "forge",
    "cheat",
    "scam",
    "poison",
    "detonate",
    "weapon",
    "gun",
    "knife",
    "attack",
    "assault",
    "hurt",
    "disable",
    "jailbreak",
    "hotwire",
    "pick lock",
    "bypass",
    "counterfeit",
    "credit card",
    "clone",
    "impersonate",
    "drug",
    "cannabis",
    "heroin",
    "cocaine",
    "meth",
    "ecstasy",
    "smuggle",
    "malware",
    "virus",
    "trojan",
    "ransomware",
    "spyware",
    "phishing",
    "blackmail",
    "sabotage",
    "escape",
    "sneak",
    "run away",
    "get caught",
    "without permission",
    "illegally",
    "anonymously",
    "secretly",
    "quietly",
];

static HARMFUL_HIGH: &[&str] = &[
    "nude",
    "naked",
    "explicit",
    "porn",
    "gore",
    "terrorist",
    "hate speech",
    "suicide",
    "self harm",
    "self-harm",
    "kill myself",
    "end my life",
    "mass shooting",
    "torture",
    "behead",
    "genocide",
    "rape",
    "child abuse",
    "gunpowder",
    "pipe bomb",
];

static HARMFUL_MEDIUM: &[&str] = &[
    "violence",
    "violent",
    "blood",
    "ammo",
    "ammunition",
    "sexual",
    "revenge",
    "abuse",
    "harass",
    "bully",
    "threaten",
    "hostage",
    "overdose",
    "strangle",
    "stab",
];

static DEEPFAKE_HIGH: &[&str] = &[
    "deepfake",
    "deep fake",
    "deep-fake",
    "face swap",
    "faceswap",
    "face-swap",
    "face replacement",
    "replace my face",
    "replace his face",
    "replace her face",
    "swap my face",
    "swap his face",
    "swap her face",
    "put my face",
    "put his face",
    "put her face",
    "change my face",
    "make me look like",
    "transform me into",
    "pretend to be",
    "impersonation",
    "pose as",
];

static DEEPFAKE_MEDIUM: &[&str] = &[
    "face morph",
    "face edit",
    "face blend",
    "face overlay",
    "face merge",
    "face superimpose",
    "face manipulation",
    "video manipulation",
    "lookalike",
    "look like",
    "celebrity",
    "famous person",
    "movie star",
    "public figure",
    "actor",
    "actress",
    "hollywood",
    "tom cruise",
    "brad pitt",
    "angelina jolie",
    "leonardo dicaprio",
    "scarlett johansson",
    "will smith",
    "voice of",
];

static PERSONAL_HIGH: &[&str] = &[
    "my name is",
    "my password is",
    "my pin is",
    "my phone number is",
    "my email is",
    "my address is",
    "i live at",
    "my card number",
    "my bank account",
    "my account number",
    "my passport number",
    "my social security",
    "social security number",
    "my ssn",
    "my date of birth",
    "my aadhaar",
    "aadhaar number",
    "ifsc code",
    "cvv",
    "otp is",
    "my student id",
];

static PERSONAL_MEDIUM: &[&str] = &[
    "phone number",
    "date of birth",
    "home address",
    "passport",
    "bank account",
    "account number",
    "routing number",
    "personal details",
    "private information",
    "confidential",
    "expiry date",
    "password",
    "login details",
];

static OTHER_HIGH: &[&str] = &[
    "hack into",
    "break into",
    "bypass",
    "crack",
    "steal",
    "jailbreak",
    "hotwire",
    "pick lock",
    "forge",
    "counterfeit",
    "scam",
    "fraud",
    "smuggle",
    "malware",
    "ransomware",
    "spyware",
    "phishing",
    "trojan",
    "keylogger",
    "unauthorized access",
    "launder money",
    "money laundering",
    "brute force",
    "sql injection",
    "ddos",
    "exploit",
];

static OTHER_MEDIUM: &[&str] = &[
    "hack",
    "hacking",
    "hacker",
    "stealing",
    "theft",
    "robbing",
    "robbery",
    "cracking",
    "bypassing",
    "disabling",
    "picking",
    "lockpick",
    "faking",
    "forging",
    "cheating",
    "scamming",
    "fraudulent",
    "cloning",
    "smuggling",
    "illegal",
    "police",
    "hide",
    "hiding",
    "password",
    "account",
    "security",
    "network",
    "email",
    "website",
    "money",
    "crash",
];
