//! shop-core: shop assistant core library (shared config, read-only knowledge base, keyword responder).
//!
//! The gateway and tests depend only on the re-exports below.

mod knowledge;
mod responder;
mod shared;

// Shared
pub use shared::{CoreConfig, DEFAULT_CONFIG_PATH};

// Knowledge
pub use knowledge::{
    KbCategory, KnowledgeBase, KnowledgeError, Product, Stock, REQUIRED_CONTACT, REQUIRED_POLICIES,
};

// Responder
pub use responder::{
    Intent, Matcher, Reply, Responder, Rule, GREETING, HELP_MENU, RULES, WARRANTY_OVERVIEW,
};
