//! Ordered keyword rules. The first rule whose matcher fires decides the reply.

use serde::Serialize;
use std::fmt;

/// What a message was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    Product,
    PriceList,
    Stock,
    Shipping,
    Returns,
    Contact,
    Warranty,
    /// No rule matched; the help menu is returned.
    Help,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Product => "product",
            Self::PriceList => "price_list",
            Self::Stock => "stock",
            Self::Shipping => "shipping",
            Self::Returns => "returns",
            Self::Contact => "contact",
            Self::Warranty => "warranty",
            Self::Help => "help",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a rule decides whether it applies to a normalized message.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// Any of the keywords occurs as a substring.
    Keywords(&'static [&'static str]),
    /// Any product name from the knowledge base occurs as a substring.
    ProductName,
}

impl Matcher {
    /// Keyword test only; [`Matcher::ProductName`] needs the knowledge base and is resolved by
    /// the responder.
    pub fn matches_keywords(&self, message: &str) -> bool {
        match self {
            Self::Keywords(words) => words.iter().any(|w| message.contains(w)),
            Self::ProductName => false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub intent: Intent,
    pub matcher: Matcher,
}

/// Rule table in precedence order. Order matters: "phone" is a product name and a contact
/// keyword, and the product rule comes first.
pub const RULES: [Rule; 8] = [
    Rule {
        intent: Intent::Greeting,
        matcher: Matcher::Keywords(&["hi", "hello", "hey", "good morning", "good afternoon"]),
    },
    Rule {
        intent: Intent::Product,
        matcher: Matcher::ProductName,
    },
    Rule {
        intent: Intent::PriceList,
        matcher: Matcher::Keywords(&["price", "cost", "how much"]),
    },
    Rule {
        intent: Intent::Stock,
        matcher: Matcher::Keywords(&["stock", "available", "in stock"]),
    },
    Rule {
        intent: Intent::Shipping,
        matcher: Matcher::Keywords(&["shipping", "delivery"]),
    },
    Rule {
        intent: Intent::Returns,
        matcher: Matcher::Keywords(&["return", "refund"]),
    },
    Rule {
        intent: Intent::Contact,
        matcher: Matcher::Keywords(&["contact", "phone", "email"]),
    },
    Rule {
        intent: Intent::Warranty,
        matcher: Matcher::Keywords(&["warranty", "guarantee"]),
    },
];

pub const GREETING: &str = "Hello! I'm your shop assistant. How can I help you today? You can ask about products, prices, shipping, returns, or contact information.";

pub const WARRANTY_OVERVIEW: &str = "All our products come with warranty:\n- Laptops & Phones: Extended warranty\n- Tablets & Headphones: Standard warranty\nWarranty covers manufacturing defects.";

pub const HELP_MENU: &str = "I'm here to help! You can ask me about:\n- Product information and prices\n- Stock availability\n- Shipping and delivery\n- Return policy\n- Contact information\n- Warranties\nWhat would you like to know?";

pub const SHIPPING_SUFFIX: &str = "Standard delivery takes 3-5 business days.";

pub const RETURNS_SUFFIX: &str = "Items must be in original condition with receipt.";
