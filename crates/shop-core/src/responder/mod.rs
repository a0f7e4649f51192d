//! Rule-based responder: maps one customer message to one canned or templated reply.
//!
//! The responder is stateless. Every call lowercases and trims the message, walks [`RULES`] in
//! order, and renders the first matching rule against the injected [`KnowledgeBase`]. Messages
//! that match nothing (including the empty string) get the help menu.

mod rules;

pub use rules::{Intent, Matcher, Rule, GREETING, HELP_MENU, RULES, WARRANTY_OVERVIEW};

use crate::knowledge::{KnowledgeBase, Product};
use rules::{RETURNS_SUFFIX, SHIPPING_SUFFIX};
use serde::Serialize;
use std::sync::Arc;

/// Classified reply for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Reply {
    pub intent: Intent,
    /// Product named in the message, for [`Intent::Product`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    pub text: String,
}

/// Keyword responder over a shared, read-only knowledge base.
#[derive(Debug, Clone)]
pub struct Responder {
    knowledge: Arc<KnowledgeBase>,
}

impl Responder {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Responder over the built-in shop facts.
    pub fn builtin() -> Self {
        Self::new(Arc::new(KnowledgeBase::builtin()))
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Rule table in evaluation order.
    pub fn rules(&self) -> &'static [Rule] {
        &RULES
    }

    /// Reply text for `input`. Never fails; deterministic for a given knowledge base.
    pub fn respond(&self, input: &str) -> String {
        self.reply(input).text
    }

    /// Intent of the first matching rule.
    pub fn classify(&self, input: &str) -> Intent {
        let message = normalize(input);
        self.first_match(&message).0
    }

    /// Classifies `input` and renders the reply.
    pub fn reply(&self, input: &str) -> Reply {
        let message = normalize(input);
        let (intent, product) = self.first_match(&message);
        tracing::debug!(
            target: "shop::responder",
            intent = %intent,
            product = product.map(|p| p.name.as_str()).unwrap_or(""),
            "Rule matched"
        );
        Reply {
            intent,
            product: product.map(|p| p.name.clone()),
            text: self.render(intent, product),
        }
    }

    fn first_match(&self, message: &str) -> (Intent, Option<&Product>) {
        for rule in &RULES {
            match rule.matcher {
                Matcher::ProductName => {
                    if let Some(product) = self.knowledge.products().find(|p| message.contains(p.name.as_str())) {
                        return (rule.intent, Some(product));
                    }
                }
                Matcher::Keywords(_) => {
                    if rule.matcher.matches_keywords(message) {
                        return (rule.intent, None);
                    }
                }
            }
        }
        (Intent::Help, None)
    }

    fn render(&self, intent: Intent, product: Option<&Product>) -> String {
        let kb = &self.knowledge;
        match (intent, product) {
            (Intent::Greeting, _) => GREETING.to_string(),
            (Intent::Product, Some(p)) => format!(
                "Our {} is priced at {} and is currently {}. It comes with {} warranty. Would you like to know anything else about it?",
                p.name, p.price, p.stock, p.warranty
            ),
            (Intent::PriceList, _) => self.price_list(),
            (Intent::Stock, _) => self.stock_summary(),
            (Intent::Shipping, _) => {
                format!("{}. {}", kb.policy("shipping").unwrap_or_default(), SHIPPING_SUFFIX)
            }
            (Intent::Returns, _) => {
                format!("{}. {}", kb.policy("return").unwrap_or_default(), RETURNS_SUFFIX)
            }
            (Intent::Contact, _) => format!(
                "You can reach us at:\nPhone: {}\nEmail: {}\nHours: {}",
                kb.contact("phone").unwrap_or_default(),
                kb.contact("email").unwrap_or_default(),
                kb.contact("hours").unwrap_or_default()
            ),
            (Intent::Warranty, _) => WARRANTY_OVERVIEW.to_string(),
            (Intent::Product, None) | (Intent::Help, _) => HELP_MENU.to_string(),
        }
    }

    fn price_list(&self) -> String {
        let mut out = String::from("I can help you with pricing! We have:\n");
        for p in self.knowledge.products() {
            out.push_str(&format!("- {}: {}\n", p.display_name(), p.price));
        }
        out.push_str("Which product are you interested in?");
        out
    }

    fn stock_summary(&self) -> String {
        let available: Vec<&str> = self
            .knowledge
            .in_stock()
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        let mut out = if available.is_empty() {
            "Currently in stock: none.".to_string()
        } else {
            format!("Currently in stock: {}.", available.join(", "))
        };

        let missing: Vec<String> = self
            .knowledge
            .out_of_stock()
            .into_iter()
            .map(Product::display_name)
            .collect();
        match missing.len() {
            0 => {}
            1 => out.push_str(&format!(" {} is currently out of stock.", missing[0])),
            _ => out.push_str(&format!(" {} are currently out of stock.", missing.join(", "))),
        }
        out
    }
}

impl Default for Responder {
    fn default() -> Self {
        Self::builtin()
    }
}

fn normalize(input: &str) -> String {
    input.to_lowercase().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::Stock;

    fn responder() -> Responder {
        Responder::builtin()
    }

    #[test]
    fn greeting_wins_anywhere_in_message() {
        let r = responder();
        for input in ["hi", "HELLO there", "well, hey", "Good Morning!", "good afternoon, laptop price?"] {
            assert_eq!(r.respond(input), GREETING, "input: {}", input);
        }
    }

    #[test]
    fn greeting_precedes_product_and_price() {
        let r = responder();
        assert_eq!(r.respond("hi, what's the price of a laptop"), GREETING);
        assert_eq!(r.classify("hi, what's the price of a laptop"), Intent::Greeting);
    }

    #[test]
    fn product_reply_interpolates_facts() {
        let r = responder();
        let text = r.respond("laptop");
        assert!(text.contains("$999"));
        assert!(text.contains("In stock"));
        assert!(text.contains("2 years"));
        assert_eq!(
            text,
            "Our laptop is priced at $999 and is currently In stock. It comes with 2 years warranty. Would you like to know anything else about it?"
        );
        assert_eq!(
            r.respond("is the tablet any good"),
            "Our tablet is priced at $399 and is currently Out of stock. It comes with 1 year warranty. Would you like to know anything else about it?"
        );
    }

    #[test]
    fn product_matching_is_case_insensitive() {
        let r = responder();
        let expected = r.respond("laptop");
        assert_eq!(r.respond("LAPTOP"), expected);
        assert_eq!(r.respond("Laptop"), expected);
        assert_eq!(r.respond("   laptop\n"), expected);
    }

    #[test]
    fn earlier_product_wins_when_names_overlap() {
        let r = responder();
        let reply = r.reply("do you sell headphones");
        assert_eq!(reply.intent, Intent::Product);
        assert_eq!(reply.product.as_deref(), Some("phone"));
        assert!(reply.text.starts_with("Our phone is priced at $699"));
    }

    #[test]
    fn phone_is_a_product_not_contact() {
        let r = responder();
        assert_eq!(r.classify("phone"), Intent::Product);
        assert_eq!(r.classify("can I email you"), Intent::Contact);
    }

    #[test]
    fn price_list_matches_builtin_literal() {
        let r = responder();
        assert_eq!(
            r.respond("how much does it cost"),
            "I can help you with pricing! We have:\n- Laptop: $999\n- Phone: $699\n- Tablet: $399\n- Headphones: $199\nWhich product are you interested in?"
        );
    }

    #[test]
    fn stock_lists_available_products() {
        let r = responder();
        assert_eq!(
            r.respond("what is in stock"),
            "Currently in stock: laptop, phone, headphones. Tablet is currently out of stock."
        );
        assert_eq!(r.classify("is it available"), Intent::Stock);
    }

    #[test]
    fn shipping_and_returns_use_policy_text() {
        let r = responder();
        assert_eq!(
            r.respond("delivery times?"),
            "Free shipping on orders over $50. Standard delivery takes 3-5 business days."
        );
        assert_eq!(
            r.respond("I want a refund"),
            "30-day return policy on all items. Items must be in original condition with receipt."
        );
    }

    #[test]
    fn shipping_keyword_contains_greeting_substring() {
        // "shipping" contains "hi", so the greeting rule fires first.
        assert_eq!(responder().classify("shipping"), Intent::Greeting);
    }

    #[test]
    fn contact_block() {
        assert_eq!(
            responder().respond("how do I contact you"),
            "You can reach us at:\nPhone: 1-800-SHOP-123\nEmail: support@myshop.com\nHours: Mon-Fri 9AM-6PM"
        );
    }

    #[test]
    fn warranty_overview_is_fixed_text() {
        let r = responder();
        assert_eq!(r.respond("what about the guarantee"), WARRANTY_OVERVIEW);
        assert_eq!(r.classify("warranty"), Intent::Warranty);
    }

    #[test]
    fn empty_and_unknown_input_get_help_menu() {
        let r = responder();
        assert_eq!(r.respond(""), HELP_MENU);
        assert_eq!(r.respond("   "), HELP_MENU);
        assert_eq!(r.respond("do you sell bicycles"), HELP_MENU);
        assert_eq!(r.classify(""), Intent::Help);
    }

    #[test]
    fn replies_are_idempotent() {
        let r = responder();
        for input in ["laptop", "what is in stock", "", "refund", "price"] {
            assert_eq!(r.respond(input), r.respond(input));
            assert!(!r.respond(input).is_empty());
        }
    }

    #[test]
    fn replies_follow_injected_knowledge() {
        let kb = KnowledgeBase::from_json(
            r#"{
                "products": [
                    {"name": "kettle", "price": "$25", "stock": "Out of stock", "warranty": "1 year"},
                    {"name": "toaster", "price": "$40", "stock": "Out of stock", "warranty": "2 years"}
                ],
                "policies": {"return": "14-day returns", "shipping": "Flat $5 shipping"},
                "contact": {"phone": "555-0100", "email": "help@kitchen.test", "hours": "Daily 8-8"}
            }"#,
        )
        .unwrap();
        let r = Responder::new(Arc::new(kb));
        assert!(r.respond("kettle").contains("$25"));
        assert_eq!(r.knowledge().product("toaster").map(|p| p.stock), Some(Stock::OutOfStock));
        assert_eq!(
            r.respond("stock?"),
            "Currently in stock: none. Kettle, Toaster are currently out of stock."
        );
        assert_eq!(
            r.respond("price"),
            "I can help you with pricing! We have:\n- Kettle: $25\n- Toaster: $40\nWhich product are you interested in?"
        );
        assert!(r.respond("refund").starts_with("14-day returns."));
        // "laptop" is not in this fact set.
        assert_eq!(r.respond("laptop"), HELP_MENU);
    }
}
