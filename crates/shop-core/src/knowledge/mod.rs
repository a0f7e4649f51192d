//! Read-only shop knowledge base.
//!
//! Three categories, each keyed by a lowercase identifier:
//!
//! | Category | Purpose                                     |
//! |----------|---------------------------------------------|
//! | products | price, stock status, warranty per product   |
//! | policies | return, shipping, and warranty statements   |
//! | contact  | phone, email, opening hours                 |

mod store;

pub use store::{
    KbCategory, KnowledgeBase, KnowledgeError, Product, Stock, REQUIRED_CONTACT, REQUIRED_POLICIES,
};
