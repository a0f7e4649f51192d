//! Immutable fact table for the shop: products, policies, and contact details.
//!
//! The table is built once at startup, either from the built-in literal fact set or from a JSON
//! file, and then shared read-only (`Arc<KnowledgeBase>`) across requests.
//!
//! | Category | Keys                                   | Value                          |
//! |----------|----------------------------------------|--------------------------------|
//! | products | `laptop`, `phone`, `tablet`, `headphones` | price, stock status, warranty |
//! | policies | `return`, `shipping`, `warranty`       | descriptive sentence           |
//! | contact  | `phone`, `email`, `hours`              | contact detail                 |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Policy keys the responder reads; a loaded fact set must define them.
pub const REQUIRED_POLICIES: [&str; 2] = ["return", "shipping"];

/// Contact keys the responder reads; a loaded fact set must define them.
pub const REQUIRED_CONTACT: [&str; 3] = ["phone", "email", "hours"];

/// Knowledge category for type-safe lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KbCategory {
    Products,
    Policies,
    Contact,
}

impl KbCategory {
    /// Lowercase identifier used in URLs and JSON.
    #[inline]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Policies => "policies",
            Self::Contact => "contact",
        }
    }

    /// Parses a category identifier. Returns None for unknown names.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "products" | "product" => Some(Self::Products),
            "policies" | "policy" => Some(Self::Policies),
            "contact" => Some(Self::Contact),
            _ => None,
        }
    }

    /// All categories in display order.
    pub fn all() -> [Self; 3] {
        [Self::Products, Self::Policies, Self::Contact]
    }
}

/// Stock status of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stock {
    #[serde(rename = "In stock", alias = "in_stock")]
    InStock,
    #[serde(rename = "Out of stock", alias = "out_of_stock")]
    OutOfStock,
}

impl Stock {
    /// Text used when the status is interpolated into a reply.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InStock => "In stock",
            Self::OutOfStock => "Out of stock",
        }
    }

    #[inline]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::InStock)
    }
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One product entry. `name` is the lowercase keyword matched against user input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: String,
    pub stock: Stock,
    pub warranty: String,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        stock: Stock,
        warranty: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            stock,
            warranty: warranty.into(),
        }
    }

    /// Name with the first letter uppercased ("headphones" -> "Headphones").
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// One-line summary for generic category/key lookups.
    pub fn summary(&self) -> String {
        format!("{}: {}, {}, {} warranty", self.name, self.price, self.stock, self.warranty)
    }
}

/// Errors raised while loading or validating a fact set.
#[derive(Debug)]
pub enum KnowledgeError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for KnowledgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read knowledge file {}: {}", path.display(), source)
            }
            Self::Parse(e) => write!(f, "malformed knowledge file: {}", e),
            Self::Invalid(reason) => write!(f, "invalid knowledge base: {}", reason),
        }
    }
}

impl std::error::Error for KnowledgeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(e) => Some(e),
            Self::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for KnowledgeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e)
    }
}

/// Read-only shop facts. Products keep their definition order, which decides which product
/// wins when several names occur in one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    products: Vec<Product>,
    policies: BTreeMap<String, String>,
    contact: BTreeMap<String, String>,
}

impl KnowledgeBase {
    /// The shop's built-in fact set.
    pub fn builtin() -> Self {
        let products = vec![
            Product::new("laptop", "$999", Stock::InStock, "2 years"),
            Product::new("phone", "$699", Stock::InStock, "1 year"),
            Product::new("tablet", "$399", Stock::OutOfStock, "1 year"),
            Product::new("headphones", "$199", Stock::InStock, "6 months"),
        ];
        let policies = [
            ("return", "30-day return policy on all items"),
            ("shipping", "Free shipping on orders over $50"),
            ("warranty", "All products come with manufacturer warranty"),
        ];
        let contact = [
            ("phone", "1-800-SHOP-123"),
            ("email", "support@myshop.com"),
            ("hours", "Mon-Fri 9AM-6PM"),
        ];
        Self {
            products,
            policies: policies
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            contact: contact
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Parses and validates a fact set from JSON.
    pub fn from_json(json: &str) -> Result<Self, KnowledgeError> {
        let kb: Self = serde_json::from_str(json)?;
        kb.validate()?;
        Ok(kb)
    }

    /// Loads and validates a fact set from a JSON file.
    pub fn load_json_path<P: AsRef<Path>>(path: P) -> Result<Self, KnowledgeError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| KnowledgeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let kb = Self::from_json(&raw)?;
        tracing::info!(
            target: "shop::knowledge",
            path = %path.display(),
            products = kb.products.len(),
            "Knowledge base loaded from file"
        );
        Ok(kb)
    }

    /// Built-in facts when `path` is None, otherwise the file at `path`.
    pub fn load_or_builtin(path: Option<&str>) -> Result<Self, KnowledgeError> {
        match path.filter(|p| !p.trim().is_empty()) {
            Some(p) => Self::load_json_path(p),
            None => Ok(Self::builtin()),
        }
    }

    /// Checks the invariants the responder relies on.
    pub fn validate(&self) -> Result<(), KnowledgeError> {
        if self.products.is_empty() {
            return Err(KnowledgeError::Invalid("no products defined".to_string()));
        }
        for (i, product) in self.products.iter().enumerate() {
            if product.name.trim().is_empty() {
                return Err(KnowledgeError::Invalid(format!("product #{} has an empty name", i + 1)));
            }
            if product.name != product.name.to_lowercase() {
                return Err(KnowledgeError::Invalid(format!(
                    "product name must be lowercase: {}",
                    product.name
                )));
            }
            if self.products[..i].iter().any(|p| p.name == product.name) {
                return Err(KnowledgeError::Invalid(format!(
                    "duplicate product: {}",
                    product.name
                )));
            }
        }
        if let Some(key) = REQUIRED_POLICIES.iter().find(|k| !self.policies.contains_key(**k)) {
            return Err(KnowledgeError::Invalid(format!("missing policy: {}", key)));
        }
        if let Some(key) = REQUIRED_CONTACT.iter().find(|k| !self.contact.contains_key(**k)) {
            return Err(KnowledgeError::Invalid(format!("missing contact field: {}", key)));
        }
        Ok(())
    }

    /// Products in definition order.
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter()
    }

    pub fn product(&self, name: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.name == name)
    }

    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    pub fn policy(&self, name: &str) -> Option<&str> {
        self.policies.get(name).map(String::as_str)
    }

    pub fn contact(&self, field: &str) -> Option<&str> {
        self.contact.get(field).map(String::as_str)
    }

    /// In-stock products, definition order.
    pub fn in_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| p.stock.is_available()).collect()
    }

    /// Out-of-stock products, definition order.
    pub fn out_of_stock(&self) -> Vec<&Product> {
        self.products.iter().filter(|p| !p.stock.is_available()).collect()
    }

    /// Generic lookup by category and key; products are rendered with [`Product::summary`].
    pub fn query(&self, category: KbCategory, key: &str) -> Option<String> {
        match category {
            KbCategory::Products => self.product(key).map(Product::summary),
            KbCategory::Policies => self.policy(key).map(str::to_string),
            KbCategory::Contact => self.contact(key).map(str::to_string),
        }
    }

    /// Keys of a category, in iteration order.
    pub fn keys(&self, category: KbCategory) -> Vec<&str> {
        match category {
            KbCategory::Products => self.products.iter().map(|p| p.name.as_str()).collect(),
            KbCategory::Policies => self.policies.keys().map(String::as_str).collect(),
            KbCategory::Contact => self.contact.keys().map(String::as_str).collect(),
        }
    }
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_products_keep_definition_order() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(kb.keys(KbCategory::Products), vec!["laptop", "phone", "tablet", "headphones"]);
        assert!(kb.validate().is_ok());
    }

    #[test]
    fn stock_partitions_follow_definition_order() {
        let kb = KnowledgeBase::builtin();
        let in_stock: Vec<&str> = kb.in_stock().iter().map(|p| p.name.as_str()).collect();
        let out: Vec<&str> = kb.out_of_stock().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(in_stock, vec!["laptop", "phone", "headphones"]);
        assert_eq!(out, vec!["tablet"]);
    }

    #[test]
    fn query_by_category_and_key() {
        let kb = KnowledgeBase::builtin();
        assert_eq!(
            kb.query(KbCategory::Contact, "email").as_deref(),
            Some("support@myshop.com")
        );
        assert_eq!(
            kb.query(KbCategory::Policies, "shipping").as_deref(),
            Some("Free shipping on orders over $50")
        );
        assert_eq!(
            kb.query(KbCategory::Products, "laptop").as_deref(),
            Some("laptop: $999, In stock, 2 years warranty")
        );
        assert!(kb.query(KbCategory::Products, "toaster").is_none());
        assert_eq!(KbCategory::from_name(" Policy "), Some(KbCategory::Policies));
        assert_eq!(KbCategory::from_name("inventory"), None);
    }

    #[test]
    fn categories_in_display_order_serialize_as_labels() {
        let labels: Vec<&str> = KbCategory::all().iter().map(|c| c.label()).collect();
        assert_eq!(labels, vec!["products", "policies", "contact"]);
        for category in KbCategory::all() {
            assert_eq!(serde_json::to_value(category).unwrap(), category.label());
            assert_eq!(KbCategory::from_name(category.label()), Some(category));
        }
    }

    #[test]
    fn json_round_trip_preserves_facts() {
        let kb = KnowledgeBase::builtin();
        let json = serde_json::to_string(&kb).unwrap();
        assert!(json.contains("\"Out of stock\""));
        assert_eq!(KnowledgeBase::from_json(&json).unwrap(), kb);
    }

    #[test]
    fn sample_fact_file_matches_builtin() {
        let kb = KnowledgeBase::from_json(include_str!("../../../../config/knowledge.json")).unwrap();
        assert_eq!(kb, KnowledgeBase::builtin());
    }

    #[test]
    fn load_json_path_reads_alternate_facts() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "products": [
                    {{"name": "kettle", "price": "$25", "stock": "in_stock", "warranty": "1 year"}},
                    {{"name": "toaster", "price": "$40", "stock": "Out of stock", "warranty": "2 years"}}
                ],
                "policies": {{"return": "14-day returns", "shipping": "Flat $5 shipping"}},
                "contact": {{"phone": "555-0100", "email": "help@kitchen.test", "hours": "Daily 8-8"}}
            }}"#
        )
        .unwrap();
        let kb = KnowledgeBase::load_json_path(file.path()).unwrap();
        assert_eq!(kb.product_count(), 2);
        assert_eq!(kb.product("toaster").unwrap().stock, Stock::OutOfStock);
        assert!(kb.policy("warranty").is_none());
    }

    #[test]
    fn load_or_builtin_without_path_is_builtin() {
        assert_eq!(KnowledgeBase::load_or_builtin(None).unwrap(), KnowledgeBase::builtin());
        assert_eq!(KnowledgeBase::load_or_builtin(Some("  ")).unwrap(), KnowledgeBase::builtin());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = KnowledgeBase::load_json_path("./no/such/facts.json").unwrap_err();
        assert!(matches!(err, KnowledgeError::Io { .. }));
        assert!(err.to_string().contains("facts.json"));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = KnowledgeBase::from_json("{ not json").unwrap_err();
        assert!(matches!(err, KnowledgeError::Parse(_)));
    }

    #[test]
    fn validation_rejects_bad_fact_sets() {
        let base = serde_json::to_value(KnowledgeBase::builtin()).unwrap();

        let mut dup = base.clone();
        dup["products"][1]["name"] = serde_json::json!("laptop");
        let err = KnowledgeBase::from_json(&dup.to_string()).unwrap_err();
        assert!(err.to_string().contains("duplicate product: laptop"));

        let mut upper = base.clone();
        upper["products"][0]["name"] = serde_json::json!("Laptop");
        assert!(matches!(
            KnowledgeBase::from_json(&upper.to_string()),
            Err(KnowledgeError::Invalid(_))
        ));

        let mut empty = base.clone();
        empty["products"] = serde_json::json!([]);
        assert!(KnowledgeBase::from_json(&empty.to_string()).is_err());

        let mut no_hours = base;
        no_hours["contact"].as_object_mut().unwrap().remove("hours");
        let err = KnowledgeBase::from_json(&no_hours.to_string()).unwrap_err();
        assert!(err.to_string().contains("missing contact field: hours"));
    }
}
