//! Taxonomy catalog: category → model → valid color variants.
//!
//! RULE: The catalog is immutable once validated. Generation samples
//! from it level by level, so every generated (category, model, color)
//! triple is guaranteed to exist here.

use crate::error::{DashError, DashResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelSpec {
    pub name: String,
    /// Unit list price. Manufacturing cost is a fixed fraction of this.
    pub base_price: f64,
    /// Ordered list of valid color variants.
    pub colors: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CategorySpec {
    pub name: String,
    pub models: Vec<ModelSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    categories: Vec<CategorySpec>,
}

/// Validated, declaration-ordered catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    categories: Vec<CategorySpec>,
}

impl Catalog {
    /// Validate and wrap a list of categories.
    ///
    /// Category names must be unique, model names unique across the whole
    /// catalog, every model priced above zero with at least one color.
    pub fn from_categories(categories: Vec<CategorySpec>) -> DashResult<Self> {
        if categories.is_empty() {
            return Err(invalid("catalog has no categories"));
        }
        let mut seen_categories = HashSet::new();
        let mut seen_models = HashSet::new();
        for cat in &categories {
            if !seen_categories.insert(cat.name.as_str()) {
                return Err(invalid(format!("duplicate category '{}'", cat.name)));
            }
            if cat.models.is_empty() {
                return Err(invalid(format!("category '{}' has no models", cat.name)));
            }
            for model in &cat.models {
                if !seen_models.insert(model.name.as_str()) {
                    return Err(invalid(format!("duplicate model '{}'", model.name)));
                }
                if !(model.base_price.is_finite() && model.base_price > 0.0) {
                    return Err(invalid(format!(
                        "model '{}' has non-positive price {}",
                        model.name, model.base_price
                    )));
                }
                if model.colors.is_empty() {
                    return Err(invalid(format!("model '{}' has no colors", model.name)));
                }
                let unique: HashSet<&str> = model.colors.iter().map(String::as_str).collect();
                if unique.len() != model.colors.len() {
                    return Err(invalid(format!("model '{}' repeats a color", model.name)));
                }
            }
        }
        Ok(Self { categories })
    }

    pub fn from_json(json: &str) -> DashResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_categories(file.categories)
    }

    /// The default product line shipped in `data/catalog.json`.
    pub fn builtin() -> Self {
        fn model(name: &str, base_price: f64, colors: &[&str]) -> ModelSpec {
            ModelSpec {
                name: name.into(),
                base_price,
                colors: colors.iter().map(|c| c.to_string()).collect(),
            }
        }
        let categories = vec![
            CategorySpec {
                name: "iPhone".into(),
                models: vec![
                    model("iPhone 15 Pro", 1199.0, &[
                        "Natural Titanium", "Blue Titanium", "White Titanium", "Black Titanium",
                    ]),
                    model("iPhone 15", 799.0, &["Black", "Blue", "Green", "Yellow", "Pink"]),
                ],
            },
            CategorySpec {
                name: "Mac".into(),
                models: vec![
                    model("MacBook Pro M3 Max", 3499.0, &["Space Black", "Silver"]),
                    model("MacBook Pro M3", 1599.0, &["Space Gray", "Silver"]),
                    model("MacBook Air M3", 1099.0, &["Midnight", "Starlight", "Space Gray", "Silver"]),
                ],
            },
            CategorySpec {
                name: "iPad".into(),
                models: vec![
                    model("iPad Pro M2", 999.0, &["Space Gray", "Silver"]),
                    model("iPad Air", 599.0, &["Space Gray", "Starlight", "Pink", "Purple", "Blue"]),
                ],
            },
            CategorySpec {
                name: "Wearables".into(),
                models: vec![model("Apple Watch Ultra 2", 799.0, &["Natural Titanium"])],
            },
            CategorySpec {
                name: "Audio".into(),
                models: vec![model("AirPods Max", 549.0, &[
                    "Space Gray", "Silver", "Sky Blue", "Green", "Pink",
                ])],
            },
        ];
        Self { categories }
    }

    pub fn categories(&self) -> &[CategorySpec] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&CategorySpec> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn model(&self, category: &str, model: &str) -> Option<&ModelSpec> {
        self.category(category)?.models.iter().find(|m| m.name == model)
    }

    pub fn contains_pair(&self, category: &str, model: &str) -> bool {
        self.model(category, model).is_some()
    }

    pub fn is_valid_color(&self, category: &str, model: &str, color: &str) -> bool {
        self.model(category, model)
            .is_some_and(|m| m.colors.iter().any(|c| c == color))
    }

    pub fn knows_category(&self, name: &str) -> bool {
        self.category(name).is_some()
    }

    /// True if any category lists a model with this name.
    pub fn knows_model(&self, name: &str) -> bool {
        self.models().any(|m| m.name == name)
    }

    /// True if any model lists this color.
    pub fn knows_color(&self, name: &str) -> bool {
        self.models().any(|m| m.colors.iter().any(|c| c == name))
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    fn models(&self) -> impl Iterator<Item = &ModelSpec> {
        self.categories.iter().flat_map(|c| c.models.iter())
    }
}

fn invalid(reason: impl Into<String>) -> DashError {
    DashError::InvalidCatalog { reason: reason.into() }
}
