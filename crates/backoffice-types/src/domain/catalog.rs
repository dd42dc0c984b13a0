use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDraft {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryPatch {
    pub name: Option<String>,
}

impl Resource for Category {
    const NAME: &'static str = "Category";
    const SEGMENT: &'static str = "categories";

    type Draft = CategoryDraft;
    type Patch = CategoryPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate_draft(draft: &CategoryDraft) -> anyhow::Result<()> {
        if draft.name.trim().is_empty() {
            anyhow::bail!("name empty");
        }
        Ok(())
    }

    fn validate_patch(patch: &CategoryPatch) -> anyhow::Result<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                anyhow::bail!("name empty");
            }
        }
        Ok(())
    }

    fn hydrate(draft: CategoryDraft, id: i64, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
        }
    }

    fn apply(&mut self, patch: CategoryPatch, _now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductDraft {
    pub name: String,
    pub price: f64,
    pub description: Option<String>,
    pub category_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub category_id: Option<i64>,
}

impl Resource for Product {
    const NAME: &'static str = "Product";
    const SEGMENT: &'static str = "products";

    type Draft = ProductDraft;
    type Patch = ProductPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate_draft(draft: &ProductDraft) -> anyhow::Result<()> {
        if draft.name.trim().is_empty() {
            anyhow::bail!("name empty");
        }
        if draft.price < 0.0 {
            anyhow::bail!("price must not be negative");
        }
        Ok(())
    }

    fn validate_patch(patch: &ProductPatch) -> anyhow::Result<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                anyhow::bail!("name empty");
            }
        }
        if let Some(price) = patch.price {
            if price < 0.0 {
                anyhow::bail!("price must not be negative");
            }
        }
        Ok(())
    }

    fn hydrate(draft: ProductDraft, id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            price: draft.price,
            description: draft.description,
            category_id: draft.category_id,
            created_at: now,
            updated_at: None,
        }
    }

    fn apply(&mut self, patch: ProductPatch, now: DateTime<Utc>) {
        let mut touched = false;
        if let Some(name) = patch.name {
            self.name = name;
            touched = true;
        }
        if let Some(price) = patch.price {
            self.price = price;
            touched = true;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
            touched = true;
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = category_id;
            touched = true;
        }
        // An empty patch must leave the record byte-identical.
        if touched {
            self.updated_at = Some(now);
        }
    }
}
