use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::resource::Resource;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerDraft {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CustomerPatch {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl Resource for Customer {
    const NAME: &'static str = "Customer";
    const SEGMENT: &'static str = "customers";
    const UNIQUE_FIELD: Option<&'static str> = Some("email");

    type Draft = CustomerDraft;
    type Patch = CustomerPatch;

    fn id(&self) -> i64 {
        self.id
    }

    fn validate_draft(draft: &CustomerDraft) -> anyhow::Result<()> {
        if draft.name.trim().is_empty() {
            anyhow::bail!("name empty");
        }
        if !draft.email.contains('@') {
            anyhow::bail!("invalid email");
        }
        Ok(())
    }

    fn validate_patch(patch: &CustomerPatch) -> anyhow::Result<()> {
        if let Some(name) = &patch.name {
            if name.trim().is_empty() {
                anyhow::bail!("name empty");
            }
        }
        if let Some(email) = &patch.email {
            if !email.contains('@') {
                anyhow::bail!("invalid email");
            }
        }
        Ok(())
    }

    fn hydrate(draft: CustomerDraft, id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            email: draft.email,
            created_at: now,
        }
    }

    fn apply(&mut self, patch: CustomerPatch, _now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
    }

    fn unique_value(&self) -> Option<&str> {
        Some(&self.email)
    }

    fn draft_unique_value(draft: &CustomerDraft) -> Option<&str> {
        Some(&draft.email)
    }

    fn patch_unique_value(patch: &CustomerPatch) -> Option<&str> {
        patch.email.as_deref()
    }
}
