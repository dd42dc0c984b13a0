use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Schema of a CRUD resource: its wire shapes plus the hooks the generic
/// store and handler implementations dispatch through.
///
/// One implementation per entity replaces the per-entity handler copies the
/// services would otherwise duplicate.
pub trait Resource: Clone + Serialize + Send + Sync + 'static {
    /// Display name used in error messages ("Product not found").
    const NAME: &'static str;
    /// Path segment the resource is mounted under (`/api/v1/<SEGMENT>/`).
    const SEGMENT: &'static str;
    /// Field covered by a uniqueness constraint, if any.
    const UNIQUE_FIELD: Option<&'static str> = None;

    /// Create request body; required fields are non-optional.
    type Draft: DeserializeOwned + Serialize + Send + Sync + 'static;
    /// Partial update body; absent fields keep their prior values.
    type Patch: DeserializeOwned + Serialize + Send + Sync + 'static;

    fn id(&self) -> i64;

    fn validate_draft(_draft: &Self::Draft) -> anyhow::Result<()> {
        Ok(())
    }

    fn validate_patch(_patch: &Self::Patch) -> anyhow::Result<()> {
        Ok(())
    }

    /// Materialize a record from a draft and a store-assigned id.
    fn hydrate(draft: Self::Draft, id: i64, now: DateTime<Utc>) -> Self;

    /// Apply the supplied fields, leaving the rest untouched.
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Current value of the unique field, if the entity has one.
    fn unique_value(&self) -> Option<&str> {
        None
    }

    fn draft_unique_value(_draft: &Self::Draft) -> Option<&str> {
        None
    }

    fn patch_unique_value(_patch: &Self::Patch) -> Option<&str> {
        None
    }
}
