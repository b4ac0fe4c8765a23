use chrono::Utc;
use sea_orm::{ActiveValue, Set, prelude::DateTimeUtc};

/// Stamps `created_at` on insert (unless the caller already set it) and
/// `updated_at` on every save.
pub(crate) fn touch(
    created_at: &mut ActiveValue<DateTimeUtc>,
    updated_at: &mut ActiveValue<DateTimeUtc>,
    insert: bool,
) {
    let now = Utc::now();
    if insert && created_at.is_not_set() {
        *created_at = Set(now);
    }
    *updated_at = Set(now);
}
