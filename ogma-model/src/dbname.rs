//! Unique database names for temporary schema instances.

use chrono::Utc;
use uuid::Uuid;

/// Build a database name that will not collide with a previous run.
pub fn unique_database_name() -> String {
    format!(
        "ogma_db__{}_{}",
        Utc::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        assert_ne!(unique_database_name(), unique_database_name());
    }

    #[test]
    fn test_name_shape() {
        let name = unique_database_name();
        assert!(name.starts_with("ogma_db__"));
        // Usable as a bare identifier in SQL statements.
        assert!(name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }
}
