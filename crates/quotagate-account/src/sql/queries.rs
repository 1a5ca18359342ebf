//! SQL statements per dialect.
//!
//! PostgreSQL takes `$n` placeholders; MySQL and SQLite share the `?` form.

macro_rules! select {
    ($tail:literal) => {
        concat!(
            "SELECT external_id, display_name, email, stripe_customer_id, ",
            "is_paying, manual_grant, daily_count, last_reset ",
            "FROM quotagate_accounts ",
            $tail
        )
    };
}

pub const FIND_BY_ID_PG: &str = select!("WHERE external_id = $1");
pub const FIND_BY_ID_MYSQL: &str = select!("WHERE external_id = ?");

pub const FIND_BY_EMAIL_PG: &str = select!("WHERE email = $1 ORDER BY external_id LIMIT 1");
pub const FIND_BY_EMAIL_MYSQL: &str = select!("WHERE email = ? ORDER BY external_id LIMIT 1");

pub const FIND_BY_CUSTOMER_PG: &str =
    select!("WHERE stripe_customer_id = $1 ORDER BY external_id LIMIT 1");
pub const FIND_BY_CUSTOMER_MYSQL: &str =
    select!("WHERE stripe_customer_id = ? ORDER BY external_id LIMIT 1");

pub const LIST_ALL: &str = select!("ORDER BY external_id");

/// Refresh profile attributes; usage and entitlement are untouched.
pub const UPDATE_PROFILE_PG: &str = r#"
UPDATE quotagate_accounts
SET display_name = $1, email = $2
WHERE external_id = $3
"#;

pub const UPDATE_PROFILE_MYSQL: &str = r#"
UPDATE quotagate_accounts
SET display_name = ?, email = ?
WHERE external_id = ?
"#;

pub const INSERT_ACCOUNT_PG: &str = r#"
INSERT INTO quotagate_accounts
    (external_id, display_name, email, stripe_customer_id, is_paying, manual_grant, daily_count, last_reset)
VALUES ($1, $2, $3, NULL, FALSE, FALSE, 0, $4)
"#;

pub const INSERT_ACCOUNT_MYSQL: &str = r#"
INSERT INTO quotagate_accounts
    (external_id, display_name, email, stripe_customer_id, is_paying, manual_grant, daily_count, last_reset)
VALUES (?, ?, ?, NULL, FALSE, FALSE, 0, ?)
"#;

pub const SET_SUBSCRIPTION_PG: &str = r#"
UPDATE quotagate_accounts
SET stripe_customer_id = $1, is_paying = TRUE
WHERE external_id = $2
"#;

pub const SET_SUBSCRIPTION_MYSQL: &str = r#"
UPDATE quotagate_accounts
SET stripe_customer_id = ?, is_paying = TRUE
WHERE external_id = ?
"#;

pub const GRANT_MANUAL_PG: &str = r#"
UPDATE quotagate_accounts
SET is_paying = TRUE, manual_grant = TRUE, daily_count = 0, last_reset = $1
WHERE external_id = $2
"#;

pub const GRANT_MANUAL_MYSQL: &str = r#"
UPDATE quotagate_accounts
SET is_paying = TRUE, manual_grant = TRUE, daily_count = 0, last_reset = ?
WHERE external_id = ?
"#;

/// Conditional usage write. Affects one row only if the stored pair still
/// matches the caller's snapshot.
pub const CAS_USAGE_PG: &str = r#"
UPDATE quotagate_accounts
SET daily_count = $1, last_reset = $2
WHERE external_id = $3 AND daily_count = $4 AND last_reset = $5
"#;

pub const CAS_USAGE_MYSQL: &str = r#"
UPDATE quotagate_accounts
SET daily_count = ?, last_reset = ?
WHERE external_id = ? AND daily_count = ? AND last_reset = ?
"#;

pub const SCHEMA_PG: &str = r#"
CREATE TABLE IF NOT EXISTS quotagate_accounts (
    external_id VARCHAR(255) PRIMARY KEY,
    display_name VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL DEFAULT '',
    stripe_customer_id VARCHAR(255),
    is_paying BOOLEAN NOT NULL DEFAULT FALSE,
    manual_grant BOOLEAN NOT NULL DEFAULT FALSE,
    daily_count BIGINT NOT NULL DEFAULT 0,
    last_reset BIGINT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_quotagate_accounts_email ON quotagate_accounts(email);
CREATE INDEX IF NOT EXISTS idx_quotagate_accounts_customer ON quotagate_accounts(stripe_customer_id);
"#;

// MySQL has no CREATE INDEX IF NOT EXISTS.
pub const SCHEMA_MYSQL: &str = r#"
CREATE TABLE IF NOT EXISTS quotagate_accounts (
    external_id VARCHAR(255) PRIMARY KEY,
    display_name VARCHAR(255) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL DEFAULT '',
    stripe_customer_id VARCHAR(255),
    is_paying BOOLEAN NOT NULL DEFAULT FALSE,
    manual_grant BOOLEAN NOT NULL DEFAULT FALSE,
    daily_count BIGINT NOT NULL DEFAULT 0,
    last_reset BIGINT NOT NULL,
    INDEX idx_quotagate_accounts_email (email),
    INDEX idx_quotagate_accounts_customer (stripe_customer_id)
);
"#;

pub const SCHEMA_SQLITE: &str = r#"
CREATE TABLE IF NOT EXISTS quotagate_accounts (
    external_id TEXT PRIMARY KEY,
    display_name TEXT NOT NULL DEFAULT '',
    email TEXT NOT NULL DEFAULT '',
    stripe_customer_id TEXT,
    is_paying INTEGER NOT NULL DEFAULT 0,
    manual_grant INTEGER NOT NULL DEFAULT 0,
    daily_count INTEGER NOT NULL DEFAULT 0,
    last_reset INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_quotagate_accounts_email ON quotagate_accounts(email);
CREATE INDEX IF NOT EXISTS idx_quotagate_accounts_customer ON quotagate_accounts(stripe_customer_id);
"#;

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &str = "external_id, display_name, email, stripe_customer_id, \
                           is_paying, manual_grant, daily_count, last_reset";

    #[test]
    fn select_macro_lists_every_column() {
        assert!(FIND_BY_ID_PG.contains(COLUMNS));
        assert!(LIST_ALL.ends_with("ORDER BY external_id"));
    }
}
