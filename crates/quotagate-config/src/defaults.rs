//! Default value functions for serde deserialization.
//!
//! These functions forward to constants defined in `quotagate_core::defaults`.

use quotagate_core::defaults;

/// Generate default value functions that forward to quotagate_core::defaults constants.
macro_rules! default_fns {
    // For Copy types (integers, bool, etc.)
    ($($fn_name:ident => $const_name:ident : $ty:ty),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> $ty {
                defaults::$const_name
            }
        )*
    };
}

/// Generate default value functions that return String from &str constants.
macro_rules! default_string_fns {
    ($($fn_name:ident => $const_name:ident),* $(,)?) => {
        $(
            pub(crate) fn $fn_name() -> String {
                defaults::$const_name.to_string()
            }
        )*
    };
}

default_fns! {
    default_max_body_bytes           => DEFAULT_MAX_BODY_BYTES: usize,
    default_shutdown_timeout_secs    => DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64,
    default_daily_ceiling            => DEFAULT_DAILY_CEILING: u32,
    default_max_update_attempts      => DEFAULT_MAX_UPDATE_ATTEMPTS: u32,
    default_sql_max_connections      => DEFAULT_SQL_MAX_CONNECTIONS: u32,
    default_sql_min_connections      => DEFAULT_SQL_MIN_CONNECTIONS: u32,
    default_sql_connect_timeout_secs => DEFAULT_SQL_CONNECT_TIMEOUT_SECS: u64,
    default_store_auto_migrate       => DEFAULT_STORE_AUTO_MIGRATE: bool,
    default_webhook_tolerance_secs   => DEFAULT_WEBHOOK_TOLERANCE_SECS: u64,
    default_billing_timeout_secs     => DEFAULT_BILLING_TIMEOUT_SECS: u64,
    default_generation_timeout_secs  => DEFAULT_GENERATION_TIMEOUT_SECS: u64,
}

default_string_fns! {
    default_listen            => DEFAULT_LISTEN,
    default_identity_header   => DEFAULT_IDENTITY_HEADER,
    default_store_backend     => DEFAULT_STORE_BACKEND,
    default_billing_api_base  => DEFAULT_BILLING_API_BASE,
    default_prompt_template   => DEFAULT_PROMPT_TEMPLATE,
}
