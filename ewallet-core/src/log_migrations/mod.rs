//! Event log schema, embedded at build time
//!
//! The first entry creates `sys_migrations` and is safe to run on every open;
//! the rest are applied once each, in order, by
//! [`LoggingService`](crate::services::LoggingService).

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
