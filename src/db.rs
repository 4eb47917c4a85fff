use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub const MIGRATIONS: &str = include_str!("schema.sql");

pub async fn init_pool(database_url: &str) -> PgPool {
    PgPoolOptions::new()
        .max_connections(8)
        .connect(database_url)
        .await
        .expect("Failed to create DB pool")
}

pub async fn run_migrations(pool: &PgPool) {
    sqlx::raw_sql(MIGRATIONS)
        .execute(pool)
        .await
        .expect("Failed to run migrations");
    log::info!("Database migrations complete");
}

/// Seed the default admin account. Skipped if any users exist already.
pub async fn seed_admin(pool: &PgPool, email: &str, password_hash: &str) {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .unwrap_or(0);
    if count > 0 {
        log::info!("Database already has {count} user(s), skipping admin seed");
        return;
    }

    let result = sqlx::query(
        "INSERT INTO users (email, display_name, password_hash, role) \
         VALUES ($1, 'Administrator', $2, 'admin')",
    )
    .bind(email)
    .bind(password_hash)
    .execute(pool)
    .await;

    match result {
        Ok(_) => log::info!("Seeded admin account '{email}'"),
        Err(e) => log::error!("Admin seed failed: {e}"),
    }
}
