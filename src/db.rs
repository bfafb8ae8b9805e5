use rocket_db_pools::{Database, sqlx};

#[derive(Database)]
#[database("identity_db")]
pub struct IdentityDb(sqlx::PgPool);

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Apply pending schema migrations. Idempotent; runs at every startup.
pub async fn run_migrations(pool: &sqlx::PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}
