use sea_orm_migration::prelude::*;

#[tokio::main]
async fn main() {
    #[cfg(debug_assertions)]
    dotenvy::dotenv().ok();

    cli::run_cli(migration::Migrator).await;
}
