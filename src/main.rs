use std::io;

use commerce_orders::{build_server, create_pool, run_migrations, AppConfig, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    let config = AppConfig::from_env().map_err(io::Error::other)?;
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let pool = create_pool(&config.database_url, config.pool_size).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(AppState::with_pool(pool), &config.host, config.port)?.await
}
