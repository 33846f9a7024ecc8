use booking_server::{config::ServerConfig, server::run_server};
use dotenvy::dotenv;
use log::*;

#[actix_web::main]
async fn main() {
    dotenv().ok();
    env_logger::init();
    let config = ServerConfig::from_env_or_default();
    info!("🚀️ Starting Venue Booking Gateway on {}:{}", config.host, config.port);
    match run_server(config).await {
        Ok(_) => info!("🚀️ Server shut down cleanly. Bye!"),
        Err(e) => error!("🚀️ Server exited with an error: {e}"),
    }
}
