use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};

use lifeline::{auth, db, handlers, notify, workflow};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set (e.g. postgres://localhost/lifeline)");

    let pool = db::init_pool(&database_url).await;
    db::run_migrations(&pool).await;

    // Seed the default admin account on first boot
    let admin_email =
        std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".to_string());
    let admin_password =
        std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());
    let admin_hash = auth::password::hash_password(&admin_password)
        .expect("Failed to hash default admin password");
    db::seed_admin(&pool, &admin_email, &admin_hash).await;

    let notifier = notify::from_env();
    let store = Arc::new(workflow::pg::PgStore::new(pool.clone()));
    let formation_workflow =
        web::Data::new(workflow::FormationWorkflow::new(store, notifier));

    // Periodic sweep over submitted formation requests
    let sweep_interval = match std::env::var("SWEEP_INTERVAL_SECS") {
        Ok(val) => match val.parse::<u64>() {
            Ok(secs) if secs > 0 => secs,
            _ => {
                log::warn!("Invalid SWEEP_INTERVAL_SECS '{val}' — using default 3600");
                3600
            }
        },
        Err(_) => 3600,
    };
    workflow::scheduler::spawn_sweep_scheduler(
        formation_workflow.clone().into_inner(),
        sweep_interval,
    );

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());
    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(formation_workflow.clone())
            .service(web::scope("/api/v1").configure(handlers::api_v1::configure))
    })
    .bind(bind_addr)?
    .run()
    .await
}
