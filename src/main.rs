use std::time::Duration;

use actix_cors::Cors;
use actix_web::{App, HttpResponse, HttpServer, Responder, get, middleware::Logger, web};
use anyhow::Result;

use payroll::database::init_database;
use payroll::middleware::RequestId;
use payroll::services::AbsenceJob;
use payroll::{Config, PgDatabase, routes};

#[get("/")]
async fn hello() -> impl Responder {
    HttpResponse::Ok().body("Payroll API v1.0")
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now()
    }))
}

#[actix_web::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize logger
    env_logger::init();

    println!("🚀 Starting payroll API server...");

    let config = Config::from_env()?;
    println!(
        "📋 Configuration loaded (environment: {})",
        config.environment
    );

    let pool = init_database(&config.database_url).await?;
    println!("✅ Database initialized");

    let database = PgDatabase::new(pool);

    if config.absence_job_enabled() {
        AbsenceJob::new(
            database.clone(),
            Duration::from_secs(config.absence_job_interval_secs),
        )
        .spawn();
    } else {
        log::info!("Absence job disabled");
    }

    let database_data = web::Data::new(database);
    let config_data = web::Data::new(config.clone());

    let server_address = config.server_address();
    println!("🌐 Server starting on http://{}", server_address);

    HttpServer::new(move || {
        App::new()
            .app_data(database_data.clone())
            .app_data(config_data.clone())
            .wrap(
                Cors::default()
                    .allowed_origin(&config.cors_origin)
                    .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
                    .allowed_headers(vec![
                        "Authorization",
                        "Content-Type",
                        "Accept",
                        "X-Requested-With",
                        "X-Correlation-ID",
                    ])
                    .max_age(3600),
            )
            .wrap(RequestId)
            .wrap(Logger::new(
                r#"%a "%r" %s %b "%{Referer}i" "%{User-Agent}i" %T correlation_id=%{x-correlation-id}o"#,
            ))
            .service(hello)
            .service(health)
            .configure(routes::configure::<PgDatabase>)
    })
    .bind(&server_address)?
    .run()
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))
}
