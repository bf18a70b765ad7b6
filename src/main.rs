use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use jobmatch::config::Settings;
use jobmatch::core::{JobNormalizer, Matcher, Throttle};
use jobmatch::reconciler::Reconciler;
use jobmatch::routes::{self, matching::AppState};
use jobmatch::services::{AppwriteClient, AppwriteCollections, PostgresStore};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.json().init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    init_logging(&settings.logging.level, &settings.logging.format);

    info!("Starting jobmatch service...");

    // User preferences live in Appwrite
    let collections = AppwriteCollections {
        user_preferences: settings.collection.user_preferences.clone(),
    };

    let appwrite = AppwriteClient::new(
        settings.appwrite.endpoint.clone(),
        settings.appwrite.api_key.clone(),
        settings.appwrite.project_id.clone(),
        settings.appwrite.database_id.clone(),
        collections,
        settings.appwrite.timeout_secs.unwrap_or(30),
    )
    .map_err(|e| {
        error!("Failed to create Appwrite client: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let appwrite = Arc::new(match settings.appwrite.page_size {
        Some(page_size) => appwrite.with_page_size(page_size),
        None => appwrite,
    });

    info!("Appwrite client initialized");

    // Job postings, notification history and matches live in PostgreSQL
    let postgres = Arc::new(
        PostgresStore::from_settings(
            &settings.database.url,
            settings.database.max_connections,
            settings.database.min_connections,
            settings.database.acquire_timeout_secs,
            settings.database.idle_timeout_secs,
        )
        .await
        .map_err(|e| {
            error!("Failed to connect to PostgreSQL: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
        })?,
    );

    info!("PostgreSQL store initialized");

    let vocabulary = settings.vocabulary.build();
    info!("Domain vocabulary loaded with {} entries", vocabulary.domain_count());

    let matcher = Matcher::new(JobNormalizer::new(vocabulary), settings.matching.strategy);
    let throttle = Throttle::new(
        settings.matching.student_cooldown_days,
        settings.matching.experienced_cooldown_days,
    );

    info!(
        "Matcher initialized: strategy={:?}, cooldowns={}d/{}d",
        matcher.strategy(),
        settings.matching.student_cooldown_days,
        settings.matching.experienced_cooldown_days
    );

    let reconciler = Reconciler::new(
        appwrite,
        postgres.clone(),
        postgres.clone(),
        postgres.clone(),
        matcher,
        throttle,
    )
    .with_write_concurrency(settings.matching.write_concurrency);

    let app_state = AppState::new(Arc::new(reconciler), postgres);

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
