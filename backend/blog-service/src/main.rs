use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use blog_service::db::{group_repo, BlogRepository, PgBlogRepository};
use blog_service::forms::GroupForm;
use blog_service::handlers::{self, API_PREFIX};
use blog_service::middleware;
use blog_service::openapi::ApiDoc;
use blog_service::services::{AuthService, PostService};
use blog_service::Config;
use chrono::Utc;
use crypto_core::jwt;
use db_pool::{create_pool as create_pg_pool, DbConfig as DbPoolConfig};
use serde::Serialize;
use sqlx::PgPool;
use std::collections::HashMap;
use std::io;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

const SERVICE_NAME: &str = "blog-service";

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Healthy,
    Unhealthy,
}

#[derive(Serialize)]
struct ComponentCheck {
    status: ComponentStatus,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
}

#[derive(Serialize)]
struct ReadinessResponse {
    ready: bool,
    status: ComponentStatus,
    checks: HashMap<String, ComponentCheck>,
    timestamp: String,
}

async fn check_postgres(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(pool).await.map(|_| ())
}

async fn health_summary(pool: web::Data<PgPool>) -> HttpResponse {
    match check_postgres(&pool).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": SERVICE_NAME,
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": SERVICE_NAME
        })),
    }
}

async fn readiness_summary(pool: web::Data<PgPool>) -> HttpResponse {
    let start = Instant::now();
    let pg_result = check_postgres(&pool).await;
    let latency_ms = Some(start.elapsed().as_millis() as u64);

    let (ready, postgres_check) = match pg_result {
        Ok(_) => (
            true,
            ComponentCheck {
                status: ComponentStatus::Healthy,
                message: "PostgreSQL connection successful".to_string(),
                latency_ms,
            },
        ),
        Err(e) => (
            false,
            ComponentCheck {
                status: ComponentStatus::Unhealthy,
                message: format!("PostgreSQL connection failed: {}", e),
                latency_ms,
            },
        ),
    };

    let mut checks = HashMap::new();
    checks.insert("postgresql".to_string(), postgres_check);

    let response = ReadinessResponse {
        ready,
        status: if ready {
            ComponentStatus::Healthy
        } else {
            ComponentStatus::Unhealthy
        },
        checks,
        timestamp: Utc::now().to_rfc3339(),
    };

    if ready {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!("SIGTERM handler unavailable ({}); waiting for Ctrl+C", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn init_jwt(config: &Config) -> io::Result<()> {
    let result = match (&config.auth.private_key_pem, &config.auth.public_key_pem) {
        (Some(private_key), Some(public_key)) => jwt::initialize_jwt_keys(private_key, public_key),
        (None, Some(public_key)) => {
            tracing::warn!("JWT_PRIVATE_KEY_PEM not set; signup and login are disabled");
            jwt::initialize_jwt_validation_only(public_key)
        }
        (_, None) => {
            tracing::warn!(
                "JWT_PUBLIC_KEY_PEM not set; requests carrying a bearer token will be rejected"
            );
            return Ok(());
        }
    };

    result.map_err(|err| {
        io::Error::new(
            io::ErrorKind::Other,
            format!("Failed to initialize JWT keys: {err}"),
        )
    })
}

async fn connect_database(config: &Config) -> io::Result<PgPool> {
    let db_cfg = DbPoolConfig::from_env(SERVICE_NAME, &config.database.url)
        .with_min_capacity(config.database.max_connections);
    db_cfg.log_config();

    let pool = create_pg_pool(db_cfg).await.map_err(|e| {
        io::Error::new(
            io::ErrorKind::ConnectionRefused,
            format!("Failed to create database pool: {}", e),
        )
    })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {}", e)))?;

    tracing::info!("Database connected and migrations applied");
    Ok(pool)
}

async fn run_healthcheck(port: u16) -> io::Result<()> {
    let url = format!("http://127.0.0.1:{}/api/v1/health", port);
    match reqwest::Client::new().get(&url).send().await {
        Ok(resp) if resp.status().is_success() => Ok(()),
        Ok(resp) => {
            eprintln!("healthcheck HTTP status: {}", resp.status());
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck failed"))
        }
        Err(e) => {
            eprintln!("healthcheck HTTP error: {}", e);
            Err(io::Error::new(io::ErrorKind::Other, "healthcheck error"))
        }
    }
}

/// `create-group <slug> <title> [description]`
async fn run_create_group(config: &Config, args: &[String]) -> io::Result<()> {
    let form = match (args.first(), args.get(1)) {
        (Some(slug), Some(title)) => GroupForm {
            slug: slug.clone(),
            title: title.clone(),
            description: args.get(2).cloned().unwrap_or_default(),
        },
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "usage: blog-service create-group <slug> <title> [description]",
            ))
        }
    };

    let form = form
        .clean()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;

    let pool = connect_database(config).await?;
    let group = group_repo::create_group(&pool, &form.title, &form.slug, &form.description)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Failed to create group: {}", e)))?;

    tracing::info!(group_id = %group.id, slug = %group.slug, "group created");
    println!("{}", group.id);
    Ok(())
}

/// Blog Service
///
/// Serves the Yatube blog: paginated post feeds, group pages, author
/// profiles, post detail, and authenticated create/edit of posts.
///
/// # Routes
///
/// - `/api/v1/posts`, `/api/v1/posts/{post_id}`, `/api/v1/posts/{post_id}/edit`
/// - `/api/v1/group/{slug}`, `/api/v1/groups`
/// - `/api/v1/profile/{username}`
/// - `/api/v1/create`
/// - `/api/v1/auth/signup`, `/api/v1/auth/login`
///
/// # Sub-commands
///
/// - `healthcheck` probes the running server, for container health checks
/// - `create-group <slug> <title> [description]` adds a group
#[actix_web::main]
async fn main() -> io::Result<()> {
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().skip(1).collect();

    if args.first().map(String::as_str) == Some("healthcheck") {
        let port = std::env::var("BLOG_SERVICE_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        return run_healthcheck(port).await;
    }

    init_tracing();

    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {:#}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if args.first().map(String::as_str) == Some("create-group") {
        return run_create_group(&config, &args[1..]).await;
    }

    tracing::info!("Starting {} v{}", SERVICE_NAME, env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    init_jwt(&config)?;

    let db_pool = connect_database(&config).await?;

    let repo: Arc<dyn BlogRepository> = Arc::new(PgBlogRepository::new(db_pool.clone()));
    let post_service = web::Data::new(PostService::new(
        repo.clone(),
        config.blog.posts_per_page,
    ));
    let auth_service = web::Data::new(AuthService::new(repo));
    let pool_data = web::Data::new(db_pool.clone());
    let allowed_origins = config.cors.allowed_origins.clone();

    let http_bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", http_bind_address);

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else if !origin.is_empty() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors
            .allow_any_method()
            .allow_any_header()
            .expose_headers(vec![actix_web::http::header::LOCATION])
            .max_age(3600);

        App::new()
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url(ApiDoc::openapi_json_path(), ApiDoc::openapi()),
            )
            .app_data(pool_data.clone())
            .app_data(post_service.clone())
            .app_data(auth_service.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/metrics", web::get().to(blog_service::metrics::serve_metrics))
            .route("/api/v1/health", web::get().to(health_summary))
            .route("/api/v1/health/ready", web::get().to(readiness_summary))
            .route("/api/v1/health/live", web::get().to(liveness_check))
            .service(
                web::scope(API_PREFIX)
                    .wrap(middleware::JwtAuthMiddleware)
                    .wrap(middleware::MetricsMiddleware)
                    .configure(handlers::configure),
            )
    })
    .bind(&http_bind_address)?
    .disable_signals()
    .run();

    let server_handle = server.handle();
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let result = tokio::select! {
        result = server => result,
        _ = &mut shutdown => {
            tracing::info!("Shutdown signal received");
            server_handle.stop(true).await;
            Ok(())
        }
    };

    db_pool.close().await;
    tracing::info!("Blog-service shutting down");
    result
}
