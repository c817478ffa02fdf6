use actix_cors::Cors;
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, Responder, middleware, web};
use ege_checker::api::{AppState, configure_routes};
use ege_checker::{banner, config};
use rust_embed::RustEmbed;
use std::borrow::Cow;

#[derive(RustEmbed)]
#[folder = "static/"]
struct StaticAssets;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Print the startup banner
    banner::print_banner();

    if let Err(e) = dotenvy::dotenv() {
        eprintln!("⚠️  No .env file loaded ({}), using the process environment", e);
    }

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let app_config = config::AppConfig::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let bind = (app_config.host.clone(), app_config.port);

    let state = AppState::new(app_config);

    // Load eagerly so the first request does not pay for it; failures are recorded, not fatal.
    match state.models.get().await {
        Some(bundle) => println!("✅ Model ready: {} on {}", bundle.source, bundle.device),
        None => eprintln!(
            "❌ Model not loaded: {}",
            state.models.load_error().unwrap_or_default()
        ),
    }

    println!("🚀 Starting server...");
    println!("📊 Checker page available at http://{}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(configure_routes)
            .route("/{_:.*}", web::get().to(static_file_handler))
    })
    .bind(bind)?
    .run()
    .await
}

/// Embedded asset name for a request path; the root serves `index.html`.
fn asset_path(request_path: &str) -> &str {
    match request_path.trim_start_matches('/') {
        "" => "index.html",
        path => path,
    }
}

async fn static_file_handler(req: HttpRequest) -> impl Responder {
    let path = asset_path(req.path());

    match StaticAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            HttpResponse::Ok().content_type(mime.as_ref()).body(Cow::into_owned(content.data))
        }
        None => HttpResponse::NotFound().body("404 Not Found"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_paths_drop_leading_slashes() {
        assert_eq!(asset_path("/"), "index.html");
        assert_eq!(asset_path(""), "index.html");
        assert_eq!(asset_path("/index.html"), "index.html");
        assert_eq!(asset_path("//static//app.js"), "static//app.js");
    }

    #[test]
    fn index_page_is_embedded() {
        assert!(StaticAssets::get(asset_path("/")).is_some());
        assert!(StaticAssets::get(asset_path("/missing.css")).is_none());
    }
}
