//! Preview server with on-demand post rendering

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cms::{CmsClient, ErrorKind};
use crate::generator::{is_routable_uid, post_output_path, post_path, Generator};
use crate::resolver::PostPageResolver;
use crate::Site;

/// Server state
pub struct ServerState {
    public_dir: PathBuf,
    generator: Generator,
    resolver: PostPageResolver,
}

impl ServerState {
    pub fn new(site: &Site, cms: Arc<dyn CmsClient>) -> Result<Self> {
        let generator = Generator::new(site, cms)?;
        let resolver = generator.resolver();
        Ok(Self {
            public_dir: site.public_dir.clone(),
            generator,
            resolver,
        })
    }
}

/// Build the router
pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/post/:uid", get(post_handler))
        .route("/post/:uid/", get(post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the preview server
pub async fn start(
    site: &Site,
    cms: Arc<dyn CmsClient>,
    ip: &str,
    port: u16,
    open: bool,
) -> Result<()> {
    let state = Arc::new(ServerState::new(site, cms)?);
    let app = router(state);

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let url = format!("http://{}:{}", ip, port);
    println!("Server running at {}", url);
    println!("Press Ctrl+C to stop.");

    if open {
        if let Err(e) = open_browser(&url) {
            tracing::warn!("Failed to open browser: {}", e);
        }
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve a generated post, resolving it from the CMS when it was not
/// generated ahead of time
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
) -> Response {
    let (status, html) = render_post_page(&state, &uid).await;
    (status, Html(html)).into_response()
}

/// Status and HTML for `/post/<uid>/`
pub async fn render_post_page(state: &ServerState, uid: &str) -> (StatusCode, String) {
    if !is_routable_uid(uid) {
        return not_found_page(state);
    }

    let path = post_output_path(&state.public_dir, uid);
    if let Ok(html) = tokio::fs::read_to_string(&path).await {
        return (StatusCode::OK, html);
    }

    tracing::info!("Resolving post {} on demand", uid);
    match state.resolver.resolve(uid).await {
        Ok(detail) => match state.generator.write_post_page(&detail) {
            Ok(html) => (StatusCode::OK, html),
            Err(e) => {
                tracing::error!("Failed to write post {}: {}", uid, e);
                page_or_plain(StatusCode::OK, state.generator.render_post(&detail))
            }
        },
        Err(e) => match e.kind() {
            ErrorKind::NotFound => {
                tracing::info!("Post {} not found", uid);
                not_found_page(state)
            }
            ErrorKind::Upstream => {
                tracing::error!("Failed to resolve post {}: {}", uid, e);
                page_or_plain(
                    StatusCode::BAD_GATEWAY,
                    state.generator.render_upstream_error(&post_path(uid)),
                )
            }
        },
    }
}

fn not_found_page(state: &ServerState) -> (StatusCode, String) {
    page_or_plain(StatusCode::NOT_FOUND, state.generator.render_not_found())
}

fn page_or_plain(status: StatusCode, page: Result<String>) -> (StatusCode, String) {
    match page {
        Ok(html) => (status, html),
        Err(e) => {
            tracing::error!("Template error: {}", e);
            (status, status.to_string())
        }
    }
}

/// Fallback handler that serves files from the public directory
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) if response.status() == StatusCode::NOT_FOUND => {
            let (status, html) = not_found_page(&state);
            (status, Html(html)).into_response()
        }
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}

/// Open a URL in the default browser
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open").arg(url).spawn()?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open").arg(url).spawn()?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/c", "start", url])
            .spawn()?;
    }

    Ok(())
}
