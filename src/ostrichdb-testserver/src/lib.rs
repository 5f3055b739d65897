//! ostrichdb-testserver - an in-memory stand-in for the OstrichDB REST API
//!
//! Models the wire contract the client speaks (text listings, record lines,
//! status codes, bearer auth) without any persistence. Used by the client's
//! integration tests and for local development.
//!
//! ```rust,no_run
//! use ostrichdb_testserver::{spawn, TestServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> std::io::Result<()> {
//!     let base_url = spawn(TestServerConfig::default())?;
//!     println!("serving on {base_url}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod store;

pub use api::AppState;
pub use config::TestServerConfig;

use actix_web::{dev::Server, web, App, HttpServer};
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

/// Build the HTTP server on an already bound listener
pub fn run(listener: TcpListener, config: TestServerConfig) -> std::io::Result<Server> {
    let workers = config.workers.max(1);
    let app_state = web::Data::new(AppState::new(config));

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(TracingLogger::default())
            .configure(api::configure)
    })
    .workers(workers)
    .listen(listener)?
    .run();

    Ok(server)
}

/// Start a server on an ephemeral localhost port in the background of the
/// current tokio runtime and return its base URL
pub fn spawn(config: TestServerConfig) -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    let server = run(listener, config)?;
    tokio::spawn(server);
    tracing::debug!(%addr, "Test server spawned");
    Ok(format!("http://{addr}"))
}
