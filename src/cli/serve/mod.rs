//! Development static file server.
//!
//! ```text
//! request ─► log ─► OPTIONS ─► 200, empty
//!                 ─► not GET ─► 405
//!                 ─► GET ─► resolve ─► File      ─► 200 (JSON validated, else 500)
//!                                   ─► Forbidden ─► 403
//!                                   ─► NotFound  ─► 404
//! ```
//!
//! Requests run on a small thread pool. Ctrl+C unblocks the accept loop;
//! in-flight requests get a short grace period.

mod lifecycle;
pub mod path;
mod response;

pub use path::{Resolution, resolve};
pub use response::Reply;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel;
use tiny_http::{Method, Request, Server};

use crate::config::{ServeConfig, SiteConfig};
use crate::{debug, log, logger};

/// Request handler threads.
const WORKER_THREADS: usize = 4;

/// How long shutdown waits for in-flight requests.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Bind and serve until Ctrl+C.
pub fn serve_site(config: &SiteConfig) -> Result<()> {
    let (server, addr) = lifecycle::bind_with_retry(config.serve.interface, config.serve.port)?;
    let server = Arc::new(server);
    lifecycle::register_server_for_shutdown(Arc::clone(&server));

    log!("serve"; "http://{}", addr);
    for mapping in &config.serve.mappings {
        debug!("serve"; "{} -> {}", mapping.prefix, config.root_relative(&mapping.dir).display());
    }

    run_request_loop(&server, Arc::new(config.serve.clone()))?;
    log!("serve"; "stopped");
    Ok(())
}

fn run_request_loop(server: &Server, serve: Arc<ServeConfig>) -> Result<()> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(WORKER_THREADS)
        .build()
        .context("failed to create request thread pool")?;

    // Each request holds a sender; the channel disconnects when all are done.
    let (done_tx, done_rx) = channel::bounded::<()>(0);

    for request in server.incoming_requests() {
        let serve = Arc::clone(&serve);
        let done = done_tx.clone();
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &serve) {
                log!("serve"; "request error: {e}");
            }
            drop(done);
        });
    }

    drop(done_tx);
    lifecycle::wait_for_requests(&done_rx, DRAIN_TIMEOUT);
    Ok(())
}

fn handle_request(request: Request, serve: &ServeConfig) -> Result<()> {
    logger::request_line(&request.method().to_string(), request.url());

    let reply = if crate::core::is_shutdown() {
        Reply::unavailable()
    } else {
        reply_for(request.method(), request.url(), serve)
    };
    reply.send(request)
}

/// Build the reply for one request.
pub fn reply_for(method: &Method, url: &str, serve: &ServeConfig) -> Reply {
    match method {
        Method::Options => return Reply::empty(),
        Method::Get => {}
        _ => return Reply::method_not_allowed(),
    }

    match resolve(url, serve) {
        Resolution::File(path) => Reply::file(&path),
        Resolution::Forbidden => {
            log!("serve"; "blocked traversal attempt: {}", url);
            Reply::forbidden()
        }
        Resolution::NotFound(request_path) => {
            debug!("serve"; "not found: {}", request_path);
            Reply::not_found(&request_path)
        }
    }
}
