use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::body::Incoming;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
// Import multipart-saver types.
use multipart_saver::{Config, Outcome};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

// A request handler which saves `multipart/form-data` uploads into the configured directory.
async fn handle(req: Request<Incoming>, config: Arc<Config>) -> Result<Response<Full<Bytes>>, Infallible> {
    match (req.method(), req.uri().path()) {
        (&Method::GET, "/info") => Ok(json_response(StatusCode::OK, r#"{"state":"ok"}"#.to_owned())),
        (&Method::POST, "/upload") => {
            let (parts, body) = req.into_parts();

            let body = match body.collect().await {
                Ok(collected) => collected.to_bytes(),
                Err(err) => {
                    log::warn!("failed to read body: {}", err);
                    return Ok(text_response(StatusCode::BAD_REQUEST, format!("failed to read body: {}", err)));
                }
            };

            // The decoder is blocking, keep it off the async workers.
            let outcome = tokio::task::spawn_blocking(move || {
                multipart_saver::process_upload(&parts.headers, &body[..], &config)
            })
            .await;

            let outcome = match outcome {
                Ok(outcome) => outcome,
                Err(err) => {
                    return Ok(text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string()));
                }
            };

            match &outcome {
                Outcome::Success { uploaded_files } => log::info!("upload finished, {} file(s) saved", uploaded_files.len()),
                Outcome::Error { description, .. } => log::warn!("upload failed: {}", description),
            }

            match outcome.to_json() {
                Ok(content) => Ok(json_response(StatusCode::OK, content)),
                Err(err) => Ok(text_response(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())),
            }
        }
        _ => Ok(text_response(StatusCode::NOT_FOUND, "not found".to_owned())),
    }
}

fn json_response(status: StatusCode, content: String) -> Response<Full<Bytes>> {
    let mut res = Response::new(Full::new(Bytes::from(content)));
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    res
}

fn text_response(status: StatusCode, content: String) -> Response<Full<Bytes>> {
    let mut res = Response::new(Full::new(Bytes::from(content)));
    *res.status_mut() = status;
    res.headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"));
    res
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let addr: SocketAddr = args.next().unwrap_or_else(|| "127.0.0.1:3000".to_owned()).parse()?;
    let upload_dir = args.next().unwrap_or_else(|| "uploads".to_owned());

    std::fs::create_dir_all(&upload_dir)?;
    let config = Arc::new(Config::new(upload_dir).skip_extra_part_headers(true));

    let listener = TcpListener::bind(addr).await?;
    log::info!("Server is running at: {}", addr);

    loop {
        let (stream, _) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let config = Arc::clone(&config);

        tokio::task::spawn(async move {
            let service = service_fn(move |req| handle(req, Arc::clone(&config)));

            if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                log::error!("server error: {}", err);
            }
        });
    }
}
