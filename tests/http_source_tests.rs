//! Coordinate sidecars fetched over HTTP from a local test server.

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use time_capsule_lib::models::archive_types::Coordinate;
use time_capsule_lib::services::coordinates::{
    resolve, CoordinateCache, CoordinateLoader, CoordinateSource, HttpSource,
};

/// Minimal static responder: one request per connection, `Connection: close`.
async fn serve(routes: Vec<(&'static str, u16, &'static str)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();

                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, *b))
                    .unwrap_or((404, "not found"));
                let reason = match status {
                    200 => "OK",
                    404 => "Not Found",
                    _ => "Internal Server Error",
                };
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason,
                    body.len(),
                    body
                );
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    format!("http://{}", addr)
}

fn source(origin: &str) -> HttpSource {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    HttpSource::with_client(client, origin, "/TimeCapsule/")
}

#[tokio::test]
async fn resolves_sidecar_under_base_path() {
    let origin = serve(vec![(
        "/TimeCapsule/images/Gleason/coordinates.txt",
        200,
        "43.084579,-77.674778",
    )])
    .await;
    let source = source(&origin);

    assert_eq!(
        source.fetch("Gleason").await.unwrap().as_deref(),
        Some("43.084579,-77.674778")
    );
    assert_eq!(
        resolve(&source, "Gleason").await,
        Some(Coordinate::new(43.084579, -77.674778))
    );
}

#[tokio::test]
async fn not_found_and_server_errors_are_misses() {
    let origin = serve(vec![
        ("/TimeCapsule/images/Gleason/coordinates.txt", 200, "43.08,-77.67"),
        ("/TimeCapsule/images/Broken/coordinates.txt", 500, "oops"),
        ("/TimeCapsule/images/Garbled/coordinates.txt", 200, "abc,def"),
    ])
    .await;
    let source = source(&origin);

    assert_eq!(source.fetch("Building-A").await.unwrap(), None);
    assert!(source.fetch("Broken").await.is_err());

    let cache = CoordinateCache::new();
    let ids = ["Gleason", "Building-A", "Broken", "Garbled"].map(String::from);
    let resolved = CoordinateLoader::new(source, 4).load_all(ids, &cache).await;

    assert_eq!(resolved, 1);
    assert_eq!(cache.get("Gleason"), Some(Coordinate::new(43.08, -77.67)));
    assert_eq!(cache.get("Building-A"), None);
}

#[tokio::test]
async fn unreachable_origin_is_a_miss() {
    // Bind then drop to get a port with nothing listening.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let origin = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    assert_eq!(resolve(&source(&origin), "Gleason").await, None);
}
