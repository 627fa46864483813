//! Review server endpoints over a bound local port.

mod helpers;

use std::net::SocketAddr;

use tempfile::TempDir;

use geolocate_batch::review::import::import_csv;
use geolocate_batch::review::{create_output_table, review_router, ReviewState, ReviewTables};
use geolocate_batch::storage::{init_db_pool_with_path, DbPool};
use helpers::write_file;

const BATCH_OUTPUT: &str = "\
locality,country,stateProvince,county,geolocate_LocalityID,geolocate_ResultID,geolocate_Latitude,geolocate_Longitude,geolocate_UncertaintyRadiusMeters,geolocate_UncertaintyPolygon,geolocate_Score,geolocate_Precision,geolocate_ParsePattern,geolocate_locFieldUsed,geolocate_NumResults
Lawrence,USA,Kansas,Douglas,1,1,38.9717,-95.2353,500,,88,High,LAWRENCE,locality,1
Atlantis,USA,Kansas,,2,,,,,,,,,,0
";

async fn start(dir: &TempDir) -> (SocketAddr, DbPool) {
    let csv = write_file(dir.path(), "batch.csv", BATCH_OUTPUT);
    let pool = init_db_pool_with_path(&dir.path().join("review.db")).await.unwrap();
    import_csv(&pool, &csv, "geocoded").await.unwrap();
    create_output_table(&pool, "approved").await.unwrap();

    let tables = ReviewTables {
        input_table: "geocoded".into(),
        output_table: "approved".into(),
        country_column: "country".into(),
        state_column: "stateProvince".into(),
        county_column: "county".into(),
        locality_columns: vec!["locality".into()],
    };
    let app = review_router(ReviewState::new(pool.clone(), tables));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, pool)
}

fn pairs(body: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(body.as_bytes()).into_owned().collect()
}

#[tokio::test]
async fn test_review_cycle() {
    let dir = TempDir::new().unwrap();
    let (addr, pool) = start(&dir).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("http://{addr}/getrec"))
        .send()
        .await
        .unwrap();
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );
    let record = pairs(&response.text().await.unwrap());
    let keys: Vec<&str> = record.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        ["k", "locality", "country", "state", "county", "lid", "rid", "points"]
    );
    assert_eq!(record[0].1, "0");
    assert_eq!(record[1].1, "Lawrence");
    assert_eq!(record[5].1, "1");
    assert_eq!(record[7].1, "38.9717|-95.2353|LAWRENCE|High(88)|500");

    let saved = client
        .post(format!("http://{addr}/save"))
        .form(&[
            ("lid", "1"),
            ("rid", "1"),
            ("lat", "38.97"),
            ("lon", "-95.24"),
            ("u", "750"),
            ("p", ""),
        ])
        .send()
        .await
        .unwrap();
    assert!(saved.status().is_success());
    assert_eq!(saved.text().await.unwrap(), "0");

    let approved: (String, String, String) = sqlx::query_as(
        "SELECT latitude, uncertaintyRadiusMeters, CAST(geolocate_LocalityID AS TEXT) FROM approved",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(
        approved,
        ("38.97".to_string(), "750".to_string(), "1".to_string())
    );

    let done = client
        .get(format!("http://{addr}/getrec"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(done, "locality=End of Data Reached");
}

#[tokio::test]
async fn test_invalid_save_is_rejected() {
    let dir = TempDir::new().unwrap();
    let (addr, pool) = start(&dir).await;

    let response = reqwest::Client::new()
        .post(format!("http://{addr}/save"))
        .form(&[("lid", "1"), ("rid", "1"), ("lat", "north"), ("lon", "-95")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "*"
    );

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM approved")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_review_page_and_preflight() {
    let dir = TempDir::new().unwrap();
    let (addr, _pool) = start(&dir).await;
    let client = reqwest::Client::new();

    let page = client
        .get(format!("http://{addr}/geolocate"))
        .send()
        .await
        .unwrap();
    assert!(page.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
    assert!(page.text().await.unwrap().contains("getrec"));

    let preflight = client
        .request(reqwest::Method::OPTIONS, format!("http://{addr}/save"))
        .send()
        .await
        .unwrap();
    assert!(preflight.status().is_success());
    assert_eq!(
        preflight.headers()["access-control-allow-methods"],
        "GET, POST, PUT, OPTIONS"
    );
}
