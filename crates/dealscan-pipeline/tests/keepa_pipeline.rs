//! End-to-end run against a mocked keyed provider.
//!
//! Exercises the real `KeepaClient` through `Pipeline::run`: input file on
//! disk, one GET per batch to a `wiremock` server, JSON written to a
//! temporary output root.

use std::num::NonZeroUsize;
use std::time::Duration;

use dealscan_catalog::client::build_http_client;
use dealscan_catalog::{CatalogClient, KeepaClient, LinkSettings, RateLimiter};
use dealscan_core::KeepaSettings;
use dealscan_pipeline::{Pipeline, PipelineOptions, RunStats, FINAL_ARTIFACT};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn keepa_client(server: &MockServer) -> CatalogClient {
    let http = build_http_client(5, "dealscan-test/0.1", None).expect("failed to build HTTP client");
    let settings = KeepaSettings {
        api_key: Some("test-key".to_owned()),
        domain: 1,
    };
    let client = KeepaClient::with_base_url(http, settings, 0, &server.uri())
        .expect("failed to build KeepaClient");
    CatalogClient::Keepa(client)
}

#[tokio::test]
async fn run_fetches_unique_identifiers_and_ranks_by_discount() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/product"))
        .and(query_param("asin", "B000111222,B000333444"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [
                {
                    "asin": "B000111222",
                    "title": "Stainless Kettle",
                    "imagesCSV": "kettle.jpg",
                    "stats": { "current": [2000, -1, -1, -1, 2500], "avg90": [] }
                },
                {
                    "asin": "B000333444",
                    "title": "Cast Iron Skillet",
                    "imagesCSV": "skillet.jpg",
                    "stats": { "current": [1000, -1, -1, -1, 4000], "avg90": [] }
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("input");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::write(
        input_dir.join("kitchen.txt"),
        "https://www.amazon.com/dp/B000111222\n\
         https://www.amazon.com/dp/B000333444?psc=1\n\
         https://www.amazon.com/gp/product/b000111222\n",
    )
    .unwrap();

    let options = PipelineOptions {
        input_dir,
        output_dir: dir.path().join("output"),
        batch_size: NonZeroUsize::new(100).unwrap(),
        links: LinkSettings {
            storefront_domain: "www.amazon.com".to_owned(),
            affiliate_tag: Some("deals-20".to_owned()),
        },
    };
    let mut pipeline = Pipeline::new(
        keepa_client(&server),
        RateLimiter::new(Duration::ZERO),
        options,
    );

    let stats = pipeline.run().await.expect("run succeeds");
    assert_eq!(
        stats,
        RunStats {
            sources: 1,
            identifiers: 2,
            duplicates: 1,
            unresolved: 0,
            batches: 1,
            records: 2,
            discounted: 2,
        }
    );

    let all: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("output").join(FINAL_ARTIFACT)).unwrap(),
    )
    .unwrap();
    let records = all.as_array().unwrap();
    // 75% off ranks ahead of 20% off.
    assert_eq!(records[0]["ASIN"], "B000333444");
    assert_eq!(records[0]["HasDiscount"], true);
    assert_eq!(records[0]["Current"].as_f64(), Some(10.0));
    assert_eq!(records[0]["Original"].as_f64(), Some(40.0));
    assert_eq!(records[0]["DiscountPct"].as_f64(), Some(75.0));
    assert_eq!(
        records[0]["Image"],
        "https://m.media-amazon.com/images/I/skillet.jpg"
    );
    assert_eq!(
        records[0]["AffiliateLink"],
        "https://www.amazon.com/dp/B000333444?tag=deals-20"
    );
    assert_eq!(records[0]["NeedCheckManually"], false);
    assert_eq!(records[1]["ASIN"], "B000111222");
    assert_eq!(records[1]["DiscountPct"].as_f64(), Some(20.0));

    assert!(dir
        .path()
        .join("output/kitchen/kitchen_1-2.json")
        .is_file());
}

#[tokio::test]
async fn provider_failure_aborts_the_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input_dir = dir.path().join("input");
    std::fs::create_dir_all(&input_dir).unwrap();
    std::fs::write(input_dir.join("a.txt"), "https://www.amazon.com/dp/B000111222\n").unwrap();

    let options = PipelineOptions {
        input_dir,
        output_dir: dir.path().join("output"),
        batch_size: NonZeroUsize::new(100).unwrap(),
        links: LinkSettings {
            storefront_domain: "www.amazon.com".to_owned(),
            affiliate_tag: None,
        },
    };
    let mut pipeline = Pipeline::new(
        keepa_client(&server),
        RateLimiter::new(Duration::ZERO),
        options,
    );

    let err = pipeline.run().await.expect_err("run must fail");
    assert!(
        err.to_string().contains("fetch failed for a identifiers 1-1"),
        "got: {err}"
    );
}
