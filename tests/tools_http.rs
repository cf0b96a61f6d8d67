use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use stepgraph::tools::{Tool, ToolRegistry, WeatherTool, WikipediaSummaryTool, WorldTimeTool};

#[tokio::test]
async fn weather_geocodes_then_fetches_current_conditions() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Tokyo"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "name": "Tokyo",
                    "admin1": "Tokyo",
                    "country": "Japan",
                    "latitude": 35.6895,
                    "longitude": 139.6917
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": {
                "temperature_2m": 21.4,
                "weather_code": 2,
                "wind_speed_10m": 9.3
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WeatherTool::with_base_urls(
        format!("{}/v1/search", server.uri()),
        format!("{}/v1/forecast", server.uri()),
    );
    let output = tool
        .invoke(&json!({"location": "Tokyo"}))
        .await
        .expect("weather lookup should succeed");

    assert_eq!(output["location_input"], "Tokyo");
    assert_eq!(output["location_resolved"], "Tokyo, Tokyo, Japan");
    assert_eq!(output["current"]["temperature_2m"], 21.4);
    server.verify().await;
}

#[tokio::test]
async fn weather_unknown_location_is_fatal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&server)
        .await;

    let tool = WeatherTool::with_base_urls(
        format!("{}/v1/search", server.uri()),
        format!("{}/v1/forecast", server.uri()),
    );
    let err = tool
        .invoke(&json!({"location": "Atlantis"}))
        .await
        .expect_err("an unmatched location should fail");

    assert!(!err.is_transient());
    assert!(err.message.contains("Atlantis"));
}

#[tokio::test]
async fn wikipedia_summary_extracts_and_trims() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/Ada_Lovelace"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "title": "Ada Lovelace",
            "description": "English mathematician",
            "extract": "First sentence. Second sentence. Third sentence.",
            "content_urls": {
                "desktop": {"page": "https://en.wikipedia.org/wiki/Ada_Lovelace"}
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WikipediaSummaryTool::with_base_url(server.uri());
    let output = tool
        .invoke(&json!({"query": "Ada Lovelace", "sentences": 2}))
        .await
        .expect("summary lookup should succeed");

    assert_eq!(output["title"], "Ada Lovelace");
    assert_eq!(output["summary"], "First sentence. Second sentence.");
    assert_eq!(
        output["source_url"],
        "https://en.wikipedia.org/wiki/Ada_Lovelace"
    );
    server.verify().await;
}

#[tokio::test]
async fn world_time_returns_clock_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/timezone/Asia/Tokyo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timezone": "Asia/Tokyo",
            "datetime": "2024-05-01T09:30:00.000000+09:00",
            "utc_offset": "+09:00",
            "day_of_week": 3
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tool = WorldTimeTool::with_base_url(server.uri());
    let output = tool
        .invoke(&json!({"timezone": "Asia/Tokyo"}))
        .await
        .expect("time lookup should succeed");

    assert_eq!(output["timezone"], "Asia/Tokyo");
    assert_eq!(output["utc_offset"], "+09:00");
    server.verify().await;
}

#[tokio::test]
async fn registry_retries_transient_server_errors() {
    let server = MockServer::start().await;

    // First hit fails with a 5xx, the retry succeeds.
    Mock::given(method("GET"))
        .and(path("/api/timezone/UTC"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/timezone/UTC"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timezone": "UTC",
            "datetime": "2024-05-01T00:30:00.000000+00:00",
            "utc_offset": "+00:00",
            "day_of_week": 3
        })))
        .mount(&server)
        .await;

    let registry = ToolRegistry::new();
    let tool = WorldTimeTool::with_base_url(server.uri());

    let invocation = registry
        .invoke(&tool, &json!({"timezone": "UTC"}))
        .await
        .expect("second attempt should recover");

    assert_eq!(invocation.attempts, 2);
    assert_eq!(invocation.output["timezone"], "UTC");
}

#[tokio::test]
async fn registry_does_not_retry_client_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/rest_v1/page/summary/No_Such_Page"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let registry = ToolRegistry::new();
    let tool = WikipediaSummaryTool::with_base_url(server.uri());

    let failure = registry
        .invoke(&tool, &json!({"query": "No Such Page"}))
        .await
        .expect_err("a 404 should fail without retrying");

    assert_eq!(failure.attempts, 1);
    server.verify().await;
}
