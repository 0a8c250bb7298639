//! Failure injection tests: dead, slow, and oversized upstreams.

use std::time::Duration;

use image_relay::http::ErrorBody;
use serde_json::json;

mod common;

#[tokio::test]
async fn test_unreachable_upstream_returns_500() {
    let dead = common::closed_port().await;
    let (relay, shutdown) = common::spawn_relay(common::loopback_config()).await;
    let client = common::client();

    let res = client
        .get(format!("http://{}/proxy-image", relay))
        .query(&[("url", format!("http://{}/a.png", dead))])
        .send()
        .await
        .expect("Relay unreachable");
    assert_eq!(res.status(), 500);
    assert_eq!(res.json::<ErrorBody>().await.unwrap().error, "Error fetching image");

    let res = client
        .post(format!("http://{}/download-image", relay))
        .json(&json!({ "imageUrl": format!("http://{}/a.png", dead) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(
        res.json::<ErrorBody>().await.unwrap().error,
        "Error downloading and converting image"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_upstream_timeout_returns_500() {
    let mut reply = common::MockReply::image("image/png", b"late");
    reply.delay = Duration::from_secs(3);
    let (upstream, _) = common::start_mock_upstream(reply).await;

    let mut config = common::loopback_config();
    config.upstream.timeout_secs = Some(1);
    let (relay, shutdown) = common::spawn_relay(config).await;

    let res = common::client()
        .get(format!("http://{}/proxy-image", relay))
        .query(&[("url", format!("http://{}/slow.png", upstream))])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(res.json::<ErrorBody>().await.unwrap().error, "Error fetching image");

    shutdown.trigger();
}

#[tokio::test]
async fn test_oversized_body_returns_500() {
    let (upstream, _) =
        common::start_mock_upstream(common::MockReply::image("image/png", &[7u8; 4096])).await;

    let mut config = common::loopback_config();
    config.upstream.max_body_bytes = Some(1024);
    let (relay, shutdown) = common::spawn_relay(config).await;
    let client = common::client();

    let res = client
        .post(format!("http://{}/download-image", relay))
        .json(&json!({ "imageUrl": format!("http://{}/big.png", upstream) }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 500);
    assert_eq!(
        res.json::<ErrorBody>().await.unwrap().error,
        "Error downloading and converting image"
    );

    shutdown.trigger();
}

#[tokio::test]
async fn test_body_under_limit_is_served() {
    let (upstream, _) =
        common::start_mock_upstream(common::MockReply::image("image/png", &[7u8; 512])).await;

    let mut config = common::loopback_config();
    config.upstream.max_body_bytes = Some(1024);
    let (relay, shutdown) = common::spawn_relay(config).await;

    let res = common::client()
        .get(format!("http://{}/proxy-image", relay))
        .query(&[("url", format!("http://{}/ok.png", upstream))])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.bytes().await.unwrap().len(), 512);

    shutdown.trigger();
}
