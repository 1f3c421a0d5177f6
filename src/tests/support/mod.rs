// Shared test support code for integration tests.

use std::time::Duration;

/// Polls `url` until it answers `want` or `within` elapses.
/// Returns the last status and JSON body seen.
pub async fn wait_for_status(
    url: &str,
    want: u16,
    within: Duration,
) -> Result<(u16, serde_json::Value), reqwest::Error> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;
    let deadline = tokio::time::Instant::now() + within;

    loop {
        match client.get(url).send().await {
            Ok(resp) => {
                let status = resp.status().as_u16();
                let body = resp.json::<serde_json::Value>().await?;
                if status == want || tokio::time::Instant::now() >= deadline {
                    return Ok((status, body));
                }
            }
            Err(e) if tokio::time::Instant::now() >= deadline => return Err(e),
            Err(_) => {}
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
