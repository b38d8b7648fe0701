use goto_token_cache::{ConfigLocation, TokenCache};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional: enable basic logging for the demo
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    // Reads GOTO_CLIENT_ID / GOTO_CLIENT_SECRET (and optional overrides) from the environment
    let cache = TokenCache::from_location(ConfigLocation::Env).await?;

    let first = cache.get_access_token().await?;
    let second = cache.get_access_token().await?;
    assert_eq!(first, second, "second call is served from the cache");

    if let Some(token) = cache.cached().await {
        println!("{}", serde_json::to_string_pretty(&token.to_snapshot())?);
    }
    Ok(())
}
