use studypal::assistant::{AssistantClient, GeminiClient};
use studypal::config::GeminiConfig;

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_gemini_replies() {
    dotenvy::dotenv().ok();

    let config = GeminiConfig::new_from_env().expect("GEMINI_API_KEY must be set");
    let client = GeminiClient::new(config).expect("Failed to build client");

    let reply = client
        .reply("In one sentence, what is photosynthesis?", &[])
        .await
        .expect("Failed to get reply");

    println!("Gemini replied: {}", reply);
    assert!(!reply.trim().is_empty());
}
