use std::env;
use std::sync::Arc;

use dotenvy::dotenv;
use kaiwa::LLMClient;
use kaiwa::Message;
use kaiwa::http::reqwest::ReqwestTransport;

#[tokio::test]
#[ignore = "requires valid OpenAI-compatible endpoint"]
async fn chat_completion_basic_dialog_live() {
    dotenv().ok();
    let Some((client, model)) = build_client_from_env() else {
        return;
    };

    let completion = client
        .get_completion(
            model,
            vec![
                Message::system("You are a helpful assistant."),
                Message::user("Please introduce Rust language in one sentence."),
            ],
        )
        .await
        .expect("live completion should succeed");

    assert!(!completion.id.is_empty(), "response must carry an id");
    assert!(
        !completion.choices.is_empty(),
        "live endpoint should return at least one choice"
    );
    assert!(
        !completion.choices[0].message.content.is_empty(),
        "assistant reply should not be empty"
    );
}

fn build_client_from_env() -> Option<(LLMClient, String)> {
    let Some(endpoint) = load_env_var("CHAT_ENDPOINT") else {
        eprintln!("skip live test: CHAT_ENDPOINT missing");
        return None;
    };
    let Some(api_key) = load_env_var("CHAT_KEY") else {
        eprintln!("skip live test: CHAT_KEY missing");
        return None;
    };
    let Some(model) = load_env_var("CHAT_MODEL") else {
        eprintln!("skip live test: CHAT_MODEL missing");
        return None;
    };

    let transport = Arc::new(ReqwestTransport::default());
    let client = LLMClient::new(transport, api_key).with_base_url(endpoint);
    Some((client, model))
}

fn load_env_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
