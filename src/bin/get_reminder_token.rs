use sms_reminder::components::google_calendar::token::{TokenManager, SCOPES};
use sms_reminder::config::GoogleOAuthConfig;
use sms_reminder::error::{other_error, ReminderResult};
use url::Url;

const REDIRECT_URI: &str = "http://localhost:8080";
const LISTEN_ADDR: &str = "127.0.0.1:8080";

#[tokio::main(flavor = "current_thread")]
async fn main() -> miette::Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> ReminderResult<()> {
    // Only the Google client settings are needed to authorize
    let oauth = GoogleOAuthConfig::load()?;
    let token_manager = TokenManager::new(&oauth, reqwest::Client::new());

    // Random state to match the callback with this request
    let state = uuid::Uuid::new_v4().to_string();

    let mut auth_url = Url::parse("https://accounts.google.com/o/oauth2/v2/auth")
        .map_err(|e| other_error(&format!("Failed to parse URL: {}", e)))?;
    auth_url
        .query_pairs_mut()
        .append_pair("client_id", &oauth.client_id)
        .append_pair("redirect_uri", REDIRECT_URI)
        .append_pair("response_type", "code")
        .append_pair("access_type", "offline")
        .append_pair("prompt", "consent")
        .append_pair("scope", &SCOPES.join(" "))
        .append_pair("state", &state);

    println!("Opening browser for Google authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Could not open a browser, visit this URL:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http(LISTEN_ADDR)
        .map_err(|e| other_error(&format!("Failed to listen on {}: {}", LISTEN_ADDR, e)))?;
    println!("Waiting for authorization callback...");

    let request = server.recv()?;
    let callback = Url::parse(&format!("{}{}", REDIRECT_URI, request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    };

    if param("state").as_deref() != Some(state.as_str()) {
        request.respond(
            tiny_http::Response::from_string("State mismatch.")
                .with_status_code(tiny_http::StatusCode(400)),
        )?;
        return Err(other_error("State in callback does not match the request"));
    }
    let code =
        param("code").ok_or_else(|| other_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let token = token_manager.exchange_code(&code, REDIRECT_URI).await?;
    if token.refresh_token.is_none() {
        println!("Warning: no refresh token received, a new consent will be needed when this one expires.");
    }
    token_manager.save(&token).await?;

    request.respond(tiny_http::Response::from_string(
        "Authorization successful! You can close this window.",
    ))?;

    println!("Token saved to {}", token_manager.token_path().display());

    Ok(())
}
