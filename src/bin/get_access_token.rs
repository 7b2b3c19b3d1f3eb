use meeting_prep::components::oauth::{OAuthClient, StateSigner};
use meeting_prep::config::Config;
use meeting_prep::error::{config_error, other_error, Error, PrepResult};
use url::Url;

/// Local redirect target registered for desktop use
const LOCAL_REDIRECT: &str = "http://localhost:8080";

#[tokio::main]
async fn main() -> miette::Result<()> {
    run().await?;
    Ok(())
}

async fn run() -> PrepResult<()> {
    // Load configuration
    let config = Config::load()?;

    let oauth = OAuthClient::from_config(&config, config.http_client()?)
        .ok_or_else(|| config_error("GOOGLE_CLIENT_ID and GOOGLE_CLIENT_SECRET must be set"))?
        .with_redirect_url(LOCAL_REDIRECT);

    // Signed state so a stray request to the listener is not accepted
    let signer = StateSigner::new(&config.oauth_state_secret);
    let state = signer.issue()?;
    let auth_url = oauth.authorization_url(&state)?;

    // Open browser for authorization
    println!("Opening browser for Google authorization...");
    if webbrowser::open(auth_url.as_str()).is_err() {
        println!("Could not open a browser, visit this URL instead:\n{}", auth_url);
    }

    // Start local server to receive the callback
    let server = tiny_http::Server::http("127.0.0.1:8080")
        .map_err(|e| other_error(&format!("Failed to start callback listener: {}", e)))?;
    println!("Waiting for authorization callback...");

    let request = server.recv()?;
    let callback = Url::parse(&format!("{}{}", LOCAL_REDIRECT, request.url()))
        .map_err(|e| other_error(&format!("Invalid callback URL: {}", e)))?;

    let param = |name: &str| {
        callback
            .query_pairs()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    };

    if let Some(reason) = param("error") {
        let _ = request.respond(tiny_http::Response::from_string("Authorization failed."));
        return Err(other_error(&format!("Authorization failed: {}", reason)));
    }

    let returned_state = param("state").ok_or(Error::Unauthorized)?;
    signer.verify(&returned_state)?;

    let code = param("code").ok_or_else(|| other_error("No authorization code found in callback"))?;

    // Exchange code for tokens
    let tokens = oauth.exchange_code(&code).await?;

    // Send success response to browser
    let response =
        tiny_http::Response::from_string("Authorization successful! You can close this window.");
    request.respond(response)?;

    println!("{}", serde_json::to_string_pretty(&tokens)?);
    println!("\nUse the accessToken as `Authorization: Bearer <token>` or set ACCESS_TOKEN for prep_cli.");

    Ok(())
}
