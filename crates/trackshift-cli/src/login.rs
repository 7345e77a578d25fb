//! Interactive browser login for one account.
//!
//! 1. Asks the core for an authorization URL
//! 2. Opens the browser and listens on the redirect address
//! 3. Hands the returned code + state back to the core for completion

use std::io::{Read, Write};
use std::net::TcpListener;

use url::Url;

use trackshift_core::{AccountType, Authenticator, LoginOutcome, SessionStore};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Run the full login flow for `account`, installing the session into
/// `store` on success.
pub async fn login(
    auth: &mut Authenticator,
    store: &mut SessionStore,
    account: AccountType,
    redirect_uri: &str,
) -> CliResult<LoginOutcome> {
    let request = auth.begin_authorization(account)?;

    // Bind before opening the browser so the redirect cannot race us.
    let listener = TcpListener::bind(callback_addr(redirect_uri)?)?;

    println!("Authorize the {account} account in your browser...");
    if open::that(&request.url).is_err() {
        println!("Could not open a browser. Visit this URL manually:\n{}", request.url);
    }

    let (code, state) = wait_for_callback(&listener)?;
    drop(listener);

    let outcome = auth.complete_authorization(store, &code, &state).await?;
    println!(
        "Connected {} account as {}",
        outcome.account, outcome.profile.display_name
    );
    Ok(outcome)
}

/// Listen address derived from the configured redirect URI.
fn callback_addr(redirect_uri: &str) -> CliResult<String> {
    let url = Url::parse(redirect_uri)?;
    let host = url.host_str().ok_or("redirect_uri has no host")?;
    let port = url
        .port_or_known_default()
        .ok_or("redirect_uri has no port")?;
    Ok(format!("{host}:{port}"))
}

/// Accept one connection and extract the callback parameters.
fn wait_for_callback(listener: &TcpListener) -> CliResult<(String, String)> {
    let (mut stream, _) = listener.accept()?;
    let mut buf = [0u8; 4096];
    let n = stream.read(&mut buf)?;
    let request = String::from_utf8_lossy(&buf[..n]);

    let params = parse_callback_params(&request).ok_or("malformed callback request")?;

    let response = "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html><body><h2>Account connected.</h2><p>You can close this tab and return to the terminal.</p></body></html>";
    stream.write_all(response.as_bytes())?;
    drop(stream);

    if let Some(error) = params.error {
        return Err(format!("authorization failed: {error}").into());
    }
    match (params.code, params.state) {
        (Some(code), Some(state)) => Ok((code, state)),
        _ => Err("missing code or state in callback".into()),
    }
}

#[derive(Debug, Default)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

fn parse_callback_params(request: &str) -> Option<CallbackParams> {
    let first_line = request.lines().next()?;
    let path = first_line.split_whitespace().nth(1)?;
    let url = Url::parse(&format!("http://localhost{path}")).ok()?;

    let mut params = CallbackParams::default();
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "code" => params.code = Some(value.into_owned()),
            "state" => params.state = Some(value.into_owned()),
            "error" => params.error = Some(value.into_owned()),
            _ => {}
        }
    }
    Some(params)
}
