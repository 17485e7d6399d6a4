//! Loading a live page into a `PageSnapshot`.
//!
//! Only what a script inside the page could see is kept: the HTML and the
//! cookies that are not `HttpOnly`. Response headers are not carried over.

use reqwest::header::SET_COOKIE;

use crate::collector::PageSnapshot;
use crate::config::MAX_RESPONSE_BODY_SIZE;
use crate::error_handling::FetchError;

/// Fetches `url` and returns the page as seen from inside it.
///
/// The snapshot URL is the final URL after redirects. The body is read in
/// chunks and the download stops at `MAX_RESPONSE_BODY_SIZE`, cutting at a
/// character boundary.
///
/// # Errors
///
/// Returns `FetchError::Http` for transport failures and
/// `FetchError::Status` for non-success responses.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<PageSnapshot, FetchError> {
    let response = client.get(url).send().await?;
    let final_url = response.url().to_string();
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: final_url,
            status: status.as_u16(),
        });
    }

    let set_cookies: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();
    let cookies = script_visible_cookies(set_cookies.iter().map(String::as_str));

    let html = read_capped(response, MAX_RESPONSE_BODY_SIZE, &final_url).await?;

    Ok(PageSnapshot::new(final_url, html, cookies))
}

/// Reads at most `cap` bytes of the body, stopping the download there.
async fn read_capped(
    mut response: reqwest::Response,
    cap: usize,
    url: &str,
) -> Result<String, reqwest::Error> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await? {
        let room = cap - body.len();
        if chunk.len() > room {
            body.extend_from_slice(&chunk[..room]);
            log::debug!("Truncating body of {} at {} bytes", url, cap);
            break;
        }
        body.extend_from_slice(&chunk);
    }
    Ok(decode_body(body))
}

/// UTF-8 decode, dropping a multi-byte character cut off by the size cap.
fn decode_body(mut body: Vec<u8>) -> String {
    if let Err(e) = std::str::from_utf8(&body) {
        if e.error_len().is_none() {
            body.truncate(e.valid_up_to());
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Builds a `document.cookie` style string from `Set-Cookie` header values,
/// leaving out `HttpOnly` cookies.
pub fn script_visible_cookies<'a>(set_cookies: impl IntoIterator<Item = &'a str>) -> String {
    set_cookies
        .into_iter()
        .filter_map(|header| {
            let mut parts = header.split(';').map(str::trim);
            let pair = parts.next().filter(|p| p.contains('='))?;
            let http_only = parts.any(|attr| attr.eq_ignore_ascii_case("httponly"));
            (!http_only).then(|| pair.to_string())
        })
        .collect::<Vec<_>>()
        .join("; ")
}
