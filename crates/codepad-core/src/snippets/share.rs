use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use tracing::warn;
use url::Url;

use crate::error::Result;

pub const CODE_PARAM: &str = "code";

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

/// Link that reopens `code` in the playground: `base` without its query or
/// fragment, plus `?code=<encoded source>`.
pub fn share_url(base: &str, code: &str) -> Result<String> {
    let mut url = Url::parse(base)?;
    url.set_query(None);
    url.set_fragment(None);
    Ok(format!("{url}?{CODE_PARAM}={}", encode_component(code)))
}

/// Source text carried by a share link, if any.
pub fn code_from_url(link: &str) -> Option<String> {
    let url = match Url::parse(link) {
        Ok(url) => url,
        Err(e) => {
            warn!(error = %e, "failed to load shared code");
            return None;
        }
    };
    let raw = url
        .query()?
        .split('&')
        .filter_map(|pair| pair.split_once('=').or(Some((pair, ""))))
        .find(|(key, _)| *key == CODE_PARAM)
        .map(|(_, value)| value.to_string())?;
    if raw.is_empty() {
        return None;
    }

    // '+' stands for a space in form-encoded queries
    let raw = raw.replace('+', " ");
    match percent_decode_str(&raw).decode_utf8() {
        Ok(code) => Some(code.into_owned()),
        Err(e) => {
            warn!(error = %e, "failed to load shared code");
            None
        }
    }
}
