//! Shareable permalinks for the active code.
//!
//! The code travels in the URL fragment as unpadded URL-safe base64, so it
//! never reaches a server.

use anyhow::Context;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;

/// Receives finished permalinks (clipboard, dialog, IPC host...).
pub trait ShareTarget {
    fn share(&mut self, url: &str) -> anyhow::Result<()>;
}

pub fn permalink(base_url: &str, code: &str) -> String {
    let base = base_url.split('#').next().unwrap_or(base_url);
    format!("{}#{}", base, URL_SAFE_NO_PAD.encode(code.as_bytes()))
}

pub fn decode_permalink(url: &str) -> anyhow::Result<String> {
    let (_, fragment) = url
        .split_once('#')
        .context("Permalink has no code fragment")?;
    let bytes = URL_SAFE_NO_PAD
        .decode(fragment)
        .context("Permalink fragment is not valid base64")?;
    String::from_utf8(bytes).context("Permalink code is not valid UTF-8")
}
