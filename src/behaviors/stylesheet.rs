use tracing::debug;

use crate::Result;
use crate::host::Host;

/// Id of the injected `<style>` element; its presence marks the sheet as
/// already installed.
pub const STYLE_ELEMENT_ID: &str = "page-enhancer-styles";

/// Rules for the tooltip and the progress widget.
pub const STYLESHEET: &str = r#"
.custom-tooltip {
    position: absolute;
    background: rgba(0, 0, 0, 0.9);
    color: white;
    padding: 8px 12px;
    border-radius: 6px;
    font-size: 12px;
    z-index: 1000;
    opacity: 0;
    transition: opacity 0.3s;
    pointer-events: none;
    max-width: 200px;
    word-wrap: break-word;
}

.progress-bar {
    position: fixed;
    top: 20px;
    right: 20px;
    background: white;
    padding: 15px 20px;
    border-radius: 10px;
    box-shadow: 0 4px 20px rgba(0, 0, 0, 0.15);
    z-index: 1000;
    min-width: 250px;
}

.progress-fill {
    height: 4px;
    background: linear-gradient(90deg, #667eea, #764ba2);
    border-radius: 2px;
    animation: progressFill 3s ease-in-out;
}

.progress-text {
    display: block;
    margin-top: 8px;
    font-size: 14px;
    color: #333;
    font-weight: 500;
}

@keyframes progressFill {
    0% { width: 0%; }
    50% { width: 70%; }
    100% { width: 100%; }
}
"#;

/// Installs [`STYLESHEET`] unless a previous run already did. Returns whether
/// a new block was appended.
pub fn inject<H: Host>(host: &mut H) -> Result<bool> {
    if host.query_first(&format!("#{STYLE_ELEMENT_ID}"))?.is_some() {
        debug!("stylesheet already installed");
        return Ok(false);
    }
    host.inject_style(STYLE_ELEMENT_ID, STYLESHEET)?;
    Ok(true)
}
