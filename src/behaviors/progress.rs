use crate::Result;
use crate::config::Classes;
use crate::host::Host;

/// Builds a detached progress widget: a bar holding an animated fill and a
/// status line. Every call returns a new node; placing and removing it is up
/// to the caller.
pub fn build<H: Host>(host: &mut H, classes: &Classes, message: &str) -> Result<H::Node> {
    let bar = host.create_element("div", &classes.progress_bar)?;
    let fill = host.create_element("div", &classes.progress_fill)?;
    let text = host.create_element("span", &classes.progress_text)?;
    host.set_text(&text, message)?;
    host.append_child(&bar, &fill)?;
    host.append_child(&bar, &text)?;
    Ok(bar)
}
