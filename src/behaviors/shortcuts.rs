use tracing::{debug, trace};
use unicode_normalization::UnicodeNormalization;

use crate::Result;
use crate::config::{ShortcutModifier, Shortcuts};
use crate::core_dom_utils::collapse_whitespace;
use crate::events::{Binding, EventKind, HostEvent, KeyPress, ListenTarget};
use crate::host::Host;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Generate,
    Download,
}

/// Document-level chords that click the generate and download buttons.
#[derive(Debug, Clone)]
pub struct ShortcutDispatcher {
    shortcuts: Shortcuts,
    generate_selector: String,
    download_selector: String,
}

impl ShortcutDispatcher {
    pub fn new(
        shortcuts: Shortcuts,
        generate_selector: impl Into<String>,
        download_selector: impl Into<String>,
    ) -> Self {
        Self {
            shortcuts,
            generate_selector: generate_selector.into(),
            download_selector: download_selector.into(),
        }
    }

    pub fn bind<H: Host>(&self, host: &mut H) -> Result<()> {
        host.listen(ListenTarget::Document, EventKind::KeyDown, Binding::Shortcut)
    }

    /// Maps a key press to an action. Keys compare exactly, so `"G"` with
    /// shift held is not the generate chord.
    pub fn action_for(&self, key: &KeyPress) -> Option<ShortcutAction> {
        let modifier_held = match self.shortcuts.modifier {
            ShortcutModifier::Ctrl => key.ctrl,
            ShortcutModifier::Meta => key.meta,
            ShortcutModifier::CtrlOrMeta => key.ctrl || key.meta,
        };
        if !modifier_held {
            return None;
        }
        if key.key == self.shortcuts.generate_key {
            Some(ShortcutAction::Generate)
        } else if key.key == self.shortcuts.download_key {
            Some(ShortcutAction::Download)
        } else {
            None
        }
    }

    pub fn on_key_down<H: Host>(&self, host: &mut H, event: &mut HostEvent<H::Node>) -> Result<()> {
        let Some(action) = event.key.as_ref().and_then(|key| self.action_for(key)) else {
            return Ok(());
        };
        event.prevent_default();

        let button = match action {
            ShortcutAction::Generate => self.generate_button(host)?,
            ShortcutAction::Download => host.query_first(&self.download_selector)?,
        };
        match button {
            Some(button) => {
                debug!(?action, "shortcut activates button");
                host.activate(&button);
            }
            None => trace!(?action, "shortcut has no button to activate"),
        }
        Ok(())
    }

    fn generate_button<H: Host>(&self, host: &H) -> Result<Option<H::Node>> {
        let label = normalize_label(&self.shortcuts.generate_label);
        Ok(host
            .query_all(&self.generate_selector)?
            .into_iter()
            .find(|button| normalize_label(&host.text_content(button)).contains(&label)))
    }
}

fn normalize_label(text: &str) -> String {
    collapse_whitespace(text).nfc().collect()
}
