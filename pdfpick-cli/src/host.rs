use arboard::Clipboard;
use pdfpick_core::{HostError, LinkClickEvent, ViewerHost};
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

/// A host callback, as reported by `pdfpick replay`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum HostCall {
    Clipboard { text: String },
    BeginDrag { text: String },
    LinkClick {
        target_page: Option<usize>,
        uri: Option<String>,
    },
    GoToPage { page: usize },
    OpenUri { uri: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HostOptions {
    /// Write copied text to the system clipboard.
    pub clipboard: bool,
    /// Hand link URIs to the platform opener.
    pub launch: bool,
    /// Block after copying until another application owns the clipboard
    /// contents. On Linux the contents vanish with the process otherwise.
    pub wait_for_handoff: bool,
}

impl HostOptions {
    /// A single copy right before the process exits.
    pub fn one_shot_copy() -> Self {
        Self {
            clipboard: true,
            launch: false,
            wait_for_handoff: true,
        }
    }
}

/// Command-line stand-in for a viewer window. Every callback is recorded;
/// clipboard and launcher are only touched when enabled.
pub struct CliHost {
    options: HostOptions,
    clipboard: Option<Clipboard>,
    calls: Vec<HostCall>,
    current_page: usize,
}

impl CliHost {
    pub fn new(options: HostOptions) -> Self {
        Self {
            options,
            clipboard: None,
            calls: Vec::new(),
            current_page: 0,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn take_calls(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    fn system_clipboard(&mut self) -> Result<&mut Clipboard, HostError> {
        if self.clipboard.is_none() {
            let clipboard = Clipboard::new()
                .map_err(|err| HostError::Clipboard(format!("failed to access clipboard: {err}")))?;
            self.clipboard = Some(clipboard);
        }
        self.clipboard
            .as_mut()
            .ok_or_else(|| HostError::Clipboard("clipboard not initialised".into()))
    }
}

impl ViewerHost for CliHost {
    fn set_clipboard_text(&mut self, text: &str) -> Result<(), HostError> {
        self.calls.push(HostCall::Clipboard {
            text: text.to_owned(),
        });
        if !self.options.clipboard {
            return Ok(());
        }
        let wait = self.options.wait_for_handoff;
        if wait {
            info!("waiting for another application to take the clipboard contents");
        }
        write_clipboard(self.system_clipboard()?, text, wait)
            .map_err(|err| HostError::Clipboard(format!("failed to copy text: {err}")))?;
        debug!(chars = text.chars().count(), "copied selection to clipboard");
        Ok(())
    }

    fn begin_drag(&mut self, text: &str) {
        self.calls.push(HostCall::BeginDrag {
            text: text.to_owned(),
        });
    }

    fn on_link_click(&mut self, event: &mut LinkClickEvent) {
        self.calls.push(HostCall::LinkClick {
            target_page: event.link.target_page,
            uri: event.link.uri.clone(),
        });
    }

    fn go_to_page(&mut self, page: usize) {
        self.current_page = page;
        self.calls.push(HostCall::GoToPage { page });
    }

    fn open_uri(&mut self, uri: &str) -> Result<(), HostError> {
        self.calls.push(HostCall::OpenUri {
            uri: uri.to_owned(),
        });
        let parsed = Url::parse(uri).map_err(|err| HostError::Launch {
            uri: uri.to_owned(),
            reason: err.to_string(),
        })?;
        if !self.options.launch {
            return Ok(());
        }
        info!(%parsed, "opening link");
        open::that(parsed.as_str()).map_err(|err| HostError::Launch {
            uri: uri.to_owned(),
            reason: err.to_string(),
        })
    }
}

#[cfg(target_os = "linux")]
fn write_clipboard(clipboard: &mut Clipboard, text: &str, wait: bool) -> Result<(), arboard::Error> {
    use arboard::SetExtLinux;

    if wait {
        clipboard.set().wait().text(text.to_owned())
    } else {
        clipboard.set_text(text.to_owned())
    }
}

#[cfg(not(target_os = "linux"))]
fn write_clipboard(clipboard: &mut Clipboard, text: &str, _wait: bool) -> Result<(), arboard::Error> {
    clipboard.set_text(text.to_owned())
}
