use anyhow::{Context, Result};
use tracing::debug;

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<()>;
}

/// System clipboard, opened on first use. On Linux the copied text belongs
/// to this process and disappears when it exits, so a short-lived process
/// has to use [`SystemClipboard::holding`].
#[derive(Default)]
pub struct SystemClipboard {
    inner: Option<arboard::Clipboard>,
    hold_until_replaced: bool,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks in `set_text` until another program takes over the clipboard.
    pub fn holding() -> Self {
        Self {
            inner: None,
            hold_until_replaced: true,
        }
    }

    pub fn holds_until_replaced(&self) -> bool {
        cfg!(target_os = "linux") && self.hold_until_replaced
    }
}

impl Clipboard for SystemClipboard {
    fn set_text(&mut self, text: &str) -> Result<()> {
        if self.inner.is_none() {
            self.inner = Some(arboard::Clipboard::new().context("Failed to open system clipboard")?);
        }
        let hold = self.holds_until_replaced();
        if let Some(clipboard) = self.inner.as_mut() {
            if hold {
                set_text_and_wait(clipboard, text)?;
            } else {
                clipboard
                    .set_text(text.to_owned())
                    .context("Failed to write to system clipboard")?;
            }
            debug!("Copied {} bytes to clipboard", text.len());
        }
        Ok(())
    }
}

#[cfg(target_os = "linux")]
fn set_text_and_wait(clipboard: &mut arboard::Clipboard, text: &str) -> Result<()> {
    use arboard::SetExtLinux;
    clipboard
        .set()
        .wait()
        .text(text.to_owned())
        .context("Failed to write to system clipboard")
}

#[cfg(not(target_os = "linux"))]
fn set_text_and_wait(clipboard: &mut arboard::Clipboard, text: &str) -> Result<()> {
    clipboard
        .set_text(text.to_owned())
        .context("Failed to write to system clipboard")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_does_not_hold() {
        assert!(!SystemClipboard::new().holds_until_replaced());
    }

    #[test]
    fn test_holding_waits_on_linux() {
        assert_eq!(
            SystemClipboard::holding().holds_until_replaced(),
            cfg!(target_os = "linux")
        );
    }
}

#[cfg(test)]
pub mod testing {
    use super::Clipboard;
    use anyhow::{bail, Result};

    #[derive(Default)]
    pub struct MemoryClipboard {
        pub contents: Option<String>,
        pub fail: bool,
    }

    impl Clipboard for MemoryClipboard {
        fn set_text(&mut self, text: &str) -> Result<()> {
            if self.fail {
                bail!("clipboard unavailable");
            }
            self.contents = Some(text.to_string());
            Ok(())
        }
    }
}
