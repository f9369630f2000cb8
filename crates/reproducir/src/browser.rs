//! Browser control for headless playback testing.
//!
//! With the `browser` feature enabled, [`CdpSession`] drives a real
//! chromium over the Chrome `DevTools` Protocol and implements the
//! [`Session`](crate::session::Session) capability the core consumes. The
//! core itself is synchronous and poll-driven, so the session owns a tokio
//! runtime and bridges each blocking call onto it.
//!
//! Without the feature only [`BrowserConfig`] is available; unit tests use
//! [`crate::mock::MockSession`] instead of a browser.

/// Browser configuration
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Create the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

// ============================================================================
// CDP implementation (feature `browser`)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::BrowserConfig;
    use crate::result::{ReproducirError, ReproducirResult};
    use crate::session::{BandwidthLimit, ElementRef, ScriptContext, Selector, Session};
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::network::EmulateNetworkConditionsParams;
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use serde_json::Value;
    use std::sync::Mutex;
    use tokio::runtime::Runtime;

    /// Wrap a script so its element arguments resolve as `args[i]` and a
    /// vanished element yields the `null` unavailable sentinel instead of a
    /// script error.
    fn bind_script(script: &str, args: &[&ElementRef]) -> String {
        let lookups: Vec<String> = args
            .iter()
            .map(|element| element.selector().to_query())
            .collect();
        format!(
            "(() => {{ const args = [{}]; if (args.some((el) => el === null)) {{ return null; }} {script} }})()",
            lookups.join(", ")
        )
    }

    /// Real browser session over CDP.
    ///
    /// Owns the browser process, one page, and the tokio runtime the async
    /// CDP client runs on. One session drives one scenario at a time.
    #[derive(Debug)]
    pub struct CdpSession {
        config: BrowserConfig,
        runtime: Runtime,
        browser: tokio::sync::Mutex<CdpBrowser>,
        page: CdpPage,
        current_url: Mutex<String>,
        #[allow(dead_code)]
        handler: tokio::task::JoinHandle<()>,
    }

    impl CdpSession {
        /// Launch a browser and open a blank page
        ///
        /// # Errors
        ///
        /// [`ReproducirError::BrowserLaunch`] when the browser cannot be
        /// started or the page cannot be created.
        pub fn launch(config: BrowserConfig) -> ReproducirResult<Self> {
            let runtime = Runtime::new()?;
            let (browser, page, handler) = runtime.block_on(async {
                let mut builder = CdpConfig::builder()
                    .window_size(config.viewport_width, config.viewport_height);
                if !config.headless {
                    builder = builder.with_head();
                }
                if !config.sandbox {
                    builder = builder.no_sandbox();
                }
                if let Some(ref path) = config.chromium_path {
                    builder = builder.chrome_executable(path);
                }
                let cdp_config =
                    builder
                        .build()
                        .map_err(|message| ReproducirError::BrowserLaunch { message })?;

                let (browser, mut handler_stream) = CdpBrowser::launch(cdp_config)
                    .await
                    .map_err(|error| ReproducirError::BrowserLaunch {
                        message: error.to_string(),
                    })?;

                let handler = tokio::spawn(async move {
                    while let Some(event) = handler_stream.next().await {
                        if event.is_err() {
                            break;
                        }
                    }
                });

                let page = browser.new_page("about:blank").await.map_err(|error| {
                    ReproducirError::BrowserLaunch {
                        message: error.to_string(),
                    }
                })?;

                Ok::<_, ReproducirError>((browser, page, handler))
            })?;

            tracing::info!(headless = config.headless, "browser launched");
            Ok(Self {
                config,
                runtime,
                browser: tokio::sync::Mutex::new(browser),
                page,
                current_url: Mutex::new(String::from("about:blank")),
                handler,
            })
        }

        /// The configuration this session was launched with
        #[must_use]
        pub const fn config(&self) -> &BrowserConfig {
            &self.config
        }

        /// Close the browser
        ///
        /// # Errors
        ///
        /// Propagates the browser's close failure.
        pub fn close(self) -> ReproducirResult<()> {
            let result = self.runtime.block_on(async {
                let mut browser = self.browser.lock().await;
                browser
                    .close()
                    .await
                    .map_err(|error| ReproducirError::Session {
                        message: error.to_string(),
                    })?;
                Ok(())
            });
            self.handler.abort();
            result
        }

        fn eval(&self, expression: String) -> ReproducirResult<Value> {
            self.runtime.block_on(async {
                let result =
                    self.page
                        .evaluate(expression)
                        .await
                        .map_err(|error| ReproducirError::Session {
                            message: error.to_string(),
                        })?;
                result
                    .into_value()
                    .map_err(|error| ReproducirError::Session {
                        message: error.to_string(),
                    })
            })
        }
    }

    impl Session for CdpSession {
        fn navigate(&self, url: &str) -> ReproducirResult<()> {
            self.runtime.block_on(async {
                self.page
                    .goto(url)
                    .await
                    .map_err(|error| ReproducirError::Navigation {
                        url: url.to_string(),
                        message: error.to_string(),
                    })?;
                Ok::<_, ReproducirError>(())
            })?;
            *self.current_url.lock().unwrap() = url.to_string();
            Ok(())
        }

        fn current_url(&self) -> ReproducirResult<String> {
            Ok(self.current_url.lock().unwrap().clone())
        }

        fn element_present(&self, selector: &Selector) -> ReproducirResult<bool> {
            let value = self.eval(selector.to_present_query())?;
            Ok(value.as_bool().unwrap_or(false))
        }

        fn element_displayed(&self, selector: &Selector) -> ReproducirResult<bool> {
            let value = self.eval(selector.to_displayed_query())?;
            Ok(value.as_bool().unwrap_or(false))
        }

        fn find_element(&self, selector: &Selector) -> ReproducirResult<ElementRef> {
            if self.element_present(selector)? {
                Ok(ElementRef::new(selector.clone()))
            } else {
                Err(ReproducirError::ElementNotFound {
                    selector: selector.to_string(),
                })
            }
        }

        fn element_text(&self, element: &ElementRef) -> ReproducirResult<Option<String>> {
            let value = self.eval(format!(
                "(() => {{ const el = {}; return el === null ? null : el.textContent; }})()",
                element.selector().to_query()
            ))?;
            Ok(value.as_str().map(ToString::to_string))
        }

        fn click(&self, element: &ElementRef) -> ReproducirResult<()> {
            self.eval(format!(
                "(() => {{ const el = {}; if (el === null) {{ return null; }} el.click(); return null; }})()",
                element.selector().to_query()
            ))?;
            Ok(())
        }

        fn execute(
            &self,
            context: ScriptContext,
            script: &str,
            args: &[&ElementRef],
        ) -> ReproducirResult<Value> {
            match context {
                // no privileged context over plain CDP; report unavailable
                ScriptContext::Chrome => Ok(Value::Null),
                ScriptContext::Content => self.eval(bind_script(script, args)),
            }
        }

        fn screenshot(&self) -> ReproducirResult<Vec<u8>> {
            self.runtime.block_on(async {
                let params = CaptureScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .build();

                let screenshot =
                    self.page
                        .execute(params)
                        .await
                        .map_err(|error| ReproducirError::Screenshot {
                            message: error.to_string(),
                        })?;

                use base64::Engine;
                base64::engine::general_purpose::STANDARD
                    .decode(&screenshot.data)
                    .map_err(|error| ReproducirError::Screenshot {
                        message: error.to_string(),
                    })
            })
        }

        fn set_bandwidth(&self, limit: Option<BandwidthLimit>) -> ReproducirResult<()> {
            let (download, latency) = match limit {
                Some(cap) => (cap.bytes_per_second(), 0.0),
                None => (-1.0, 0.0),
            };
            let params = EmulateNetworkConditionsParams::builder()
                .offline(false)
                .latency(latency)
                .download_throughput(download)
                .upload_throughput(-1.0)
                .build()
                .map_err(|message| ReproducirError::Session { message })?;
            self.runtime.block_on(async {
                self.page
                    .execute(params)
                    .await
                    .map_err(|error| ReproducirError::Session {
                        message: error.to_string(),
                    })?;
                Ok(())
            })
        }
    }

}

#[cfg(feature = "browser")]
pub use cdp::CdpSession;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_headless_sandboxed() {
        let config = BrowserConfig::default();
        assert!(config.headless);
        assert!(config.sandbox);
        assert!(config.chromium_path.is_none());
    }

    #[test]
    fn config_builders_chain() {
        let config = BrowserConfig::new()
            .with_viewport(1920, 1080)
            .with_headless(false)
            .with_chromium_path("/usr/bin/chromium")
            .with_no_sandbox();
        assert_eq!(config.viewport_width, 1920);
        assert_eq!(config.viewport_height, 1080);
        assert!(!config.headless);
        assert!(!config.sandbox);
        assert_eq!(config.chromium_path.as_deref(), Some("/usr/bin/chromium"));
    }
}
