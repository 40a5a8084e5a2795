//! Headless Chromium renderer
//!
//! One browser process and one browser context serve the whole batch; every
//! file gets a fresh tab that is closed again once the file is done.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::emulation::SetEmulatedMediaParams;
use chromiumoxide::cdp::browser_protocol::network::LoaderId;
use chromiumoxide::cdp::browser_protocol::page::{
    EventLifecycleEvent, NavigateParams, PrintToPdfParams, SetLifecycleEventsEnabledParams,
};
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use super::{PageRenderer, RenderJob};
use crate::error::{Error, Result};
use crate::extract::extract_content;
use crate::html::Document;

/// Browser settings for a batch run
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Chromium/Chrome binary; auto-detected when `None`
    pub chrome_executable: Option<PathBuf>,
    /// Pause after load for late layout and animations
    pub settle_delay: Duration,
    /// Upper bound on waiting for the page to load and the network to go idle
    pub network_idle_timeout: Duration,
    /// Run Chromium with its sandbox (disable inside containers)
    pub sandbox: bool,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            chrome_executable: None,
            settle_delay: Duration::from_millis(200),
            network_idle_timeout: Duration::from_secs(30),
            sandbox: true,
        }
    }
}

/// Renders pages with headless Chromium over the DevTools protocol.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: Option<JoinHandle<()>>,
    context: BrowserContextId,
    options: BrowserOptions,
}

impl ChromiumRenderer {
    /// Start the browser and create the browser context shared by all pages.
    pub async fn launch(options: BrowserOptions) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if let Some(path) = &options.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        if !options.sandbox {
            builder = builder.no_sandbox();
        }
        let config = builder.build().map_err(Error::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await?;
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler: {}", e);
                }
            }
        });

        let context = browser
            .execute(CreateBrowserContextParams::default())
            .await?
            .result
            .browser_context_id;
        debug!("browser launched");

        Ok(Self {
            browser,
            handler: Some(handler),
            context,
            options,
        })
    }

    async fn open_page(&self) -> Result<Page> {
        let params = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(self.context.clone())
            .build()
            .map_err(Error::Browser)?;
        Ok(self.browser.new_page(params).await?)
    }

    async fn drive(&self, page: &Page, job: &RenderJob<'_>) -> Result<()> {
        let url = Url::from_file_path(job.source).map_err(|_| Error::Navigation {
            url: job.source.display().to_string(),
            reason: "not an absolute file path".to_string(),
        })?;
        self.navigate(page, url.as_str()).await?;

        // Print stylesheets often hide the very content we want
        page.execute(SetEmulatedMediaParams::builder().media("screen").build())
            .await?;
        tokio::time::sleep(self.options.settle_delay).await;

        let mut doc = Document::parse(&page.content().await?);
        if extract_content(&mut doc, job.start_token) {
            let script = replace_body_script(&doc)?;
            let applied: bool = page
                .evaluate(script)
                .await?
                .into_value()
                .map_err(|e| Error::Browser(format!("unexpected script result: {}", e)))?;
            if !applied {
                warn!("{}: page body could not be replaced", url);
            }
        } else {
            debug!("{}: no MCQ ID marker, printing the full page", url);
        }

        let params = PrintToPdfParams::builder()
            .print_background(true)
            .prefer_css_page_size(true)
            .build();
        let pdf = page.pdf(params).await?;
        std::fs::write(job.output, pdf)?;
        Ok(())
    }

    /// Navigate and wait for `load`, then for network idle.
    ///
    /// Running out of time before `load` is an error; running out while
    /// waiting only for the network to settle is not.
    async fn navigate(&self, page: &Page, url: &str) -> Result<()> {
        page.execute(SetLifecycleEventsEnabledParams::new(true)).await?;
        let mut events = page.event_listener::<EventLifecycleEvent>().await?;

        let navigation = page.execute(NavigateParams::new(url)).await?.result;
        if let Some(reason) = navigation.error_text {
            return Err(Error::Navigation {
                url: url.to_string(),
                reason,
            });
        }

        self.wait_for_network_idle(&mut events, navigation.loader_id.as_ref(), url)
            .await
    }

    async fn wait_for_network_idle(
        &self,
        events: &mut EventStream<EventLifecycleEvent>,
        loader: Option<&LoaderId>,
        url: &str,
    ) -> Result<()> {
        let deadline = tokio::time::Instant::now() + self.options.network_idle_timeout;
        let mut loaded = false;
        let mut idle = false;

        while !(loaded && idle) {
            match tokio::time::timeout_at(deadline, events.next()).await {
                Ok(Some(event)) => {
                    if loader.is_some_and(|id| *id != event.loader_id) {
                        continue;
                    }
                    match event.name.as_str() {
                        "load" => loaded = true,
                        "networkIdle" => idle = true,
                        _ => {}
                    }
                }
                Ok(None) => {
                    return Err(Error::Browser("page event stream closed".to_string()));
                }
                Err(_) if loaded => {
                    debug!("{}: network still busy after {:?}, continuing", url, self.options.network_idle_timeout);
                    break;
                }
                Err(_) => {
                    return Err(Error::Navigation {
                        url: url.to_string(),
                        reason: format!("no load event within {:?}", self.options.network_idle_timeout),
                    });
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PageRenderer for ChromiumRenderer {
    async fn render(&mut self, job: &RenderJob<'_>) -> Result<()> {
        let page = self.open_page().await?;
        let result = self.drive(&page, job).await;
        if let Err(e) = page.close().await {
            debug!("closing page for {} failed: {}", job.source.display(), e);
        }
        result
    }

    /// Dispose of the context and shut the browser down.
    async fn close(&mut self) -> Result<()> {
        let Some(handler) = self.handler.take() else {
            return Ok(());
        };
        if let Err(e) = self
            .browser
            .execute(DisposeBrowserContextParams::new(self.context.clone()))
            .await
        {
            debug!("disposing browser context failed: {}", e);
        }
        self.browser.close().await?;
        self.browser.wait().await?;
        if let Err(e) = handler.await {
            debug!("browser handler task ended abnormally: {}", e);
        }
        Ok(())
    }
}

/// Script that swaps the live page's `<body>` for the one in `doc`.
///
/// The head is left alone, so stylesheets keep applying to the new body.
fn replace_body_script(doc: &Document) -> Result<String> {
    let body = doc
        .body()
        .ok_or_else(|| Error::General("extracted document has no body".to_string()))?;
    let attrs = doc.element(body).map(|e| e.attrs.clone()).unwrap_or_default();
    let html = doc.inner_html(body);

    Ok(format!(
        r#"((attrs, html) => {{
    const body = document.createElement('body');
    for (const [name, value] of attrs) body.setAttribute(name, value);
    body.innerHTML = html;
    if (document.body) document.documentElement.replaceChild(body, document.body);
    else document.documentElement.appendChild(body);
    return true;
}})({}, {})"#,
        serde_json::json!(attrs),
        serde_json::json!(html),
    ))
}
