//! Fake browser and object store shared by integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pdfprint_lib::{
    BrowserError, BrowserSession, BrowserVersion, ObjectStore, PdfArtifact, PrintHandler,
    PrintOptions, PutObject, ReadySignal, RemoteBrowser, RenderSettings, Renderer,
    RequestObserver, StorageError, TargetInfo, UploadSettings, Uploader,
};

pub const FAKE_PDF: &[u8] = b"%PDF-1.4 fake";

#[derive(Default)]
pub struct Recorder {
    pub opened: usize,
    pub closed: usize,
    pub navigated: Vec<String>,
    pub printed: Vec<PrintOptions>,
}

#[derive(Clone)]
pub struct FakeBrowser {
    /// `None` means the load event never fires.
    pub load_after: Option<Duration>,
    pub fail_print: bool,
    pub fail_navigate: bool,
    pub fail_enable: bool,
    pub no_targets: bool,
    pub recorder: Arc<Mutex<Recorder>>,
}

impl FakeBrowser {
    pub fn loading_after(delay: Duration) -> Self {
        Self {
            load_after: Some(delay),
            fail_print: false,
            fail_navigate: false,
            fail_enable: false,
            no_targets: false,
            recorder: Arc::default(),
        }
    }

    pub fn never_loading() -> Self {
        Self {
            load_after: None,
            ..Self::loading_after(Duration::ZERO)
        }
    }

    pub fn recorder(&self) -> Arc<Mutex<Recorder>> {
        Arc::clone(&self.recorder)
    }
}

pub struct FakeSession {
    browser: FakeBrowser,
    loaded: Mutex<Option<ReadySignal>>,
    observer: Mutex<Option<RequestObserver>>,
    closed: bool,
}

#[async_trait]
impl RemoteBrowser for FakeBrowser {
    type Session = FakeSession;

    async fn version(&self) -> Result<BrowserVersion, BrowserError> {
        Ok(BrowserVersion {
            browser: "HeadlessChrome/120.0".to_string(),
            protocol_version: "1.3".to_string(),
            ..BrowserVersion::default()
        })
    }

    async fn list_targets(&self) -> Result<Vec<TargetInfo>, BrowserError> {
        if self.no_targets {
            return Ok(Vec::new());
        }
        Ok(vec![TargetInfo {
            id: "T1".to_string(),
            kind: "page".to_string(),
            title: "about:blank".to_string(),
            url: "about:blank".to_string(),
            web_socket_debugger_url: None,
        }])
    }

    async fn open_session(&self, _target: &TargetInfo) -> Result<FakeSession, BrowserError> {
        self.recorder.lock().unwrap().opened += 1;
        Ok(FakeSession {
            browser: self.clone(),
            loaded: Mutex::new(None),
            observer: Mutex::new(None),
            closed: false,
        })
    }
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn observe_requests(&self, observer: RequestObserver) -> Result<(), BrowserError> {
        *self.observer.lock().unwrap() = Some(observer);
        Ok(())
    }

    async fn observe_load(&self, loaded: ReadySignal) -> Result<(), BrowserError> {
        *self.loaded.lock().unwrap() = Some(loaded);
        Ok(())
    }

    async fn enable_network(&self) -> Result<(), BrowserError> {
        if self.browser.fail_enable {
            return Err(BrowserError::Protocol("Network.enable failed".to_string()));
        }
        Ok(())
    }

    async fn enable_page(&self) -> Result<(), BrowserError> {
        Ok(())
    }

    async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        if self.browser.fail_navigate {
            return Err(BrowserError::Protocol("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }
        self.browser
            .recorder
            .lock()
            .unwrap()
            .navigated
            .push(url.to_string());
        if let Some(observer) = self.observer.lock().unwrap().as_ref() {
            observer(url);
        }
        if let (Some(delay), Some(loaded)) =
            (self.browser.load_after, self.loaded.lock().unwrap().clone())
        {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                loaded.set();
            });
        }
        Ok(())
    }

    async fn print_to_pdf(&self, options: &PrintOptions) -> Result<PdfArtifact, BrowserError> {
        if self.browser.fail_print {
            return Err(BrowserError::Protocol("Printing failed".to_string()));
        }
        self.browser
            .recorder
            .lock()
            .unwrap()
            .printed
            .push(options.clone());
        Ok(PdfArtifact::new(FAKE_PDF.to_vec()))
    }

    async fn close(&mut self) -> Result<(), BrowserError> {
        if !self.closed {
            self.closed = true;
            self.browser.recorder.lock().unwrap().closed += 1;
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub enum StoreBehavior {
    Accept,
    Reject,
    Hang,
}

pub struct FakeStore {
    behavior: StoreBehavior,
    puts: Arc<Mutex<Vec<PutObject>>>,
}

impl FakeStore {
    pub fn new(behavior: StoreBehavior) -> (Self, Arc<Mutex<Vec<PutObject>>>) {
        let puts = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                behavior,
                puts: Arc::clone(&puts),
            },
            puts,
        )
    }
}

#[async_trait]
impl ObjectStore for FakeStore {
    async fn put_object(&self, request: PutObject) -> Result<(), StorageError> {
        self.puts.lock().unwrap().push(request);
        match self.behavior {
            StoreBehavior::Accept => Ok(()),
            StoreBehavior::Reject => Err(StorageError::Rejected {
                status: 403,
                message: "AccessDenied".to_string(),
            }),
            StoreBehavior::Hang => {
                futures::future::pending::<()>().await;
                Ok(())
            }
        }
    }
}

pub fn handler(
    browser: FakeBrowser,
    store: FakeStore,
    settings: RenderSettings,
) -> PrintHandler<FakeBrowser, FakeStore> {
    PrintHandler::new(
        Renderer::new(browser, settings),
        Uploader::new(store, UploadSettings::new("us-west-2", "docs")),
    )
}
