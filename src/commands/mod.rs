mod handle;
mod print;
mod serve;

pub use handle::run_handle;
pub use print::run_print;
pub use serve::run_serve;

use pdfprint_lib::{telemetry, CdpBrowser, Config, PrintHandler, Renderer, S3Store, Uploader};

/// Wire the CDP browser and S3 store described by `cfg` into a handler.
pub(crate) fn build_handler(cfg: &Config) -> PrintHandler<CdpBrowser, S3Store> {
    let browser = CdpBrowser::new(cfg.chrome.host.clone(), cfg.chrome.port);
    let renderer = Renderer::new(browser, cfg.render_settings());
    let store = S3Store::new(cfg.storage.region.clone(), cfg.storage.credentials());
    let uploader = Uploader::new(store, cfg.storage.upload_settings());
    PrintHandler::new(renderer, uploader)
}

/// Install logging once the effective `logging` flag is known.
pub(crate) fn init_logging(cfg: &Config) {
    if let Err(err) = telemetry::init(cfg.logging) {
        eprintln!("{err}");
    }
}
