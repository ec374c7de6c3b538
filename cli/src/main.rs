use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use serde_json::{Value, json};
use tokio::task::LocalSet;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use whep_viewer::*;


#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("missing endpoint URL; pass <URL> or set WHEP_URL")]
    MissingUrl,
    #[error("failed to read offer {path}: {source}")]
    ReadOffer {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("negotiation failed: {0}")]
    Negotiation(#[from] NegotiationError),
    #[error("{0}")]
    Viewer(#[from] ViewerError),
    #[error("failed to wait for ctrl-c: {0}")]
    Signal(std::io::Error),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "whep-viewer-cli", about = "Headless WHEP endpoint probe")]
struct Cli {
    /// Bearer token sent with every request.
    #[arg(long, env = "WHEP_TOKEN", hide_env_values = true)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Negotiate once, print the outcome and delete the session.
    Probe(ProbeArgs),
    /// Run a viewer session with retries and print its events until Ctrl-C.
    Watch(WatchArgs),
}

#[derive(Args, Debug)]
struct EndpointArgs {
    /// WHEP endpoint URL.
    #[arg(env = "WHEP_URL")]
    url: Option<String>,

    /// File holding the SDP offer to send.
    #[arg(long)]
    offer: PathBuf,
}

#[derive(Args, Debug)]
struct ProbeArgs {
    #[command(flatten)]
    endpoint: EndpointArgs,

    /// Leave the session running instead of deleting it.
    #[arg(long, default_value_t = false)]
    keep: bool,
}

#[derive(Args, Debug)]
struct WatchArgs {
    #[command(flatten)]
    endpoint: EndpointArgs,

    /// Delay before the first reconnect attempt.
    #[arg(long)]
    retry_delay_ms: Option<u64>,

    /// Give up after this many consecutive failed attempts.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Select this layer (or `auto`) once layers are announced.
    #[arg(long)]
    layer: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Probe(args) => run_probe(cli.token, args).await,
        Command::Watch(args) => LocalSet::new().run_until(run_watch(cli.token, args)).await,
    }
}

async fn run_probe(token: Option<String>, args: ProbeArgs) -> Result<(), CliError> {
    let url = endpoint_url(&args.endpoint)?;
    let offer = read_offer(&args.endpoint.offer)?;
    let client = WhepClient::new(token)?;
    let peer = Rc::new(FilePeer::new(offer));

    let session = match client.negotiate(peer.clone(), &url).await {
        Ok(session) => session,
        Err(e) => {
            let raw = e.to_string();
            let event = ViewerEvent::failure(FailureKind::classify(&raw), &raw, &url);
            print_json(&json!({
                "event": event.name(),
                "detail": event.detail(),
                "code": e.error_code(),
                "retryable": e.retryable(),
            }))?;
            return Err(e.into());
        }
    };

    print_json(&json!({
        "event": ViewerEvent::Connected { url: url.clone() }.name(),
        "session": session.id(),
        "answer": peer.answer(),
    }))?;

    if args.keep {
        info!(session = %session.id(), "leaving session running");
        return Ok(());
    }
    session.stop().await?;
    Ok(())
}

async fn run_watch(token: Option<String>, args: WatchArgs) -> Result<(), CliError> {
    let url = endpoint_url(&args.endpoint)?;
    let offer = read_offer(&args.endpoint.offer)?;

    let mut config = ViewerConfig::from_env();
    config.url = url;
    config.token = token.or(config.token);
    if let Some(ms) = args.retry_delay_ms {
        config.retry.delay = Duration::from_millis(ms);
    }
    if args.max_retries.is_some() {
        config.retry.max_attempts = args.max_retries;
    }

    let negotiator = Rc::new(WhepClient::new(config.token.clone())?);
    let host = Rc::new(PrintHost);
    let controller = SessionController::new(config, host, Rc::new(FilePeers { offer }), negotiator);

    if let Some(layer) = args.layer {
        tokio::task::spawn_local(select_when_announced(controller.clone(), layer));
    }

    if let Err(e) = controller.connect().await {
        // Retryable failures keep the session alive; only a hard stop ends it.
        if matches!(e, ViewerError::Configuration(_) | ViewerError::GaveUp { .. }) {
            return Err(e.into());
        }
        warn!(error = %e, "initial attempt failed");
    }

    tokio::signal::ctrl_c().await.map_err(CliError::Signal)?;
    info!("interrupted, stopping session");
    controller.stop().await;
    Ok(())
}

async fn select_when_announced(controller: SessionController, layer: String) {
    while controller.layers().is_none() {
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
    match controller.select_layer(&layer).await {
        Ok(()) => info!(layer = %layer, "layer selected"),
        Err(e) => warn!(layer = %layer, error = %e, code = e.error_code(), "layer selection failed"),
    }
}

fn endpoint_url(args: &EndpointArgs) -> Result<String, CliError> {
    args.url.as_deref().map(str::trim).filter(|url| !url.is_empty()).map(str::to_owned).ok_or(CliError::MissingUrl)
}

fn read_offer(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadOffer { path: path.to_owned(), source })
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string(value)?;
    println!("{rendered}");
    Ok(())
}

// =============================================================================
// Headless host
// =============================================================================

/// Peer connection that replays a prepared offer and keeps the answer.
struct FilePeer {
    offer: String,
    answer: RefCell<Option<String>>,
}

impl FilePeer {
    fn new(offer: String) -> Self {
        Self { offer, answer: RefCell::new(None) }
    }

    fn answer(&self) -> Option<String> {
        self.answer.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PeerConnection for FilePeer {
    fn add_transceiver(&self, kind: MediaKind) -> Result<(), NegotiationError> {
        debug!(kind = ?kind, "transceiver added");
        Ok(())
    }

    async fn create_offer(&self) -> Result<String, NegotiationError> {
        if self.offer.trim().is_empty() {
            return Err(NegotiationError::Peer("offer file is empty".into()));
        }
        Ok(self.offer.clone())
    }

    async fn apply_answer(&self, sdp: &str) -> Result<(), NegotiationError> {
        *self.answer.borrow_mut() = Some(sdp.to_owned());
        Ok(())
    }

    fn close(&self) {}
}

struct FilePeers {
    offer: String,
}

impl PeerFactory for FilePeers {
    fn create(&self) -> Result<Rc<dyn PeerConnection>, NegotiationError> {
        Ok(Rc::new(FilePeer::new(self.offer.clone())))
    }
}

/// Host that prints every lifecycle event as one JSON line.
struct PrintHost;

#[async_trait(?Send)]
impl HostSurface for PrintHost {
    fn attach_stream(&self, stream: &MediaStream) {
        info!(stream = %stream.id, "stream attached");
    }

    async fn play(&self) -> Result<(), ViewerError> {
        Ok(())
    }

    fn pause(&self) {}

    fn emit(&self, event: &ViewerEvent) {
        println!("{}", event_line(event));
    }
}

fn event_line(event: &ViewerEvent) -> Value {
    json!({ "event": event.name(), "detail": event.detail() })
}
