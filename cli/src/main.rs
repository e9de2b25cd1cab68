use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use protocol::{Command, DecodeError, Ring, ServerFrame};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("websocket connect failed: {0}")]
    Connect(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket send failed: {0}")]
    Send(Box<tokio_tungstenite::tungstenite::Error>),
    #[error("websocket closed while waiting for {0}")]
    Closed(&'static str),
    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("frame decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("server has no active generation session")]
    NoGame,
    #[error("server rejected the last command as invalid")]
    Rejected,
    #[error("unexpected {got} frame while waiting for {want}")]
    Unexpected {
        want: &'static str,
        got: &'static str,
    },
    #[error("{centroids} centroids for {polygons} polygons")]
    CountMismatch { polygons: usize, centroids: usize },
    #[error("invalid JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "terramap", about = "Territory map server probe")]
struct Cli {
    /// WebSocket endpoint of the generation server.
    #[arg(long, env = "TERRAMAP_URL", default_value = "ws://localhost:8000/ws/")]
    url: String,

    /// Requested map width in surface pixels.
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// Requested map height in surface pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Requested horizontal subdivision density.
    #[arg(long, default_value_t = 40)]
    cells_x: u32,

    /// Requested vertical subdivision density.
    #[arg(long, default_value_t = 10)]
    cells_y: u32,

    /// Per-reply timeout in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    #[command(subcommand)]
    command: Probe,
}

#[derive(Subcommand, Debug)]
enum Probe {
    /// Request a fresh generation and wait for the acknowledgement.
    Generate,
    /// Run the full generate → polygons → centroids handshake.
    Cycle {
        /// Print the decoded geometry as JSON instead of a summary.
        #[arg(long, default_value_t = false)]
        dump: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let generate = Command::Generate {
        width: cli.width,
        height: cli.height,
        cells_x: cli.cells_x,
        cells_y: cli.cells_y,
    };
    let timeout = Duration::from_secs(cli.timeout);

    let (mut stream, _) = connect_async(cli.url.as_str())
        .await
        .map_err(|error| CliError::Connect(Box::new(error)))?;

    match cli.command {
        Probe::Generate => run_generate(&mut stream, generate, timeout).await,
        Probe::Cycle { dump } => run_cycle(&mut stream, generate, timeout, dump).await,
    }
}

async fn run_generate(
    stream: &mut WsStream,
    generate: Command,
    timeout: Duration,
) -> Result<(), CliError> {
    send(stream, &generate).await?;
    await_reply(stream, timeout, "GENERATED").await?;
    println!("generated");
    Ok(())
}

async fn run_cycle(
    stream: &mut WsStream,
    generate: Command,
    timeout: Duration,
    dump: bool,
) -> Result<(), CliError> {
    send(stream, &generate).await?;
    await_reply(stream, timeout, "GENERATED").await?;

    send(stream, &Command::Polygons).await?;
    let polygons: Vec<Ring> = match await_reply(stream, timeout, "POLYGONS").await? {
        ServerFrame::Polygons(rings) => rings,
        frame => return Err(CliError::Unexpected { want: "POLYGONS", got: frame.name() }),
    };

    send(stream, &Command::Centroids).await?;
    let centroids = match await_reply(stream, timeout, "CENTROIDS").await? {
        ServerFrame::Centroids(points) => points,
        frame => return Err(CliError::Unexpected { want: "CENTROIDS", got: frame.name() }),
    };

    if centroids.len() != polygons.len() {
        return Err(CliError::CountMismatch {
            polygons: polygons.len(),
            centroids: centroids.len(),
        });
    }

    if dump {
        let rendered = serde_json::to_string_pretty(&serde_json::json!({
            "polygons": polygons,
            "centroids": centroids,
        }))?;
        println!("{rendered}");
    } else {
        println!("cycle complete: {} polygons, {} centroids", polygons.len(), centroids.len());
        for (index, ring) in polygons.iter().enumerate() {
            println!("  polygon {index}: {} vertices", ring.len());
        }
    }
    Ok(())
}

async fn send(stream: &mut WsStream, command: &Command) -> Result<(), CliError> {
    stream
        .send(Message::Text(command.encode().into()))
        .await
        .map_err(|error| CliError::Send(Box::new(error)))
}

/// Wait for the reply named by `want`.
///
/// Session-level refusals terminate the probe; anything else that is not the
/// awaited reply is reported and skipped, keeping the exchange strictly
/// sequential.
async fn await_reply(
    stream: &mut WsStream,
    timeout: Duration,
    want: &'static str,
) -> Result<ServerFrame, CliError> {
    loop {
        let frame = recv_frame(stream, timeout, want).await?;
        if frame.name() == want {
            return Ok(frame);
        }
        match frame {
            ServerFrame::NoGame => return Err(CliError::NoGame),
            ServerFrame::Invalid => return Err(CliError::Rejected),
            other => eprintln!("ignoring out-of-order {} frame", other.name()),
        }
    }
}

async fn recv_frame(
    stream: &mut WsStream,
    timeout: Duration,
    want: &'static str,
) -> Result<ServerFrame, CliError> {
    let fut = async {
        loop {
            let Some(message) = stream.next().await else {
                return Err(CliError::Closed(want));
            };
            match message.map_err(|error| CliError::Connect(Box::new(error)))? {
                Message::Text(text) => {
                    return protocol::decode_frame(text.as_str()).map_err(CliError::from);
                }
                Message::Close(_) => return Err(CliError::Closed(want)),
                _ => {}
            }
        }
    };

    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CliError::Timeout(want))?
}
