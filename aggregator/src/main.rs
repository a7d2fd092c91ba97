use std::{env, io};

use aggregator::service::AggregatorBuilder;
use comms::msg::{Command, Msg};
use log::{info, warn};
use tokio::{net::TcpListener, signal};

const DEFAULT_HOST: &str = "127.0.0.1";

#[tokio::main]
async fn main() -> io::Result<()> {
    env_logger::init();

    let addr = format!(
        "{}:{}",
        env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
        env::var("PORT").map_err(io::Error::other)?,
    );

    let list = TcpListener::bind(&addr).await?;
    info!("listening at {addr}");

    let (stream, peer) = list.accept().await?;
    let (rx, tx) = stream.into_split();
    let (mut rx, _) = comms::channel(rx, tx);
    info!("orchestrator connected from {peer}");

    let builder = AggregatorBuilder::new();
    let mut rx_buf: Vec<u32> = Vec::new();

    loop {
        let spec = match rx.recv_into(&mut rx_buf).await? {
            Msg::Control(Command::CreateAggregator(spec)) => spec,
            Msg::Control(Command::Disconnect) => {
                info!("orchestrator disconnected");
                break;
            }
            msg => {
                warn!("expected CreateAggregator, got {msg:?}");
                continue;
            }
        };

        let mut server = match builder.build(spec) {
            Ok(server) => server,
            Err(e) => {
                warn!("invalid aggregator spec: {e}");
                continue;
            }
        };

        for _ in 0..server.workers() {
            let (stream, peer) = list.accept().await?;
            let (rx, tx) = stream.into_split();
            let (rx, tx) = comms::channel(rx, tx);
            info!("worker connected from {peer}");
            server.spawn(rx, tx);
        }

        tokio::select! {
            ret = server.run() => {
                let replica = ret?;
                info!(round = replica.round; "aggregation finished");
            }
            _ = signal::ctrl_c() => {
                info!("received ctrl-c, shutting down");
                break;
            }
        }
    }

    Ok(())
}
