use std::{borrow::Cow, io};

use comms::{
    OnoReceiver, OnoSender,
    msg::{Command, Msg, Payload},
};
use log::{debug, info, warn};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    task::JoinSet,
};

use crate::{
    error::AggregateErr,
    message::UpdateMessage,
    policy::Status,
    synchronization::{Replica, StepErr, Synchronizer},
};

/// The central server structure, it handles task management and io between workers.
pub struct AggregationServer<S: Synchronizer> {
    tasks: JoinSet<io::Result<()>>,
    rounds: usize,
    synchronizer: S,
}

impl<S: Synchronizer> AggregationServer<S> {
    /// Creates a new `AggregationServer`.
    ///
    /// # Arguments
    /// * `rounds` - The amount of rounds to aggregate before disconnecting the workers.
    /// * `synchronizer` - The synchronizer shared by every worker task.
    pub fn new(rounds: usize, synchronizer: S) -> Self {
        Self {
            tasks: JoinSet::new(),
            rounds,
            synchronizer,
        }
    }

    /// Returns the amount of workers expected to connect.
    pub fn workers(&self) -> usize {
        self.synchronizer.workers()
    }

    pub fn status(&self) -> Status {
        self.synchronizer.status()
    }

    /// Drives every spawned worker task to completion.
    ///
    /// # Returns
    /// The last published replica, or the first error raised by a worker task.
    pub async fn run(&mut self) -> io::Result<Replica> {
        while let Some(res) = self.tasks.join_next().await {
            res??
        }

        Ok(self.synchronizer.current().as_ref().clone())
    }

    /// Creates an error for when an unexpected message kind is received.
    ///
    /// # Arguments
    /// * `msg` - The received message.
    ///
    /// # Returns
    /// An error.
    fn unexpected_message_kind<U>(msg: Msg) -> io::Result<U> {
        Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Received an unexpected message kind, got: {msg:?}"),
        ))
    }

    /// Sends the contents of `replica` to a worker.
    async fn send_params<W>(tx: &mut OnoSender<W>, replica: &Replica) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        let values = replica.values();
        let msg = Msg::Data(Payload::Params {
            shape: replica.shape().to_vec(),
            values: &values,
        });

        tx.send(&msg).await
    }

    /// Tells a worker its update was refused, it's up to the worker to send another one.
    async fn reject<W>(tx: &mut OnoSender<W>, reason: String) -> io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        warn!("rejecting update: {reason}");
        tx.send(&Msg::Err(Cow::Owned(reason))).await
    }
}

impl<S: Synchronizer + Send + Sync + 'static> AggregationServer<S> {
    /// Binds a new worker to this server and spawns it's own aggregation task.
    ///
    /// Each round the worker is sent the current parameters and is expected to answer with
    /// exactly one accepted update. After the last round it receives the final parameters
    /// followed by a disconnect.
    ///
    /// # Arguments
    /// * `rx` - The receiving end of the communication.
    /// * `tx` - The sending end of the communication.
    pub fn spawn<R, W>(&mut self, mut rx: OnoReceiver<R>, mut tx: OnoSender<W>)
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let rounds = self.rounds;
        let synchronizer = self.synchronizer.clone();

        let task = async move {
            let mut rx_buf: Vec<u32> = Vec::new();
            let mut replica = synchronizer.current();

            for _ in 0..rounds {
                Self::send_params(&mut tx, &replica).await?;

                replica = loop {
                    let update = match rx.recv_into(&mut rx_buf).await? {
                        Msg::Data(Payload::Update { header, values }) => {
                            UpdateMessage::from_wire(header, values)
                        }
                        Msg::Control(Command::Disconnect) => {
                            info!(round = replica.round; "worker disconnected early");
                            return Ok(());
                        }
                        msg => return Self::unexpected_message_kind(msg),
                    };

                    let update = match update {
                        Ok(update) => update,
                        Err(e) => {
                            Self::reject(&mut tx, e.to_string()).await?;
                            continue;
                        }
                    };

                    match synchronizer.step(update).await {
                        Ok(next) => break next,
                        Err(StepErr::Rejected(e @ AggregateErr::RoundOverflow { .. })) => {
                            return Err(e.into());
                        }
                        Err(StepErr::Rejected(e)) => Self::reject(&mut tx, e.to_string()).await?,
                        Err(e) => return Err(io::Error::other(e)),
                    }
                };

                debug!(round = replica.round; "round replicated");
            }

            Self::send_params(&mut tx, &replica).await?;
            tx.send(&Msg::Control(Command::Disconnect)).await?;
            Ok(())
        };

        self.tasks.spawn(task);
    }
}
