use super::{framer::RtuFramer, port};
use crate::settings::Settings;
use bytes::Bytes;
use codec::{Outcome, SlaveContext};
use frame::MAX_ADU_SIZE;
use futures::{SinkExt, StreamExt};
use log::{error, info, warn};
use std::io::Error;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_serial::SerialStream;
use tokio_util::codec::Framed;

/// Serial RTU slave: reads requests, runs them through a [`SlaveContext`]
/// and writes the replies back.
pub struct RtuSlave {
    io: Framed<SerialStream, RtuFramer>,
    context: SlaveContext<'static>,
    reply_rx: mpsc::UnboundedReceiver<Bytes>,
    timeout: Duration,
    name: String,
}

impl RtuSlave {
    /// Open the port. `configure` receives a context that already sends its
    /// replies to the port and adds the data hooks.
    pub fn build<F>(settings: &Settings, configure: F) -> Result<RtuSlave, Error>
    where
        F: FnOnce(SlaveContext<'static>) -> SlaveContext<'static>,
    {
        let port = port::build(&settings.port)?;
        let name = settings.port.name.clone();
        let io = Framed::new(port, RtuFramer::new(&name));

        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let reply_name = name.clone();
        let context = SlaveContext::new(settings.slave, move |data: &[u8]| {
            if reply_tx.send(Bytes::copy_from_slice(data)).is_err() {
                warn!("{}: reply dropped, receiver closed", reply_name);
            }
        })
        .with_addressing(settings.addressing);

        info!("start rtu slave {} on {}", settings.slave, name);
        Ok(RtuSlave {
            io,
            context: configure(context),
            reply_rx,
            timeout: settings.timeout,
            name,
        })
    }

    /// Serve requests until the port is closed.
    pub async fn run(mut self) -> Result<(), Error> {
        let mut scratch = [0u8; MAX_ADU_SIZE];
        loop {
            match tokio::time::timeout(self.timeout, self.io.next()).await {
                //timeout
                Err(_) => {
                    if !self.io.read_buffer().is_empty() {
                        warn!("{}: reset buffer by timeout", self.name);
                        self.reset();
                    }
                }
                Ok(Some(Ok(request))) => self.process(&request, &mut scratch).await?,
                Ok(Some(Err(err))) => {
                    error!("{}: serial error: {:?}", self.name, err);
                    self.reset();
                }
                Ok(None) => {
                    info!("{}: port closed", self.name);
                    return Ok(());
                }
            }
        }
    }

    fn reset(&mut self) {
        self.io.read_buffer_mut().clear();
    }

    async fn process(&mut self, request: &[u8], scratch: &mut [u8]) -> Result<(), Error> {
        match self.context.parse_input(request, scratch) {
            Ok(Outcome::Replied(_)) => {
                while let Ok(reply) = self.reply_rx.try_recv() {
                    self.io.send(reply).await?;
                }
            }
            Ok(Outcome::Ignored) => {}
            Err(err) => {
                warn!("{}: drop request: {}", self.name, err);
            }
        }
        Ok(())
    }
}
