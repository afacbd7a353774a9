//! Serial receive task
//!
//! Decodes operator command bytes from the host and queues them for the
//! control loop.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use kinesis_protocol::CommandDecoder;

use crate::channels::COMMAND_CHANNEL;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Serial RX task - turns typed bytes into commands
#[embassy_executor::task]
pub async fn serial_rx_task(mut rx: BufferedUartRx) {
    info!("Serial RX task started");

    let mut decoder = CommandDecoder::new();
    let mut buf = [0u8; RX_BUF_SIZE];
    let mut ignored = 0;

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                decoder.feed_slice(&buf[..n], |cmd| {
                    debug!("Command byte: {:?}", cmd);
                    // Send to command channel, dropping if full
                    if COMMAND_CHANNEL.try_send(cmd).is_err() {
                        warn!("Command channel full, dropping {:?}", cmd);
                    }
                });

                if decoder.ignored() != ignored {
                    ignored = decoder.ignored();
                    trace!("Ignored {} non-command bytes so far", ignored);
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
