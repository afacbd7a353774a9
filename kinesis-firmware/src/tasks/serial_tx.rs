//! Serial transmit task
//!
//! Writes queued report lines to the host.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use crate::channels::REPORT_CHANNEL;

/// Serial TX task - drains the report channel
#[embassy_executor::task]
pub async fn serial_tx_task(mut tx: BufferedUartTx) {
    info!("Serial TX task started");

    loop {
        let line = REPORT_CHANNEL.receive().await;

        if let Err(e) = tx.write_all(line.as_bytes()).await {
            warn!("Failed to send report: {:?}", e);
        } else {
            trace!("TX: {}", line.as_str());
        }
    }
}
