// Streaming speedometer service - Snapshot followed by live updates
use crate::application::speedometer_service::SpeedometerService;
use crate::domain::speedometer::SpeedometerState;
use tokio::sync::mpsc;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

const STREAM_BUFFER: usize = 100;

#[derive(Debug, Clone)]
pub enum StreamMessage {
    Snapshot(SpeedometerState),
    Update(SpeedometerState),
}

#[derive(Clone)]
pub struct StreamingSpeedometerService {
    speedometer: SpeedometerService,
}

impl StreamingSpeedometerService {
    pub fn new(speedometer: SpeedometerService) -> Self {
        Self { speedometer }
    }

    pub async fn stream_readings(&self) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);

        // Subscribe before taking the snapshot so no change falls in between
        let updates = self.speedometer.subscribe();
        let snapshot = self.speedometer.snapshot().await;
        let _ = tx.send(StreamMessage::Snapshot(snapshot)).await;

        tokio::spawn(forward_updates(BroadcastStream::new(updates), tx));

        rx
    }
}

/// Relay state changes until the client hangs up or the service goes away
async fn forward_updates(
    mut updates: BroadcastStream<SpeedometerState>,
    tx: mpsc::Sender<StreamMessage>,
) {
    loop {
        tokio::select! {
            _ = tx.closed() => {
                tracing::debug!("Stream client went away");
                break;
            }
            next = updates.next() => match next {
                Some(Ok(state)) => {
                    if tx.send(StreamMessage::Update(state)).await.is_err() {
                        tracing::debug!("Stream client went away");
                        break;
                    }
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    tracing::warn!("Stream client lagged, skipped {} updates", skipped);
                }
                None => break,
            },
        }
    }
}
