use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use crate::predict_client::{PredictError, PredictionBackend, PredictionClient};
use crate::state::{Delta, ProviderCommand};

/// Runs predictions off the UI thread.
///
/// Exits once the command channel closes or the UI stops listening.
pub fn spawn_prediction_worker<B>(
    client: PredictionClient<B>,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()>
where
    B: PredictionBackend + 'static,
{
    thread::spawn(move || {
        let mut rng = rand::thread_rng();
        while let Ok(cmd) = cmd_rx.recv() {
            let delta = match cmd {
                ProviderCommand::Predict(selection) => {
                    debug!(
                        home = selection.home.name,
                        away = selection.away.name,
                        "prediction requested"
                    );
                    let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
                        client.predict(&selection, &mut rng)
                    }));
                    match attempt {
                        Ok(Ok(outcome)) => Delta::PredictionReady(outcome),
                        Ok(Err(err)) => Delta::PredictionFailed(err),
                        Err(payload) => {
                            let msg = panic_message(&*payload);
                            Delta::PredictionFailed(PredictError::BackendPanic(msg))
                        }
                    }
                }
            };
            if tx.send(delta).is_err() {
                warn!("ui channel closed, stopping prediction worker");
                break;
            }
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
