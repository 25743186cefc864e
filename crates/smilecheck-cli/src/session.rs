use smilecheck_core::{FlowConfig, FlowController, FlowStatus, Point};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("failed to spawn session thread: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("session thread exited")]
    ChannelClosed,
}

/// Messages sent from the async side to the session thread.
enum SessionRequest {
    Tick {
        landmarks: Vec<Point>,
        dt: f32,
        reply: oneshot::Sender<FlowStatus>,
    },
    Begin {
        reply: oneshot::Sender<FlowStatus>,
    },
    Reset {
        reply: oneshot::Sender<FlowStatus>,
    },
    Status {
        reply: oneshot::Sender<FlowStatus>,
    },
}

/// Clone-safe handle to the session thread.
///
/// The thread is the sole owner of the [`FlowController`]; landmark sets are
/// handed over by value, one snapshot per tick.
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<SessionRequest>,
}

impl SessionHandle {
    /// Submit one tick of raw landmarks. An empty set means no face.
    pub async fn tick(&self, landmarks: Vec<Point>, dt: f32) -> Result<FlowStatus, SessionError> {
        self.request(|reply| SessionRequest::Tick {
            landmarks,
            dt,
            reply,
        })
        .await
    }

    /// Leave the welcome stage.
    pub async fn begin(&self) -> Result<FlowStatus, SessionError> {
        self.request(|reply| SessionRequest::Begin { reply }).await
    }

    /// External reset trigger: back to `Align` with all state cleared.
    pub async fn reset(&self) -> Result<FlowStatus, SessionError> {
        self.request(|reply| SessionRequest::Reset { reply }).await
    }

    /// Current status without advancing the protocol.
    pub async fn status(&self) -> Result<FlowStatus, SessionError> {
        self.request(|reply| SessionRequest::Status { reply }).await
    }

    async fn request(
        &self,
        make: impl FnOnce(oneshot::Sender<FlowStatus>) -> SessionRequest,
    ) -> Result<FlowStatus, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| SessionError::ChannelClosed)?;
        reply_rx.await.map_err(|_| SessionError::ChannelClosed)
    }
}

/// Spawn the session on a dedicated OS thread.
///
/// The thread runs until every [`SessionHandle`] has been dropped.
pub fn spawn_session(config: FlowConfig) -> Result<SessionHandle, SessionError> {
    let (tx, mut rx) = mpsc::channel::<SessionRequest>(4);

    std::thread::Builder::new()
        .name("smilecheck-session".into())
        .spawn(move || {
            let mut flow = FlowController::new(config);
            let guide = flow.guide();
            tracing::info!(
                center_x = guide.center.x,
                center_y = guide.center.y,
                semi_x = guide.semi_x,
                semi_y = guide.semi_y,
                hold_still_seconds = flow.config().hold_still_seconds,
                smile_hold_seconds = flow.config().smile_hold_seconds,
                "session thread started"
            );
            let mut ticks: u64 = 0;

            while let Some(req) = rx.blocking_recv() {
                let (status, reply) = match req {
                    SessionRequest::Tick {
                        landmarks,
                        dt,
                        reply,
                    } => {
                        ticks += 1;
                        (flow.tick(&landmarks, dt), reply)
                    }
                    SessionRequest::Begin { reply } => {
                        flow.begin();
                        (flow.status(), reply)
                    }
                    SessionRequest::Reset { reply } => {
                        flow.reset();
                        (flow.status(), reply)
                    }
                    SessionRequest::Status { reply } => (flow.status(), reply),
                };
                let _ = reply.send(status);
            }

            tracing::info!(ticks, "session thread exiting");
        })
        .map_err(SessionError::Spawn)?;

    Ok(SessionHandle { tx })
}
