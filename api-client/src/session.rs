// Stateful render session for UI consumers
//
// Wraps a DiagramServiceClient and publishes loading / error / image URL
// state through a watch channel instead of framework globals.

use crate::errors::ApiError;
use crate::http_client::DiagramServiceClient;
use graphviz_render_core::{DotUpload, RenderRequest, RenderResult};
use tokio::sync::watch;

/// Snapshot of a session, as seen by subscribers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    /// A generate call is in flight
    pub loading: bool,

    /// Display text of the last failure, cleared when a new call starts
    pub error: Option<String>,

    /// Image URL of the last successful render
    pub image_url: Option<String>,

    pub last_result: Option<RenderResult>,
}

/// Render session owned by a single consumer
pub struct RenderSession {
    client: DiagramServiceClient,
    state: watch::Sender<SessionState>,
}

impl RenderSession {
    pub fn new(client: DiagramServiceClient) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { client, state }
    }

    pub fn client(&self) -> &DiagramServiceClient {
        &self.client
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Run a render request and publish its outcome
    pub async fn generate(&mut self, request: RenderRequest) -> Result<RenderResult, ApiError> {
        self.state.send_modify(|state| {
            state.loading = true;
            state.error = None;
        });

        let result = self.client.generate(request).await;

        match &result {
            Ok(render) => {
                let image_url = self.client.image_url(&render.output_file);
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.image_url = Some(image_url);
                    state.last_result = Some(render.clone());
                });
            }
            Err(e) => {
                let message = e.to_string();
                self.state.send_modify(|state| {
                    state.loading = false;
                    state.error = Some(message);
                    state.image_url = None;
                });
            }
        }

        result
    }

    pub async fn generate_from_existing(
        &mut self,
        filename: impl Into<String>,
    ) -> Result<RenderResult, ApiError> {
        self.generate(RenderRequest::Existing {
            filename: filename.into(),
        })
        .await
    }

    pub async fn generate_from_upload(
        &mut self,
        upload: DotUpload,
    ) -> Result<RenderResult, ApiError> {
        self.generate(RenderRequest::Upload(upload)).await
    }

    /// Forget the last result and error
    pub fn reset(&mut self) {
        self.state.send_replace(SessionState::default());
    }
}
