//! # Lifecycle Event Adapter
//!
//! Translates the orchestrator's custom-resource envelope into a
//! [`LifecycleEvent`], runs it through the [`LifecycleController`], and turns
//! the [`LifecycleResult`] back into a response envelope.
//!
//! Every request produces a response, including requests that cannot be
//! mapped to a resource kind. When no physical id is known for a failed
//! response a deterministic placeholder is reported, so the orchestrator's
//! rollback Delete completes without touching a real record.

pub mod envelope;
pub mod responder;
pub mod server;

use tracing::{error, info};

use crate::controller::{
    placeholder_physical_id, FailureKind, LifecycleController, LifecycleEvent, LifecycleResult,
    ResourceKind,
};
use crate::errors::{Error, Result};

pub use envelope::{CustomResourceRequest, CustomResourceResponse, ResponseStatus};
pub use responder::ResponseSender;

#[derive(Debug, Clone)]
pub struct LifecycleAdapter {
    controller: LifecycleController,
    default_kind: Option<ResourceKind>,
    responder: ResponseSender,
}

impl LifecycleAdapter {
    pub fn new(controller: LifecycleController, default_kind: Option<ResourceKind>) -> Self {
        Self { controller, default_kind, responder: ResponseSender::default() }
    }

    pub fn with_responder(mut self, responder: ResponseSender) -> Self {
        self.responder = responder;
        self
    }

    pub fn controller(&self) -> &LifecycleController {
        &self.controller
    }

    /// Build the controller's view of a request.
    pub fn to_event(&self, request: &CustomResourceRequest) -> Result<LifecycleEvent> {
        let kind = request.resource_kind().or(self.default_kind).ok_or_else(|| {
            Error::validation_field(
                format!("Cannot determine resource kind from type '{}'", request.resource_type),
                "ResourceType",
            )
        })?;

        Ok(LifecycleEvent {
            request_type: request.request_type,
            kind,
            properties: request.properties(),
            old_properties: request.old_properties(),
            physical_id: request.physical_resource_id.clone().filter(|id| !id.trim().is_empty()),
            correlation_id: Some(request.request_id.clone()).filter(|id| !id.is_empty()),
        })
    }

    /// Run the request through the controller without delivering the response.
    pub async fn process(&self, request: &CustomResourceRequest) -> CustomResourceResponse {
        let result = match self.to_event(request) {
            Ok(event) => self.controller.handle(&event).await,
            Err(e) => LifecycleResult::failure(FailureKind::ValidationError, e.to_string()),
        };
        build_response(request, result)
    }

    /// Deliver a response to the request's `ResponseURL`.
    pub async fn deliver(
        &self,
        request: &CustomResourceRequest,
        response: &CustomResourceResponse,
    ) -> Result<()> {
        let url = request
            .response_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or_else(|| Error::validation_field("Request carries no ResponseURL", "ResponseURL"))?;
        self.responder.send(url, response).await
    }

    /// Process and deliver. Delivery failures are logged, not propagated, so
    /// the caller always gets the response back.
    pub async fn handle(&self, request: &CustomResourceRequest) -> CustomResourceResponse {
        let response = self.process(request).await;
        match self.deliver(request, &response).await {
            Ok(()) => info!(request_id = %request.request_id, status = ?response.status, "Lifecycle response sent"),
            Err(e) => error!(request_id = %request.request_id, error = %e, "Failed to deliver lifecycle response"),
        }
        response
    }
}

/// Build the response envelope for a controller result.
pub fn build_response(request: &CustomResourceRequest, result: LifecycleResult) -> CustomResourceResponse {
    let (status, reason, physical_resource_id, data) = match result {
        LifecycleResult::Success { physical_id, data } => (ResponseStatus::Success, None, physical_id, data),
        LifecycleResult::Failure { kind, message } => {
            let physical_id = request
                .physical_resource_id
                .clone()
                .filter(|id| !id.trim().is_empty())
                .unwrap_or_else(|| placeholder_physical_id(&request.logical_resource_id, &request.request_id));
            let reason = envelope::truncate_reason(&format!("{}: {}", kind, message));
            (ResponseStatus::Failed, Some(reason), physical_id, Default::default())
        }
    };

    CustomResourceResponse {
        status,
        reason,
        physical_resource_id,
        stack_id: request.stack_id.clone(),
        request_id: request.request_id.clone(),
        logical_resource_id: request.logical_resource_id.clone(),
        no_echo: false,
        data,
    }
}
