//! The request-decision and settlement state machine.
//!
//! [`process_request`] is the single entry point a framework adapter calls
//! before dispatching to the upstream application; [`process_settlement`] is
//! called afterward once the upstream status code is known. Both are
//! fail-open at their outer boundary: an internal error never escapes to
//! the caller.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use foldgate_core::facilitator::{Facilitator, SettleRequest, SettleResponse, VerifyRequest};
use foldgate_core::host_config::{ApiProtectionMode, HostConfig};
use foldgate_core::metadata::RequestMetadata;
use foldgate_core::result::{ProcessRequestResult, ProcessSettleResult, ResponseParts};
use foldgate_mcp::list::ListPaymentHeader;
use foldgate_mcp::{McpRequest, build_route_key, call_method_for_list, collect_list_requirements};
use serde::Serialize;
use tracing::Instrument;

use crate::error::DispatchError;
use crate::formatters::{format_api_error, format_mcp_error};
use crate::paywall::render_paywall;
use crate::request_adapter::RequestAdapter;
use crate::resource_server::{HttpOutcome, HttpRequestContext};
use crate::telemetry::build_event_payload;
use crate::worker::FoldgateWorker;

#[derive(Serialize)]
struct HealthBody<'a> {
    status: &'static str,
    core_version: &'a str,
    sdk_version: &'a str,
    platform: &'a str,
    timestamp: String,
}

/// Runs the request-decision pipeline for one inbound request.
///
/// Never returns an error: any internal [`DispatchError`] is logged, reported
/// via telemetry, and converted into a `NoPaymentRequired` pass-through.
pub async fn process_request(worker: &FoldgateWorker, adapter: &dyn RequestAdapter) -> ProcessRequestResult {
    let metadata = RequestMetadata::new(worker.core_version.clone());
    let span = tracing::info_span!("process_request", request_id = %metadata.request_id, path = adapter.path());

    async {
        if adapter.path() == foldgate_core::HEALTH_PATH {
            return health_check_result(worker, metadata);
        }

        match route_request(worker, adapter, &metadata).await {
            Ok(result) => result,
            Err(source) => {
                tracing::error!(%source, "dispatcher error, falling through to pass-through");
                worker.telemetry.report_error(&source.to_string(), "", None).await;
                ProcessRequestResult::NoPaymentRequired {
                    metadata,
                    headers: Vec::new(),
                }
            }
        }
    }
    .instrument(span)
    .await
}

fn health_check_result(worker: &FoldgateWorker, metadata: RequestMetadata) -> ProcessRequestResult {
    let body = HealthBody {
        status: "ok",
        core_version: &worker.core_version,
        sdk_version: &worker.sdk_version,
        platform: &worker.platform,
        timestamp: metadata.timestamp.to_rfc3339(),
    };
    let mut response = ResponseParts::empty(200);
    response.body = serde_json::to_vec(&body).unwrap_or_default();
    response.content_type = Some("application/json".to_string());
    ProcessRequestResult::HealthCheck {
        metadata,
        response,
        headers: Vec::new(),
    }
}

fn no_payment_required(metadata: RequestMetadata) -> ProcessRequestResult {
    ProcessRequestResult::NoPaymentRequired {
        metadata,
        headers: Vec::new(),
    }
}

async fn route_request(
    worker: &FoldgateWorker,
    adapter: &dyn RequestAdapter,
    metadata: &RequestMetadata,
) -> Result<ProcessRequestResult, DispatchError> {
    let host_config = worker.host_config.get().await?;

    if let Some(host_config) = &host_config
        && host_config.is_mcp_path(adapter.path())
    {
        let mcp_endpoint = host_config.mcp_endpoint.as_deref().unwrap_or_default();
        let tos_url = host_config.terms_of_service_url.as_deref();
        return handle_mcp_request(worker, adapter, metadata, mcp_endpoint, tos_url).await;
    }

    handle_decision(worker, adapter, metadata, host_config.as_ref()).await
}

async fn handle_decision(
    worker: &FoldgateWorker,
    adapter: &dyn RequestAdapter,
    metadata: &RequestMetadata,
    host_config: Option<&HostConfig>,
) -> Result<ProcessRequestResult, DispatchError> {
    let bot = match adapter.user_agent() {
        Some(ua) => worker.bots.match_user_agent(ua).await?,
        None => None,
    };

    let should_check =
        bot.is_some() || host_config.is_some_and(|config| config.api_protection_mode == ApiProtectionMode::All);
    if !should_check {
        return Ok(no_payment_required(metadata.clone()));
    }

    let result = handle_payment_request(worker, adapter, metadata, None).await?;
    let ProcessRequestResult::PaymentError {
        metadata,
        restriction: Some(restriction),
        mut response,
        headers,
    } = result
    else {
        return Ok(result);
    };

    if restriction.is_web() && bot.is_none() {
        return Ok(no_payment_required(metadata));
    }

    let payment_methods = worker.payment_methods.get().await?;
    if !payment_methods.is_empty() {
        let tos_url = host_config.and_then(|config| config.terms_of_service_url.as_deref());
        if restriction.is_web() {
            let html = render_paywall(&restriction, &payment_methods, adapter.url(), tos_url);
            response.body = html.into_bytes();
            response.content_type = Some("text/html".to_string());
        } else {
            format_api_error(&mut response, &restriction, &metadata, &payment_methods, tos_url);
        }
    }

    if bot.is_some_and(|bot| bot.force_200) {
        response.set_status(200);
    }

    Ok(ProcessRequestResult::PaymentError {
        metadata,
        restriction: Some(restriction),
        response,
        headers,
    })
}

async fn handle_payment_request(
    worker: &FoldgateWorker,
    adapter: &dyn RequestAdapter,
    metadata: &RequestMetadata,
    path_override: Option<&str>,
) -> Result<ProcessRequestResult, DispatchError> {
    let Some(server) = worker.http_server.get().await? else {
        return Ok(no_payment_required(metadata.clone()));
    };

    let ctx = HttpRequestContext {
        path: path_override.map_or_else(|| adapter.path().to_string(), str::to_string),
        method: adapter.method().to_string(),
        payment_header: adapter
            .header("PAYMENT-SIGNATURE")
            .or_else(|| adapter.header("X-PAYMENT"))
            .map(str::to_string),
    };

    if !server.requires_payment(&ctx) {
        return Ok(no_payment_required(metadata.clone()));
    }

    let outcome = server.process_http_request_with_restriction(&ctx).await;
    let result = stamp_metadata(outcome, metadata.clone());

    if let ProcessRequestResult::PaymentError {
        restriction: Some(restriction),
        response,
        ..
    } = &result
    {
        let free_tier = restriction.price() == 0.0;
        let status = if free_tier { 200 } else { response.status };
        let payload = build_event_payload(adapter, metadata, status, None);
        worker.telemetry.send_event(&payload).await;

        if free_tier {
            return Ok(no_payment_required(metadata.clone()));
        }
    }

    Ok(result)
}

fn stamp_metadata(outcome: HttpOutcome, metadata: RequestMetadata) -> ProcessRequestResult {
    match outcome {
        HttpOutcome::NoPaymentRequired => no_payment_required(metadata),
        HttpOutcome::PaymentError { restriction, response } => ProcessRequestResult::PaymentError {
            metadata,
            restriction: Some(restriction),
            response,
            headers: Vec::new(),
        },
        HttpOutcome::PaymentVerified {
            restriction,
            payment_payload,
            payment_requirements,
        } => ProcessRequestResult::PaymentVerified {
            metadata,
            restriction,
            payment_payload,
            payment_requirements,
            headers: Vec::new(),
        },
    }
}

async fn handle_mcp_request(
    worker: &FoldgateWorker,
    adapter: &dyn RequestAdapter,
    metadata: &RequestMetadata,
    mcp_endpoint: &str,
    tos_url: Option<&str>,
) -> Result<ProcessRequestResult, DispatchError> {
    if adapter.method() != "POST" {
        return Ok(no_payment_required(metadata.clone()));
    }

    let body = adapter.body_json().await.unwrap_or(serde_json::Value::Null);
    let Some(request) = McpRequest::parse(&body) else {
        return Ok(no_payment_required(metadata.clone()));
    };

    if let Some(call_method) = call_method_for_list(&request.method) {
        return handle_mcp_list(worker, adapter, metadata, tos_url, call_method).await;
    }

    let Some(identifier) = request.call_identifier() else {
        return Ok(no_payment_required(metadata.clone()));
    };

    let route_key = build_route_key(mcp_endpoint, &request.method, identifier);
    let result = handle_payment_request(worker, adapter, metadata, Some(&route_key)).await?;

    let ProcessRequestResult::PaymentError {
        metadata,
        restriction: Some(restriction),
        mut response,
        headers,
    } = result
    else {
        return Ok(result);
    };

    let payment_methods = worker.payment_methods.get().await?;
    format_mcp_error(&mut response, &restriction, &metadata, &payment_methods, tos_url, request.id.clone());

    Ok(ProcessRequestResult::PaymentError {
        metadata,
        restriction: Some(restriction),
        response,
        headers,
    })
}

async fn handle_mcp_list(
    worker: &FoldgateWorker,
    adapter: &dyn RequestAdapter,
    metadata: &RequestMetadata,
    tos_url: Option<&str>,
    call_method: &str,
) -> Result<ProcessRequestResult, DispatchError> {
    let restrictions = worker.restrictions.get().await?;
    let payment_methods = worker.payment_methods.get().await?;
    let requirements = collect_list_requirements(&restrictions, &payment_methods, call_method);

    let mut headers = Vec::new();
    if !requirements.is_empty() {
        let header_body = ListPaymentHeader {
            requirements,
            terms_of_service_url: tos_url.map(str::to_string),
        };
        if let Ok(encoded) = serde_json::to_string(&header_body) {
            headers.push(("Payment-Required".to_string(), encoded));
        }
    }

    let payload = build_event_payload(adapter, metadata, 200, None);
    worker.telemetry.send_event(&payload).await;

    Ok(ProcessRequestResult::NoPaymentRequired {
        metadata: metadata.clone(),
        headers,
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettlementEnvelope<'a> {
    success: bool,
    payer: &'a str,
    transaction: &'a str,
    network: &'a str,
}

fn encode_payment_response_header(payer: &str, transaction: &str, network: &str) -> String {
    let envelope = SettlementEnvelope {
        success: true,
        payer,
        transaction,
        network,
    };
    BASE64.encode(serde_json::to_vec(&envelope).unwrap_or_default())
}

/// Settles a previously verified payment after the upstream application has
/// responded.
///
/// `payment_payload` is accepted for parity with the external settlement
/// signature but is not forwarded: [`Facilitator::settle`] only takes the
/// payment requirements the payload was already verified against.
pub async fn process_settlement(
    worker: &FoldgateWorker,
    adapter: &dyn RequestAdapter,
    _payment_payload: &VerifyRequest,
    payment_requirements: &SettleRequest,
    upstream_status_code: u16,
    metadata: &RequestMetadata,
) -> ProcessSettleResult {
    let span = tracing::info_span!(
        "process_settlement",
        request_id = %metadata.request_id,
        upstream_status_code,
    );

    async move {
        let server = match worker.http_server.get().await {
            Ok(Some(server)) => server,
            Ok(None) => return ProcessSettleResult::failure("Server not initialized"),
            Err(source) => {
                tracing::error!(%source, "resource server unavailable during settlement");
                return ProcessSettleResult::failure("Server not initialized");
            }
        };

        if upstream_status_code >= 400 {
            let payload = build_event_payload(adapter, metadata, upstream_status_code, None);
            worker.telemetry.send_event(&payload).await;
            return ProcessSettleResult::failure("Upstream error");
        }

        match server.facilitator().settle(payment_requirements).await {
            SettleResponse::Success {
                payer,
                transaction,
                network,
            } => {
                let header = encode_payment_response_header(&payer, &transaction, &network);
                let payload = build_event_payload(adapter, metadata, upstream_status_code, Some(header.clone()));
                worker.telemetry.send_event(&payload).await;
                ProcessSettleResult::success(Some(header))
            }
            SettleResponse::Error { reason, .. } => {
                let payload = build_event_payload(adapter, metadata, 402, None);
                worker.telemetry.send_event(&payload).await;
                ProcessSettleResult::failure(reason)
            }
        }
    }
    .instrument(span)
    .await
}
