//! Subcommand implementations; each returns the JSON document to print

use serde_json::{Value, json};
use switchboard_llm::{DispatchRequest, DispatchResult, Dispatcher, LlmError, OutputFormat};
use switchboard_queue::{MessageFactory, MessageOptions, MessageType};
use switchboard_routing::Priorities;
use tokio_util::sync::CancellationToken;

use crate::args::{CompareArgs, DispatchArgs, PromptArgs, RecommendArgs};

/// Producer name stamped on emitted messages
const MESSAGE_SOURCE: &str = "switchboard-cli";

pub fn models(dispatcher: &Dispatcher) -> anyhow::Result<Value> {
    let catalog = dispatcher.catalog().snapshot();
    Ok(serde_json::to_value(catalog.list())?)
}

pub fn recommend(dispatcher: &Dispatcher, args: &RecommendArgs) -> anyhow::Result<Value> {
    let mut request = base_request(&args.prompt);
    request.task = args.task;
    request.priorities = Priorities::from(&args.priorities);
    request.require_vision = args.vision;
    request.preferred_model.clone_from(&args.prefer);

    let recommendations = dispatcher.recommend(&request, args.top).map_err(describe)?;
    Ok(serde_json::to_value(recommendations)?)
}

pub async fn dispatch(dispatcher: &Dispatcher, args: &DispatchArgs, cancel: &CancellationToken) -> anyhow::Result<Value> {
    let mut request = base_request(&args.prompt);
    request.model.clone_from(&args.model);
    request.temperature = args.temperature;
    request.task = args.task;
    request.priorities = Priorities::from(&args.priorities);
    request.preferred_model.clone_from(&args.prefer);

    let result = dispatcher
        .dispatch_with_cancel(&request, cancel)
        .await
        .map_err(describe)?;

    if !args.emit_message {
        return Ok(serde_json::to_value(&result)?);
    }

    let message = completion_event(&result)?;
    Ok(json!({ "result": result, "message": message }))
}

pub async fn compare(dispatcher: &Dispatcher, args: &CompareArgs, cancel: &CancellationToken) -> anyhow::Result<Value> {
    let mut request = base_request(&args.prompt);
    request.temperature = args.temperature;

    let report = dispatcher.compare_with_cancel(&request, &args.models, cancel).await;

    let outcomes = report
        .outcomes
        .iter()
        .map(|outcome| match &outcome.result {
            Ok(result) => json!({ "model": outcome.model, "result": result }),
            Err(e) => json!({ "model": outcome.model, "error": error_json(e) }),
        })
        .collect::<Vec<_>>();

    Ok(json!({
        "outcomes": outcomes,
        "succeeded": report.succeeded,
        "failed": report.failed,
        "cheapest": report.cheapest().map(|r| &r.model),
        "fastest": report.fastest().map(|r| &r.model),
    }))
}

fn base_request(args: &PromptArgs) -> DispatchRequest {
    let mut request = DispatchRequest::new(args.prompt.clone());
    request.system_prompt.clone_from(&args.system_prompt);
    request.max_output_tokens = args.max_output_tokens;
    if args.json {
        request.output_format = OutputFormat::Json;
    }
    request
}

/// Event envelope announcing a finished generation
fn completion_event(result: &DispatchResult) -> anyhow::Result<Value> {
    let payload = json!({
        "kind": "generation.completed",
        "model": result.model,
        "provider": result.provider,
        "tokens": result.tokens,
        "cost": result.cost,
        "latencyMs": u64::try_from(result.latency.as_millis()).unwrap_or(u64::MAX),
    });

    let message = MessageFactory::new(MESSAGE_SOURCE).create_message(
        MessageType::Event,
        payload,
        MessageOptions::default().tag(result.provider.to_string()),
    );
    Ok(serde_json::to_value(message)?)
}

fn error_json(error: &LlmError) -> Value {
    json!({ "kind": error.kind(), "message": error.to_string() })
}

fn describe(error: LlmError) -> anyhow::Error {
    anyhow::anyhow!("{} error: {error}", error.kind())
}
