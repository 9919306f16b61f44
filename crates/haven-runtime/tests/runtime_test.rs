//! Integration tests for Runtime::execute against in-memory collaborators.

use std::sync::Arc;
use std::time::Duration;

use haven_config::FlowDef;
use haven_flow::{Flow, FlowError, LoadOptions};
use haven_host::{
  Capabilities, CompletionProvider, CompletionRouter, RecordingHost, ScriptedCompletion,
  StaticCompletion,
};
use haven_runtime::{
  ChannelNotifier, ENGINE_NODE_ID, ExecutionEvent, ExecutionStatus, LogStatus, Runtime,
  RuntimeConfig, RuntimeError, Variables,
};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

fn definition(nodes: Value) -> FlowDef {
  serde_json::from_value(json!({
    "id": "flow_test",
    "name": "Test flow",
    "nodes": nodes,
  }))
  .expect("valid flow definition")
}

fn load(nodes: Value) -> Flow {
  Flow::load(definition(nodes)).expect("flow should load")
}

fn load_lenient(nodes: Value) -> Flow {
  Flow::load_with(definition(nodes), LoadOptions::lenient()).expect("flow should load")
}

fn runtime_with(completion: Arc<dyn CompletionProvider>, host: Arc<RecordingHost>) -> Runtime {
  Runtime::new(
    Capabilities::with_sinks(completion, host),
    RuntimeConfig::default(),
  )
}

fn runtime() -> (Runtime, Arc<RecordingHost>) {
  let host = Arc::new(RecordingHost::new());
  let runtime = runtime_with(Arc::new(ScriptedCompletion::new()), host.clone());
  (runtime, host)
}

fn greeting_nodes() -> Value {
  json!([
    { "id": "start", "type": "trigger", "name": "Start", "successors": ["ask"] },
    {
      "id": "ask",
      "type": "ai_call",
      "name": "Ask",
      "config": { "prompt": "Say hi to {{name}}", "outputVariable": "greeting" },
      "successors": ["done"]
    },
    { "id": "done", "type": "output", "name": "Done", "config": { "outputVariable": "greeting" } }
  ])
}

fn vars(value: Value) -> Variables {
  Variables::from_value(value)
}

#[tokio::test]
async fn test_greeting_flow() {
  let completion = Arc::new(ScriptedCompletion::new().respond("Say hi to Ana", "Hi Ana!"));
  let runtime = runtime_with(completion.clone(), Arc::new(RecordingHost::new()));
  let flow = load(greeting_nodes());

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Ana" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.variables.get("greeting"), Some(&json!("Hi Ana!")));
  assert_eq!(ctx.output, Some(json!("Hi Ana!")));
  assert_eq!(ctx.visited_nodes(), vec!["start", "ask", "done"]);
  assert_eq!(ctx.logs.len(), 6);
  assert!(ctx.error.is_none());
  assert!(ctx.finished_at.is_some());

  for node_id in ["start", "ask", "done"] {
    let entries = ctx.entries_for(node_id);
    assert_eq!(entries.len(), 2, "{node_id}");
    assert_eq!(entries[0].status, LogStatus::Started);
    assert_eq!(entries[1].status, LogStatus::Completed);
  }

  let requests = completion.requests().await;
  assert_eq!(requests.len(), 1);
  assert_eq!(requests[0].prompt, "Say hi to Ana");
}

fn score_nodes(operator: &str, value: Value) -> Value {
  json!([
    { "id": "start", "type": "trigger", "successors": ["check"] },
    {
      "id": "check",
      "type": "condition",
      "config": {
        "field": "score",
        "operator": operator,
        "value": value,
        "trueNode": "A",
        "falseNode": "B"
      }
    },
    { "id": "A", "type": "output", "config": { "outputVariable": "score" } },
    { "id": "B", "type": "output" }
  ])
}

#[tokio::test]
async fn test_condition_routes_to_true_branch() {
  let (runtime, _) = runtime();
  let flow = load(score_nodes("greater_than", json!("50")));

  let ctx = runtime
    .execute(&flow, vars(json!({ "score": "75" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.visited_nodes(), vec!["start", "check", "A"]);
  assert!(ctx.entries_for("B").is_empty());
  assert_eq!(ctx.output, Some(json!("75")));
}

#[tokio::test]
async fn test_is_empty_on_unset_field() {
  let (runtime, _) = runtime();
  let flow = load(score_nodes("is_empty", Value::Null));

  let ctx = runtime
    .execute(&flow, Variables::new(), CancellationToken::new())
    .await;

  assert_eq!(ctx.visited_nodes(), vec!["start", "check", "A"]);
  let check = ctx.result_of("check").unwrap();
  assert_eq!(check.output.as_ref().unwrap()["result"], json!(true));
}

#[tokio::test]
async fn test_condition_false_branch_skips_true_node() {
  let (runtime, _) = runtime();
  let flow = load(score_nodes("greater_than", json!(50)));

  let ctx = runtime
    .execute(&flow, vars(json!({ "score": "not a number" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.visited_nodes(), vec!["start", "check", "B"]);
  assert!(ctx.entries_for("A").is_empty());
  assert_eq!(ctx.output, Some(json!({ "score": "not a number" })));
}

#[tokio::test]
async fn test_condition_ignores_declared_successors() {
  let nodes = json!([
    { "id": "start", "type": "trigger", "successors": ["check"] },
    {
      "id": "check",
      "type": "condition",
      "config": { "field": "score", "operator": "equals", "value": "1", "trueNode": "A", "falseNode": "B" },
      "successors": ["C"]
    },
    { "id": "A", "type": "output" },
    { "id": "B", "type": "output" },
    { "id": "C", "type": "output" }
  ]);
  assert!(matches!(
    Flow::load(definition(nodes.clone())),
    Err(FlowError::Unreachable { node_id }) if node_id == "C"
  ));

  let (runtime, _) = runtime();
  let flow = load_lenient(nodes);
  for (score, branch) in [("1", "A"), ("2", "B")] {
    let ctx = runtime
      .execute(&flow, vars(json!({ "score": score })), CancellationToken::new())
      .await;

    assert_eq!(ctx.status, ExecutionStatus::Completed);
    assert_eq!(ctx.visited_nodes(), vec!["start", "check", branch]);
    assert!(ctx.entries_for("C").is_empty());
  }
}

#[tokio::test]
async fn test_null_variable_fails_equality_with_empty_string() {
  let (runtime, _) = runtime();
  let flow = load(score_nodes("equals", json!("")));

  let ctx = runtime
    .execute(&flow, vars(json!({ "score": null })), CancellationToken::new())
    .await;

  assert_eq!(ctx.visited_nodes(), vec!["start", "check", "B"]);
}

#[tokio::test]
async fn test_fan_out_is_sequential_depth_first() {
  let (runtime, _) = runtime();
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["upper", "lower"] },
    {
      "id": "upper",
      "type": "transform",
      "config": { "input": "name", "operation": "uppercase", "output": "shout" },
      "successors": ["note"]
    },
    { "id": "note", "type": "action", "config": { "actionType": "log", "message": "{{shout}}" } },
    {
      "id": "lower",
      "type": "transform",
      "config": { "input": "shout", "operation": "lowercase", "output": "quiet" }
    }
  ]));

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Ana" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.visited_nodes(), vec!["start", "upper", "note", "lower"]);
  assert_eq!(ctx.variables.get("quiet"), Some(&json!("ana")));
}

#[tokio::test]
async fn test_node_failure_aborts_run() {
  let (runtime, _) = runtime();
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["parse", "after"] },
    {
      "id": "parse",
      "type": "transform",
      "config": { "input": "raw", "operation": "json_parse", "output": "parsed" },
      "successors": ["child"]
    },
    { "id": "child", "type": "output" },
    { "id": "after", "type": "output" }
  ]));

  let ctx = runtime
    .execute(&flow, vars(json!({ "raw": "{not json" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert_eq!(ctx.visited_nodes(), vec!["start", "parse"]);
  assert!(ctx.entries_for("child").is_empty());
  assert!(ctx.entries_for("after").is_empty());

  let last = ctx.logs.last().unwrap();
  assert_eq!(last.node_id, "parse");
  assert_eq!(last.status, LogStatus::Failed);
  assert!(last.error.as_deref().unwrap().contains("malformed JSON"));
  assert_eq!(ctx.logs.len(), 4);
  assert!(ctx.error.as_deref().unwrap().starts_with("node 'parse' failed"));
  assert!(!ctx.variables.contains("parsed"));
}

#[tokio::test]
async fn test_missing_transform_input_fails() {
  let (runtime, _) = runtime();
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["trim"] },
    { "id": "trim", "type": "transform", "config": { "input": "text", "operation": "trim" } }
  ]));

  let ctx = runtime
    .execute(&flow, Variables::new(), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert_eq!(
    ctx.result_of("trim").unwrap().error.as_deref(),
    Some("transform input 'text' is not set")
  );
}

#[tokio::test]
async fn test_json_round_trip_through_flow() {
  let (runtime, _) = runtime();
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["encode"] },
    {
      "id": "encode",
      "type": "transform",
      "config": { "input": "analysis", "operation": "json_stringify", "output": "encoded" },
      "successors": ["decode"]
    },
    {
      "id": "decode",
      "type": "transform",
      "config": { "input": "encoded", "operation": "json_parse", "output": "decoded" },
      "successors": ["level"]
    },
    {
      "id": "level",
      "type": "transform",
      "config": { "input": "decoded", "operation": "extract", "key": "riskLevel", "output": "risk" }
    }
  ]));
  let analysis = json!({ "riskLevel": "high", "flags": ["isolation"], "score": 0.82 });

  let ctx = runtime
    .execute(&flow, vars(json!({ "analysis": analysis.clone() })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.variables.get("decoded"), Some(&analysis));
  assert_eq!(ctx.variables.get("risk"), Some(&json!("high")));
}

#[tokio::test]
async fn test_actions_reach_collaborators() {
  let (runtime, host) = runtime();
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["save", "notify", "alert"] },
    {
      "id": "save",
      "type": "action",
      "config": {
        "actionType": "save_to_db",
        "table": "check_ins",
        "data": { "user_id": "{{member.id}}", "mood": "{{mood}}" }
      }
    },
    {
      "id": "notify",
      "type": "action",
      "config": {
        "actionType": "send_notification",
        "userId": "{{member.id}}",
        "title": "Thanks",
        "message": "Thanks for checking in, {{member.name}}",
        "outputVariable": "notified"
      }
    },
    {
      "id": "alert",
      "type": "action",
      "config": {
        "actionType": "create_alert",
        "recipient": "{{member.id}}",
        "riskLevel": "medium",
        "riskType": "{{unknown.type}}",
        "details": { "mood": "{{mood}}" }
      }
    }
  ]));

  let ctx = runtime
    .execute(
      &flow,
      vars(json!({ "member": { "id": "u1", "name": "Ana" }, "mood": "low" })),
      CancellationToken::new(),
    )
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);

  let writes = host.writes().await;
  assert_eq!(writes.len(), 1);
  assert_eq!(writes[0].data["user_id"], json!("u1"));

  let notifications = host.notifications().await;
  assert_eq!(notifications[0].message, "Thanks for checking in, Ana");
  assert_eq!(ctx.variables.get("notified.success"), Some(&json!(true)));

  let alerts = host.alerts().await;
  assert_eq!(alerts[0].risk_type, "{{unknown.type}}");
  assert_eq!(alerts[0].details, json!({ "mood": "low" }));
}

#[tokio::test]
async fn test_rejected_action_fails_run() {
  let host = Arc::new(RecordingHost::rejecting());
  let runtime = runtime_with(Arc::new(ScriptedCompletion::new()), host);
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["save"] },
    { "id": "save", "type": "action", "config": { "actionType": "save_to_db", "table": "t" }, "successors": ["done"] },
    { "id": "done", "type": "output" }
  ]));

  let ctx = runtime
    .execute(&flow, Variables::new(), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert_eq!(
    ctx.result_of("save").unwrap().error.as_deref(),
    Some("save_to_db was rejected by the collaborator")
  );
  assert!(ctx.entries_for("done").is_empty());
}

#[tokio::test]
async fn test_completion_error_fails_run() {
  let (runtime, _) = runtime();
  let flow = load(greeting_nodes());

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Bo" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert_eq!(ctx.visited_nodes(), vec!["start", "ask"]);
  assert!(!ctx.variables.contains("greeting"));
  assert!(ctx.output.is_none());
}

#[tokio::test]
async fn test_node_timeout() {
  let completion = Arc::new(
    ScriptedCompletion::new()
      .respond("Say hi to Ana", "Hi Ana!")
      .with_delay(Duration::from_millis(500)),
  );
  let runtime = runtime_with(completion, Arc::new(RecordingHost::new()));
  let mut nodes = greeting_nodes();
  nodes[1]["timeoutMs"] = json!(20);
  let flow = load(nodes);

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Ana" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert_eq!(
    ctx.result_of("ask").unwrap().error.as_deref(),
    Some("node timed out after 20ms")
  );
  assert!(ctx.entries_for("done").is_empty());
}

#[tokio::test]
async fn test_run_deadline_caps_node_timeout() {
  let completion = Arc::new(
    ScriptedCompletion::new()
      .respond("Say hi to Ana", "Hi Ana!")
      .with_delay(Duration::from_secs(5)),
  );
  let config = RuntimeConfig {
    run_timeout_ms: Some(50),
    ..RuntimeConfig::default()
  };
  let runtime = Runtime::new(
    Capabilities::with_sinks(completion, Arc::new(RecordingHost::new())),
    config,
  );
  let flow = load(greeting_nodes());

  let started = std::time::Instant::now();
  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Ana" })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert!(started.elapsed() < Duration::from_secs(2));
  assert_eq!(ctx.result_of("ask").unwrap().status, LogStatus::Failed);
}

#[tokio::test]
async fn test_cancel_before_start() {
  let (runtime, _) = runtime();
  let flow = load(greeting_nodes());
  let cancel = CancellationToken::new();
  cancel.cancel();

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Ana" })), cancel)
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert!(ctx.visited_nodes().is_empty());
  assert_eq!(ctx.logs.len(), 1);
  assert_eq!(ctx.logs[0].node_id, ENGINE_NODE_ID);
  assert_eq!(ctx.error.as_deref(), Some("execution cancelled"));
}

#[tokio::test]
async fn test_cancel_during_external_call() {
  let completion = Arc::new(
    ScriptedCompletion::new()
      .respond("Say hi to Ana", "Hi Ana!")
      .with_delay(Duration::from_secs(5)),
  );
  let runtime = runtime_with(completion, Arc::new(RecordingHost::new()));
  let flow = load(greeting_nodes());
  let cancel = CancellationToken::new();

  let canceller = cancel.clone();
  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(20)).await;
    canceller.cancel();
  });

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Ana" })), cancel)
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  let ask = ctx.result_of("ask").unwrap();
  assert_eq!(ask.status, LogStatus::Failed);
  assert_eq!(ask.error.as_deref(), Some("execution cancelled"));
  assert_eq!(ctx.logs.last().unwrap().node_id, "ask");
  assert!(ctx.entries_for("done").is_empty());
}

#[tokio::test]
async fn test_lenient_dangling_successor_ends_branch() {
  let (runtime, _) = runtime();
  let flow = load_lenient(json!([
    { "id": "start", "type": "trigger", "successors": ["missing", "done"] },
    { "id": "done", "type": "output" }
  ]));

  let ctx = runtime
    .execute(&flow, vars(json!({ "a": 1 })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.visited_nodes(), vec!["start", "done"]);
}

#[tokio::test]
async fn test_step_limit_stops_cycles() {
  let host = Arc::new(RecordingHost::new());
  let config = RuntimeConfig {
    max_steps: 5,
    ..RuntimeConfig::default()
  };
  let runtime = Runtime::new(
    Capabilities::with_sinks(Arc::new(ScriptedCompletion::new()), host),
    config,
  );
  let flow = load_lenient(json!([
    { "id": "start", "type": "trigger", "successors": ["ping"] },
    { "id": "ping", "type": "action", "config": { "actionType": "log", "message": "ping" }, "successors": ["pong"] },
    { "id": "pong", "type": "action", "config": { "actionType": "log", "message": "pong" }, "successors": ["ping"] }
  ]));

  let ctx = runtime
    .execute(&flow, Variables::new(), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  assert_eq!(ctx.visited_nodes().len(), 5);
  assert_eq!(
    ctx.error.as_deref(),
    Some("run exceeded the limit of 5 node visits")
  );
  assert_eq!(ctx.logs.last().unwrap().node_id, ENGINE_NODE_ID);
}

#[tokio::test]
async fn test_notifier_receives_events() {
  let completion = Arc::new(ScriptedCompletion::new().respond("Say hi to Ana", "Hi Ana!"));
  let (notifier, mut events) = ChannelNotifier::channel();
  let runtime =
    runtime_with(completion, Arc::new(RecordingHost::new())).with_notifier(Arc::new(notifier));
  let flow = load(greeting_nodes());

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Ana" })), CancellationToken::new())
    .await;

  let mut received = Vec::new();
  while let Ok(event) = events.try_recv() {
    received.push(event);
  }

  assert_eq!(received.len(), 8);
  assert_eq!(
    received[0],
    ExecutionEvent::RunStarted {
      execution_id: ctx.execution_id.clone(),
      flow_id: "flow_test".to_string(),
    }
  );
  assert_eq!(
    received[4],
    ExecutionEvent::NodeCompleted {
      execution_id: ctx.execution_id.clone(),
      node_id: "ask".to_string(),
      output: json!("Hi Ana!"),
    }
  );
  assert_eq!(
    received[7],
    ExecutionEvent::RunCompleted {
      execution_id: ctx.execution_id.clone(),
    }
  );
}

#[tokio::test]
async fn test_node_events_mirror_log_outputs() {
  let (notifier, mut events) = ChannelNotifier::channel();
  let runtime = runtime_with(
    Arc::new(ScriptedCompletion::new()),
    Arc::new(RecordingHost::new()),
  )
  .with_notifier(Arc::new(notifier));
  let flow = load(score_nodes("greater_than", json!(50)));

  let ctx = runtime
    .execute(&flow, vars(json!({ "score": 80 })), CancellationToken::new())
    .await;

  let mut completed = Vec::new();
  while let Ok(event) = events.try_recv() {
    if let ExecutionEvent::NodeCompleted { node_id, output, .. } = event {
      completed.push((node_id, output));
    }
  }

  assert_eq!(completed.len(), 3);
  for (node_id, output) in &completed {
    let entry = ctx.result_of(node_id).unwrap();
    assert_eq!(entry.output.as_ref(), Some(output), "{node_id}");
  }
  assert_eq!(completed[1].1, json!({ "result": true, "next": "A" }));
}

#[tokio::test]
async fn test_failed_run_ends_with_node_failed_then_run_failed() {
  let (notifier, mut events) = ChannelNotifier::channel();
  let runtime = runtime_with(
    Arc::new(ScriptedCompletion::new()),
    Arc::new(RecordingHost::new()),
  )
  .with_notifier(Arc::new(notifier));
  let flow = load(greeting_nodes());

  let ctx = runtime
    .execute(&flow, vars(json!({ "name": "Bo" })), CancellationToken::new())
    .await;

  let mut received = Vec::new();
  while let Ok(event) = events.try_recv() {
    received.push(event);
  }

  let failures: Vec<_> = received
    .iter()
    .filter(|event| matches!(event, ExecutionEvent::NodeFailed { .. }))
    .collect();
  assert_eq!(failures.len(), 1);
  assert!(matches!(
    &received[received.len() - 2],
    ExecutionEvent::NodeFailed { node_id, .. } if node_id == "ask"
  ));
  assert_eq!(
    received.last(),
    Some(&ExecutionEvent::RunFailed {
      execution_id: ctx.execution_id.clone(),
      error: ctx.error.clone().unwrap(),
    })
  );
}

#[tokio::test]
async fn test_execute_definition_rejects_invalid_flow() {
  let (runtime, _) = runtime();
  let def = definition(json!([
    { "id": "a", "type": "trigger" },
    { "id": "b", "type": "trigger" }
  ]));

  let result = runtime
    .execute_definition(
      def,
      LoadOptions::default(),
      Variables::new(),
      CancellationToken::new(),
    )
    .await;

  assert!(matches!(result, Err(FlowError::TriggerCount { found: 2 })));
}

#[tokio::test]
async fn test_execute_node_in_isolation() {
  let (runtime, _) = runtime();
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["upper"] },
    {
      "id": "upper",
      "type": "transform",
      "config": { "input": "name", "operation": "uppercase", "output": "shout" },
      "successors": ["done"]
    },
    { "id": "done", "type": "output" }
  ]));

  let ctx = runtime
    .execute_node(&flow, "upper", vars(json!({ "name": "ana" })), CancellationToken::new())
    .await
    .unwrap();

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.visited_nodes(), vec!["upper"]);
  assert_eq!(ctx.variables.get("shout"), Some(&json!("ANA")));

  let missing = runtime
    .execute_node(&flow, "nope", Variables::new(), CancellationToken::new())
    .await;
  assert!(matches!(missing, Err(RuntimeError::UnknownNode(id)) if id == "nope"));
}

#[tokio::test]
async fn test_concurrent_runs_are_isolated() {
  let completion = Arc::new(
    ScriptedCompletion::new()
      .respond("Say hi to Ana", "Hi Ana!")
      .respond("Say hi to Bo", "Hi Bo!"),
  );
  let runtime = Arc::new(runtime_with(completion, Arc::new(RecordingHost::new())));
  let flow = Arc::new(load(greeting_nodes()));

  let handles: Vec<_> = ["Ana", "Bo"]
    .into_iter()
    .map(|name| {
      let runtime = runtime.clone();
      let flow = flow.clone();
      tokio::spawn(async move {
        runtime
          .execute(&flow, vars(json!({ "name": name })), CancellationToken::new())
          .await
      })
    })
    .collect();

  let mut outputs = Vec::new();
  for handle in handles {
    outputs.push(handle.await.unwrap().output);
  }

  assert_eq!(outputs, vec![Some(json!("Hi Ana!")), Some(json!("Hi Bo!"))]);
}

#[tokio::test]
async fn test_ai_call_routes_by_provider() {
  let router = CompletionRouter::new()
    .with_provider("openai", Arc::new(StaticCompletion::new("from openai")))
    .with_provider("local", Arc::new(StaticCompletion::new("from local")));
  let runtime = runtime_with(Arc::new(router), Arc::new(RecordingHost::new()));
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["default", "local"] },
    { "id": "default", "type": "ai_call", "config": { "prompt": "p", "outputVariable": "a" } },
    {
      "id": "local",
      "type": "ai_call",
      "config": { "prompt": "p", "provider": "local", "outputVariable": "b" }
    }
  ]));

  let ctx = runtime
    .execute(&flow, Variables::new(), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.variables.get("a"), Some(&json!("from openai")));
  assert_eq!(ctx.variables.get("b"), Some(&json!("from local")));
}

#[tokio::test]
async fn test_ai_call_unknown_provider_fails_run() {
  let router = CompletionRouter::new().with_provider("openai", Arc::new(StaticCompletion::new("ok")));
  let runtime = runtime_with(Arc::new(router), Arc::new(RecordingHost::new()));
  let flow = load(json!([
    { "id": "start", "type": "trigger", "successors": ["ask"] },
    { "id": "ask", "type": "ai_call", "config": { "prompt": "p", "provider": "anthropic" } }
  ]));

  let ctx = runtime
    .execute(&flow, Variables::new(), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Failed);
  let failed = ctx.result_of("ask").unwrap();
  assert_eq!(failed.status, LogStatus::Failed);
  assert!(ctx.error.as_deref().unwrap().contains("anthropic"));
}

#[tokio::test]
async fn test_deserialized_flow_runs() {
  let (runtime, _) = runtime();
  let flow: Flow = serde_json::from_value(json!({
    "id": "flow_test",
    "name": "Test flow",
    "nodes": [
      { "id": "start", "type": "trigger", "successors": ["done"] },
      { "id": "done", "type": "output", "config": { "outputVariable": "x" } }
    ]
  }))
  .unwrap();

  let ctx = runtime
    .execute(&flow, vars(json!({ "x": 1 })), CancellationToken::new())
    .await;

  assert_eq!(ctx.status, ExecutionStatus::Completed);
  assert_eq!(ctx.output, Some(json!(1)));

  let broken = serde_json::from_value::<Flow>(json!({
    "id": "flow_test",
    "name": "Test flow",
    "nodes": [{ "id": "start", "type": "trigger", "successors": ["ghost"] }]
  }));
  assert!(broken.is_err());
}
