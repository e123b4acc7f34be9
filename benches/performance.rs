use assistant_runs::{Message, MessageSet, RunStreamEvent, ToolRegistry};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde::Deserialize;
use serde_json::json;

fn message_payload(id: &str, text_size: usize) -> String {
    json!({
        "id": id,
        "object": "thread.message",
        "thread_id": "thread_1",
        "role": "assistant",
        "content": [{"type": "text", "text": {"value": "a".repeat(text_size), "annotations": []}}]
    })
    .to_string()
}

// Stream of message versions where each id is revised `revisions` times
fn create_versions(ids: usize, revisions: usize) -> Vec<Message> {
    (0..revisions)
        .flat_map(|_| 0..ids)
        .map(|i| serde_json::from_str(&message_payload(&format!("msg_{}", i), 64)).unwrap())
        .collect()
}

// Benchmark: upserting message versions into the working set
fn bench_message_set_upsert(c: &mut Criterion) {
    let mut group = c.benchmark_group("message_set_upsert");

    for ids in [1, 10, 50, 200].iter() {
        let versions = create_versions(*ids, 5);
        group.bench_with_input(BenchmarkId::from_parameter(ids), &versions, |b, versions| {
            b.iter(|| {
                let mut set = MessageSet::new();
                for message in versions {
                    set.upsert(black_box(message.clone()));
                }
                set.len()
            });
        });
    }

    group.finish();
}

// Benchmark: decoding event payloads of varying sizes
fn bench_decode_message_event(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_message_event");

    for size in [16, 256, 4096, 65536].iter() {
        let payload = message_payload("msg_1", *size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &payload, |b, payload| {
            b.iter(|| RunStreamEvent::decode(black_box(payload)).unwrap());
        });
    }

    group.finish();
}

// Benchmark: decoding a run that requires several tool calls
fn bench_decode_required_action(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode_required_action");

    for calls in [1, 8, 32].iter() {
        let tool_calls: Vec<_> = (0..*calls)
            .map(|i| {
                json!({
                    "id": format!("call_{}", i),
                    "type": "function",
                    "function": {"name": "getWeather", "arguments": "{\"city\":\"Zurich\"}"}
                })
            })
            .collect();
        let payload = json!({
            "id": "run_1",
            "object": "thread.run",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {"tool_calls": tool_calls}
            }
        })
        .to_string();

        group.bench_with_input(BenchmarkId::from_parameter(calls), &payload, |b, payload| {
            b.iter(|| RunStreamEvent::decode(black_box(payload)).unwrap());
        });
    }

    group.finish();
}

#[derive(Deserialize)]
struct AddArgs {
    a: f64,
    b: f64,
}

// Benchmark: a registry round trip from argument text to output text
fn bench_tool_invoke(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let registry = ToolRegistry::new();
    registry.register("add", |args: AddArgs| async move {
        Ok::<_, std::io::Error>(json!({"sum": args.a + args.b}))
    });

    c.bench_function("tool_invoke", |b| {
        b.iter(|| {
            runtime
                .block_on(registry.invoke("add", black_box(r#"{"a": 2, "b": 3}"#)))
                .unwrap()
        });
    });
}

criterion_group!(
    benches,
    bench_message_set_upsert,
    bench_decode_message_event,
    bench_decode_required_action,
    bench_tool_invoke,
);
criterion_main!(benches);
