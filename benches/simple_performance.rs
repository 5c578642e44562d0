use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sms_core::*;
use smsgate::{ConnectorRegistry, GatewayConfig};
use std::sync::Arc;
use tokio::runtime::Runtime;

const LAYOUT: ResponseLayout = ResponseLayout {
    status: "/status",
    message: "/message",
    data: "/data",
    success: 1,
};

fn outbox_body(records: usize) -> String {
    let items: Vec<String> = (0..records)
        .map(|i| {
            format!(
                r#"{{"messageId":{i},"mobile":"98912{i:07}","messageText":"hi","sendDateTime":1700000000,"lineNumber":30004505,"cost":1.0}}"#
            )
        })
        .collect();
    format!(r#"{{"status":1,"message":"ok","data":[{}]}}"#, items.join(","))
}

fn benchmark_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    for records in [1, 100, 1000] {
        let response = HttpResponse {
            status: 200,
            body: outbox_body(records),
        };
        group.bench_with_input(BenchmarkId::new("classify", records), &records, |b, _| {
            b.iter(|| black_box(classify(&LAYOUT, &response)))
        });
    }

    let malformed = HttpResponse {
        status: 404,
        body: String::new(),
    };
    group.bench_function("classify_malformed", |b| {
        b.iter(|| black_box(classify(&LAYOUT, &malformed)))
    });

    group.finish();
}

fn benchmark_extraction(c: &mut Criterion) {
    let fields = OutboxFields {
        message_id: "messageId",
        recipient: "mobile",
        body: "messageText",
        sent_at: "sendDateTime",
        sender: "lineNumber",
        cost: "cost",
    };
    let envelope = classify(
        &LAYOUT,
        &HttpResponse {
            status: 200,
            body: outbox_body(100),
        },
    )
    .unwrap();

    let mut group = c.benchmark_group("extraction");
    group.bench_function("outbox_records_100", |b| {
        b.iter(|| black_box(envelope.outbox_records(&fields)))
    });
    group.finish();
}

fn benchmark_send_round_trip(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mock = MockTransport::responding(200, r#"{"status":1,"message":"ok","data":{"id":42}}"#);
    let config = GatewayConfig::default()
        .with_provider("smsir", ProviderConfig::new("k").with_line_number("30004505"));
    let connector = ConnectorRegistry::builtin(Arc::new(mock))
        .driver(&config)
        .unwrap();
    let message = Message::text(["989121234567"], "hi").unwrap();

    let mut group = c.benchmark_group("connector");
    group.bench_function("send_mock_transport", |b| {
        b.to_async(&rt)
            .iter(|| async { black_box(connector.send(&message).await) })
    });
    group.finish();
}

fn benchmark_selection(c: &mut Criterion) {
    let registry = ConnectorRegistry::builtin(Arc::new(MockTransport::new()));
    let config = GatewayConfig::default()
        .with_provider("smsir", ProviderConfig::new("k"))
        .with_provider("kavenegar", ProviderConfig::new("KEY"));

    let mut group = c.benchmark_group("selection");

    group.bench_function("driver", |b| b.iter(|| black_box(registry.driver(&config))));

    group.bench_function("create_default_config", |b| {
        b.iter(|| black_box(smsgate::AppConfig::default()))
    });

    group.finish();
}

criterion_group!(
    benches,
    benchmark_classification,
    benchmark_extraction,
    benchmark_send_round_trip,
    benchmark_selection
);

criterion_main!(benches);
