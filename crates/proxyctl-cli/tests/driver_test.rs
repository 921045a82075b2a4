//! End-to-end invocations through the driver with a scripted transport.

use std::sync::Arc;
use std::time::Duration;

use proxyctl_cli::commands::build_tree;
use proxyctl_cli::driver::{EXIT_FAILURE, EXIT_SUCCESS};
use proxyctl_cli::{Config, Driver, Format, OutputFormat};
use proxyctl_core::testing::{FakeTransport, Reply};
use proxyctl_core::{CtlError, ErrorKind, ExecutionPolicy, Host, Method, Mode};

fn driver(fake: &Arc<FakeTransport>, hosts: &[&str], policy: ExecutionPolicy, format: Format) -> Driver {
    let config = Config {
        hosts: hosts.iter().map(|h| Host::new(*h)).collect(),
        policy,
        format,
    };
    let tree = build_tree(OutputFormat::new(format)).expect("tree");
    Driver::new(tree, fake.clone(), &config)
}

fn sequential(fake: &Arc<FakeTransport>, hosts: &[&str]) -> Driver {
    driver(fake, hosts, ExecutionPolicy::default(), Format::Table)
}

async fn invoke(driver: &Driver, tokens: &[&str]) -> (u8, String) {
    let outcome = driver.run(tokens).await;
    let mut buf = Vec::new();
    let code = driver.finish(&outcome, &mut buf);
    (code, String::from_utf8(buf).expect("utf8"))
}

#[tokio::test]
async fn clear_server_issues_one_put_and_exits_zero() {
    let fake = Arc::new(FakeTransport::new().reply("http://a", Reply::Status(204, String::new())));
    let driver = sequential(&fake, &["http://a:8989", "http://b:8989"]);

    let (code, out) = invoke(&driver, &["clear", "server", "db1", "maintenance"]).await;

    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(out, "");
    let calls = fake.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, Method::Put);
    assert_eq!(calls[0].url, "http://a:8989/v1/servers/db1/clear?state=maintenance");
}

#[tokio::test]
async fn unknown_top_level_command_never_touches_the_network() {
    let fake = Arc::new(FakeTransport::new());
    let driver = sequential(&fake, &["http://a:8989"]);

    let (code, out) = invoke(&driver, &["bogus"]).await;

    assert_eq!(code, EXIT_FAILURE);
    assert!(out.contains("Unknown command 'bogus'"));
    assert!(out.contains("`help`"));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn failover_skips_unreachable_and_failing_hosts() {
    let fake = Arc::new(
        FakeTransport::new()
            .reply("http://a", Reply::Fail("connection refused".into()))
            .reply("http://b", Reply::Status(503, "starting".into()))
            .reply("http://c", Reply::Status(200, String::new())),
    );
    let driver = sequential(&fake, &["http://a:8989", "http://b:8989", "http://c:8989"]);

    let (code, _) = invoke(&driver, &["set", "server", "db1", "slave"]).await;

    assert_eq!(code, EXIT_SUCCESS);
    let hosts: Vec<String> = fake
        .urls()
        .iter()
        .map(|u| u.split("/v1/").next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(hosts, vec!["http://a:8989", "http://b:8989", "http://c:8989"]);
}

#[tokio::test]
async fn timed_out_attempt_fails_over() {
    let fake = Arc::new(FakeTransport::new().reply("http://a", Reply::Hang));
    let policy = ExecutionPolicy::default().with_timeout(Duration::from_millis(50));
    let driver = driver(&fake, &["http://a:8989", "http://b:8989"], policy, Format::Table);

    let (code, _) = invoke(&driver, &["clear", "server", "db1", "drain"]).await;

    assert_eq!(code, EXIT_SUCCESS);
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn retries_are_spent_per_host() {
    let fake = Arc::new(FakeTransport::new().replies(
        "http://a",
        vec![
            Reply::Fail("connection reset".into()),
            Reply::Status(200, String::new()),
        ],
    ));
    let policy = ExecutionPolicy::default().with_retries(1);
    let driver = driver(&fake, &["http://a:8989", "http://b:8989"], policy, Format::Table);

    let (code, _) = invoke(&driver, &["clear", "server", "db1", "stale"]).await;

    assert_eq!(code, EXIT_SUCCESS);
    assert!(fake.urls().iter().all(|u| u.starts_with("http://a:8989")));
    assert_eq!(fake.call_count(), 2);
}

#[tokio::test]
async fn fan_out_partial_failure_names_hosts_in_order() {
    let fake = Arc::new(
        FakeTransport::new()
            .reply(
                "http://a",
                Reply::Delayed(Duration::from_millis(40), Box::new(Reply::Fail("connection refused".into()))),
            )
            .reply("http://c", Reply::Fail("connection refused".into())),
    );
    let policy = ExecutionPolicy::default().with_mode(Mode::FanOut);
    let driver = driver(
        &fake,
        &["http://a:8989", "http://b:8989", "http://c:8989"],
        policy,
        Format::Table,
    );

    let outcome = driver.run(&["set", "server", "db1", "maintenance"]).await;
    let err = outcome.as_ref().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PartialFailure);
    let failed: Vec<&str> = err.host_failures().iter().map(|f| f.host.as_str()).collect();
    assert_eq!(failed, vec!["http://a:8989", "http://c:8989"]);

    let mut buf = Vec::new();
    assert_eq!(driver.finish(&outcome, &mut buf), EXIT_FAILURE);
    let out = String::from_utf8(buf).expect("utf8");
    assert!(out.contains("2 of 3"));
}

#[tokio::test]
async fn invalid_state_is_rejected_before_any_request() {
    let fake = Arc::new(FakeTransport::new());
    let driver = sequential(&fake, &["http://a:8989"]);

    let (code, out) = invoke(&driver, &["set", "server", "db1", "sleeping"]).await;

    assert_eq!(code, EXIT_FAILURE);
    assert!(out.contains("Invalid state 'sleeping'"));
    assert!(out.contains("Usage: set server <server> <state>"));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn server_rejection_is_reported_with_status() {
    let fake = Arc::new(FakeTransport::new().reply(
        "http://a",
        Reply::Status(400, r#"{"errors":[{"detail":"Invalid or missing value for 'state'"}]}"#.into()),
    ));
    let driver = sequential(&fake, &["http://a:8989"]);

    let outcome = driver.run(&["clear", "server", "db1", "synced"]).await;

    assert!(matches!(outcome, Err(CtlError::ServerRejected { status: 400, .. })));
    let mut buf = Vec::new();
    driver.finish(&outcome, &mut buf);
    let out = String::from_utf8(buf).expect("utf8");
    assert!(out.contains("HTTP 400"));
    assert!(out.contains("Invalid or missing value for 'state'"));
}

#[tokio::test]
async fn help_renders_branch_usage() {
    let fake = Arc::new(FakeTransport::new());
    let driver = sequential(&fake, &["http://a:8989"]);

    let (code, out) = invoke(&driver, &["help", "clear"]).await;

    assert_eq!(code, EXIT_SUCCESS);
    assert!(out.starts_with("Usage: clear <command>"));
    assert!(out.contains("server <server> <state>"));
    assert_eq!(fake.call_count(), 0);
}

#[tokio::test]
async fn list_servers_in_json_mode() {
    let fake = Arc::new(FakeTransport::new().reply(
        "http://a",
        Reply::Status(
            200,
            r#"{"data":[{"id":"db1","attributes":{"state":"Running","parameters":{"address":"10.0.0.5","port":3306}}}]}"#
                .into(),
        ),
    ));
    let driver = driver(&fake, &["http://a:8989"], ExecutionPolicy::default(), Format::Json);

    let (code, out) = invoke(&driver, &["list", "servers"]).await;

    assert_eq!(code, EXIT_SUCCESS);
    let value: serde_json::Value = serde_json::from_str(&out).expect("json output");
    assert_eq!(value[0]["server"], "db1");
    assert_eq!(value[0]["address"], "10.0.0.5");
}
