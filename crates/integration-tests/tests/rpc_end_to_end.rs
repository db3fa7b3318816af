//! End-to-end tests: demo service served by the JSON-RPC server, called through the SDK.

use serde_json::{json, Value};
use std::sync::Arc;
use svcbind_api_rpc::{RpcServer, RpcServerConfig, RunningServer};
use svcbind_core::{BindConfig, ServiceBinder};
use svcbind_daemon::echo::{EchoReply, GetLoginKindResponse, UserInfo};
use svcbind_daemon::{EchoService, DEFAULT_SERVICE_NAME};
use svcbind_sdk::{SdkError, ServiceClient};

fn ephemeral() -> RpcServerConfig {
    RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    }
}

async fn start(config: BindConfig) -> (RunningServer, ServiceClient) {
    let binder = ServiceBinder::register(DEFAULT_SERVICE_NAME, EchoService::new(), config).unwrap();
    let server = RpcServer::new(ephemeral(), Arc::new(binder))
        .start()
        .await
        .unwrap();
    let client = ServiceClient::connect(server.url()).await.unwrap();
    (server, client)
}

#[tokio::test(flavor = "multi_thread")]
async fn test_typed_call_round_trip() {
    let (server, client) = start(BindConfig::default()).await;

    let reply: EchoReply = client
        .invoke("echo", &json!({"message": "hello", "repeat": 2}))
        .await
        .unwrap();
    assert_eq!(reply.message, "hello hello");

    let login: GetLoginKindResponse = client
        .invoke("get_login_kind", &json!({"channel": "app"}))
        .await
        .unwrap();
    assert_eq!(login.base.message, "ok");
    assert_eq!(login.kinds.len(), 2);

    server.handle.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_void_call_then_read_back() {
    let (server, client) = start(BindConfig::default()).await;

    client
        .invoke_void(
            "update_info",
            &json!({"name": "kim", "nickname": "kk", "meta": {"team": "core"}}),
        )
        .await
        .unwrap();

    let user: UserInfo = client
        .invoke("get_user_info", &json!({"name": "kim"}))
        .await
        .unwrap();
    assert_eq!(user.nickname.as_deref(), Some("kk"));
    assert_eq!(user.meta.get("team").map(String::as_str), Some("core"));

    server.handle.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_signature_over_the_wire() {
    let (server, client) = start(BindConfig::default()).await;

    let document = client.signature().await.unwrap();
    let parsed: serde_yaml::Value = serde_yaml::from_str(&document).unwrap();
    assert_eq!(parsed["apiVersion"].as_str(), Some(DEFAULT_SERVICE_NAME));

    assert_eq!(
        client.method_names().await.unwrap(),
        vec!["echo", "get_login_kind", "get_user_info", "list_areas", "update_info"]
    );

    server.handle.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_custom_signature_method() {
    let config = BindConfig {
        signature_method: "describe".to_string(),
        ..BindConfig::default()
    };
    let (server, client) = start(config).await;

    let err = client.signature().await.unwrap_err();
    assert_eq!(err.code(), Some(-32601));

    let client = client.with_signature_method("describe");
    assert!(client.signature().await.unwrap().contains("name: echo"));

    server.handle.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_error_codes() {
    let (server, client) = start(BindConfig::default()).await;

    // validation: channel must be web or app
    let err = client
        .invoke::<_, Value>("get_login_kind", &json!({"channel": "tv"}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(4001));

    // business error from the method itself
    let err = client
        .invoke::<_, Value>("list_areas", &json!({"parent": "99"}))
        .await
        .unwrap_err();
    match err {
        SdkError::Rpc { code, message } => {
            assert_eq!(code, 5000);
            assert_eq!(message, "unknown area code: 99");
        }
        other => panic!("unexpected error: {other}"),
    }

    // body that does not decode into the argument record
    let err = client
        .invoke::<_, Value>("echo", &json!("plain text"))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(4000));

    server.handle.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unknown_method_rejected_before_dispatch() {
    let (server, client) = start(BindConfig::default()).await;

    let err = client
        .invoke::<_, Value>("Echo", &json!({"message": "hi"}))
        .await
        .unwrap_err();
    assert_eq!(err.code(), Some(-32601));

    server.handle.stop().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn test_concurrent_calls() {
    let (server, client) = start(BindConfig::default()).await;
    let client = Arc::new(client);

    let mut handles = Vec::new();
    for i in 0..16 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            let reply: EchoReply = client
                .invoke("echo", &json!({"message": format!("m{}", i)}))
                .await
                .unwrap();
            assert_eq!(reply.message, format!("m{}", i));
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    server.handle.stop().unwrap();
}
