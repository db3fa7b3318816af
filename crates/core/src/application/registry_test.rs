//! Unit tests for method discovery

use super::fixtures::{
    BadTagServer, CollidingServer, DemoServer, EchoMessage, EmptyServer, MixedServer,
};
use super::registry::{discover, ResultKind};
use crate::config::{BindConfig, CollisionPolicy};
use crate::domain::{CallContext, SchemaError, TypeRef};
use crate::error::BindError;
use std::sync::Arc;

#[test]
fn test_discover_uses_wire_names() {
    let service = discover("demo", Arc::new(DemoServer::default()), &BindConfig::default()).unwrap();

    assert_eq!(service.name(), "demo");
    assert_eq!(
        service.wire_names(),
        vec!["echo", "get_login_kind", "list_areas", "update_info"]
    );

    let echo = service.get("echo").unwrap();
    assert_eq!(echo.declared_name(), "Echo");
    assert_eq!(echo.argument(), TypeRef::of::<EchoMessage>());
    assert_eq!(echo.result(), ResultKind::Typed(TypeRef::of::<EchoMessage>()));
    assert_eq!(echo.call_count(), 0);

    assert_eq!(service.get("update_info").unwrap().result(), ResultKind::Void);
    assert!(service.get("Echo").is_none());
}

#[test]
fn test_ineligible_methods_are_skipped() {
    let service = discover("mixed", Arc::new(MixedServer), &BindConfig::default()).unwrap();

    // lowercase, empty, scalar argument, scalar result and reserved names are dropped
    assert_eq!(service.wire_names(), vec!["ping"]);
}

#[test]
fn test_custom_signature_method_frees_default_name() {
    let config = BindConfig {
        signature_method: "describe".to_string(),
        ..BindConfig::default()
    };
    let service = discover("mixed", Arc::new(MixedServer), &config).unwrap();

    assert_eq!(service.wire_names(), vec!["get_signature", "ping"]);
}

#[test]
fn test_collision_rejected_by_default() {
    let err = discover("pdf", Arc::new(CollidingServer), &BindConfig::default()).unwrap_err();

    match err {
        BindError::NameCollision {
            wire_name,
            first,
            second,
        } => {
            assert_eq!(wire_name, "load_pdf");
            assert_eq!(first, "LoadPDF");
            assert_eq!(second, "LoadPdf");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_collision_overwrite_keeps_later_method() {
    let config = BindConfig {
        collision_policy: CollisionPolicy::Overwrite,
        ..BindConfig::default()
    };
    let service = discover("pdf", Arc::new(CollidingServer), &config).unwrap();

    assert_eq!(service.len(), 1);
    assert_eq!(service.get("load_pdf").unwrap().declared_name(), "LoadPdf");

    let handler = super::dispatcher::method_handler(
        service.get("load_pdf").unwrap().clone(),
        Arc::new(config),
    );
    let content = handler(&CallContext::new(), br#"{"message":""}"#, "application/json")
        .unwrap()
        .unwrap();
    assert_eq!(content.data, br#"{"message":"second"}"#.to_vec());
}

#[test]
fn test_empty_service_name_rejected() {
    let err = discover("  ", Arc::new(DemoServer::default()), &BindConfig::default()).unwrap_err();
    assert!(matches!(err, BindError::EmptyName));
}

#[test]
fn test_no_eligible_methods_is_fatal() {
    let err = discover("empty", Arc::new(EmptyServer), &BindConfig::default()).unwrap_err();
    assert!(matches!(err, BindError::NoEligibleMethods { ref service } if service == "empty"));
    assert!(err.to_string().contains("no eligible methods"));
}

#[test]
fn test_malformed_rule_is_fatal() {
    let err = discover("bad", Arc::new(BadTagServer), &BindConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        BindError::Schema(SchemaError::InvalidRule { ref field, .. }) if field == "size"
    ));
}
