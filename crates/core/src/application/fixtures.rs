//! Test services shared by the application tests

use crate::application::registry::{Methods, Service};
use crate::domain::{CallContext, Describe, TypeShape};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct EchoMessage {
    pub message: String,
}

impl Describe for EchoMessage {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>().field::<String>("message").build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateInfoRequest {
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl Describe for UpdateInfoRequest {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field_with::<String>("name", "required")
            .field_with::<Option<String>>("nickname", "omitempty,min=2")
            .build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BaseResponse {
    pub result: i32,
    #[serde(rename = "msg")]
    pub message: String,
}

impl Describe for BaseResponse {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field::<i32>("result")
            .field::<String>("msg")
            .build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginKind {
    pub name: String,
    pub label: String,
}

impl Describe for LoginKind {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field::<String>("name")
            .field::<String>("label")
            .build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetLoginKindRequest {
    #[serde(default)]
    pub channel: String,
}

impl Describe for GetLoginKindRequest {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field_with::<String>("channel", "required,oneof=web app")
            .build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GetLoginKindResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub kinds: Vec<LoginKind>,
}

impl Describe for GetLoginKindResponse {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .embed::<BaseResponse>()
            .field::<Vec<LoginKind>>("kinds")
            .build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AreaQuery {
    #[serde(default)]
    pub code: String,
}

impl Describe for AreaQuery {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>().field::<String>("code").build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AreaNode {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub children: Vec<Box<AreaNode>>,
}

impl Describe for AreaNode {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field::<String>("code")
            .field::<String>("name")
            .field::<Vec<Box<AreaNode>>>("children")
            .build()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AreaTree {
    pub roots: Vec<AreaNode>,
    pub labels: BTreeMap<String, String>,
}

impl Describe for AreaTree {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field::<Vec<AreaNode>>("roots")
            .field::<BTreeMap<String, String>>("labels")
            .build()
    }
}

/// Service with one method of every supported form
#[derive(Default)]
pub struct DemoServer {
    pub updates: Mutex<Vec<String>>,
}

impl DemoServer {
    fn echo(&self, _ctx: &CallContext, input: &EchoMessage, out: &mut EchoMessage) -> Result<(), String> {
        if input.message == "fail" {
            return Err("echo refused".to_string());
        }
        out.message = input.message.clone();
        Ok(())
    }

    fn update_info(&self, _ctx: &CallContext, input: &UpdateInfoRequest) -> Result<(), String> {
        self.updates
            .lock()
            .map_err(|e| e.to_string())?
            .push(input.name.clone());
        Ok(())
    }

    fn get_login_kind(
        &self,
        _ctx: &CallContext,
        input: &GetLoginKindRequest,
        out: &mut GetLoginKindResponse,
    ) -> Result<(), String> {
        out.base.message = format!("kinds for {}", input.channel);
        out.kinds.push(LoginKind {
            name: "password".to_string(),
            label: "Password".to_string(),
        });
        Ok(())
    }

    fn list_areas(&self, _ctx: &CallContext, input: &AreaQuery, out: &mut AreaTree) -> Result<(), String> {
        if !input.code.is_empty() {
            out.roots.push(AreaNode {
                code: input.code.clone(),
                name: "root".to_string(),
                children: Vec::new(),
            });
        }
        Ok(())
    }
}

impl Service for DemoServer {
    fn methods(methods: &mut Methods<Self>) {
        methods
            .method("Echo", Self::echo)
            .void("UpdateInfo", Self::update_info)
            .method("GetLoginKind", Self::get_login_kind)
            .method("ListAreas", Self::list_areas);
    }
}

/// Service whose only method panics
pub struct PanickingServer;

impl PanickingServer {
    fn explode(&self, _ctx: &CallContext, input: &EchoMessage, _out: &mut EchoMessage) -> Result<(), String> {
        panic!("cannot echo {}", input.message);
    }
}

impl Service for PanickingServer {
    fn methods(methods: &mut Methods<Self>) {
        methods.method("Explode", Self::explode);
    }
}

/// Service where most declared methods break the eligibility contract
pub struct MixedServer;

impl MixedServer {
    fn ping(&self, _ctx: &CallContext, input: &EchoMessage, out: &mut EchoMessage) -> Result<(), String> {
        out.message = input.message.clone();
        Ok(())
    }

    fn scalar_argument(&self, _ctx: &CallContext, input: &String, out: &mut EchoMessage) -> Result<(), String> {
        out.message = input.clone();
        Ok(())
    }

    fn scalar_result(&self, _ctx: &CallContext, input: &EchoMessage, out: &mut Vec<String>) -> Result<(), String> {
        out.push(input.message.clone());
        Ok(())
    }
}

impl Service for MixedServer {
    fn methods(methods: &mut Methods<Self>) {
        methods
            .method("Ping", Self::ping)
            .method("ping2", Self::ping)
            .method("", Self::ping)
            .method("ScalarArgument", Self::scalar_argument)
            .method("ScalarResult", Self::scalar_result)
            .method("GetSignature", Self::ping);
    }
}

/// Two declared names that map to the same wire name
pub struct CollidingServer;

impl CollidingServer {
    fn first(&self, _ctx: &CallContext, _input: &EchoMessage, out: &mut EchoMessage) -> Result<(), String> {
        out.message = "first".to_string();
        Ok(())
    }

    fn second(&self, _ctx: &CallContext, _input: &EchoMessage, out: &mut EchoMessage) -> Result<(), String> {
        out.message = "second".to_string();
        Ok(())
    }
}

impl Service for CollidingServer {
    fn methods(methods: &mut Methods<Self>) {
        methods
            .method("LoadPDF", Self::first)
            .method("LoadPdf", Self::second);
    }
}

/// Declares nothing
pub struct EmptyServer;

impl Service for EmptyServer {
    fn methods(_methods: &mut Methods<Self>) {}
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BadTagRequest {
    pub size: i64,
}

impl Describe for BadTagRequest {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field_with::<i64>("size", "required,between=1")
            .build()
    }
}

/// Eligible method whose argument carries a malformed rule
pub struct BadTagServer;

impl BadTagServer {
    fn resize(&self, _ctx: &CallContext, _input: &BadTagRequest) -> Result<(), String> {
        Ok(())
    }
}

impl Service for BadTagServer {
    fn methods(methods: &mut Methods<Self>) {
        methods.void("Resize", Self::resize);
    }
}

#[derive(Debug, Default, Serialize)]
pub struct CalendarResponse {
    #[serde(skip)]
    pub created: Option<chrono::DateTime<chrono::Local>>,
}

impl Describe for CalendarResponse {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field::<Option<chrono::DateTime<chrono::Local>>>("created")
            .build()
    }
}

/// Eligible method whose result uses a general calendar type
pub struct CalendarServer;

impl CalendarServer {
    fn created(&self, _ctx: &CallContext, _input: &EchoMessage, out: &mut CalendarResponse) -> Result<(), String> {
        out.created = Some(chrono::Local::now());
        Ok(())
    }
}

impl Service for CalendarServer {
    fn methods(methods: &mut Methods<Self>) {
        methods.method("Created", Self::created);
    }
}
