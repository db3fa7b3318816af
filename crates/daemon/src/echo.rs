//! Demo Service
//!
//! Small account-style service exercising every method form: typed results,
//! a void method, validated arguments, embedded records and a recursive tree.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use svcbind_core::{CallContext, Describe, JsonTime, Methods, Service, TypeShape};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum DemoError {
    #[error("unknown area code: {0}")]
    UnknownArea(String),

    #[error("user not found: {0}")]
    UserNotFound(String),

    #[error("user store is unavailable")]
    Poisoned,
}

// ============================================================================
// Records
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EchoRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub repeat: u32,
}

impl Describe for EchoRequest {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field_with::<String>("message", "required")
            .field_with::<u32>("repeat", "omitempty,max=10")
            .build()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EchoReply {
    pub message: String,
    pub received_at: JsonTime,
}

impl Describe for EchoReply {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field::<String>("message")
            .field::<JsonTime>("received_at")
            .build()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Describe for UserInfo {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field_with::<String>("name", "required")
            .field_with::<Option<String>>("nickname", "omitempty,min=2,max=32")
            .field::<BTreeMap<String, String>>("meta")
            .build()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetUserInfoRequest {
    #[serde(default)]
    pub name: String,
}

impl Describe for GetUserInfoRequest {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field_with::<String>("name", "required")
            .build()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
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

/// Login type
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginKind {
    /// Internal name
    pub name: String,
    /// Display name
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetLoginKindRequest {
    /// Login channel: web or app
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetLoginKindResponse {
    #[serde(flatten)]
    pub base: BaseResponse,
    pub kinds: Vec<LoginKind>,
    #[serde(rename = "create")]
    pub created: JsonTime,
}

impl Describe for GetLoginKindResponse {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .embed::<BaseResponse>()
            .field::<Vec<LoginKind>>("kinds")
            .field::<JsonTime>("create")
            .build()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
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

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAreasRequest {
    /// Root code; empty lists every top-level area
    #[serde(default)]
    pub parent: String,
}

impl Describe for ListAreasRequest {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>().field::<String>("parent").build()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListAreasResponse {
    pub areas: Vec<AreaNode>,
    /// Area code to display name, for every returned node
    pub labels: BTreeMap<String, String>,
}

impl Describe for ListAreasResponse {
    fn shape() -> TypeShape {
        TypeShape::record::<Self>()
            .field::<Vec<AreaNode>>("areas")
            .field::<BTreeMap<String, String>>("labels")
            .build()
    }
}

// ============================================================================
// Service
// ============================================================================

pub struct EchoService {
    users: RwLock<HashMap<String, UserInfo>>,
    areas: Vec<AreaNode>,
}

impl Default for EchoService {
    fn default() -> Self {
        Self::new()
    }
}

impl EchoService {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            areas: default_areas(),
        }
    }

    fn echo(&self, ctx: &CallContext, input: &EchoRequest, out: &mut EchoReply) -> Result<(), DemoError> {
        debug!(request_id = %ctx.request_id(), "echo");
        let times = input.repeat.max(1) as usize;
        out.message = vec![input.message.as_str(); times].join(" ");
        out.received_at = JsonTime::now();
        Ok(())
    }

    fn update_info(&self, _ctx: &CallContext, input: &UserInfo) -> Result<(), DemoError> {
        let mut users = self.users.write().map_err(|_| DemoError::Poisoned)?;
        users.insert(input.name.clone(), input.clone());
        Ok(())
    }

    fn get_user_info(
        &self,
        _ctx: &CallContext,
        input: &GetUserInfoRequest,
        out: &mut UserInfo,
    ) -> Result<(), DemoError> {
        let users = self.users.read().map_err(|_| DemoError::Poisoned)?;
        *out = users
            .get(&input.name)
            .cloned()
            .ok_or_else(|| DemoError::UserNotFound(input.name.clone()))?;
        Ok(())
    }

    fn get_login_kind(
        &self,
        _ctx: &CallContext,
        input: &GetLoginKindRequest,
        out: &mut GetLoginKindResponse,
    ) -> Result<(), DemoError> {
        out.kinds.push(login_kind("password", "Password"));
        match input.channel.as_str() {
            "web" => out.kinds.push(login_kind("qrcode", "QR Code")),
            _ => out.kinds.push(login_kind("sms", "SMS")),
        }
        out.base.message = "ok".to_string();
        out.created = JsonTime::now();
        Ok(())
    }

    fn list_areas(
        &self,
        _ctx: &CallContext,
        input: &ListAreasRequest,
        out: &mut ListAreasResponse,
    ) -> Result<(), DemoError> {
        out.areas = if input.parent.is_empty() {
            self.areas.clone()
        } else {
            let node = find_area(&self.areas, &input.parent)
                .ok_or_else(|| DemoError::UnknownArea(input.parent.clone()))?;
            node.children.iter().map(|child| (**child).clone()).collect()
        };
        for area in &out.areas {
            collect_labels(area, &mut out.labels);
        }
        Ok(())
    }
}

impl Service for EchoService {
    fn methods(methods: &mut Methods<Self>) {
        methods
            .method("Echo", Self::echo)
            .void("UpdateInfo", Self::update_info)
            .method("GetUserInfo", Self::get_user_info)
            .method("GetLoginKind", Self::get_login_kind)
            .method("ListAreas", Self::list_areas);
    }
}

fn login_kind(name: &str, label: &str) -> LoginKind {
    LoginKind {
        name: name.to_string(),
        label: label.to_string(),
    }
}

fn area(code: &str, name: &str, children: Vec<AreaNode>) -> AreaNode {
    AreaNode {
        code: code.to_string(),
        name: name.to_string(),
        children: children.into_iter().map(Box::new).collect(),
    }
}

fn default_areas() -> Vec<AreaNode> {
    vec![
        area(
            "11",
            "Seoul",
            vec![area("11010", "Jongno-gu", vec![]), area("11020", "Jung-gu", vec![])],
        ),
        area(
            "26",
            "Busan",
            vec![area("26110", "Jung-gu", vec![]), area("26140", "Seo-gu", vec![])],
        ),
    ]
}

fn find_area<'a>(areas: &'a [AreaNode], code: &str) -> Option<&'a AreaNode> {
    areas.iter().find_map(|area| find_in(area, code))
}

fn find_in<'a>(area: &'a AreaNode, code: &str) -> Option<&'a AreaNode> {
    if area.code == code {
        return Some(area);
    }
    area.children.iter().find_map(|child| find_in(child, code))
}

fn collect_labels(area: &AreaNode, labels: &mut BTreeMap<String, String>) {
    labels.insert(area.code.clone(), area.name.clone());
    for child in &area.children {
        collect_labels(child, labels);
    }
}
