//! Static catalog of Dao3 platform operations.
//!
//! Each entry describes one MCP tool: its name, description, argument schema and the path
//! template used to build the upstream request. The catalog is built once at startup and is
//! immutable afterwards.

use crate::error::CatalogError;
use crate::template::PathTemplate;
use rmcp::model::JsonObject;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::fmt;

/// Argument type accepted by an operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Number,
}

impl ParamKind {
    /// JSON Schema `type` keyword for this kind.
    #[must_use]
    pub const fn json_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
        }
    }

    /// Whether `value` is acceptable for this kind. No range checks are applied.
    #[must_use]
    pub fn accepts(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_)) | (Self::Number, Value::Number(_))
        )
    }
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.json_type())
    }
}

/// One tool argument. Every argument is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
}

impl ParamSpec {
    #[must_use]
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::String,
            description,
        }
    }

    #[must_use]
    pub const fn number(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            kind: ParamKind::Number,
            description,
        }
    }
}

/// Credential parameters appended to every authenticated operation.
pub const TOKEN_PARAM: ParamSpec = ParamSpec::string("token", "认证Token");
pub const USER_AGENT_PARAM: ParamSpec = ParamSpec::string("userAgent", "用户请求头");

static CREDENTIAL_PARAMS: [ParamSpec; 2] = [TOKEN_PARAM, USER_AGENT_PARAM];

/// Whether an operation needs caller credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    /// Requires `token` + `userAgent`, sent as [`AuthHeaders`](crate::headers::AuthHeaders).
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub access: Access,
    /// Path parameters in declared order (credentials excluded).
    pub params: Vec<ParamSpec>,
    /// Path + query with `{param}` placeholders, e.g. `/user/profile/{userId}`.
    pub path_template: &'static str,
}

impl OperationDescriptor {
    #[must_use]
    pub fn public(
        name: &'static str,
        description: &'static str,
        path_template: &'static str,
        params: impl Into<Vec<ParamSpec>>,
    ) -> Self {
        Self {
            name,
            description,
            access: Access::Public,
            params: params.into(),
            path_template,
        }
    }

    #[must_use]
    pub fn authenticated(
        name: &'static str,
        description: &'static str,
        path_template: &'static str,
        params: impl Into<Vec<ParamSpec>>,
    ) -> Self {
        Self {
            name,
            description,
            access: Access::Authenticated,
            params: params.into(),
            path_template,
        }
    }

    /// Every argument the tool accepts: declared params, then credentials if any.
    pub fn arguments(&self) -> impl Iterator<Item = &ParamSpec> {
        let credentials: &[ParamSpec] = match self.access {
            Access::Public => &[],
            Access::Authenticated => &CREDENTIAL_PARAMS,
        };
        self.params.iter().chain(credentials)
    }

    /// JSON Schema advertised as the tool's `inputSchema`.
    #[must_use]
    pub fn input_schema(&self) -> JsonObject {
        let mut properties = JsonObject::new();
        let mut required: Vec<&str> = Vec::new();

        for param in self.arguments() {
            required.push(param.name);
            properties.insert(
                param.name.to_string(),
                json!({
                    "type": param.kind.json_type(),
                    "description": param.description,
                }),
            );
        }

        let mut schema = JsonObject::new();
        schema.insert("type".to_string(), json!("object"));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), json!(required));
        }
        schema
    }
}

/// A validated descriptor together with its compiled path template.
#[derive(Debug, Clone)]
pub struct Operation {
    pub descriptor: OperationDescriptor,
    pub template: PathTemplate,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    operations: Vec<Operation>,
}

impl Catalog {
    /// Build a catalog from descriptors.
    ///
    /// # Errors
    ///
    /// Returns an error on duplicate operation or param names, malformed path templates,
    /// placeholders that name no declared param, or declared params no placeholder uses.
    pub fn new(
        descriptors: impl IntoIterator<Item = OperationDescriptor>,
    ) -> Result<Self, CatalogError> {
        let mut names: HashSet<&'static str> = HashSet::new();
        let mut operations = Vec::new();

        for descriptor in descriptors {
            if !names.insert(descriptor.name) {
                return Err(CatalogError::DuplicateOperation(descriptor.name.to_string()));
            }
            let template = compile_operation(&descriptor)?;
            operations.push(Operation {
                descriptor,
                template,
            });
        }

        Ok(Self { operations })
    }

    /// The Dao3 catalog: public operations followed by authenticated ones.
    ///
    /// # Errors
    ///
    /// Only fails if the built-in tables are inconsistent.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(public_operations().into_iter().chain(authenticated_operations()))
    }

    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.iter().find(|op| op.descriptor.name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn compile_operation(descriptor: &OperationDescriptor) -> Result<PathTemplate, CatalogError> {
    let operation = descriptor.name;

    let mut arg_names: HashSet<&str> = HashSet::new();
    for param in descriptor.arguments() {
        if !arg_names.insert(param.name) {
            return Err(CatalogError::DuplicateParam {
                operation: operation.to_string(),
                param: param.name.to_string(),
            });
        }
    }

    let template = PathTemplate::parse(descriptor.path_template).map_err(|message| {
        CatalogError::MalformedTemplate {
            operation: operation.to_string(),
            message,
        }
    })?;

    let declared: HashSet<&str> = descriptor.params.iter().map(|p| p.name).collect();
    let used: HashSet<&str> = template.placeholders().collect();

    if let Some(placeholder) = template.placeholders().find(|p| !declared.contains(p)) {
        return Err(CatalogError::UnknownPlaceholder {
            operation: operation.to_string(),
            placeholder: placeholder.to_string(),
        });
    }
    if let Some(param) = descriptor.params.iter().find(|p| !used.contains(p.name)) {
        return Err(CatalogError::UnusedParameter {
            operation: operation.to_string(),
            param: param.name.to_string(),
        });
    }

    Ok(template)
}

/// Operations that need no credentials.
#[must_use]
pub fn public_operations() -> Vec<OperationDescriptor> {
    vec![
        OperationDescriptor::public(
            "getUserProfile",
            "获取神岛平台用户的个人资料数据",
            "/user/profile/{userId}",
            [ParamSpec::string("userId", "用户ID")],
        ),
        OperationDescriptor::public(
            "getMapInfo",
            "获取神岛平台用户地图详情",
            "/content/detail/{mapId}",
            [ParamSpec::string("mapId", "地图ID")],
        ),
        OperationDescriptor::public(
            "getMapCommentList",
            "获取神岛平台用户地图评论列表",
            "/comment/list?contentId={contentId}&limit={limit}&offset={offset}&contentType={contentType}&orderBy={orderBy}",
            [
                ParamSpec::string("contentId", "地图ID"),
                ParamSpec::number("limit", "查询数量"),
                ParamSpec::number("offset", "偏移量"),
                ParamSpec::number("orderBy", "排序方式，1创建时间倒序；4热度（默认）"),
                ParamSpec::number("contentType", "评论分类，1地图，2模型"),
            ],
        ),
        OperationDescriptor::public(
            "getMapReleaseInfo",
            "获取神岛平台用户地图发布信息",
            "/map/release-info/{contentId}?limit={limit}&offset={offset}",
            [
                ParamSpec::string("contentId", "地图ID"),
                ParamSpec::number("limit", "查询数量"),
                ParamSpec::number("offset", "偏移量"),
            ],
        ),
        OperationDescriptor::public(
            "getMapList",
            "获取神岛平台用户地图列表",
            "/map/tab/maps?offset={offset}&limit={limit}&keyword={keyword}&orderBy={orderBy}",
            [
                ParamSpec::number("offset", "偏移量"),
                ParamSpec::number("limit", "查询数量"),
                ParamSpec::string("keyword", "关键词"),
                ParamSpec::number(
                    "orderBy",
                    "排序方式，0：官方推荐:最热，1：最新, 2:当通过keyword查找地图时使用",
                ),
            ],
        ),
    ]
}

const START_TIME: ParamSpec = ParamSpec::string("startTime", "开始时间，例如：2025-03-29");
const END_TIME: ParamSpec = ParamSpec::string("endTime", "结束时间，例如：2025-04-04");
const MAP_ID: ParamSpec = ParamSpec::string("mapId", "地图ID");

/// Per-map statistics endpoints; they share the `startTime`/`endTime`/`mapId` shape.
const MAP_STATS_OPERATIONS: [(&str, &str, &str); 3] = [
    (
        "getMapPlayerStatList",
        "获取神岛平台用户地图玩家统计，需Token和用户请求头和地图ID",
        "/statistics/map/player?startTime={startTime}&endTime={endTime}&mapId={mapId}",
    ),
    (
        "getMapPlayerRetention",
        "获取神岛平台用户地图玩家留存，需Token和用户请求头和地图ID",
        "/statistics/map/player-retention?startTime={startTime}&endTime={endTime}&mapId={mapId}",
    ),
    (
        "getMapPlayerBehavior",
        "获取神岛平台用户地图玩家行为，需Token和用户请求头和地图ID",
        "/statistics/map/player-behavior?startTime={startTime}&endTime={endTime}&mapId={mapId}",
    ),
];

/// Operations that require `token` + `userAgent`.
#[must_use]
pub fn authenticated_operations() -> Vec<OperationDescriptor> {
    let mut ops = vec![
        OperationDescriptor::authenticated(
            "getCommentList",
            "获取神岛平台用户的评论列表，需要Token和用户请求头",
            "/msg/comment?offset={offset}&limit={limit}",
            [
                ParamSpec::number("offset", "偏移量"),
                ParamSpec::number("limit", "限制数量"),
            ],
        ),
        OperationDescriptor::authenticated(
            "getMapStatList",
            "获取神岛平台用户地图统计列表，需Token和用户请求头",
            "/statistics/map/user-maps?startTime={startTime}&endTime={endTime}",
            [START_TIME, END_TIME],
        ),
    ];

    ops.extend(MAP_STATS_OPERATIONS.iter().map(|&(name, description, path)| {
        OperationDescriptor::authenticated(name, description, path, [START_TIME, END_TIME, MAP_ID])
    }));

    ops
}
