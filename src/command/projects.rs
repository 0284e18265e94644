// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Project operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProjectsCommand {
    Get(ProjectGetRequest),
    Create(ProjectCreateRequest),
    List(ProjectsListRequest),
    Update(ProjectUpdateRequest),
    Delete(ProjectsDeleteRequest),
}

impl ProjectsCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ProjectsCommand::Get(_) => "projects.get",
            ProjectsCommand::Create(_) => "projects.create",
            ProjectsCommand::List(_) => "projects.list",
            ProjectsCommand::Update(_) => "projects.update",
            ProjectsCommand::Delete(_) => "projects.delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectGetRequest {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreateRequest {
    pub organization_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsListRequest {
    pub organization_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdateRequest {
    pub id: String,
    pub organization_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectsDeleteRequest {
    pub ids: Vec<String>,
}
