// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::EmptyRequest;
use serde::{Deserialize, Serialize};

/// Vault folder operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FoldersCommand {
    Create(FolderCreateRequest),
    List(EmptyRequest),
    Update(FolderUpdateRequest),
    Delete(FolderDeleteRequest),
}

impl FoldersCommand {
    pub fn name(&self) -> &'static str {
        match self {
            FoldersCommand::Create(_) => "folders.create",
            FoldersCommand::List(_) => "folders.list",
            FoldersCommand::Update(_) => "folders.update",
            FoldersCommand::Delete(_) => "folders.delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderCreateRequest {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderUpdateRequest {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderDeleteRequest {
    pub id: String,
}
