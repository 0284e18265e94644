// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GeneratorsCommand {
    GeneratePassword(PasswordGeneratorRequest),
}

impl GeneratorsCommand {
    pub fn name(&self) -> &'static str {
        match self {
            GeneratorsCommand::GeneratePassword(_) => "generators.generatePassword",
        }
    }
}

/// Character classes and length for a generated password.
///
/// The `min_*` fields only apply when the matching class is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordGeneratorRequest {
    pub lowercase: bool,
    pub uppercase: bool,
    pub numbers: bool,
    pub special: bool,
    pub length: u8,
    pub avoid_ambiguous: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_lowercase: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_uppercase: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_number: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_special: Option<u8>,
}

impl Default for PasswordGeneratorRequest {
    fn default() -> Self {
        Self {
            lowercase: true,
            uppercase: true,
            numbers: true,
            special: false,
            length: 16,
            avoid_ambiguous: false,
            min_lowercase: None,
            min_uppercase: None,
            min_number: None,
            min_special: None,
        }
    }
}
