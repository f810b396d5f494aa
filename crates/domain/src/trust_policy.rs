//! Trust-policy document parsing.
//!
//! Only `AWS` principals of non-deny statements are collected, plus the bare
//! `"*"` principal. Service and federated principals cannot call the issuance
//! surface with long-lived keys, so they are ignored.

use rolegate_core::{AppError, AppResult};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::One(value) => vec![value],
            Self::Many(values) => values,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PolicyDocument {
    Document {
        #[serde(rename = "Statement")]
        statement: OneOrMany<Statement>,
    },
    Statements(Vec<Statement>),
}

#[derive(Debug, Deserialize)]
struct Statement {
    #[serde(rename = "Effect", default)]
    effect: Option<String>,
    #[serde(rename = "Principal", default)]
    principal: Option<PrincipalBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PrincipalBlock {
    Wildcard(String),
    Typed {
        #[serde(rename = "AWS", default)]
        aws: Option<OneOrMany<String>>,
    },
}

/// Extracts trusted principal identifiers from a trust-policy document.
///
/// Accepts a full policy document or a bare statement list. Result order follows
/// the document with duplicates removed.
pub fn trust_policy_principals(document: &str) -> AppResult<Vec<String>> {
    let parsed = serde_json::from_str::<PolicyDocument>(document)
        .map_err(|error| AppError::Validation(format!("invalid trust policy document: {error}")))?;

    let statements = match parsed {
        PolicyDocument::Document { statement } => statement.into_vec(),
        PolicyDocument::Statements(statements) => statements,
    };

    let mut principals: Vec<String> = Vec::new();
    for statement in statements {
        let denies = statement
            .effect
            .as_deref()
            .is_some_and(|effect| effect.eq_ignore_ascii_case("deny"));
        if denies {
            continue;
        }

        let values = match statement.principal {
            Some(PrincipalBlock::Wildcard(value)) => vec![value],
            Some(PrincipalBlock::Typed { aws: Some(aws) }) => aws.into_vec(),
            Some(PrincipalBlock::Typed { aws: None }) | None => Vec::new(),
        };

        for value in values {
            let value = value.trim();
            if !value.is_empty() && !principals.iter().any(|known| known == value) {
                principals.push(value.to_owned());
            }
        }
    }

    Ok(principals)
}
