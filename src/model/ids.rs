// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-AdvisorContent-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of advisor-content and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use thiserror::Error;

/// A validated identifier handed to external render targets.
///
/// Render engines use these as DOM/element ids, so they must be non-empty and free of
/// whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id<T> {
    value: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        validate_id(&value)?;
        Ok(Self { value, _marker: PhantomData })
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl<T> AsRef<str> for Id<T> {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("id must not be empty")]
    Empty,
    #[error("id must not contain whitespace")]
    ContainsWhitespace,
}

fn validate_id(value: &str) -> Result<(), IdError> {
    if value.is_empty() {
        return Err(IdError::Empty);
    }
    if value.chars().any(char::is_whitespace) {
        return Err(IdError::ContainsWhitespace);
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RenderInstanceTag {}
pub type InstanceId = Id<RenderInstanceTag>;

/// Source of unique render-instance ids, owned by the hosting application and injected into
/// diagram renderers.
pub trait IdGenerator: Send + Sync {
    fn next_instance_id(&self) -> InstanceId;
}

/// Monotonic `<prefix>-<n>` ids.
#[derive(Debug)]
pub struct SequentialIds {
    prefix: String,
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Result<Self, IdError> {
        let prefix = prefix.into();
        validate_id(&prefix)?;
        Ok(Self { prefix, next: AtomicU64::new(0) })
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self { prefix: "diagram".to_owned(), next: AtomicU64::new(0) }
    }
}

impl IdGenerator for SequentialIds {
    fn next_instance_id(&self) -> InstanceId {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        let mut buf = itoa::Buffer::new();
        let value = format!("{}-{}", self.prefix, buf.format(n));
        // The prefix was validated and the suffix is digits.
        InstanceId { value, _marker: PhantomData }
    }
}
