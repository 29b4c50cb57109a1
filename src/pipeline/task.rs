// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

use async_trait::async_trait;

use super::BuildContext;
use crate::errors::ForjaResult;

/// One step of a packaging run
#[async_trait]
pub trait Task: Send + Sync {
    /// Stable name used in logs and task reports
    fn name(&self) -> &str;

    /// Run the step against the shared context
    async fn execute(&self, ctx: &mut BuildContext) -> ForjaResult<()>;
}
