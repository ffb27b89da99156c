// SPDX-FileCopyrightText: 2026 Tributary Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read access to externally managed datasource template variables.

use crate::types::DatasourceVariable;

/// Enumerates the template variables of kind "datasource".
pub trait VariableSource: Send + Sync + 'static {
    fn datasource_variables(&self) -> Vec<DatasourceVariable>;
}

/// A variable source with no variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl VariableSource for NoVariables {
    fn datasource_variables(&self) -> Vec<DatasourceVariable> {
        Vec::new()
    }
}
