use crate::data::Dataset;
use crate::error::{ColumnRole, ConfigurationError};
use crate::ir::{ColumnConfig, ColumnRef, ResolvedColumns};
use std::collections::BTreeSet;
use tracing::debug;

/// Separator between factor values in a group key.
pub const GROUP_SEPARATOR: &str = "-";

/// Resolve effective column roles for `primary` and prepare the dataset:
/// plotted columns are coerced to numbers and every row gets its group key.
///
/// The dataset is only touched once resolution has succeeded.
pub fn resolve_and_prepare(
    config: &ColumnConfig,
    data: &mut Dataset,
    primary: &str,
) -> Result<ResolvedColumns, ConfigurationError> {
    let (primary, factors, values) = resolve_columns(config, data.columns(), primary)?;

    // Coerce plotted columns to numbers
    for row in data.rows_mut() {
        for column in values.iter().chain(std::iter::once(&primary)) {
            row.coerce(column.index);
        }
    }

    let groups = assign_groups(data, &factors);

    debug!(
        primary = %primary.name,
        factors = ?factors.iter().map(|c| &c.name).collect::<Vec<_>>(),
        values = ?values.iter().map(|c| &c.name).collect::<Vec<_>>(),
        groups = groups.len(),
        "resolved columns"
    );

    Ok(ResolvedColumns {
        primary,
        factors,
        values,
        groups,
    })
}

/// Resolve roles against the header, without touching row data.
///
/// Precedence: no factors configured → factors are everything else; no values
/// configured → values are everything else; both configured → the configured
/// values minus the primary.
pub fn resolve_columns(
    config: &ColumnConfig,
    columns: &[String],
    primary: &str,
) -> Result<(ColumnRef, Vec<ColumnRef>, Vec<ColumnRef>), ConfigurationError> {
    let lookup = |name: &str| columns.iter().position(|c| c == name);

    let primary_index = lookup(primary).ok_or_else(|| ConfigurationError::PrimaryNotFound {
        column: primary.to_string(),
    })?;
    let primary = ColumnRef {
        name: primary.to_string(),
        index: primary_index,
    };

    let configured = |names: &[String], role: ColumnRole| -> Result<Vec<ColumnRef>, ConfigurationError> {
        let mut seen = BTreeSet::new();
        let mut refs = Vec::with_capacity(names.len());
        for name in names {
            let index = lookup(name).ok_or_else(|| ConfigurationError::UnknownColumn {
                role,
                column: name.clone(),
            })?;
            if seen.insert(index) {
                refs.push(ColumnRef {
                    name: name.clone(),
                    index,
                });
            }
        }
        Ok(refs)
    };

    let factors = configured(&config.factors, ColumnRole::Factor)?;
    let values = configured(&config.values, ColumnRole::Value)?;

    let complement = |exclude: &[ColumnRef]| -> Vec<ColumnRef> {
        columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != primary.index && !exclude.iter().any(|c| c.index == *idx))
            .map(|(index, name)| ColumnRef {
                name: name.clone(),
                index,
            })
            .collect()
    };

    let without_primary = |refs: Vec<ColumnRef>| -> Vec<ColumnRef> {
        refs.into_iter().filter(|c| c.index != primary.index).collect()
    };

    let (factors, values) = if factors.is_empty() {
        (complement(&values), without_primary(values))
    } else if values.is_empty() {
        let values = complement(&factors);
        (factors, values)
    } else {
        (factors, without_primary(values))
    };

    Ok((primary, factors, values))
}

/// Compute each row's group key and return the sorted distinct keys.
fn assign_groups(data: &mut Dataset, factors: &[ColumnRef]) -> Vec<String> {
    let mut groups = BTreeSet::new();
    for row in data.rows_mut() {
        let key = factors
            .iter()
            .map(|f| row.cell(f.index).map_or("", |c| c.raw()))
            .collect::<Vec<_>>()
            .join(GROUP_SEPARATOR);
        groups.insert(key.clone());
        row.set_group_key(key);
    }
    groups.into_iter().collect()
}
