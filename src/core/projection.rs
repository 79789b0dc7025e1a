use crate::domain::model::{Column, Table};
use crate::utils::error::{Result, SweepError};
use std::collections::{HashMap, HashSet};

/// 依指定順序保留欄位；`None` 代表保留全部欄位
pub fn project(table: Table, selection: Option<&[String]>) -> Result<Table> {
    let Some(selection) = selection else {
        return Ok(table);
    };

    check_selection(&table, selection)?;

    let mut by_name: HashMap<String, Column> = table
        .into_columns()
        .into_iter()
        .map(|c| (c.name.clone(), c))
        .collect();

    let columns = selection
        .iter()
        .filter_map(|name| by_name.remove(name))
        .collect();

    Table::new(columns)
}

/// 先檢查再搬移欄位，錯誤時不會留下半套結果
pub fn check_selection(table: &Table, selection: &[String]) -> Result<()> {
    if selection.is_empty() {
        return Err(SweepError::EmptySelection);
    }

    let mut seen = HashSet::new();
    for name in selection {
        if table.column(name).is_none() {
            return Err(SweepError::UnknownColumn {
                column: name.clone(),
            });
        }
        if !seen.insert(name.as_str()) {
            return Err(SweepError::DuplicateSelection {
                column: name.clone(),
            });
        }
    }
    Ok(())
}
