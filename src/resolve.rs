use std::fmt;

use serde::Serialize;

/// Identifier column candidates, most preferred first.
pub const IDENTIFIER_CANDIDATES: [&str; 5] = ["ID_REF", "ID", "Gene", "GENE_SYMBOL", "SPOT_ID"];

/// The only accepted measurement column.
pub const VALUE_COLUMN: &str = "VALUE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnChoice {
    pub id_column: String,
    pub value_column: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unusable {
    NoIdentifierColumn,
    NoValueColumn,
}

impl fmt::Display for Unusable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unusable::NoIdentifierColumn => write!(f, "no identifier column"),
            Unusable::NoValueColumn => write!(f, "no {VALUE_COLUMN} column"),
        }
    }
}

/// Pick the identifier and value columns of a sample table.
///
/// The identifier is the first entry of [`IDENTIFIER_CANDIDATES`] present in
/// `columns`; the physical column order of the table plays no part.
pub fn resolve_columns<S: AsRef<str>>(columns: &[S]) -> Result<ColumnChoice, Unusable> {
    let has = |name: &str| columns.iter().any(|column| column.as_ref() == name);

    let id_column = IDENTIFIER_CANDIDATES
        .iter()
        .find(|&&candidate| has(candidate))
        .ok_or(Unusable::NoIdentifierColumn)?;
    if !has(VALUE_COLUMN) {
        return Err(Unusable::NoValueColumn);
    }

    Ok(ColumnChoice {
        id_column: id_column.to_string(),
        value_column: VALUE_COLUMN.to_string(),
    })
}
