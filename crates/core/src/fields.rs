// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Header alias resolution.
//!
//! Uploaded files spell the same column many ways ("Display Name",
//! "display_name", "displayName", "name"). Each import type declares its
//! canonical fields with an ordered alias list; a [`FieldResolver`] maps the
//! actual headers of one file onto those fields once, before any row is read.

use d1_store_domain::normalize_key;

use crate::csv_input::{CsvRow, ParsedCsv};

/// A canonical field and the header spellings accepted for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub canonical: &'static str,
    pub aliases: &'static [&'static str],
}

/// Fields read by the staff import.
pub const STAFF_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        canonical: "display_name",
        aliases: &["displayName", "display_name", "Display Name", "name"],
    },
    FieldSpec {
        canonical: "store",
        aliases: &["store", "storeName", "store_name"],
    },
    FieldSpec {
        canonical: "role",
        aliases: &["role"],
    },
    FieldSpec {
        canonical: "uniform_limit",
        aliases: &["uniformLimit", "uniform_limit", "limit"],
    },
];

/// Fields read by the stock import.
pub const STOCK_FIELDS: &[FieldSpec] = &[
    FieldSpec {
        canonical: "ean",
        aliases: &["ean"],
    },
    FieldSpec {
        canonical: "name",
        aliases: &["name", "item", "item_name"],
    },
    FieldSpec {
        canonical: "qty",
        aliases: &["qty", "quantity"],
    },
];

/// Column indices for each canonical field of one parsed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldResolver {
    columns: Vec<(&'static str, Vec<usize>)>,
}

impl FieldResolver {
    /// Resolves `specs` against the headers of `parsed`.
    ///
    /// Headers and aliases are compared with [`normalize_key`], so casing and
    /// spacing differences do not matter. A field matched by several columns
    /// keeps them in alias order, then header order.
    #[must_use]
    pub fn resolve(specs: &[FieldSpec], parsed: &ParsedCsv) -> Self {
        let normalized_headers: Vec<String> =
            parsed.headers.iter().map(|h| normalize_key(h)).collect();

        let columns: Vec<(&'static str, Vec<usize>)> = specs
            .iter()
            .map(|spec| {
                let mut indices: Vec<usize> = Vec::new();
                for alias in spec.aliases {
                    let alias_key: String = normalize_key(alias);
                    for (idx, header) in normalized_headers.iter().enumerate() {
                        if *header == alias_key && !indices.contains(&idx) {
                            indices.push(idx);
                        }
                    }
                }
                (spec.canonical, indices)
            })
            .collect();

        Self { columns }
    }

    /// Returns whether any header maps to `canonical`.
    #[must_use]
    pub fn has(&self, canonical: &str) -> bool {
        self.columns
            .iter()
            .any(|(name, indices)| *name == canonical && !indices.is_empty())
    }

    /// Returns the first non-empty trimmed value for `canonical` in `row`,
    /// or `""` when there is none.
    #[must_use]
    pub fn get<'a>(&self, row: &'a CsvRow, canonical: &str) -> &'a str {
        self.columns
            .iter()
            .find(|(name, _)| *name == canonical)
            .and_then(|(_, indices)| {
                indices
                    .iter()
                    .filter_map(|&idx| row.values.get(idx))
                    .map(|value| value.trim())
                    .find(|value| !value.is_empty())
            })
            .unwrap_or_default()
    }
}
