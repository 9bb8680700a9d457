// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{FieldResolver, ParsedCsv, STAFF_FIELDS, STOCK_FIELDS, parse_csv};

#[test]
fn test_resolver_matches_aliases_ignoring_case_and_spacing() {
    let parsed: ParsedCsv = parse_csv(
        "DISPLAY  NAME,storeName,Role\nAlice,Central,staff\n",
        STAFF_FIELDS,
    )
    .unwrap();
    let resolver: FieldResolver = FieldResolver::resolve(STAFF_FIELDS, &parsed);

    assert_eq!(resolver.get(&parsed.rows[0], "display_name"), "Alice");
    assert_eq!(resolver.get(&parsed.rows[0], "store"), "Central");
    assert_eq!(resolver.get(&parsed.rows[0], "role"), "staff");
    assert!(!resolver.has("uniform_limit"));
    assert_eq!(resolver.get(&parsed.rows[0], "uniform_limit"), "");
}

#[test]
fn test_resolver_prefers_earlier_alias() {
    let parsed: ParsedCsv = parse_csv("name,display_name\nBob,Alice\n", STAFF_FIELDS).unwrap();
    let resolver: FieldResolver = FieldResolver::resolve(STAFF_FIELDS, &parsed);

    assert_eq!(resolver.get(&parsed.rows[0], "display_name"), "Alice");
}

#[test]
fn test_resolver_falls_through_empty_columns() {
    let parsed: ParsedCsv = parse_csv("display_name,name\n,Bob\n", STAFF_FIELDS).unwrap();
    let resolver: FieldResolver = FieldResolver::resolve(STAFF_FIELDS, &parsed);

    assert_eq!(resolver.get(&parsed.rows[0], "display_name"), "Bob");
}

#[test]
fn test_stock_aliases() {
    let parsed: ParsedCsv =
        parse_csv("EAN,item_name,Quantity\n501,Fleece,3\n", STOCK_FIELDS).unwrap();
    let resolver: FieldResolver = FieldResolver::resolve(STOCK_FIELDS, &parsed);

    assert!(resolver.has("ean"));
    assert_eq!(resolver.get(&parsed.rows[0], "name"), "Fleece");
    assert_eq!(resolver.get(&parsed.rows[0], "qty"), "3");
}

#[test]
fn test_missing_cell_in_short_row_is_empty() {
    let parsed: ParsedCsv = parse_csv("ean,name,qty\n501\n", STOCK_FIELDS).unwrap();
    let resolver: FieldResolver = FieldResolver::resolve(STOCK_FIELDS, &parsed);

    assert_eq!(resolver.get(&parsed.rows[0], "qty"), "");
}
