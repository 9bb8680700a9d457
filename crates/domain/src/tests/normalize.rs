// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{normalize_key, normalize_value};

#[test]
fn test_normalize_key_lowercases_and_trims() {
    assert_eq!(normalize_key("  Jane Doe  "), "jane doe");
}

#[test]
fn test_normalize_key_collapses_internal_whitespace() {
    assert_eq!(normalize_key("Jane \t  \n Doe"), "jane doe");
}

#[test]
fn test_normalize_key_folds_compatibility_forms() {
    // Fullwidth letters and the "ﬁ" ligature fold to their plain forms.
    assert_eq!(normalize_key("ＪＡＮＥ"), "jane");
    assert_eq!(normalize_key("ﬁeld"), "field");
}

#[test]
fn test_normalize_key_composes_combining_marks() {
    let decomposed: &str = "Rene\u{0301}e";
    let composed: &str = "Ren\u{00e9}e";
    assert_eq!(normalize_key(decomposed), normalize_key(composed));
}

#[test]
fn test_normalize_key_treats_unicode_spaces_as_whitespace() {
    assert_eq!(normalize_key("Polo\u{00a0}Shirt"), "polo shirt");
}

#[test]
fn test_normalize_key_empty_input() {
    assert_eq!(normalize_key("   "), "");
}

#[test]
fn test_normalize_value_only_trims() {
    assert_eq!(normalize_value("  Polo Shirt  "), "Polo Shirt");
}
