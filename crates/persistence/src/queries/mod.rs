// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! Each module pairs Diesel row structs with the conversion into domain
//! types. Mutations reuse the row structs to read back what they wrote.

pub mod requests;
pub mod sessions;
pub mod staff;
pub mod stock;
