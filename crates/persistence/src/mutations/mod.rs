// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Anything that reads a value and then writes based on it runs inside an
//! `IMMEDIATE` transaction so the write lock is held from the first read.

pub mod requests;
pub mod sessions;
pub mod staff;
pub mod stock;
