// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tock Contributors 2024.

//! Non-owning collection types.

pub mod list;

pub use list::{List, ListLink, ListNode};
