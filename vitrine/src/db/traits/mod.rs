// SPDX-License-Identifier: AGPL-3.0-or-later

mod collection;

pub use collection::{Collection, Identifiable, IntoFilter, WriteFields};
