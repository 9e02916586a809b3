/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

/// Separator between the id components of an organization's materialized
/// path.
pub const PATH_SEPARATOR: char = '/';

/// Display color applied to resources created without one.
pub const DEFAULT_RESOURCE_COLOR: &str = "#4f6df5";

/// Upper bound for user-supplied display names.
pub const MAX_NAME_LENGTH: usize = 120;

/// Role spellings left behind by earlier releases, rewritten to the closed
/// enumeration once at startup.
pub const LEGACY_ROLE_ALIASES: [(&str, &str); 3] = [
    ("schemalaggare", "scheduler"),
    ("schemaadmin", "admin"),
    ("schemaanmain", "admin"),
];
