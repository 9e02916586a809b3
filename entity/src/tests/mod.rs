/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */
