/*
 * SPDX-FileCopyrightText: 2025 Rota Contributors <dev@rota.rs>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, IntoActiveModel, Order, PaginatorTrait,
    QueryFilter, QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::consts::PATH_SEPARATOR;
use super::database::get_organization;
use super::error::{CoreError, CoreResult};
use super::input::check_display_name;
use super::types::*;

#[derive(Serialize, Deserialize, Debug)]
pub struct CreateOrganization {
    pub name: String,
    pub parent: Option<Uuid>,
    pub created_by: Uuid,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    /// `Some(None)` detaches the node and makes it a root.
    pub parent: Option<Option<Uuid>>,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ParentFilter {
    All,
    Roots,
    ChildrenOf(Uuid),
}

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum OrganizationSort {
    #[default]
    NameAsc,
    NameDesc,
    CreatedAtAsc,
    CreatedAtDesc,
}

pub async fn create_organization(
    state: Arc<ServerState>,
    input: CreateOrganization,
) -> CoreResult<MOrganization> {
    check_display_name(&input.name).map_err(CoreError::Validation)?;

    let parent = match input.parent {
        Some(parent_id) => Some(
            get_organization(Arc::clone(&state), parent_id)
                .await?
                .ok_or_else(|| CoreError::not_found("Parent organization"))?,
        ),
        None => None,
    };

    let id = Uuid::new_v4();
    let now = Utc::now().naive_utc();

    let organization = AOrganization {
        id: Set(id),
        name: Set(input.name),
        parent: Set(input.parent),
        path: Set(make_path(parent.as_ref().map(|p| p.path.as_str()), id)),
        created_by: Set(input.created_by),
        created_at: Set(now),
        updated_at: Set(now),
    };

    Ok(organization.insert(&state.db).await?)
}

pub async fn get_organization_detail(
    state: Arc<ServerState>,
    id: Uuid,
) -> CoreResult<OrganizationDetail> {
    let organization = get_organization(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization"))?;

    let children_count = EOrganization::find()
        .filter(COrganization::Parent.eq(id))
        .count(&state.db)
        .await?;

    Ok(OrganizationDetail {
        organization,
        children_count,
    })
}

pub async fn list_organizations(
    state: Arc<ServerState>,
    filter: ParentFilter,
    sort: OrganizationSort,
) -> CoreResult<Vec<MOrganization>> {
    let query = EOrganization::find();

    let query = match filter {
        ParentFilter::All => query,
        ParentFilter::Roots => query.filter(COrganization::Parent.is_null()),
        ParentFilter::ChildrenOf(parent) => query.filter(COrganization::Parent.eq(parent)),
    };

    let query = match sort {
        OrganizationSort::NameAsc => query.order_by(COrganization::Name, Order::Asc),
        OrganizationSort::NameDesc => query.order_by(COrganization::Name, Order::Desc),
        OrganizationSort::CreatedAtAsc => query.order_by(COrganization::CreatedAt, Order::Asc),
        OrganizationSort::CreatedAtDesc => query.order_by(COrganization::CreatedAt, Order::Desc),
    };

    Ok(query.all(&state.db).await?)
}

/// Rename and/or reparent an organization. A parent change rewrites the
/// moved node's path and the path of every descendant in one transaction,
/// so no caller can observe a half-moved subtree.
pub async fn update_organization(
    state: Arc<ServerState>,
    id: Uuid,
    changes: UpdateOrganization,
) -> CoreResult<MOrganization> {
    let organization = get_organization(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization"))?;

    if let Some(name) = &changes.name {
        check_display_name(name).map_err(CoreError::Validation)?;
    }

    let mut new_parent = None;
    let mut new_path = None;
    let mut path_updates = Vec::new();

    if let Some(parent) = changes.parent {
        if parent != organization.parent {
            let parent_path = match parent {
                Some(parent_id) => {
                    if parent_id == id {
                        return Err(CoreError::cyclic_parent());
                    }

                    let parent_org = get_organization(Arc::clone(&state), parent_id)
                        .await?
                        .ok_or_else(|| CoreError::not_found("Parent organization"))?;

                    if is_descendant_path(&organization.path, &parent_org.path) {
                        return Err(CoreError::cyclic_parent());
                    }

                    Some(parent_org.path)
                }
                None => None,
            };

            let moved_path = make_path(parent_path.as_deref(), id);

            let descendant_nodes: Vec<(Uuid, Option<Uuid>)> = EOrganization::find()
                .filter(
                    COrganization::Path
                        .like(format!("{}{}%", organization.path, PATH_SEPARATOR)),
                )
                .all(&state.db)
                .await?
                .iter()
                .map(|o| (o.id, o.parent))
                .collect();

            path_updates = rebuild_paths(id, &moved_path, &descendant_nodes);
            new_parent = Some(parent);
            new_path = Some(moved_path);
        }
    }

    let txn = state.db.begin().await?;

    let mut aorganization = organization.into_active_model();
    if let Some(name) = changes.name {
        aorganization.name = Set(name);
    }
    if let Some(parent) = new_parent {
        aorganization.parent = Set(parent);
    }
    if let Some(path) = new_path {
        aorganization.path = Set(path);
    }
    aorganization.updated_at = Set(Utc::now().naive_utc());

    let organization = aorganization.update(&txn).await?;

    for (node_id, node_path) in path_updates {
        EOrganization::update_many()
            .col_expr(COrganization::Path, Expr::value(node_path))
            .filter(COrganization::Id.eq(node_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    Ok(organization)
}

pub async fn delete_organization(state: Arc<ServerState>, id: Uuid) -> CoreResult<()> {
    let organization = get_organization(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization"))?;

    let children_count = EOrganization::find()
        .filter(COrganization::Parent.eq(id))
        .count(&state.db)
        .await?;

    if children_count > 0 {
        return Err(CoreError::has_children());
    }

    organization.into_active_model().delete(&state.db).await?;
    Ok(())
}

/// All nodes below the organization, in path order (parents before their
/// children).
pub async fn descendants(state: Arc<ServerState>, id: Uuid) -> CoreResult<Vec<MOrganization>> {
    let organization = get_organization(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization"))?;

    Ok(EOrganization::find()
        .filter(COrganization::Path.like(format!("{}{}%", organization.path, PATH_SEPARATOR)))
        .order_by(COrganization::Path, Order::Asc)
        .all(&state.db)
        .await?)
}

/// The chain above the organization, root first, excluding the node itself.
/// Derived from the node's own path, so no walk up the tree is needed.
pub async fn ancestors(state: Arc<ServerState>, id: Uuid) -> CoreResult<Vec<MOrganization>> {
    let organization = get_organization(Arc::clone(&state), id)
        .await?
        .ok_or_else(|| CoreError::not_found("Organization"))?;

    let chain: Vec<Uuid> = path_components(&organization.path)
        .into_iter()
        .filter(|component| *component != id)
        .collect();

    if chain.is_empty() {
        return Ok(Vec::new());
    }

    let mut found = EOrganization::find()
        .filter(COrganization::Id.is_in(chain.clone()))
        .all(&state.db)
        .await?;

    found.sort_by_key(|o| chain.iter().position(|c| *c == o.id));
    Ok(found)
}

fn make_path(parent_path: Option<&str>, id: Uuid) -> String {
    match parent_path {
        Some(parent_path) => format!("{}{}{}", parent_path, PATH_SEPARATOR, id),
        None => id.to_string(),
    }
}

fn path_components(path: &str) -> Vec<Uuid> {
    path.split(PATH_SEPARATOR)
        .filter_map(|part| Uuid::parse_str(part).ok())
        .collect()
}

fn is_descendant_path(ancestor_path: &str, candidate_path: &str) -> bool {
    candidate_path.starts_with(&format!("{}{}", ancestor_path, PATH_SEPARATOR))
}

/// Recompute the path of every node below `root` once `root` has moved to
/// `root_path`. Children are processed from an explicit stack, parent
/// before child, so each node derives its path from an already-updated
/// parent; tree depth never touches the call stack.
fn rebuild_paths(
    root: Uuid,
    root_path: &str,
    nodes: &[(Uuid, Option<Uuid>)],
) -> Vec<(Uuid, String)> {
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (id, parent) in nodes {
        if let Some(parent) = parent {
            children.entry(*parent).or_default().push(*id);
        }
    }

    let mut updates = Vec::with_capacity(nodes.len());
    let mut stack = vec![(root, root_path.to_string())];

    while let Some((node, path)) = stack.pop() {
        if let Some(child_ids) = children.get(&node) {
            for child in child_ids {
                let child_path = make_path(Some(&path), *child);
                updates.push((*child, child_path.clone()));
                stack.push((*child, child_path));
            }
        }
    }

    updates
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn mock_cli() -> Cli {
        Cli {
            log_level: "info".to_string(),
            database_url: Some("mock://test".to_string()),
            database_url_file: None,
            database_max_connections: 10,
            database_min_connections: 1,
        }
    }

    fn organization_row(id: Uuid) -> MOrganization {
        MOrganization {
            id,
            name: "Radiology".to_string(),
            parent: None,
            path: id.to_string(),
            created_by: Uuid::new_v4(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn paths_chain_parent_to_child() {
        let parent = Uuid::new_v4();
        let child = Uuid::new_v4();

        let parent_path = make_path(None, parent);
        assert_eq!(parent_path, parent.to_string());

        let child_path = make_path(Some(&parent_path), child);
        assert_eq!(child_path, format!("{}/{}", parent, child));
        assert!(is_descendant_path(&parent_path, &child_path));
        assert!(!is_descendant_path(&child_path, &parent_path));
        assert!(!is_descendant_path(&parent_path, &parent_path));
    }

    #[test]
    fn path_components_split_the_chain() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let path = make_path(Some(&make_path(Some(&make_path(None, a)), b)), c);

        assert_eq!(path_components(&path), vec![a, b, c]);
    }

    #[test]
    fn rebuild_walks_the_subtree_top_down() {
        let root = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        // root -> a -> b, root -> c
        let nodes = vec![(a, Some(root)), (b, Some(a)), (c, Some(root))];

        let new_root_path = format!("{}/{}", Uuid::new_v4(), root);
        let updates = rebuild_paths(root, &new_root_path, &nodes);

        assert_eq!(updates.len(), 3);

        let paths: HashMap<Uuid, String> = updates.into_iter().collect();
        assert_eq!(paths[&a], format!("{}/{}", new_root_path, a));
        assert_eq!(paths[&b], format!("{}/{}/{}", new_root_path, a, b));
        assert_eq!(paths[&c], format!("{}/{}", new_root_path, c));

        // every descendant path still extends its parent's path
        assert!(is_descendant_path(&new_root_path, &paths[&a]));
        assert!(is_descendant_path(&paths[&a], &paths[&b]));
    }

    #[test]
    fn rebuild_of_a_leaf_is_empty() {
        let root = Uuid::new_v4();
        assert!(rebuild_paths(root, &root.to_string(), &[]).is_empty());
    }

    #[tokio::test]
    async fn create_requires_a_resolvable_parent() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<MOrganization>::new()])
            .into_connection();
        let state = Arc::new(ServerState { db, cli: mock_cli() });

        let err = create_organization(
            state,
            CreateOrganization {
                name: "Night shift".to_string(),
                parent: Some(Uuid::new_v4()),
                created_by: Uuid::new_v4(),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "not_found");
    }

    #[tokio::test]
    async fn reparenting_under_itself_is_cyclic() {
        let id = Uuid::new_v4();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![organization_row(id)]])
            .into_connection();
        let state = Arc::new(ServerState { db, cli: mock_cli() });

        let err = update_organization(
            state,
            id,
            UpdateOrganization {
                name: None,
                parent: Some(Some(id)),
            },
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind(), "cyclic_parent");
    }
}
