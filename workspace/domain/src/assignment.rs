//! Trainer assignment and the trainer change-request workflow.
//!
//! A change request moves through `pending -> approved` or `pending -> rejected`
//! and never back. Direct assignment bypasses the requests entirely.

use std::collections::HashMap;

use common::{Page, Pagination};
use model::entities::{
    trainer_change_request::{self, ChangeRequestStatus},
    user::{self, Role},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info, instrument, trace};

use crate::error::{DomainError, Result};

/// Result of a direct assignment.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub client: user::Model,
    pub trainer: user::Model,
}

/// Outcome of an admin decision on a change request.
#[derive(Debug, Clone)]
pub struct ProcessedChange {
    pub request: trainer_change_request::Model,
    pub client: user::Model,
}

/// A pending request joined with the accounts it refers to.
#[derive(Debug, Clone)]
pub struct PendingChangeRequest {
    pub request: trainer_change_request::Model,
    pub client: Option<user::Model>,
    pub requested_trainer: Option<user::Model>,
}

pub(crate) async fn find_client<C: ConnectionTrait>(db: &C, client_id: i32) -> Result<user::Model> {
    match user::Entity::find_by_id(client_id).one(db).await? {
        Some(client) if client.role == Role::Client => Ok(client),
        _ => Err(DomainError::not_found(format!("Client {client_id} not found"))),
    }
}

async fn find_approved_trainer<C: ConnectionTrait>(db: &C, trainer_id: i32) -> Result<user::Model> {
    match user::Entity::find_by_id(trainer_id).one(db).await? {
        Some(trainer) if trainer.is_approved_trainer() => Ok(trainer),
        _ => Err(DomainError::not_found(format!(
            "Trainer {trainer_id} not found or not approved"
        ))),
    }
}

async fn find_pending_request<C: ConnectionTrait>(
    db: &C,
    client_id: i32,
) -> Result<Option<trainer_change_request::Model>> {
    Ok(trainer_change_request::Entity::find()
        .filter(trainer_change_request::Column::ClientId.eq(client_id))
        .filter(trainer_change_request::Column::Status.eq(ChangeRequestStatus::Pending))
        .one(db)
        .await?)
}

/// Binds a client to an approved trainer, overwriting any previous assignment.
#[instrument(skip(db))]
pub async fn assign_client(db: &DatabaseConnection, client_id: i32, trainer_id: i32) -> Result<Assignment> {
    trace!("Entering assign_client");

    let client = find_client(db, client_id).await?;
    let trainer = find_approved_trainer(db, trainer_id).await?;

    let mut active: user::ActiveModel = client.into();
    active.assigned_trainer_id = Set(Some(trainer.id));
    active.updated_at = Set(crate::now());
    let client = active.update(db).await?;

    info!("Client {} assigned to trainer {}", client.id, trainer.id);
    Ok(Assignment { client, trainer })
}

/// Sets or revokes a trainer's approval.
#[instrument(skip(db, note))]
pub async fn approve_trainer(
    db: &DatabaseConnection,
    admin_id: i32,
    trainer_id: i32,
    is_approved: bool,
    note: Option<String>,
) -> Result<user::Model> {
    trace!("Entering approve_trainer");

    let trainer = match user::Entity::find_by_id(trainer_id).one(db).await? {
        Some(trainer) if trainer.role == Role::Trainer => trainer,
        _ => return Err(DomainError::not_found(format!("Trainer {trainer_id} not found"))),
    };

    let now = crate::now();
    let mut active: user::ActiveModel = trainer.into();
    active.is_approved = Set(is_approved);
    active.approved_by = Set(Some(admin_id));
    active.approved_at = Set(Some(now));
    active.approval_note = Set(note);
    active.updated_at = Set(now);
    let trainer = active.update(db).await?;

    info!(
        "Trainer {} {} by admin {}",
        trainer.id,
        if is_approved { "approved" } else { "unapproved" },
        admin_id
    );
    Ok(trainer)
}

/// Opens a change request for `client_id`. Fails while another one is pending.
#[instrument(skip(db, reason))]
pub async fn request_trainer_change(
    db: &DatabaseConnection,
    client_id: i32,
    requested_trainer_id: i32,
    reason: Option<String>,
) -> Result<trainer_change_request::Model> {
    trace!("Entering request_trainer_change");

    let txn = db.begin().await?;

    let client = find_client(&txn, client_id).await?;
    if find_pending_request(&txn, client.id).await?.is_some() {
        return Err(DomainError::validation(
            "A trainer change request is already pending",
        ));
    }

    let trainer = find_approved_trainer(&txn, requested_trainer_id).await?;

    let request = trainer_change_request::ActiveModel {
        client_id: Set(client.id),
        requested_trainer_id: Set(trainer.id),
        reason: Set(reason),
        status: Set(ChangeRequestStatus::Pending),
        requested_at: Set(crate::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
        "Client {} requested a change to trainer {} (request {})",
        client.id, trainer.id, request.id
    );
    Ok(request)
}

/// Approves or rejects the client's pending request. Approval reassigns the client.
#[instrument(skip(db, note))]
pub async fn process_trainer_change(
    db: &DatabaseConnection,
    admin_id: i32,
    client_id: i32,
    approve: bool,
    note: Option<String>,
) -> Result<ProcessedChange> {
    trace!("Entering process_trainer_change");

    let txn = db.begin().await?;

    let client = find_client(&txn, client_id).await?;
    let request = find_pending_request(&txn, client.id)
        .await?
        .ok_or_else(|| DomainError::not_found("No pending trainer change request"))?;

    let now = crate::now();
    let client = if approve {
        let mut active: user::ActiveModel = client.into();
        active.assigned_trainer_id = Set(Some(request.requested_trainer_id));
        active.updated_at = Set(now);
        active.update(&txn).await?
    } else {
        client
    };

    let status = if approve {
        ChangeRequestStatus::Approved
    } else {
        ChangeRequestStatus::Rejected
    };
    let mut active: trainer_change_request::ActiveModel = request.into();
    active.status = Set(status);
    active.processed_at = Set(Some(now));
    active.processed_by = Set(Some(admin_id));
    active.decision_note = Set(note);
    let request = active.update(&txn).await?;

    txn.commit().await?;

    info!(
        "Change request {} for client {} {:?} by admin {}",
        request.id, client.id, request.status, admin_id
    );
    Ok(ProcessedChange { request, client })
}

/// The most recent change request of a client, whatever its status.
pub async fn latest_change_request(
    db: &DatabaseConnection,
    client_id: i32,
) -> Result<Option<trainer_change_request::Model>> {
    Ok(trainer_change_request::Entity::find()
        .filter(trainer_change_request::Column::ClientId.eq(client_id))
        .order_by_desc(trainer_change_request::Column::RequestedAt)
        .order_by_desc(trainer_change_request::Column::Id)
        .one(db)
        .await?)
}

/// Pending requests, newest first.
#[instrument(skip(db))]
pub async fn pending_change_requests(
    db: &DatabaseConnection,
    page: u64,
    limit: u64,
) -> Result<Page<PendingChangeRequest>> {
    trace!("Entering pending_change_requests");

    let paginator = trainer_change_request::Entity::find()
        .filter(trainer_change_request::Column::Status.eq(ChangeRequestStatus::Pending))
        .order_by_desc(trainer_change_request::Column::RequestedAt)
        .order_by_desc(trainer_change_request::Column::Id)
        .paginate(db, limit.max(1));
    let total = paginator.num_items().await?;
    let requests = paginator.fetch_page(page.max(1) - 1).await?;
    debug!("Fetched {} of {} pending change requests", requests.len(), total);

    let mut ids: Vec<i32> = requests
        .iter()
        .flat_map(|r| [r.client_id, r.requested_trainer_id])
        .collect();
    ids.sort_unstable();
    ids.dedup();
    let users: HashMap<i32, user::Model> = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    let items = requests
        .into_iter()
        .map(|request| PendingChangeRequest {
            client: users.get(&request.client_id).cloned(),
            requested_trainer: users.get(&request.requested_trainer_id).cloned(),
            request,
        })
        .collect();

    Ok(Page::new(items, Pagination::new(page, limit, total)))
}
