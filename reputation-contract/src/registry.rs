//! Agreement registry: services and the agreements they carry.
//!
//! A service lives under its own id as a JSON document, with an index entry
//! `doc~service / Service / <id>` used for listing.

use sla_core::{Agreement, AgreementItem, Category, PenaltyRule, Service, SERVICE_DOC_TYPE};
use tracing::info;

use crate::context::TransactionContext;
use crate::error::ContractError;

/// Object type of the service index.
pub const SERVICE_INDEX: &str = "doc~service";

/// Value stored under every index entry.
pub const INDEX_MARKER: [u8; 1] = [0x00];

fn index_key(ctx: &TransactionContext<'_>, service_id: &str) -> Result<String, ContractError> {
    Ok(ctx.create_composite_key(SERVICE_INDEX, &[SERVICE_DOC_TYPE, service_id])?)
}

/// Replacement terms for an existing agreement.
#[derive(Debug, Clone, PartialEq)]
pub struct AgreementTerms {
    pub category: Category,
    pub items: Vec<AgreementItem>,
    pub has_penalty_rule: bool,
    pub penalty_rules: Vec<PenaltyRule>,
}

pub fn service_exists(ctx: &mut TransactionContext<'_>, service_id: &str) -> Result<bool, ContractError> {
    Ok(ctx.get_state(service_id)?.is_some())
}

pub fn read_service(
    ctx: &mut TransactionContext<'_>,
    service_id: &str,
) -> Result<Service, ContractError> {
    ctx.get_json::<Service>(service_id)?
        .ok_or_else(|| ContractError::ServiceNotFound(service_id.to_string()))
}

pub fn save_service(ctx: &mut TransactionContext<'_>, service: &Service) -> Result<(), ContractError> {
    ctx.put_json(&service.service_id, service)?;
    Ok(())
}

/// Register a new service with perfect rates and no agreements.
pub fn create_service(
    ctx: &mut TransactionContext<'_>,
    service_id: &str,
) -> Result<Service, ContractError> {
    if service_exists(ctx, service_id)? {
        return Err(ContractError::ServiceExists(service_id.to_string()));
    }

    let service = Service::new(service_id);
    save_service(ctx, &service)?;
    let index = index_key(ctx, service_id)?;
    ctx.put_state(&index, INDEX_MARKER.to_vec())?;

    info!(service_id = %service_id, tx_id = %ctx.tx_id(), "Created service");
    Ok(service)
}

/// Remove a service and its index entry.
pub fn delete_service(ctx: &mut TransactionContext<'_>, service_id: &str) -> Result<(), ContractError> {
    if !service_exists(ctx, service_id)? {
        return Err(ContractError::ServiceNotFound(service_id.to_string()));
    }

    ctx.del_state(service_id)?;
    let index = index_key(ctx, service_id)?;
    ctx.del_state(&index)?;

    info!(service_id = %service_id, tx_id = %ctx.tx_id(), "Deleted service");
    Ok(())
}

/// Every registered service, in id order.
///
/// Fails on the first service that can no longer be read.
pub fn list_services(ctx: &mut TransactionContext<'_>) -> Result<Vec<Service>, ContractError> {
    let entries = ctx.state_by_partial_composite_key(SERVICE_INDEX, &[SERVICE_DOC_TYPE])?;

    let mut services = Vec::with_capacity(entries.len());
    for (key, _) in entries {
        let (_, attributes) = ctx.split_composite_key(&key)?;
        let Some(service_id) = attributes.get(1) else {
            continue;
        };
        services.push(read_service(ctx, service_id)?);
    }
    Ok(services)
}

/// Attach a new agreement to a service.
pub fn add_agreement(
    ctx: &mut TransactionContext<'_>,
    service_id: &str,
    agreement: Agreement,
) -> Result<Service, ContractError> {
    let mut service = read_service(ctx, service_id)?;
    if service.agreement(&agreement.agreement_id).is_some() {
        return Err(ContractError::AgreementExists {
            service_id: service_id.to_string(),
            agreement_id: agreement.agreement_id,
        });
    }

    info!(
        service_id = %service_id,
        agreement_id = %agreement.agreement_id,
        category = %agreement.category,
        "Added agreement"
    );
    service.agreements.push(agreement);
    service.refresh_rollup();
    save_service(ctx, &service)?;
    Ok(service)
}

/// Replace the terms of an agreement, keeping its counters.
pub fn update_agreement(
    ctx: &mut TransactionContext<'_>,
    service_id: &str,
    agreement_id: &str,
    terms: AgreementTerms,
) -> Result<Service, ContractError> {
    let mut service = read_service(ctx, service_id)?;
    let agreement = service
        .agreement_mut(agreement_id)
        .ok_or_else(|| ContractError::AgreementNotFound {
            service_id: service_id.to_string(),
            agreement_id: agreement_id.to_string(),
        })?;

    agreement.category = terms.category;
    agreement.items = terms.items;
    agreement.has_penalty_rule = terms.has_penalty_rule;
    agreement.penalty_rules = terms.penalty_rules;

    save_service(ctx, &service)?;
    info!(service_id = %service_id, agreement_id = %agreement_id, "Updated agreement");
    Ok(service)
}

/// Drop an agreement and recompute the service rollups.
pub fn remove_agreement(
    ctx: &mut TransactionContext<'_>,
    service_id: &str,
    agreement_id: &str,
) -> Result<Service, ContractError> {
    let mut service = read_service(ctx, service_id)?;
    let index = service
        .agreement_index(agreement_id)
        .ok_or_else(|| ContractError::AgreementNotFound {
            service_id: service_id.to_string(),
            agreement_id: agreement_id.to_string(),
        })?;

    service.agreements.remove(index);
    service.refresh_rollup();
    save_service(ctx, &service)?;

    info!(
        service_id = %service_id,
        agreement_id = %agreement_id,
        remaining = service.agreements.len(),
        "Removed agreement"
    );
    Ok(service)
}
