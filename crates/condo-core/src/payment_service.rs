//! The payment write path: creation, manual verification, gateway callbacks.

use condo_domain::{
    Actor, Condominium, Payment, PaymentMethod, PaymentStatus, Period,
};
use uuid::Uuid;

use crate::{
    access_policy::{AccessPolicy, ResourceRef, WriteAction},
    time::Clock,
    CoreError, CoreResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Terminal outcome reported by the external gateway for a transaction.
pub enum GatewayOutcome {
    Completed,
    Rejected,
    InProgress,
}

/// Validated mutations for [`Payment`] records. Status transitions happen
/// only here; the reconciler never writes.
pub struct PaymentService;

impl PaymentService {
    /// Records a new payment attempt. Residents may pay for their own
    /// department; administrators may record a transfer for any.
    ///
    /// Creation is refused while an in-flight or paid record already covers
    /// the (department, period) pair — a fresh attempt is only possible
    /// after a rejection.
    pub fn create(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        department_id: &str,
        period: Period,
        amount: i64,
        method: PaymentMethod,
    ) -> CoreResult<Uuid> {
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::Payment { department_id },
            WriteAction::Create,
        )?;
        if amount <= 0 {
            return Err(CoreError::InvalidInput(format!(
                "payment amount must be positive, got {amount}"
            )));
        }
        if condo.department(department_id).is_none() {
            return Err(CoreError::NotFound(format!("department {department_id}")));
        }
        let blocking = condo
            .payments_for(department_id, period)
            .into_iter()
            .find(|payment| payment.in_flight() || payment.status == PaymentStatus::Paid);
        if let Some(existing) = blocking {
            return Err(CoreError::InvalidInput(format!(
                "a {} payment already covers {} for {}",
                existing.status, period, department_id
            )));
        }
        let payment =
            Payment::new(department_id, period, amount, clock.now()).with_method(method);
        Ok(condo.add_payment(payment))
    }

    /// Administrator review of a manual transfer: approve marks the record
    /// paid, decline rejects it; both leave an audit trail.
    pub fn verify_manual(
        condo: &mut Condominium,
        actor: &Actor,
        clock: &dyn Clock,
        payment_id: Uuid,
        approved: bool,
        notes: Option<String>,
    ) -> CoreResult<()> {
        let department_id = Self::department_of(condo, actor, payment_id)?;
        AccessPolicy::authorize_write(
            actor,
            &ResourceRef::Payment {
                department_id: &department_id,
            },
            WriteAction::Update,
        )?;
        let now = clock.now();
        let payment = condo
            .payment_mut(payment_id)
            .ok_or_else(|| CoreError::NotFound(format!("payment {payment_id}")))?;
        if approved {
            payment.status = PaymentStatus::Paid;
            payment.paid_at = Some(now);
        } else {
            payment.status = PaymentStatus::Rejected;
        }
        payment.verified_by = Some(actor.id.clone());
        if notes.is_some() {
            payment.notes = notes;
        }
        condo.touch();
        Ok(())
    }

    /// Applies a gateway webhook notification. The webhook endpoint is a
    /// trusted machine boundary, so no actor is involved.
    pub fn apply_gateway_update(
        condo: &mut Condominium,
        clock: &dyn Clock,
        payment_id: Uuid,
        gateway_ref: impl Into<String>,
        outcome: GatewayOutcome,
    ) -> CoreResult<()> {
        let now = clock.now();
        let payment = condo
            .payment_mut(payment_id)
            .ok_or_else(|| CoreError::NotFound(format!("payment {payment_id}")))?;
        payment.gateway_ref = Some(gateway_ref.into());
        payment.method = Some(PaymentMethod::Gateway);
        match outcome {
            GatewayOutcome::Completed => {
                payment.status = PaymentStatus::Paid;
                payment.paid_at = Some(now);
            }
            GatewayOutcome::Rejected => {
                payment.status = PaymentStatus::Rejected;
            }
            GatewayOutcome::InProgress => {
                payment.status = PaymentStatus::UnderReview;
            }
        }
        condo.touch();
        Ok(())
    }

    /// Every payment the actor may see: all of them for an administrator,
    /// only the own department's for a resident.
    pub fn visible_payments<'a>(condo: &'a Condominium, actor: &Actor) -> Vec<&'a Payment> {
        condo
            .payments
            .iter()
            .filter(|payment| {
                AccessPolicy::can_read(
                    actor,
                    &ResourceRef::Payment {
                        department_id: &payment.department_id,
                    },
                )
            })
            .collect()
    }

    /// Administrator worklist of records still awaiting settlement.
    pub fn pending_payments<'a>(
        condo: &'a Condominium,
        actor: &Actor,
    ) -> CoreResult<Vec<&'a Payment>> {
        if !actor.is_admin {
            return Err(CoreError::Forbidden);
        }
        Ok(condo
            .payments
            .iter()
            .filter(|payment| payment.status == PaymentStatus::Pending)
            .collect())
    }

    /// Resolves the department of a payment for the policy check without
    /// leaking existence to unauthorized callers: non-admins fail closed
    /// before the lookup result is revealed.
    fn department_of(
        condo: &Condominium,
        actor: &Actor,
        payment_id: Uuid,
    ) -> CoreResult<String> {
        if !actor.is_admin {
            return Err(CoreError::Forbidden);
        }
        condo
            .payment(payment_id)
            .map(|payment| payment.department_id.clone())
            .ok_or_else(|| CoreError::NotFound(format!("payment {payment_id}")))
    }
}
