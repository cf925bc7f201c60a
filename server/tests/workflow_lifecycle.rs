//! Workflow lifecycle tests against an in-memory store
//!
//! Exercises the parcel and asset request state machines plus the payment
//! ledger end to end, through the same `Workflow` the HTTP handlers use.

use std::sync::Arc;

use assetverse_server::db::DbService;
use assetverse_server::db::repository::{AccountRepository, ParcelFilter, ParcelRepository};
use assetverse_server::payments::{CheckoutProvider, CheckoutSession, MockProvider};
use assetverse_server::workflow::{Workflow, WorkflowError};
use shared::request::{
    AssetCreate, AssetRequestCreate, CheckoutSessionCreate, ParcelCreate,
};
use shared::types::{AssetRequestStatus, ParcelStatus, Role, WorkStatus};

const HR: &str = "hr@example.com";
const ADMIN: &str = "admin@example.com";
const EMPLOYEE: &str = "employee@example.com";

struct Fixture {
    workflow: Arc<Workflow>,
    provider: Arc<MockProvider>,
    accounts: AccountRepository,
    parcels: ParcelRepository,
}

async fn setup() -> Fixture {
    let db = DbService::memory().await.expect("open memory db");
    let provider = Arc::new(MockProvider::new());
    let workflow = Arc::new(Workflow::new(
        db.db.clone(),
        provider.clone() as Arc<dyn CheckoutProvider>,
    ));
    Fixture {
        workflow,
        provider,
        accounts: AccountRepository::new(db.db.clone()),
        parcels: ParcelRepository::new(db.db),
    }
}

impl Fixture {
    async fn grant(&self, email: &str, role: Role) {
        let account = self
            .accounts
            .find_or_create(email)
            .await
            .expect("create account");
        let id = account.id.expect("account id").to_string();
        self.accounts.update_role(&id, role).await.expect("grant role");
    }

    async fn seed_roles(&self) {
        self.grant(HR, Role::Hr).await;
        self.grant(ADMIN, Role::Admin).await;
        self.grant(EMPLOYEE, Role::Employee).await;
    }
}

fn parcel_payload() -> ParcelCreate {
    ParcelCreate {
        target_employee_email: EMPLOYEE.to_string(),
    }
}

#[tokio::test]
async fn parcel_lifecycle_to_completed() {
    let fx = setup().await;
    fx.seed_roles().await;

    let parcel = fx
        .workflow
        .create_parcel(HR, parcel_payload())
        .await
        .expect("create parcel");
    assert_eq!(parcel.status, ParcelStatus::Pending);
    assert!(parcel.invariant_holds());
    let id = parcel.id.expect("parcel id").to_string();

    let outcome = fx
        .workflow
        .assign_parcel(HR, &id, EMPLOYEE)
        .await
        .expect("assign parcel");
    assert!(outcome.consistency_gap.is_none());
    assert_eq!(outcome.entity.status, ParcelStatus::Assigned);
    assert!(outcome.entity.assigned_user_id.is_some());
    assert!(outcome.entity.approval_date.is_some());
    assert!(outcome.entity.invariant_holds());

    // Assignment flips the employee to in_delivery in the same operation
    let account = fx
        .accounts
        .find_by_email(EMPLOYEE)
        .await
        .expect("lookup")
        .expect("employee account");
    assert_eq!(account.work_status, WorkStatus::InDelivery);

    let parcel = fx
        .workflow
        .update_parcel_status(HR, &id, ParcelStatus::EmployeeArriving)
        .await
        .expect("employee_arriving");
    assert_eq!(parcel.status, ParcelStatus::EmployeeArriving);

    let parcel = fx
        .workflow
        .update_parcel_status(HR, &id, ParcelStatus::Completed)
        .await
        .expect("completed");
    assert_eq!(parcel.status, ParcelStatus::Completed);
    assert!(parcel.invariant_holds());

    // Terminal state: no resurrection
    let err = fx
        .workflow
        .update_parcel_status(HR, &id, ParcelStatus::EmployeeArriving)
        .await
        .expect_err("completed parcel must not move");
    match err {
        WorkflowError::InvalidTransition { current, .. } => {
            assert_eq!(current, "completed");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn rejected_parcel_cannot_be_assigned() {
    let fx = setup().await;
    fx.seed_roles().await;

    let parcel = fx
        .workflow
        .create_parcel(HR, parcel_payload())
        .await
        .expect("create parcel");
    let id = parcel.id.expect("parcel id").to_string();

    let parcel = fx
        .workflow
        .update_parcel_status(HR, &id, ParcelStatus::Rejected)
        .await
        .expect("reject");
    assert_eq!(parcel.status, ParcelStatus::Rejected);
    assert!(parcel.invariant_holds());

    let err = fx
        .workflow
        .assign_parcel(HR, &id, EMPLOYEE)
        .await
        .expect_err("rejected parcel must not be assignable");
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn assigning_a_completed_parcel_leaves_it_untouched() {
    let fx = setup().await;
    fx.seed_roles().await;
    fx.grant("second@example.com", Role::Employee).await;

    let parcel = fx
        .workflow
        .create_parcel(HR, parcel_payload())
        .await
        .expect("create parcel");
    let id = parcel.id.expect("parcel id").to_string();

    fx.workflow
        .assign_parcel(HR, &id, EMPLOYEE)
        .await
        .expect("assign parcel");
    fx.workflow
        .update_parcel_status(HR, &id, ParcelStatus::Completed)
        .await
        .expect("complete");

    let before = fx
        .parcels
        .find_by_id(&id)
        .await
        .expect("read")
        .expect("parcel present");

    let err = fx
        .workflow
        .assign_parcel(HR, &id, "second@example.com")
        .await
        .expect_err("completed parcel must not be assignable");
    match err {
        WorkflowError::InvalidTransition { current, .. } => assert_eq!(current, "completed"),
        other => panic!("expected InvalidTransition, got {other:?}"),
    }

    // The failed assignment wrote nothing
    let after = fx
        .parcels
        .find_by_id(&id)
        .await
        .expect("read")
        .expect("parcel present");
    assert_eq!(after.status, ParcelStatus::Completed);
    assert_eq!(after.assigned_user_id, before.assigned_user_id);
    assert_eq!(after.approval_date, before.approval_date);
    assert_eq!(after.target_employee_email, before.target_employee_email);
    assert_eq!(after.hr_email, before.hr_email);
    assert_eq!(after.created_at, before.created_at);
}

#[tokio::test]
async fn parcel_creation_requires_hr() {
    let fx = setup().await;
    fx.seed_roles().await;

    // Employee is below HR; unknown principals resolve to plain user
    for principal in [EMPLOYEE, "stranger@example.com"] {
        let err = fx
            .workflow
            .create_parcel(principal, parcel_payload())
            .await
            .expect_err("non-hr principal must be rejected");
        assert!(matches!(err, WorkflowError::Forbidden(_)));
    }
}

#[tokio::test]
async fn parcel_listing_filters_and_order() {
    let fx = setup().await;
    fx.seed_roles().await;

    for _ in 0..3 {
        fx.workflow
            .create_parcel(HR, parcel_payload())
            .await
            .expect("create parcel");
    }

    let all = fx
        .workflow
        .list_parcels(ParcelFilter::default())
        .await
        .expect("list");
    assert_eq!(all.len(), 3);

    let pending_only = fx
        .workflow
        .list_parcels(ParcelFilter {
            hr_email: Some(HR.to_string()),
            statuses: Some(vec![ParcelStatus::Pending]),
            ..Default::default()
        })
        .await
        .expect("filtered list");
    assert_eq!(pending_only.len(), 3);

    let none = fx
        .workflow
        .list_parcels(ParcelFilter {
            hr_email: Some("other-hr@example.com".to_string()),
            ..Default::default()
        })
        .await
        .expect("empty list");
    assert!(none.is_empty());
}

#[tokio::test]
async fn asset_request_approval_consumes_stock() {
    let fx = setup().await;
    fx.seed_roles().await;

    let asset = fx
        .workflow
        .create_asset(
            ADMIN,
            AssetCreate {
                name: "Laptop".to_string(),
                available_quantity: 1,
            },
        )
        .await
        .expect("create asset");
    let asset_id = asset.id.expect("asset id").to_string();

    let request = fx
        .workflow
        .create_asset_request(
            EMPLOYEE,
            AssetRequestCreate {
                asset_id: asset_id.clone(),
            },
        )
        .await
        .expect("create request");
    let request_id = request.id.expect("request id").to_string();

    let approved = fx
        .workflow
        .approve_asset_request(ADMIN, &request_id)
        .await
        .expect("approve");
    assert_eq!(approved.request_status, AssetRequestStatus::Approved);
    assert!(approved.approval_date.is_some());
    assert_eq!(approved.processed_by.as_deref(), Some(ADMIN));

    let asset = fx
        .workflow
        .list_assets()
        .await
        .expect("list assets")
        .into_iter()
        .next()
        .expect("asset present");
    assert_eq!(asset.available_quantity, 0);

    // Stock exhausted: the next pending request cannot be approved
    let second = fx
        .workflow
        .create_asset_request(
            EMPLOYEE,
            AssetRequestCreate {
                asset_id: asset_id.clone(),
            },
        )
        .await
        .expect("second request");
    let second_id = second.id.expect("request id").to_string();
    let err = fx
        .workflow
        .approve_asset_request(ADMIN, &second_id)
        .await
        .expect_err("no stock left");
    assert!(matches!(err, WorkflowError::OutOfStock(_)));

    // Return restocks and reopens approval
    let outcome = fx
        .workflow
        .return_asset_request(ADMIN, &request_id)
        .await
        .expect("return");
    assert!(outcome.consistency_gap.is_none());
    assert_eq!(outcome.entity.request_status, AssetRequestStatus::Returned);

    let approved = fx
        .workflow
        .approve_asset_request(ADMIN, &second_id)
        .await
        .expect("approve after restock");
    assert_eq!(approved.request_status, AssetRequestStatus::Approved);
}

#[tokio::test]
async fn rejecting_a_request_leaves_stock_untouched() {
    let fx = setup().await;
    fx.seed_roles().await;

    let asset = fx
        .workflow
        .create_asset(
            ADMIN,
            AssetCreate {
                name: "Monitor".to_string(),
                available_quantity: 2,
            },
        )
        .await
        .expect("create asset");
    let asset_id = asset.id.expect("asset id").to_string();

    let request = fx
        .workflow
        .create_asset_request(EMPLOYEE, AssetRequestCreate { asset_id })
        .await
        .expect("create request");
    let request_id = request.id.expect("request id").to_string();

    let rejected = fx
        .workflow
        .reject_asset_request(ADMIN, &request_id)
        .await
        .expect("reject");
    assert_eq!(rejected.request_status, AssetRequestStatus::Rejected);

    let asset = fx
        .workflow
        .list_assets()
        .await
        .expect("list assets")
        .into_iter()
        .next()
        .expect("asset present");
    assert_eq!(asset.available_quantity, 2);

    // Terminal: cannot approve a rejected request
    let err = fx
        .workflow
        .approve_asset_request(ADMIN, &request_id)
        .await
        .expect_err("rejected request must not be approvable");
    assert!(matches!(err, WorkflowError::InvalidTransition { .. }));
}

#[tokio::test]
async fn employees_only_see_their_own_asset_requests() {
    let fx = setup().await;
    fx.seed_roles().await;
    fx.grant("other@example.com", Role::Employee).await;

    let asset = fx
        .workflow
        .create_asset(
            ADMIN,
            AssetCreate {
                name: "Keyboard".to_string(),
                available_quantity: 5,
            },
        )
        .await
        .expect("create asset");
    let asset_id = asset.id.expect("asset id").to_string();

    fx.workflow
        .create_asset_request(
            EMPLOYEE,
            AssetRequestCreate {
                asset_id: asset_id.clone(),
            },
        )
        .await
        .expect("request one");
    fx.workflow
        .create_asset_request("other@example.com", AssetRequestCreate { asset_id })
        .await
        .expect("request two");

    let own = fx
        .workflow
        .list_asset_requests(EMPLOYEE, Default::default())
        .await
        .expect("employee list");
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].requester_email, EMPLOYEE);

    let all = fx
        .workflow
        .list_asset_requests(ADMIN, Default::default())
        .await
        .expect("admin list");
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn payment_reconciliation_is_idempotent() {
    let fx = setup().await;
    fx.seed_roles().await;

    let session = fx
        .workflow
        .create_checkout_session(
            HR,
            CheckoutSessionCreate {
                package_name: "pro".to_string(),
                price: 9900,
                employee_limit: 50,
            },
        )
        .await
        .expect("create session");

    let first = fx
        .workflow
        .reconcile_payment(&session.id)
        .await
        .expect("first reconcile");
    assert!(!first.already_applied);
    assert!(first.consistency_gap.is_none());
    assert_eq!(first.record.package_name, "pro");
    assert_eq!(first.record.employee_limit, 50);

    // Entitlements landed on the HR account
    let account = fx
        .accounts
        .find_by_email(HR)
        .await
        .expect("lookup")
        .expect("hr account");
    assert_eq!(account.subscription_package.as_deref(), Some("pro"));
    assert_eq!(account.employee_limit, 50);

    // A duplicate callback is a success that changes nothing
    let second = fx
        .workflow
        .reconcile_payment(&session.id)
        .await
        .expect("second reconcile");
    assert!(second.already_applied);
    assert_eq!(
        second.record.transaction_id,
        first.record.transaction_id
    );

    let history = fx
        .workflow
        .list_payments(HR, None)
        .await
        .expect("payment history");
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn unpaid_session_is_not_reconciled() {
    let fx = setup().await;
    fx.seed_roles().await;

    fx.provider.insert_session(CheckoutSession {
        id: "cs_unpaid".to_string(),
        payment_status: "unpaid".to_string(),
        payment_intent: None,
        customer_email: Some(HR.to_string()),
        metadata: Default::default(),
        amount_total: None,
    });

    let err = fx
        .workflow
        .reconcile_payment("cs_unpaid")
        .await
        .expect_err("unpaid session must not grant entitlements");
    assert!(matches!(err, WorkflowError::PaymentNotCompleted(_)));

    let history = fx
        .workflow
        .list_payments(HR, None)
        .await
        .expect("payment history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn paid_session_without_an_amount_is_rejected() {
    let fx = setup().await;
    fx.seed_roles().await;

    fx.provider.insert_session(CheckoutSession {
        id: "cs_no_amount".to_string(),
        payment_status: "paid".to_string(),
        payment_intent: Some("pi_no_amount".to_string()),
        customer_email: Some(HR.to_string()),
        metadata: std::collections::HashMap::from([
            ("packageName".to_string(), "pro".to_string()),
            ("employeeLimit".to_string(), "50".to_string()),
        ]),
        amount_total: None,
    });

    // The ledger is immutable audit state; never record an amount of zero
    let err = fx
        .workflow
        .reconcile_payment("cs_no_amount")
        .await
        .expect_err("amountless session must not be recorded");
    assert!(matches!(err, WorkflowError::Validation(_)));

    let history = fx
        .workflow
        .list_payments(HR, None)
        .await
        .expect("payment history");
    assert!(history.is_empty());
}

#[tokio::test]
async fn entitlement_repair_reapplies_from_record() {
    let fx = setup().await;
    fx.seed_roles().await;

    let session = fx
        .workflow
        .create_checkout_session(
            HR,
            CheckoutSessionCreate {
                package_name: "starter".to_string(),
                price: 1900,
                employee_limit: 10,
            },
        )
        .await
        .expect("create session");
    let outcome = fx
        .workflow
        .reconcile_payment(&session.id)
        .await
        .expect("reconcile");

    // Repair is idempotent against an already-applied grant
    let applied = fx
        .workflow
        .repair_entitlements(ADMIN, &outcome.record.transaction_id)
        .await
        .expect("repair");
    assert!(applied);

    let account = fx
        .accounts
        .find_by_email(HR)
        .await
        .expect("lookup")
        .expect("hr account");
    assert_eq!(account.subscription_package.as_deref(), Some("starter"));
    assert_eq!(account.employee_limit, 10);
}

#[tokio::test]
async fn employee_approval_is_one_way() {
    let fx = setup().await;
    fx.seed_roles().await;

    let account = fx
        .accounts
        .find_or_create("applicant@example.com")
        .await
        .expect("create applicant");
    let id = account.id.expect("account id").to_string();

    let approved = fx
        .workflow
        .approve_employee(ADMIN, &id)
        .await
        .expect("approve employee");
    assert_eq!(approved.role, Role::Employee);
    assert_eq!(approved.work_status, WorkStatus::Available);

    // Second approval finds the account past `user`
    let err = fx
        .workflow
        .approve_employee(ADMIN, &id)
        .await
        .expect_err("approval must not re-fire");
    match err {
        WorkflowError::InvalidTransition { current, .. } => assert_eq!(current, "employee"),
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}
