//! The ordered permission rule table.
//!
//! Rules are evaluated top to bottom; the first rule with an opinion wins,
//! and exhausting the table denies. A rule returns `None` when it has no
//! opinion on the (identity, action) pair.

use eventcrm_auth::Identity;

use crate::{Action, Decision};

type RuleFn = fn(&Identity, &Action<'_>) -> Option<Decision>;

/// The rule set is fixed and small; no dynamic registration.
const RULES: &[(&str, RuleFn)] = &[
    ("global-read", global_read),
    ("management", management),
    ("commercial", commercial),
    ("support", support),
];

/// Decide whether `identity` may perform `action`.
///
/// - No IO
/// - No panics
/// - No side effects (pure policy check)
pub fn decide(identity: &Identity, action: &Action<'_>) -> Decision {
    for (_name, rule) in RULES {
        if let Some(verdict) = rule(identity, action) {
            return verdict;
        }
    }
    Decision::deny(format!(
        "{} is not permitted for the {} department",
        action.describe(),
        identity.department
    ))
}

/// Rule 1: every department may read every entity.
fn global_read(_identity: &Identity, action: &Action<'_>) -> Option<Decision> {
    match action {
        Action::Read(_) => Some(Decision::Allow),
        _ => None,
    }
}

/// Rule 2: Management administers accounts, contracts and assignments.
fn management(identity: &Identity, action: &Action<'_>) -> Option<Decision> {
    if !identity.is_management() {
        return None;
    }
    match action {
        Action::CreateUser
        | Action::UpdateUser
        | Action::DeleteUser
        | Action::CreateClient
        | Action::ReassignClient { .. }
        | Action::CreateContract { .. }
        | Action::UpdateContract { .. }
        | Action::AssignSupport { .. }
        | Action::FilterUnassignedEvents => Some(Decision::Allow),
        _ => None,
    }
}

/// Rule 3: Commercial manages its own portfolio.
fn commercial(identity: &Identity, action: &Action<'_>) -> Option<Decision> {
    if !identity.is_commercial() {
        return None;
    }
    match action {
        Action::CreateClient => Some(Decision::Allow),
        Action::UpdateClient { client } => {
            if client.commercial_contact_id == identity.user_id {
                Some(Decision::Allow)
            } else {
                Some(Decision::deny(
                    "clients can only be updated by their commercial contact",
                ))
            }
        }
        Action::CreateContract { client } => {
            if client.commercial_contact_id == identity.user_id {
                Some(Decision::Allow)
            } else {
                Some(Decision::deny(
                    "contracts can only be created for the commercial's own clients",
                ))
            }
        }
        Action::UpdateContract { contract } => {
            if contract.commercial_contact_id == identity.user_id {
                Some(Decision::Allow)
            } else {
                Some(Decision::deny(
                    "contracts can only be updated by their commercial contact",
                ))
            }
        }
        Action::CreateEvent { contract } => {
            if contract.commercial_contact_id != identity.user_id {
                Some(Decision::deny(
                    "events can only be created by the contract's commercial contact",
                ))
            } else if !contract.signed {
                // Same reason code as the lifecycle gate.
                Some(Decision::deny_with(
                    eventcrm_core::DomainError::ContractNotSigned,
                ))
            } else {
                Some(Decision::Allow)
            }
        }
        Action::FilterOwnUnsignedContracts | Action::FilterOwnUnpaidContracts => {
            Some(Decision::Allow)
        }
        _ => None,
    }
}

/// Rule 4: Support works its own assignments.
fn support(identity: &Identity, action: &Action<'_>) -> Option<Decision> {
    if !identity.is_support() {
        return None;
    }
    match action {
        Action::UpdateEvent { event } | Action::CompleteEvent { event } => {
            if event.support_contact_id == Some(identity.user_id) {
                Some(Decision::Allow)
            } else {
                Some(Decision::deny(
                    "events can only be updated by their assigned support contact",
                ))
            }
        }
        Action::FilterOwnEvents => Some(Decision::Allow),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EntityKind;
    use chrono::Utc;
    use eventcrm_auth::Department;
    use eventcrm_core::{ClientId, ContractId, UserId};
    use eventcrm_domain::{
        Client, Contract, Event, EventChange, NewClient, NewContract, NewEvent,
    };

    fn identity(department: Department) -> Identity {
        Identity::new(UserId::new(), department, "Test Collaborator")
    }

    fn client_owned_by(owner: UserId) -> Client {
        Client::create(NewClient {
            id: ClientId::new(),
            full_name: "Kevin Casey".to_string(),
            email: "kevin@startup.io".to_string(),
            phone: "+678 123 456 78".to_string(),
            company_name: "Cool Startup LLC".to_string(),
            commercial_contact_id: owner,
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    fn contract_owned_by(owner: UserId, signed: bool) -> Contract {
        Contract::create(NewContract {
            id: ContractId::new(),
            client_id: ClientId::new(),
            commercial_contact_id: owner,
            total_amount: 500_00,
            amount_due: 500_00,
            signed,
            occurred_at: Utc::now(),
        })
        .unwrap()
    }

    fn event_assigned_to(support: UserId) -> Event {
        let contract = contract_owned_by(UserId::new(), true);
        let starts_at = Utc::now();
        let event = Event::create(
            NewEvent {
                id: eventcrm_core::EventId::new(),
                contract_id: contract.id,
                starts_at,
                ends_at: starts_at + chrono::Duration::hours(4),
                location: "Parc des Expositions".to_string(),
                attendees: 50,
                notes: None,
            },
            &contract,
        )
        .unwrap();
        event
            .handle(&EventChange::AssignSupport {
                support_id: support,
                support_department: Department::Support,
            })
            .unwrap()
    }

    #[test]
    fn read_is_allowed_for_every_department() {
        for department in [
            Department::Management,
            Department::Commercial,
            Department::Support,
        ] {
            for kind in [
                EntityKind::User,
                EntityKind::Client,
                EntityKind::Contract,
                EntityKind::Event,
            ] {
                let verdict = decide(&identity(department), &Action::Read(kind));
                assert!(verdict.is_allowed(), "{department} should read {kind:?}");
            }
        }
    }

    #[test]
    fn management_administers_users_contracts_and_assignments() {
        let mgmt = identity(Department::Management);
        let other_owner = UserId::new();
        let client = client_owned_by(other_owner);
        let contract = contract_owned_by(other_owner, false);
        let event = event_assigned_to(UserId::new());

        assert!(decide(&mgmt, &Action::CreateUser).is_allowed());
        assert!(decide(&mgmt, &Action::UpdateUser).is_allowed());
        assert!(decide(&mgmt, &Action::DeleteUser).is_allowed());
        // Any contract, any client — ownership is irrelevant to Management.
        assert!(decide(&mgmt, &Action::CreateContract { client: &client }).is_allowed());
        assert!(decide(&mgmt, &Action::UpdateContract { contract: &contract }).is_allowed());
        assert!(decide(&mgmt, &Action::ReassignClient { client: &client }).is_allowed());
        assert!(decide(&mgmt, &Action::AssignSupport { event: &event }).is_allowed());
        assert!(decide(&mgmt, &Action::FilterUnassignedEvents).is_allowed());
    }

    #[test]
    fn management_does_not_update_events_or_clients() {
        let mgmt = identity(Department::Management);
        let client = client_owned_by(UserId::new());
        let event = event_assigned_to(UserId::new());

        assert!(!decide(&mgmt, &Action::UpdateEvent { event: &event }).is_allowed());
        assert!(!decide(&mgmt, &Action::UpdateClient { client: &client }).is_allowed());
    }

    #[test]
    fn commercial_updates_only_its_own_clients() {
        let commercial = identity(Department::Commercial);
        let own = client_owned_by(commercial.user_id);
        let foreign = client_owned_by(UserId::new());

        assert!(decide(&commercial, &Action::UpdateClient { client: &own }).is_allowed());

        let verdict = decide(&commercial, &Action::UpdateClient { client: &foreign });
        assert!(matches!(verdict, Decision::Deny { .. }));
    }

    #[test]
    fn commercial_updates_only_its_own_contracts() {
        let commercial = identity(Department::Commercial);
        let own = contract_owned_by(commercial.user_id, false);
        let foreign = contract_owned_by(UserId::new(), false);

        assert!(decide(&commercial, &Action::UpdateContract { contract: &own }).is_allowed());
        assert!(!decide(&commercial, &Action::UpdateContract { contract: &foreign }).is_allowed());
    }

    #[test]
    fn commercial_event_creation_requires_ownership_and_signature() {
        let commercial = identity(Department::Commercial);
        let own_signed = contract_owned_by(commercial.user_id, true);
        let own_unsigned = contract_owned_by(commercial.user_id, false);
        let foreign_signed = contract_owned_by(UserId::new(), true);

        assert!(decide(&commercial, &Action::CreateEvent { contract: &own_signed }).is_allowed());

        // Owner but unsigned: the deny carries the lifecycle's reason code.
        let err = decide(&commercial, &Action::CreateEvent { contract: &own_unsigned })
            .into_result()
            .unwrap_err();
        assert_eq!(err, eventcrm_core::DomainError::ContractNotSigned);

        let err = decide(&commercial, &Action::CreateEvent { contract: &foreign_signed })
            .into_result()
            .unwrap_err();
        assert!(matches!(
            err,
            eventcrm_core::DomainError::InsufficientPermission(_)
        ));
    }

    #[test]
    fn commercial_filters_its_own_portfolio() {
        let commercial = identity(Department::Commercial);

        assert!(decide(&commercial, &Action::FilterOwnUnsignedContracts).is_allowed());
        assert!(decide(&commercial, &Action::FilterOwnUnpaidContracts).is_allowed());
        assert!(!decide(&commercial, &Action::FilterUnassignedEvents).is_allowed());
    }

    #[test]
    fn support_updates_only_its_own_assignments() {
        let support = identity(Department::Support);
        let own = event_assigned_to(support.user_id);
        let foreign = event_assigned_to(UserId::new());

        assert!(decide(&support, &Action::UpdateEvent { event: &own }).is_allowed());
        assert!(decide(&support, &Action::CompleteEvent { event: &own }).is_allowed());
        assert!(decide(&support, &Action::FilterOwnEvents).is_allowed());

        let verdict = decide(&support, &Action::UpdateEvent { event: &foreign });
        assert!(matches!(verdict, Decision::Deny { .. }));
    }

    #[test]
    fn support_cannot_assign_or_touch_contracts() {
        let support = identity(Department::Support);
        let event = event_assigned_to(support.user_id);
        let contract = contract_owned_by(UserId::new(), true);

        assert!(!decide(&support, &Action::AssignSupport { event: &event }).is_allowed());
        assert!(!decide(&support, &Action::UpdateContract { contract: &contract }).is_allowed());
        assert!(!decide(&support, &Action::CreateClient).is_allowed());
    }

    #[test]
    fn exhausting_the_table_denies() {
        let commercial = identity(Department::Commercial);

        let verdict = decide(&commercial, &Action::DeleteUser);
        let Decision::Deny { reason } = verdict else {
            panic!("expected a denial");
        };
        let eventcrm_core::DomainError::InsufficientPermission(detail) = reason else {
            panic!("expected InsufficientPermission");
        };
        assert!(detail.contains("user.delete"));
    }

    #[test]
    fn deny_converts_to_insufficient_permission() {
        let support = identity(Department::Support);

        let err = decide(&support, &Action::CreateUser).into_result().unwrap_err();
        assert!(matches!(
            err,
            eventcrm_core::DomainError::InsufficientPermission(_)
        ));
    }
}
