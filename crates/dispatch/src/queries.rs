//! Permission-gated reads and scoped filters.
//!
//! Plain reads are globally allowed (rule 1) but still routed through the
//! decision table — no code path bypasses it. The scoped filters are the
//! query side of the department rules: unassigned events for Management,
//! own unsigned/unpaid contracts for Commercial, own assignments for
//! Support.

use eventcrm_auth::{Identity, User};
use eventcrm_core::{ClientId, ContractId, DomainResult, EventId, UserId};
use eventcrm_domain::{Client, Contract, Event, EventStatus};
use eventcrm_policy::{Action, EntityKind, decide};

use crate::dispatcher::Dispatcher;
use crate::store::CrmStore;

impl<S: CrmStore> Dispatcher<S> {
    pub fn get_user(&self, identity: &Identity, id: UserId) -> DomainResult<User> {
        decide(identity, &Action::Read(EntityKind::User)).into_result()?;
        self.load_user(id)
    }

    pub fn get_client(&self, identity: &Identity, id: ClientId) -> DomainResult<Client> {
        decide(identity, &Action::Read(EntityKind::Client)).into_result()?;
        self.load_client(id)
    }

    pub fn get_contract(&self, identity: &Identity, id: ContractId) -> DomainResult<Contract> {
        decide(identity, &Action::Read(EntityKind::Contract)).into_result()?;
        self.load_contract(id)
    }

    pub fn get_event(&self, identity: &Identity, id: EventId) -> DomainResult<Event> {
        decide(identity, &Action::Read(EntityKind::Event)).into_result()?;
        self.load_event(id)
    }

    pub fn list_users(&self, identity: &Identity) -> DomainResult<Vec<User>> {
        decide(identity, &Action::Read(EntityKind::User)).into_result()?;
        Ok(self.store().list_users())
    }

    pub fn list_clients(&self, identity: &Identity) -> DomainResult<Vec<Client>> {
        decide(identity, &Action::Read(EntityKind::Client)).into_result()?;
        Ok(self.store().list_clients())
    }

    pub fn list_contracts(&self, identity: &Identity) -> DomainResult<Vec<Contract>> {
        decide(identity, &Action::Read(EntityKind::Contract)).into_result()?;
        Ok(self.store().list_contracts())
    }

    pub fn list_events(&self, identity: &Identity) -> DomainResult<Vec<Event>> {
        decide(identity, &Action::Read(EntityKind::Event)).into_result()?;
        Ok(self.store().list_events())
    }

    /// Events awaiting assignment, for Management to staff.
    pub fn list_unassigned_events(&self, identity: &Identity) -> DomainResult<Vec<Event>> {
        decide(identity, &Action::FilterUnassignedEvents).into_result()?;
        Ok(self
            .store()
            .list_events()
            .into_iter()
            .filter(|event| event.status == EventStatus::Unassigned)
            .collect())
    }

    /// The calling commercial's contracts still awaiting signature.
    pub fn list_own_unsigned_contracts(&self, identity: &Identity) -> DomainResult<Vec<Contract>> {
        decide(identity, &Action::FilterOwnUnsignedContracts).into_result()?;
        Ok(self
            .store()
            .list_contracts()
            .into_iter()
            .filter(|contract| {
                contract.commercial_contact_id == identity.user_id && !contract.signed
            })
            .collect())
    }

    /// The calling commercial's contracts with money still due.
    pub fn list_own_unpaid_contracts(&self, identity: &Identity) -> DomainResult<Vec<Contract>> {
        decide(identity, &Action::FilterOwnUnpaidContracts).into_result()?;
        Ok(self
            .store()
            .list_contracts()
            .into_iter()
            .filter(|contract| {
                contract.commercial_contact_id == identity.user_id && contract.amount_due > 0
            })
            .collect())
    }

    /// The calling support collaborator's own assignments.
    pub fn list_own_events(&self, identity: &Identity) -> DomainResult<Vec<Event>> {
        decide(identity, &Action::FilterOwnEvents).into_result()?;
        Ok(self
            .store()
            .list_events()
            .into_iter()
            .filter(|event| event.support_contact_id == Some(identity.user_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::{ClientDraft, ContractDraft};
    use crate::store::InMemoryStore;
    use chrono::Utc;
    use eventcrm_auth::{Department, NewUser};
    use eventcrm_core::DomainError;
    use eventcrm_domain::NewEvent;

    fn seed_user(store: &InMemoryStore, department: Department) -> Identity {
        let user = User::create(NewUser {
            id: UserId::new(),
            employee_number: "EE-100".to_string(),
            name: "Query Tester".to_string(),
            email: "query@example.com".to_string(),
            department,
            created_at: Utc::now(),
        })
        .unwrap();
        store
            .insert(crate::store::EntityState::User(user.clone()))
            .unwrap();
        Identity::new(user.id, user.department, user.name)
    }

    fn seeded_dispatcher() -> (
        Dispatcher<InMemoryStore>,
        Identity, // management
        Identity, // commercial
        Identity, // support
    ) {
        let store = InMemoryStore::new();
        let mgmt = seed_user(&store, Department::Management);
        let commercial = seed_user(&store, Department::Commercial);
        let support = seed_user(&store, Department::Support);
        (Dispatcher::new(store), mgmt, commercial, support)
    }

    fn seed_portfolio(
        dispatcher: &Dispatcher<InMemoryStore>,
        mgmt: &Identity,
        commercial: &Identity,
    ) -> (Contract, Event) {
        let client = dispatcher
            .create_client(commercial, ClientDraft {
                id: ClientId::new(),
                full_name: "Kevin Casey".to_string(),
                email: "kevin@startup.io".to_string(),
                phone: "+678 123 456 78".to_string(),
                company_name: "Cool Startup LLC".to_string(),
                commercial_contact_id: None,
                occurred_at: Utc::now(),
            })
            .unwrap();
        let unsigned = dispatcher
            .create_contract(mgmt, ContractDraft {
                id: ContractId::new(),
                client_id: client.id,
                total_amount: 300_00,
                amount_due: 300_00,
                signed: false,
                occurred_at: Utc::now(),
            })
            .unwrap();
        let signed = dispatcher
            .create_contract(mgmt, ContractDraft {
                id: ContractId::new(),
                client_id: client.id,
                total_amount: 800_00,
                amount_due: 0,
                signed: true,
                occurred_at: Utc::now(),
            })
            .unwrap();
        let starts_at = Utc::now();
        let event = dispatcher
            .create_event(commercial, NewEvent {
                id: EventId::new(),
                contract_id: signed.id,
                starts_at,
                ends_at: starts_at + chrono::Duration::hours(4),
                location: "Quai des Chartrons".to_string(),
                attendees: 200,
                notes: None,
            })
            .unwrap();
        (unsigned, event)
    }

    #[test]
    fn every_department_reads_everything() {
        let (dispatcher, mgmt, commercial, support) = seeded_dispatcher();
        seed_portfolio(&dispatcher, &mgmt, &commercial);

        for identity in [&mgmt, &commercial, &support] {
            assert!(dispatcher.list_clients(identity).is_ok());
            assert!(dispatcher.list_contracts(identity).is_ok());
            assert!(dispatcher.list_events(identity).is_ok());
            assert!(dispatcher.list_users(identity).is_ok());
        }
    }

    #[test]
    fn unassigned_filter_is_management_only() {
        let (dispatcher, mgmt, commercial, support) = seeded_dispatcher();
        let (_, event) = seed_portfolio(&dispatcher, &mgmt, &commercial);

        let unassigned = dispatcher.list_unassigned_events(&mgmt).unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, event.id);

        for identity in [&commercial, &support] {
            let err = dispatcher.list_unassigned_events(identity).unwrap_err();
            assert!(matches!(err, DomainError::InsufficientPermission(_)));
        }
    }

    #[test]
    fn commercial_filters_see_only_their_own_contracts() {
        let (dispatcher, mgmt, commercial, _) = seeded_dispatcher();
        let (unsigned, _) = seed_portfolio(&dispatcher, &mgmt, &commercial);

        let own_unsigned = dispatcher.list_own_unsigned_contracts(&commercial).unwrap();
        assert_eq!(own_unsigned.len(), 1);
        assert_eq!(own_unsigned[0].id, unsigned.id);

        let own_unpaid = dispatcher.list_own_unpaid_contracts(&commercial).unwrap();
        assert_eq!(own_unpaid.len(), 1);
        assert_eq!(own_unpaid[0].id, unsigned.id);

        // Another commercial sees an empty portfolio, not a denial.
        let other = {
            let store = dispatcher.store();
            seed_user(store, Department::Commercial)
        };
        assert!(dispatcher.list_own_unsigned_contracts(&other).unwrap().is_empty());

        let err = dispatcher.list_own_unsigned_contracts(&mgmt).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientPermission(_)));
    }

    #[test]
    fn support_filter_sees_only_their_assignments() {
        let (dispatcher, mgmt, commercial, support) = seeded_dispatcher();
        let (_, event) = seed_portfolio(&dispatcher, &mgmt, &commercial);

        assert!(dispatcher.list_own_events(&support).unwrap().is_empty());

        dispatcher
            .assign_support(&mgmt, event.id, support.user_id)
            .unwrap();

        let own = dispatcher.list_own_events(&support).unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].support_contact_id, Some(support.user_id));

        let err = dispatcher.list_own_events(&commercial).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientPermission(_)));
    }
}
