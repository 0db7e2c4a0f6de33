//! Per-website edit lifecycle for batched, full-replace submission.
//!
//! Each website in the working set carries an [`EditState`]. Submission sends
//! the whole surviving set; anything omitted is pruned by the backend.

use serde::Serialize;
use tracing::{debug, info};

use super::domain_resolver::{form_to_website, website_to_form, UnmatchedDomainPolicy};
use crate::models::{AvailableDomain, CreateWebsiteInput, Website, WebsiteForm};
use crate::validation::{validate_websites, CoreError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EditState {
    /// Persisted and untouched
    NoChange,
    /// Persisted and edited since the last submission
    ReadyToChange,
    /// Persisted and marked for removal
    ReadyToDelete,
    /// Not persisted yet
    Added,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditEvent {
    Edit,
    Delete,
    SubmitSucceeded,
    SubmitFailed,
}

/// State after `event`, or `None` when the record leaves the working set.
///
/// A failed submission only resets the status of edited records; their
/// values are kept so the next attempt can pick them up again.
pub fn next_state(state: EditState, event: EditEvent) -> Option<EditState> {
    use EditEvent::*;
    use EditState::*;

    match (state, event) {
        (NoChange | ReadyToChange, Edit) => Some(ReadyToChange),
        (Added, Edit) => Some(Added),
        (ReadyToDelete, Edit) => Some(ReadyToDelete),

        (Added, Delete) => None,
        (NoChange | ReadyToChange | ReadyToDelete, Delete) => Some(ReadyToDelete),

        (ReadyToDelete, SubmitSucceeded) => None,
        (NoChange | ReadyToChange | Added, SubmitSucceeded) => Some(NoChange),

        (ReadyToChange, SubmitFailed) => Some(NoChange),
        (other, SubmitFailed) => Some(other),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebsiteEditRecord {
    pub state: EditState,
    pub website: WebsiteForm,
    /// Last value known to be persisted
    pub baseline: Option<CreateWebsiteInput>,
    /// Backend id, when the record came from a persisted website
    pub id: Option<String>,
}

impl WebsiteEditRecord {
    /// Record for a persisted website
    pub fn persisted(website: &Website, form: WebsiteForm) -> Self {
        Self {
            state: EditState::NoChange,
            website: form,
            baseline: Some(website.to_input()),
            id: Some(website.id.clone()),
        }
    }

    /// Record for a website that only exists in the form
    pub fn added(form: WebsiteForm) -> Self {
        Self {
            state: EditState::Added,
            website: form,
            baseline: None,
            id: None,
        }
    }

    /// Whether the current value differs from the baseline
    pub fn is_dirty(&self) -> bool {
        match &self.baseline {
            Some(baseline) => form_to_website(&self.website) != *baseline,
            None => true,
        }
    }

    /// State re-derived from the value for persisted records, so a record
    /// reset by a failed submission is still sent if it differs.
    pub fn effective_state(&self) -> EditState {
        match self.state {
            EditState::NoChange | EditState::ReadyToChange if self.baseline.is_some() => {
                if self.is_dirty() {
                    EditState::ReadyToChange
                } else {
                    EditState::NoChange
                }
            }
            state => state,
        }
    }

    /// Value this record contributes to the submission, if any
    pub fn submitted_value(&self) -> Option<CreateWebsiteInput> {
        match self.effective_state() {
            EditState::ReadyToDelete => None,
            EditState::NoChange => self
                .baseline
                .clone()
                .or_else(|| Some(form_to_website(&self.website))),
            EditState::ReadyToChange | EditState::Added => Some(form_to_website(&self.website)),
        }
    }

    fn apply(mut self, event: EditEvent) -> Option<Self> {
        self.state = next_state(self.state, event)?;
        Some(self)
    }
}

/// The websites of one application while they are being edited
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WebsiteWorkingSet {
    records: Vec<WebsiteEditRecord>,
}

impl WebsiteWorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing the persisted websites of an application
    pub fn from_websites(
        websites: &[Website],
        domains: &[AvailableDomain],
        policy: UnmatchedDomainPolicy,
    ) -> Result<Self> {
        let records = websites
            .iter()
            .map(|w| {
                let form = website_to_form(&w.to_input(), domains, policy)?;
                Ok(WebsiteEditRecord::persisted(w, form))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(count = records.len(), "Loaded websites into working set");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[WebsiteEditRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&WebsiteEditRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Append a new website; returns its index
    pub fn add(&mut self, form: WebsiteForm) -> usize {
        self.records.push(WebsiteEditRecord::added(form));
        self.records.len() - 1
    }

    /// Append a new website on the first domain that can take one
    pub fn add_default(&mut self, domains: &[AvailableDomain]) -> Result<usize> {
        let domain = domains
            .iter()
            .find(|d| d.is_wildcard() || !d.already_bound)
            .ok_or(CoreError::NoDomainsAvailable)?;
        Ok(self.add(WebsiteForm::new(domain.domain.clone())))
    }

    /// Change the value of a record
    pub fn edit(&mut self, index: usize, f: impl FnOnce(&mut WebsiteForm)) -> Result<()> {
        let record = self
            .records
            .get_mut(index)
            .ok_or(CoreError::RecordNotFound { index })?;
        f(&mut record.website);
        if let Some(state) = next_state(record.state, EditEvent::Edit) {
            record.state = state;
        }
        Ok(())
    }

    /// Mark a record for deletion. Records never persisted are removed
    /// outright, which shifts the indices of later records.
    pub fn delete(&mut self, index: usize) -> Result<()> {
        let record = self
            .records
            .get_mut(index)
            .ok_or(CoreError::RecordNotFound { index })?;
        match next_state(record.state, EditEvent::Delete) {
            Some(state) => record.state = state,
            None => {
                self.records.remove(index);
            }
        }
        Ok(())
    }

    /// Whether submitting would change anything on the backend
    pub fn has_changes(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.effective_state() != EditState::NoChange)
    }

    /// Full-replace payload: every surviving website, edited or not
    pub fn payload(&self) -> Vec<CreateWebsiteInput> {
        self.records
            .iter()
            .filter_map(WebsiteEditRecord::submitted_value)
            .collect()
    }

    /// Validate every surviving record and build the payload
    pub fn prepare_submission(&self, domains: &[AvailableDomain]) -> Result<Vec<CreateWebsiteInput>> {
        validate_websites(&self.records, domains)?;
        Ok(self.payload())
    }

    /// The backend accepted the payload: surviving records become the new
    /// baseline and records marked for deletion leave the working set.
    pub fn submit_succeeded(&mut self) {
        let before = self.records.len();
        self.records = std::mem::take(&mut self.records)
            .into_iter()
            .map(|mut r| {
                r.baseline = Some(form_to_website(&r.website));
                r
            })
            .filter_map(|r| r.apply(EditEvent::SubmitSucceeded))
            .collect();
        info!(
            kept = self.records.len(),
            removed = before - self.records.len(),
            "Website changes applied"
        );
    }

    /// The backend rejected the payload: edited records go back to
    /// `NoChange` but keep their values.
    pub fn submit_failed(&mut self) {
        self.records = std::mem::take(&mut self.records)
            .into_iter()
            .filter_map(|r| r.apply(EditEvent::SubmitFailed))
            .collect();
        info!(count = self.records.len(), "Website submission failed, statuses reset");
    }

    /// Drive [`submit_succeeded`](Self::submit_succeeded) or
    /// [`submit_failed`](Self::submit_failed) from a submission result
    pub fn finish_submit<E>(&mut self, outcome: &std::result::Result<(), E>) {
        match outcome {
            Ok(()) => self.submit_succeeded(),
            Err(_) => self.submit_failed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AuthenticationType;

    fn catalog() -> Vec<AvailableDomain> {
        vec![
            AvailableDomain::new("*.trap.show").with_auth(true),
            AvailableDomain::new("example.com").with_already_bound(true),
        ]
    }

    fn persisted(id: &str, fqdn: &str) -> Website {
        Website {
            id: id.to_string(),
            fqdn: fqdn.to_string(),
            path_prefix: "/".to_string(),
            strip_prefix: false,
            https: true,
            h2c: false,
            http_port: 80,
            authentication: AuthenticationType::Off,
        }
    }

    fn form(subdomain: &str) -> WebsiteForm {
        let mut form = WebsiteForm::new("*.trap.show");
        form.subdomain = subdomain.to_string();
        form
    }

    #[test]
    fn test_transition_table() {
        use EditEvent::*;
        use EditState::*;

        assert_eq!(next_state(NoChange, Edit), Some(ReadyToChange));
        assert_eq!(next_state(Added, Edit), Some(Added));
        assert_eq!(next_state(NoChange, Delete), Some(ReadyToDelete));
        assert_eq!(next_state(ReadyToChange, Delete), Some(ReadyToDelete));
        assert_eq!(next_state(Added, Delete), None);
        assert_eq!(next_state(ReadyToDelete, SubmitSucceeded), None);
        assert_eq!(next_state(Added, SubmitSucceeded), Some(NoChange));
        assert_eq!(next_state(ReadyToChange, SubmitFailed), Some(NoChange));
        assert_eq!(next_state(Added, SubmitFailed), Some(Added));
    }

    #[test]
    fn test_added_record_lifecycle() {
        let domains = catalog();
        let mut set = WebsiteWorkingSet::new();
        let index = set.add(form("app"));
        set.edit(index, |w| w.http_port = 8080).unwrap();
        assert_eq!(set.records()[index].state, EditState::Added);

        let payload = set.prepare_submission(&domains).unwrap();
        assert_eq!(payload.len(), 1);
        assert_eq!(payload[0].fqdn, "app.trap.show");
        assert_eq!(payload[0].http_port, 8080);

        set.submit_succeeded();
        let record = &set.records()[index];
        assert_eq!(record.state, EditState::NoChange);
        assert_eq!(record.baseline.as_ref(), Some(&payload[0]));
    }

    #[test]
    fn test_delete_persisted_record() {
        let domains = catalog();
        let websites = vec![persisted("w1", "a.trap.show"), persisted("w2", "b.trap.show")];
        let mut set =
            WebsiteWorkingSet::from_websites(&websites, &domains, UnmatchedDomainPolicy::Reject)
                .unwrap();
        assert!(!set.has_changes());

        set.delete(0).unwrap();
        assert_eq!(set.records()[0].state, EditState::ReadyToDelete);
        assert!(set.has_changes());

        let payload = set.prepare_submission(&domains).unwrap();
        assert_eq!(payload, vec![websites[1].to_input()]);

        set.submit_succeeded();
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].id.as_deref(), Some("w2"));
    }

    #[test]
    fn test_delete_added_record_removes_it() {
        let mut set = WebsiteWorkingSet::new();
        set.add(form("x"));
        set.delete(0).unwrap();
        assert!(set.is_empty());
        assert!(matches!(set.delete(0), Err(CoreError::RecordNotFound { index: 0 })));
    }

    #[test]
    fn test_failed_submission_keeps_edited_value() {
        let domains = catalog();
        let websites = vec![persisted("w1", "a.trap.show")];
        let mut set =
            WebsiteWorkingSet::from_websites(&websites, &domains, UnmatchedDomainPolicy::Reject)
                .unwrap();

        set.edit(0, |w| w.subdomain = "renamed".to_string()).unwrap();
        assert_eq!(set.records()[0].state, EditState::ReadyToChange);

        set.finish_submit(&Err::<(), _>("backend unavailable"));
        let record = &set.records()[0];
        assert_eq!(record.state, EditState::NoChange);
        assert_eq!(record.website.subdomain, "renamed");
        assert_eq!(record.effective_state(), EditState::ReadyToChange);

        // the retry still carries the edit
        let payload = set.prepare_submission(&domains).unwrap();
        assert_eq!(payload[0].fqdn, "renamed.trap.show");

        // reverting the value makes the record unchanged again
        set.edit(0, |w| w.subdomain = "a".to_string()).unwrap();
        assert_eq!(set.records()[0].effective_state(), EditState::NoChange);
        assert!(!set.has_changes());
    }

    #[test]
    fn test_persisted_auth_on_domain_without_auth_is_turned_off() {
        let domains = vec![AvailableDomain::new("*.trap.show")];
        let mut website = persisted("w1", "app.trap.show");
        website.authentication = AuthenticationType::Hard;

        let set = WebsiteWorkingSet::from_websites(
            &[website],
            &domains,
            UnmatchedDomainPolicy::Reject,
        )
        .unwrap();
        let record = &set.records()[0];
        assert_eq!(record.website.authentication, AuthenticationType::Off);
        assert_eq!(record.effective_state(), EditState::ReadyToChange);
        assert!(set.has_changes());

        let payload = set.prepare_submission(&domains).unwrap();
        assert_eq!(payload[0].authentication, AuthenticationType::Off);
    }

    #[test]
    fn test_add_default_skips_bound_domains() {
        let domains = vec![
            AvailableDomain::new("taken.com").with_already_bound(true),
            AvailableDomain::new("free.com"),
        ];
        let mut set = WebsiteWorkingSet::new();
        let index = set.add_default(&domains).unwrap();
        assert_eq!(set.records()[index].website.domain, "free.com");

        assert!(matches!(
            set.add_default(&[]),
            Err(CoreError::NoDomainsAvailable)
        ));
    }

    #[test]
    fn test_invalid_record_blocks_submission() {
        let mut set = WebsiteWorkingSet::new();
        set.add(form(""));
        let Err(CoreError::Validation(errors)) = set.prepare_submission(&catalog()) else {
            panic!("Expected validation error");
        };
        assert!(errors.has_field("websites[0].subdomain"));
    }
}
