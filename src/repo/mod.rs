use std::path::Path;

use anyhow::Result;

use crate::models::{Client, Job};
use crate::store::{self, CLIENTS_KEY, FileStore, JOBS_KEY, Store};

/// CRUD over the two persisted collections.
///
/// Every call re-reads the backing collection; nothing is cached between
/// calls, so the store is the single source of truth. Reads degrade to an
/// empty collection on a corrupt store (see `store::load`), writes surface
/// real I/O failures.
pub struct Repository {
    store: Box<dyn Store>,
}

impl Repository {
    pub fn new(store: Box<dyn Store>) -> Self {
        Self { store }
    }

    // Client operations

    pub fn get_clients(&self) -> Vec<Client> {
        store::load(self.store.as_ref(), CLIENTS_KEY)
    }

    pub fn get_client(&self, id: &str) -> Option<Client> {
        self.get_clients().into_iter().find(|c| c.id == id)
    }

    /// Upsert by id: an existing record is replaced in place, keeping its
    /// position in the collection; a new record is appended.
    pub fn save_client(&self, client: &Client) -> Result<()> {
        let mut clients = self.get_clients();
        match clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client.clone(),
            None => clients.push(client.clone()),
        }
        store::save(self.store.as_ref(), CLIENTS_KEY, &clients)?;
        Ok(())
    }

    /// Remove the client and every job that references it, as one logical
    /// operation. Jobs are written first so a torn operation can never leave
    /// orphaned jobs behind.
    pub fn delete_client(&self, id: &str) -> Result<()> {
        let jobs: Vec<Job> = self
            .get_jobs()
            .into_iter()
            .filter(|j| j.client_id != id)
            .collect();
        let clients: Vec<Client> = self
            .get_clients()
            .into_iter()
            .filter(|c| c.id != id)
            .collect();

        store::save(self.store.as_ref(), JOBS_KEY, &jobs)?;
        store::save(self.store.as_ref(), CLIENTS_KEY, &clients)?;
        Ok(())
    }

    // Job operations

    pub fn get_jobs(&self) -> Vec<Job> {
        store::load(self.store.as_ref(), JOBS_KEY)
    }

    pub fn get_job(&self, id: &str) -> Option<Job> {
        self.get_jobs().into_iter().find(|j| j.id == id)
    }

    pub fn save_job(&self, job: &Job) -> Result<()> {
        let mut jobs = self.get_jobs();
        match jobs.iter_mut().find(|j| j.id == job.id) {
            Some(existing) => *existing = job.clone(),
            None => jobs.push(job.clone()),
        }
        store::save(self.store.as_ref(), JOBS_KEY, &jobs)?;
        Ok(())
    }

    pub fn delete_job(&self, id: &str) -> Result<()> {
        let jobs: Vec<Job> = self
            .get_jobs()
            .into_iter()
            .filter(|j| j.id != id)
            .collect();
        store::save(self.store.as_ref(), JOBS_KEY, &jobs)?;
        Ok(())
    }

    /// Jobs referencing `client_id`, in stored order. No check that the
    /// client still exists.
    pub fn get_client_jobs(&self, client_id: &str) -> Vec<Job> {
        self.get_jobs()
            .into_iter()
            .filter(|j| j.client_id == client_id)
            .collect()
    }
}

/// Open the repository over a file store rooted at `data_dir`.
pub fn init(data_dir: &Path) -> Result<Repository> {
    let store = FileStore::open(data_dir)?;
    Ok(Repository::new(Box::new(store)))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::store::MemoryStore;

    fn test_repo() -> Repository {
        Repository::new(Box::new(MemoryStore::new()))
    }

    fn client(id: &str, name: &str, price: f64) -> Client {
        Client {
            id: id.to_string(),
            name: name.to_string(),
            phone: "555-0100".to_string(),
            address: "12 Elm St".to_string(),
            price,
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn job(id: &str, client_id: &str) -> Job {
        Job {
            id: id.to_string(),
            client_id: client_id.to_string(),
            scheduled_date: Utc::now(),
            completed: false,
            completed_date: None,
            paid: false,
            paid_date: None,
            notes: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn get_client_after_save_returns_equal_record() {
        let repo = test_repo();
        let c = client("c1", "Ann", 50.0);
        repo.save_client(&c).unwrap();
        assert_eq!(repo.get_client("c1"), Some(c));
    }

    #[test]
    fn get_client_missing_returns_none() {
        let repo = test_repo();
        assert_eq!(repo.get_client("nope"), None);
    }

    #[test]
    fn save_twice_with_same_id_keeps_one_record_with_latest_values() {
        let repo = test_repo();
        repo.save_job(&job("j1", "c1")).unwrap();
        let mut updated = job("j1", "c1");
        updated.completed = true;
        updated.completed_date = Some(Utc::now());
        repo.save_job(&updated).unwrap();

        let jobs = repo.get_jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0], updated);
    }

    #[test]
    fn upsert_preserves_position() {
        let repo = test_repo();
        repo.save_client(&client("c1", "Ann", 50.0)).unwrap();
        repo.save_client(&client("c2", "Bob", 60.0)).unwrap();
        repo.save_client(&client("c3", "Cam", 70.0)).unwrap();

        repo.save_client(&client("c1", "Ann Lee", 55.0)).unwrap();

        let ids: Vec<String> = repo.get_clients().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3"]);
        assert_eq!(repo.get_client("c1").unwrap().name, "Ann Lee");
    }

    #[test]
    fn delete_client_cascades_to_jobs() {
        let repo = test_repo();
        repo.save_client(&client("c1", "Ann", 50.0)).unwrap();
        repo.save_client(&client("c2", "Bob", 60.0)).unwrap();
        repo.save_job(&job("j1", "c1")).unwrap();
        repo.save_job(&job("j2", "c1")).unwrap();
        repo.save_job(&job("j3", "c2")).unwrap();

        repo.delete_client("c1").unwrap();

        assert_eq!(repo.get_client("c1"), None);
        assert!(repo.get_client_jobs("c1").is_empty());
        // Unrelated records are untouched.
        assert!(repo.get_client("c2").is_some());
        assert_eq!(repo.get_jobs().len(), 1);
    }

    #[test]
    fn delete_job_removes_only_that_job() {
        let repo = test_repo();
        repo.save_job(&job("j1", "c1")).unwrap();
        repo.save_job(&job("j2", "c1")).unwrap();

        repo.delete_job("j1").unwrap();

        let jobs = repo.get_jobs();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "j2");
    }

    #[test]
    fn client_jobs_filter_tolerates_missing_client() {
        let repo = test_repo();
        repo.save_job(&job("j1", "ghost")).unwrap();
        assert_eq!(repo.get_client_jobs("ghost").len(), 1);
    }

    #[test]
    fn records_round_trip_through_json_field_names() {
        let repo = test_repo();
        let mut j = job("j1", "c1");
        j.completed = true;
        j.completed_date = Some(Utc::now());
        j.notes = Some("gate code 4411".to_string());
        repo.save_job(&j).unwrap();
        assert_eq!(repo.get_job("j1"), Some(j));
    }
}
