//! JSON document store for templates, cases, and soldiers.
//!
//! One document per entity under the data root:
//! `templates/<id>.json`, `cases/<id>.json`, `soldiers/<id>.json`.
//! Writes go through a temp file and rename so a document is either the old
//! version or the new one, never a torn write. Case writes carry a revision
//! guard: saving against a stale revision is a typed conflict, so two editors
//! on one case cannot silently overwrite each other.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, TashError};
use crate::schema::{CaseStatus, ConsultationCase, RequestTemplate, Soldier};

/// Default data root in production.
pub const DEFAULT_DATA_DIR: &str = "/var/lib/tash";

const TEMPLATES: &str = "templates";
const CASES: &str = "cases";
const SOLDIERS: &str = "soldiers";

pub struct DocStore {
    root: PathBuf,
}

impl DocStore {
    /// Open (and create if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        for collection in [TEMPLATES, CASES, SOLDIERS] {
            fs::create_dir_all(root.join(collection))?;
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn doc_path(&self, collection: &str, id: &str) -> Result<PathBuf> {
        if id.is_empty() || id.contains('/') || id.contains('\\') || id.contains("..") {
            return Err(TashError::Invalid(format!("bad document id: {:?}", id)));
        }
        Ok(self.root.join(collection).join(format!("{}.json", id)))
    }

    fn read_doc<T: DeserializeOwned>(&self, collection: &str, id: &str) -> Result<Option<T>> {
        let path = self.doc_path(collection, id)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write_doc<T: Serialize>(&self, collection: &str, id: &str, value: &T) -> Result<()> {
        let path = self.doc_path(collection, id)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn read_all<T: DeserializeOwned>(&self, collection: &str) -> Result<Vec<T>> {
        let mut out = Vec::new();
        for entry in fs::read_dir(self.root.join(collection))? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let text = fs::read_to_string(&path)?;
                match serde_json::from_str(&text) {
                    Ok(doc) => out.push(doc),
                    Err(e) => warn!("Skipping unreadable document {:?}: {}", path, e),
                }
            }
        }
        Ok(out)
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    /// Write the given templates only when the collection is empty. Returns
    /// how many were seeded.
    pub fn seed_templates(&self, templates: &[RequestTemplate]) -> Result<usize> {
        if !self.list_templates()?.is_empty() {
            return Ok(0);
        }
        for template in templates {
            self.write_doc(TEMPLATES, &template.id, template)?;
        }
        info!("Seeded {} templates into {:?}", templates.len(), self.root);
        Ok(templates.len())
    }

    /// All templates, ordered by category then title for stable listings.
    pub fn list_templates(&self) -> Result<Vec<RequestTemplate>> {
        let mut templates: Vec<RequestTemplate> = self.read_all(TEMPLATES)?;
        templates.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then_with(|| a.title.cmp(&b.title))
        });
        Ok(templates)
    }

    pub fn get_template(&self, id: &str) -> Result<Option<RequestTemplate>> {
        self.read_doc(TEMPLATES, id)
    }

    /// Create or replace a template, stamping `last_updated`.
    pub fn upsert_template(&self, template: &RequestTemplate) -> Result<()> {
        let mut template = template.clone();
        template.last_updated = Utc::now();
        self.write_doc(TEMPLATES, &template.id, &template)
    }

    pub fn delete_template(&self, id: &str) -> Result<bool> {
        let path = self.doc_path(TEMPLATES, id)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive keyword search over title, description, keywords, and
    /// eligibility criteria.
    pub fn search_templates(&self, query: &str) -> Result<Vec<RequestTemplate>> {
        let q = query.to_lowercase();
        Ok(self
            .list_templates()?
            .into_iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&q)
                    || t.short_description.to_lowercase().contains(&q)
                    || t.ai_keywords.iter().any(|k| k.to_lowercase().contains(&q))
                    || t.eligibility_criteria
                        .iter()
                        .any(|c| c.to_lowercase().contains(&q))
            })
            .collect())
    }

    // ------------------------------------------------------------------
    // Cases
    // ------------------------------------------------------------------

    /// Persist a freshly materialized case as one atomic write. Refuses to
    /// overwrite an existing case id.
    pub fn create_case(&self, case: &ConsultationCase) -> Result<()> {
        let path = self.doc_path(CASES, &case.id)?;
        if path.exists() {
            return Err(TashError::Invalid(format!("case {} already exists", case.id)));
        }
        self.write_doc(CASES, &case.id, case)?;
        info!("Created case {} from template {}", case.id, case.template_id);
        Ok(())
    }

    pub fn get_case(&self, id: &str) -> Result<Option<ConsultationCase>> {
        self.read_doc(CASES, id)
    }

    /// Cases newest-first, optionally filtered to one soldier and/or to
    /// active status only.
    pub fn list_cases(
        &self,
        soldier_id: Option<&str>,
        active_only: bool,
        limit: usize,
    ) -> Result<Vec<ConsultationCase>> {
        let mut cases: Vec<ConsultationCase> = self
            .read_all(CASES)?
            .into_iter()
            .filter(|c: &ConsultationCase| {
                soldier_id.map(|s| c.soldier_id == s).unwrap_or(true)
                    && (!active_only || c.status == CaseStatus::Active)
            })
            .collect();
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        cases.truncate(limit);
        Ok(cases)
    }

    /// Write back a mutated case. The caller's `rev` must match the stored
    /// one; on success the revision is bumped and `updated_at` stamped.
    pub fn save_case(&self, case: &mut ConsultationCase) -> Result<()> {
        let stored: ConsultationCase = self
            .get_case(&case.id)?
            .ok_or_else(|| TashError::NotFound(format!("case {}", case.id)))?;

        if stored.rev != case.rev {
            return Err(TashError::Conflict {
                id: case.id.clone(),
                expected: case.rev,
                actual: stored.rev,
            });
        }

        case.rev += 1;
        case.updated_at = Utc::now();
        self.write_doc(CASES, &case.id.clone(), case)
    }

    // ------------------------------------------------------------------
    // Soldiers
    // ------------------------------------------------------------------

    pub fn list_soldiers(&self) -> Result<Vec<Soldier>> {
        let mut soldiers: Vec<Soldier> = self.read_all(SOLDIERS)?;
        soldiers.sort_by(|a, b| a.full_name.cmp(&b.full_name));
        Ok(soldiers)
    }

    pub fn get_soldier(&self, id: &str) -> Result<Option<Soldier>> {
        self.read_doc(SOLDIERS, id)
    }

    pub fn upsert_soldier(&self, soldier: &Soldier) -> Result<()> {
        let mut soldier = soldier.clone();
        soldier.updated_at = Some(Utc::now());
        self.write_doc(SOLDIERS, &soldier.id, &soldier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;
    use crate::materializer::{materialize, RoutingPolicy};

    fn open_store() -> (tempfile::TempDir, DocStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = DocStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_seed_only_when_empty() {
        let (_dir, store) = open_store();
        let catalog = default_catalog();
        assert_eq!(store.seed_templates(&catalog).unwrap(), catalog.len());
        // Second seed is a no-op, even after an edit.
        assert_eq!(store.seed_templates(&catalog).unwrap(), 0);
    }

    #[test]
    fn test_template_crud() {
        let (_dir, store) = open_store();
        let catalog = default_catalog();
        store.seed_templates(&catalog).unwrap();

        let mut template = store.get_template("work-permit").unwrap().unwrap();
        let before = template.last_updated;
        template.title = "Private work permit (updated)".to_string();
        store.upsert_template(&template).unwrap();

        let reloaded = store.get_template("work-permit").unwrap().unwrap();
        assert_eq!(reloaded.title, "Private work permit (updated)");
        assert!(reloaded.last_updated >= before);

        assert!(store.delete_template("work-permit").unwrap());
        assert!(!store.delete_template("work-permit").unwrap());
        assert!(store.get_template("work-permit").unwrap().is_none());
    }

    #[test]
    fn test_search_templates() {
        let (_dir, store) = open_store();
        store.seed_templates(&default_catalog()).unwrap();

        let hits = store.search_templates("rent").unwrap();
        assert!(hits.iter().any(|t| t.id == "rent-participation"));

        let hits = store.search_templates("FORECLOSURE").unwrap();
        assert!(hits.iter().any(|t| t.id == "bzack-grant"));

        assert!(store.search_templates("zzz-nothing").unwrap().is_empty());
    }

    #[test]
    fn test_case_roundtrip_and_listing() {
        let (_dir, store) = open_store();
        let catalog = default_catalog();

        let a = materialize(&catalog[0], "s-1", "Dana", "first", RoutingPolicy::FixedTwoTrack);
        let mut b = materialize(&catalog[1], "s-2", "Noam", "second", RoutingPolicy::FixedTwoTrack);
        b.created_at = a.created_at + chrono::Duration::seconds(5);
        store.create_case(&a).unwrap();
        store.create_case(&b).unwrap();

        // Newest first.
        let all = store.list_cases(None, false, 10).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, b.id);

        // Filter by soldier.
        let mine = store.list_cases(Some("s-1"), false, 10).unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].id, a.id);

        // Active filter.
        let mut closed = store.get_case(&b.id).unwrap().unwrap();
        closed.status = CaseStatus::Archived;
        store.save_case(&mut closed).unwrap();
        let active = store.list_cases(None, true, 10).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);
    }

    #[test]
    fn test_create_case_refuses_duplicate_id() {
        let (_dir, store) = open_store();
        let catalog = default_catalog();
        let case = materialize(&catalog[0], "s-1", "Dana", "x", RoutingPolicy::FixedTwoTrack);
        store.create_case(&case).unwrap();
        assert!(store.create_case(&case).is_err());
    }

    #[test]
    fn test_stale_rev_is_conflict() {
        let (_dir, store) = open_store();
        let catalog = default_catalog();
        let case = materialize(&catalog[0], "s-1", "Dana", "x", RoutingPolicy::FixedTwoTrack);
        store.create_case(&case).unwrap();

        // Two editors fetch the same revision.
        let mut first = store.get_case(&case.id).unwrap().unwrap();
        let mut second = store.get_case(&case.id).unwrap().unwrap();

        crate::checklist::add(&mut first, crate::schema::Track::Mashak, "Call the unit");
        store.save_case(&mut first).unwrap();
        assert_eq!(first.rev, 1);

        // The second editor's write is rejected, not silently merged.
        crate::checklist::add(&mut second, crate::schema::Track::Mashak, "Other note");
        let err = store.save_case(&mut second).unwrap_err();
        assert!(err.is_conflict());

        // After re-fetching, the retry goes through.
        let mut refreshed = store.get_case(&case.id).unwrap().unwrap();
        crate::checklist::add(&mut refreshed, crate::schema::Track::Mashak, "Other note");
        store.save_case(&mut refreshed).unwrap();
        assert_eq!(refreshed.rev, 2);
    }

    #[test]
    fn test_save_missing_case_is_not_found() {
        let (_dir, store) = open_store();
        let catalog = default_catalog();
        let mut case = materialize(&catalog[0], "s-1", "Dana", "x", RoutingPolicy::FixedTwoTrack);
        assert!(matches!(
            store.save_case(&mut case),
            Err(TashError::NotFound(_))
        ));
    }

    #[test]
    fn test_soldier_registry() {
        let (_dir, store) = open_store();
        let soldier = Soldier {
            id: "s-1".to_string(),
            personal_id: "8123456".to_string(),
            full_name: "Dana Levi".to_string(),
            unit: Some("8200".to_string()),
            phone: None,
            notes: None,
            is_lone_soldier: true,
            is_tashmash: false,
            is_or_population: false,
            created_at: Utc::now(),
            updated_at: None,
        };
        store.upsert_soldier(&soldier).unwrap();

        let loaded = store.get_soldier("s-1").unwrap().unwrap();
        assert_eq!(loaded.full_name, "Dana Levi");
        assert!(loaded.updated_at.is_some());
        assert_eq!(store.list_soldiers().unwrap().len(), 1);
    }

    #[test]
    fn test_bad_id_rejected() {
        let (_dir, store) = open_store();
        assert!(store.get_template("../etc/passwd").is_err());
        assert!(store.get_case("").is_err());
    }
}
