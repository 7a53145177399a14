use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::birthdays;
use crate::models::{Contact, ContactPatch, NewContact};

use super::manager::{classify_unique, DatabaseError};
use super::Page;

const DUPLICATE_CONTACT_EMAIL: &str = "Contact with this email already exists";

const CONTACT_COLUMNS: &str = "id, owner_id, first_name, last_name, email, phone_number, \
     birth_date, additional_info, created_at, updated_at";

/// Owner-scoped contact persistence. Every operation takes the owner id and
/// applies it as a mandatory filter, so an id belonging to someone else is
/// indistinguishable from an absent one.
#[async_trait]
pub trait ContactStore: Send + Sync {
    async fn create(&self, owner_id: Uuid, draft: NewContact) -> Result<Contact, DatabaseError>;
    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Contact>, DatabaseError>;
    async fn list(&self, owner_id: Uuid, page: Page) -> Result<Vec<Contact>, DatabaseError>;
    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, DatabaseError>;
    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, DatabaseError>;
    /// Case-insensitive substring match over first name, last name and email.
    /// A blank term behaves exactly like `list`.
    async fn search(
        &self,
        owner_id: Uuid,
        term: &str,
        page: Page,
    ) -> Result<Vec<Contact>, DatabaseError>;
    /// Contacts whose next birthday (month/day, any year) falls within
    /// `window_days` of `today`, both ends inclusive.
    async fn upcoming_birthdays(
        &self,
        owner_id: Uuid,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Contact>, DatabaseError>;
    /// Cheap connectivity probe for health reporting.
    async fn ping(&self) -> Result<(), DatabaseError>;
}

#[derive(Clone)]
pub struct PgContactStore {
    pool: PgPool,
}

impl PgContactStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactStore for PgContactStore {
    async fn create(&self, owner_id: Uuid, draft: NewContact) -> Result<Contact, DatabaseError> {
        let sql = format!(
            "INSERT INTO contacts (id, owner_id, first_name, last_name, email, phone_number, \
             birth_date, additional_info) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            CONTACT_COLUMNS
        );

        sqlx::query_as::<_, Contact>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&draft.first_name)
            .bind(&draft.last_name)
            .bind(&draft.email)
            .bind(&draft.phone_number)
            .bind(draft.birth_date)
            .bind(&draft.additional_info)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| classify_unique(e, DUPLICATE_CONTACT_EMAIL))
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Contact>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE id = $1 AND owner_id = $2",
            CONTACT_COLUMNS
        );

        let contact = sqlx::query_as::<_, Contact>(&sql)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(contact)
    }

    async fn list(&self, owner_id: Uuid, page: Page) -> Result<Vec<Contact>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM contacts WHERE owner_id = $1 \
             ORDER BY created_at, id LIMIT $2 OFFSET $3",
            CONTACT_COLUMNS
        );

        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(owner_id)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(contacts)
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, DatabaseError> {
        let mut builder = QueryBuilder::<Postgres>::new("UPDATE contacts SET ");
        let mut first = true;

        if let Some(first_name) = patch.first_name {
            push_set_prefix(&mut builder, &mut first);
            builder.push("first_name = ").push_bind(first_name);
        }
        if let Some(last_name) = patch.last_name {
            push_set_prefix(&mut builder, &mut first);
            builder.push("last_name = ").push_bind(last_name);
        }
        if let Some(email) = patch.email {
            push_set_prefix(&mut builder, &mut first);
            builder.push("email = ").push_bind(email);
        }
        if let Some(phone_number) = patch.phone_number {
            push_set_prefix(&mut builder, &mut first);
            builder.push("phone_number = ").push_bind(phone_number);
        }
        if let Some(birth_date) = patch.birth_date {
            push_set_prefix(&mut builder, &mut first);
            builder.push("birth_date = ").push_bind(birth_date);
        }
        if let Some(additional_info) = patch.additional_info {
            push_set_prefix(&mut builder, &mut first);
            // Binding None clears the column
            builder.push("additional_info = ").push_bind(additional_info);
        }

        push_set_prefix(&mut builder, &mut first);
        builder.push("updated_at = NOW()");

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(" AND owner_id = ").push_bind(owner_id);
        builder.push(format!(" RETURNING {}", CONTACT_COLUMNS));

        builder
            .build_query_as::<Contact>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| classify_unique(e, DUPLICATE_CONTACT_EMAIL))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM contacts WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(
        &self,
        owner_id: Uuid,
        term: &str,
        page: Page,
    ) -> Result<Vec<Contact>, DatabaseError> {
        let term = term.trim();
        if term.is_empty() {
            return self.list(owner_id, page).await;
        }

        let pattern = format!("%{}%", escape_like(term));

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM contacts WHERE owner_id = ",
            CONTACT_COLUMNS
        ));
        builder.push_bind(owner_id);
        builder.push(" AND (first_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR last_name ILIKE ");
        builder.push_bind(pattern.clone());
        builder.push(" OR email ILIKE ");
        builder.push_bind(pattern);
        builder.push(") ORDER BY created_at, id LIMIT ");
        builder.push_bind(page.limit);
        builder.push(" OFFSET ");
        builder.push_bind(page.offset);

        let contacts = builder
            .build_query_as::<Contact>()
            .fetch_all(&self.pool)
            .await?;

        Ok(contacts)
    }

    async fn upcoming_birthdays(
        &self,
        owner_id: Uuid,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Contact>, DatabaseError> {
        // The window test lives in one tested function; the query itself
        // stays a plain owner-scoped scan.
        let sql = format!(
            "SELECT {} FROM contacts WHERE owner_id = $1 ORDER BY created_at, id",
            CONTACT_COLUMNS
        );

        let contacts = sqlx::query_as::<_, Contact>(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(contacts
            .into_iter()
            .filter(|contact| birthdays::in_window(contact.birth_date, today, window_days))
            .collect())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn push_set_prefix(builder: &mut QueryBuilder<'_, Postgres>, first: &mut bool) {
    if *first {
        *first = false;
    } else {
        builder.push(", ");
    }
}

/// Escape LIKE wildcards so a search for "100%" matches the literal text.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// In-memory store used by the tests and the database-less backend.
/// Insertion order doubles as creation order.
#[derive(Debug, Default)]
pub struct MemoryContactStore {
    contacts: RwLock<Vec<Contact>>,
}

impl MemoryContactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn matches_term(contact: &Contact, needle: &str) -> bool {
    contact.first_name.to_lowercase().contains(needle)
        || contact.last_name.to_lowercase().contains(needle)
        || contact.email.to_lowercase().contains(needle)
}

fn page_slice(contacts: Vec<Contact>, page: Page) -> Vec<Contact> {
    contacts
        .into_iter()
        .skip(page.offset.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl ContactStore for MemoryContactStore {
    async fn create(&self, owner_id: Uuid, draft: NewContact) -> Result<Contact, DatabaseError> {
        let mut contacts = self.contacts.write().await;

        let taken = contacts
            .iter()
            .any(|c| c.owner_id == owner_id && c.email.eq_ignore_ascii_case(&draft.email));
        if taken {
            return Err(DatabaseError::Duplicate(DUPLICATE_CONTACT_EMAIL.to_string()));
        }

        let now = Utc::now();
        let contact = Contact {
            id: Uuid::new_v4(),
            owner_id,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            phone_number: draft.phone_number,
            birth_date: draft.birth_date,
            additional_info: draft.additional_info,
            created_at: now,
            updated_at: now,
        };

        contacts.push(contact.clone());
        Ok(contact)
    }

    async fn get(&self, owner_id: Uuid, id: Uuid) -> Result<Option<Contact>, DatabaseError> {
        let contact = self
            .contacts
            .read()
            .await
            .iter()
            .find(|c| c.id == id && c.owner_id == owner_id)
            .cloned();
        Ok(contact)
    }

    async fn list(&self, owner_id: Uuid, page: Page) -> Result<Vec<Contact>, DatabaseError> {
        let contacts = self
            .contacts
            .read()
            .await
            .iter()
            .filter(|c| c.owner_id == owner_id)
            .cloned()
            .collect::<Vec<_>>();
        Ok(page_slice(contacts, page))
    }

    async fn update(
        &self,
        owner_id: Uuid,
        id: Uuid,
        patch: ContactPatch,
    ) -> Result<Option<Contact>, DatabaseError> {
        let mut contacts = self.contacts.write().await;

        // The row must exist before the collision check can fire, matching
        // the single-statement Postgres path.
        let Some(position) = contacts
            .iter()
            .position(|c| c.id == id && c.owner_id == owner_id)
        else {
            return Ok(None);
        };

        if let Some(new_email) = patch.email.as_deref() {
            let taken = contacts.iter().any(|c| {
                c.owner_id == owner_id && c.id != id && c.email.eq_ignore_ascii_case(new_email)
            });
            if taken {
                return Err(DatabaseError::Duplicate(DUPLICATE_CONTACT_EMAIL.to_string()));
            }
        }

        let contact = &mut contacts[position];

        if let Some(first_name) = patch.first_name {
            contact.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            contact.last_name = last_name;
        }
        if let Some(email) = patch.email {
            contact.email = email;
        }
        if let Some(phone_number) = patch.phone_number {
            contact.phone_number = phone_number;
        }
        if let Some(birth_date) = patch.birth_date {
            contact.birth_date = birth_date;
        }
        if let Some(additional_info) = patch.additional_info {
            contact.additional_info = additional_info;
        }
        contact.updated_at = Utc::now();

        Ok(Some(contact.clone()))
    }

    async fn delete(&self, owner_id: Uuid, id: Uuid) -> Result<bool, DatabaseError> {
        let mut contacts = self.contacts.write().await;
        let before = contacts.len();
        contacts.retain(|c| !(c.id == id && c.owner_id == owner_id));
        Ok(contacts.len() < before)
    }

    async fn search(
        &self,
        owner_id: Uuid,
        term: &str,
        page: Page,
    ) -> Result<Vec<Contact>, DatabaseError> {
        let term = term.trim();
        if term.is_empty() {
            return self.list(owner_id, page).await;
        }

        let needle = term.to_lowercase();
        let contacts = self
            .contacts
            .read()
            .await
            .iter()
            .filter(|c| c.owner_id == owner_id && matches_term(c, &needle))
            .cloned()
            .collect::<Vec<_>>();
        Ok(page_slice(contacts, page))
    }

    async fn upcoming_birthdays(
        &self,
        owner_id: Uuid,
        today: NaiveDate,
        window_days: i64,
    ) -> Result<Vec<Contact>, DatabaseError> {
        let contacts = self
            .contacts
            .read()
            .await
            .iter()
            .filter(|c| {
                c.owner_id == owner_id && birthdays::in_window(c.birth_date, today, window_days)
            })
            .cloned()
            .collect();
        Ok(contacts)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(first: &str, last: &str, email: &str, birth: &str) -> NewContact {
        NewContact {
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: email.to_string(),
            phone_number: "+15551234567".to_string(),
            birth_date: birth.parse().unwrap(),
            additional_info: None,
        }
    }

    fn page(offset: i64, limit: i64) -> Page {
        Page { offset, limit }
    }

    #[tokio::test]
    async fn create_get_list_delete_flow() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();

        let created = store
            .create(owner, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .unwrap();

        let fetched = store.get(owner, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "ada@example.com");
        assert_eq!(fetched.owner_id, owner);

        let all = store.list(owner, page(0, 10)).await.unwrap();
        assert_eq!(all.len(), 1);

        assert!(store.delete(owner, created.id).await.unwrap());
        assert!(store.get(owner, created.id).await.unwrap().is_none());
        assert!(!store.delete(owner, created.id).await.unwrap());
    }

    #[tokio::test]
    async fn duplicate_email_is_per_owner() {
        let store = MemoryContactStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        store
            .create(alice, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .unwrap();

        let same_owner = store
            .create(alice, draft("Ada", "Again", "ADA@example.com", "1815-12-10"))
            .await;
        assert!(matches!(same_owner, Err(DatabaseError::Duplicate(_))));

        // A different owner may hold the same address
        assert!(store
            .create(bob, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = MemoryContactStore::new();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        let contact = store
            .create(alice, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .unwrap();

        assert!(store.get(bob, contact.id).await.unwrap().is_none());
        assert!(store.list(bob, page(0, 10)).await.unwrap().is_empty());
        assert!(!store.delete(bob, contact.id).await.unwrap());
        assert!(store
            .update(bob, contact.id, ContactPatch::default())
            .await
            .unwrap()
            .is_none());

        // Alice still sees it untouched
        assert!(store.get(alice, contact.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn patch_touches_only_supplied_fields() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();

        let created = store
            .create(owner, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .unwrap();

        let patch = ContactPatch {
            phone_number: Some("+442071234567".to_string()),
            ..Default::default()
        };
        let updated = store.update(owner, created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.phone_number, "+442071234567");
        assert_eq!(updated.first_name, "Ada");
        assert_eq!(updated.email, "ada@example.com");
        assert_eq!(updated.birth_date, created.birth_date);
        assert_eq!(updated.owner_id, owner);
    }

    #[tokio::test]
    async fn update_of_absent_id_is_none_despite_taken_email() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();

        store
            .create(owner, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .unwrap();

        // No such row, so the taken address never comes into play
        let patch = ContactPatch {
            email: Some("ada@example.com".to_string()),
            ..Default::default()
        };
        let result = store.update(owner, Uuid::new_v4(), patch).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn patch_can_clear_notes() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();

        let mut with_notes = draft("Ada", "Lovelace", "ada@example.com", "1815-12-10");
        with_notes.additional_info = Some("met at the analytical engine demo".to_string());
        let created = store.create(owner, with_notes).await.unwrap();
        assert!(created.additional_info.is_some());

        let patch = ContactPatch {
            additional_info: Some(None),
            ..Default::default()
        };
        let updated = store.update(owner, created.id, patch).await.unwrap().unwrap();
        assert!(updated.additional_info.is_none());
    }

    #[tokio::test]
    async fn search_blank_term_lists_everything() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();

        store
            .create(owner, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .unwrap();
        store
            .create(owner, draft("Grace", "Hopper", "grace@example.com", "1906-12-09"))
            .await
            .unwrap();

        let all = store.search(owner, "   ", page(0, 10)).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_substring() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();

        store
            .create(owner, draft("Ada", "Lovelace", "ada@example.com", "1815-12-10"))
            .await
            .unwrap();
        store
            .create(owner, draft("Grace", "Hopper", "grace@navy.mil", "1906-12-09"))
            .await
            .unwrap();
        store
            .create(other, draft("Adam", "Smith", "adam@example.com", "1723-06-16"))
            .await
            .unwrap();

        let hits = store.search(owner, "LACE", page(0, 10)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].last_name, "Lovelace");

        // Email matches too, and other owners never leak in
        let hits = store.search(owner, "navy", page(0, 10)).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = store.search(owner, "adam", page(0, 10)).await.unwrap();
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn list_pagination_slices_in_creation_order() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();

        for i in 0..3 {
            store
                .create(
                    owner,
                    draft("Ada", "Lovelace", &format!("ada{}@example.com", i), "1815-12-10"),
                )
                .await
                .unwrap();
        }

        let first_two = store.list(owner, page(0, 2)).await.unwrap();
        assert_eq!(first_two.len(), 2);
        assert_eq!(first_two[0].email, "ada0@example.com");

        let rest = store.list(owner, page(2, 2)).await.unwrap();
        assert_eq!(rest.len(), 1);

        let past_end = store.list(owner, page(10, 2)).await.unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn birthday_scan_is_owner_scoped() {
        let store = MemoryContactStore::new();
        let owner = Uuid::new_v4();
        let other = Uuid::new_v4();
        let today: NaiveDate = "2024-12-29".parse().unwrap();

        store
            .create(owner, draft("Ada", "Lovelace", "soon@example.com", "1990-01-03"))
            .await
            .unwrap();
        store
            .create(owner, draft("Grace", "Hopper", "later@example.com", "2000-01-06"))
            .await
            .unwrap();
        store
            .create(other, draft("Alan", "Turing", "other@example.com", "1990-01-03"))
            .await
            .unwrap();

        let upcoming = store.upcoming_birthdays(owner, today, 7).await.unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].email, "soon@example.com");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
